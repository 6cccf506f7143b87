use std::{fs::File, io::Read, path::Path};

use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, info, warn};

use crate::{
    equivalence::equivalence_graph::EquivalenceGraph,
    error::{Error, Result},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub rows: usize,
    pub lemmata_added: usize,
    pub edges_added: usize,
}

/// A table of equivalent lemma names read from CSV. The first row names
/// the convention of each column; every following row holds the names of
/// one lemma, with empty cells where a convention has no name for it.
pub struct EquivalenceTable<R: Read> {
    conventions: Vec<String>,
    reader: csv::Reader<R>,
}

impl EquivalenceTable<File> {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::MissingPath(path.display().to_string()));
        }
        Self::from_reader(File::open(path)?)
    }
}

impl<R: Read> EquivalenceTable<R> {
    pub fn from_reader(reader: R) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut header = StringRecord::new();
        if !reader.read_record(&mut header)? {
            return Err(Error::InvalidTable("the table is empty".to_string()));
        }

        let conventions: Vec<String> = header.iter().map(|cell| cell.to_lowercase()).collect();
        if let Some(column) = conventions.iter().position(|c| c.is_empty()) {
            return Err(Error::InvalidTable(format!(
                "column {} has no convention name",
                column + 1
            )));
        }

        Ok(Self {
            conventions,
            reader,
        })
    }

    pub fn conventions(&self) -> &[String] {
        &self.conventions
    }

    // Cells past the last declared convention have no convention to go with
    fn cells<'r>(&self, record: &'r StringRecord) -> Vec<(&str, &'r str)> {
        if record.len() > self.conventions.len() {
            warn!(
                row = record.position().map(|p| p.line()).unwrap_or_default(),
                cells = record.len(),
                conventions = self.conventions.len(),
                "ignoring cells without a convention"
            );
        }
        self.conventions
            .iter()
            .map(String::as_str)
            .zip(record.iter())
            .collect()
    }

    /// Adds every row of the table to `graph`.
    pub fn import_into(mut self, graph: &mut EquivalenceGraph) -> Result<ImportSummary> {
        let lemmata_before = graph.len();
        let mut summary = ImportSummary::default();
        let mut record = StringRecord::new();

        while self.reader.read_record(&mut record)? {
            let cells = self.cells(&record);
            let added = graph.import_row(&cells);
            debug!(row = summary.rows + 1, edges = added, "imported equivalence row");
            summary.rows += 1;
            summary.edges_added += added;
        }

        summary.lemmata_added = graph.len() - lemmata_before;
        info!(
            rows = summary.rows,
            lemmata = summary.lemmata_added,
            edges = summary.edges_added,
            "imported equivalence table"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equivalence::equivalence_graph::LemmaNode;

    const TABLE: &str = "Bridge, LSJ ,Lewis\n\
                         puer,boy,puer\n\
                         arma,,arma1\n";

    #[test]
    fn test_conventions_are_lowercased() {
        let table = EquivalenceTable::from_reader(TABLE.as_bytes()).unwrap();
        assert_eq!(table.conventions(), &["bridge", "lsj", "lewis"]);
    }

    #[test]
    fn test_import_into_graph() {
        let mut graph = EquivalenceGraph::new();
        let summary = EquivalenceTable::from_reader(TABLE.as_bytes())
            .unwrap()
            .import_into(&mut graph)
            .unwrap();

        assert_eq!(
            summary,
            ImportSummary {
                rows: 2,
                lemmata_added: 5,
                edges_added: 4,
            }
        );
        let puer = LemmaNode::new("puer", "bridge");
        assert_eq!(
            graph.resolve(&puer, "lsj", false),
            Ok(&LemmaNode::new("boy", "lsj"))
        );
        let arma = LemmaNode::new("arma", "bridge");
        assert!(graph.resolve(&arma, "lsj", false).is_err());
    }

    #[test]
    fn test_reimport_adds_nothing() {
        let mut graph = EquivalenceGraph::new();
        EquivalenceTable::from_reader(TABLE.as_bytes())
            .unwrap()
            .import_into(&mut graph)
            .unwrap();
        let summary = EquivalenceTable::from_reader(TABLE.as_bytes())
            .unwrap()
            .import_into(&mut graph)
            .unwrap();
        assert_eq!(summary.lemmata_added, 0);
        assert_eq!(summary.edges_added, 0);
        assert_eq!(graph.edge_count(), 4);
    }

    #[test]
    fn test_short_rows_are_padded() {
        let mut graph = EquivalenceGraph::new();
        let summary = EquivalenceTable::from_reader("bridge,lsj,lewis\npuer,boy\n".as_bytes())
            .unwrap()
            .import_into(&mut graph)
            .unwrap();
        assert_eq!(summary.edges_added, 1);
    }

    #[test]
    fn test_invalid_tables() {
        assert!(matches!(
            EquivalenceTable::from_reader("".as_bytes()),
            Err(Error::InvalidTable(_))
        ));
        assert!(matches!(
            EquivalenceTable::from_reader("bridge,,lewis\n".as_bytes()),
            Err(Error::InvalidTable(_))
        ));
    }

    #[test]
    fn test_cells_beyond_the_header_are_ignored() {
        let mut graph = EquivalenceGraph::new();
        let summary = EquivalenceTable::from_reader("bridge,lsj\npuer,boy\narma,arms,extra\n".as_bytes())
            .unwrap()
            .import_into(&mut graph)
            .unwrap();
        assert_eq!(summary.rows, 2);
        assert_eq!(summary.lemmata_added, 4);
        assert_eq!(summary.edges_added, 2);

        let arma = LemmaNode::new("arma", "bridge");
        assert_eq!(
            graph.resolve(&arma, "lsj", false),
            Ok(&LemmaNode::new("arms", "lsj"))
        );
        assert!(graph.traverse(&arma).all(|node| node.display != "extra"));
    }

    #[test]
    fn test_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let result = EquivalenceTable::from_path(dir.path().join("missing.csv"));
        assert!(matches!(result, Err(Error::MissingPath(_))));
    }
}
