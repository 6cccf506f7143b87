use tracing::{debug, info};

use crate::{
    equivalence::equivalence_graph::{EquivalenceGraph, LemmaNode},
    error::EquivalenceError,
    extractor::extractor::Word,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionReport {
    pub converted: usize,
    pub total: usize,
}

/// Rewrites lemmata from one naming convention into another using an
/// equivalence graph. Lemmata that cannot be converted are flagged as
/// `"{source}: {display}"` so they stand out for review.
pub struct LemmaConverter<'g> {
    graph: &'g EquivalenceGraph,
    source: String,
    target: String,
    include_ambiguous: bool,
}

impl<'g> LemmaConverter<'g> {
    pub fn new(graph: &'g EquivalenceGraph, source: &str, target: &str) -> Self {
        Self {
            graph,
            source: source.to_lowercase(),
            target: target.to_lowercase(),
            include_ambiguous: false,
        }
    }

    pub fn include_ambiguous(mut self, include_ambiguous: bool) -> Self {
        self.include_ambiguous = include_ambiguous;
        self
    }

    pub fn convert(&self, display: &str) -> Result<&'g LemmaNode, EquivalenceError> {
        let source = LemmaNode::new(display, self.source.as_str());
        self.graph
            .resolve(&source, &self.target, self.include_ambiguous)
    }

    /// Converts the lemma of `word` in place. Returns whether it succeeded.
    pub fn convert_word(&self, word: &mut Word) -> bool {
        let Some(display) = word.lemma.clone() else {
            return false;
        };
        match self.convert(&display) {
            Ok(node) => {
                word.lemma = Some(node.display.clone());
                true
            }
            Err(e) => {
                debug!(form = %word.form, error = %e, "lemma not converted");
                word.lemma = Some(LemmaNode::new(display, self.source.as_str()).to_string());
                false
            }
        }
    }

    pub fn convert_words<I>(&self, words: I) -> (Vec<Word>, ConversionReport)
    where
        I: IntoIterator<Item = Word>,
    {
        let mut report = ConversionReport::default();
        let converted: Vec<Word> = words
            .into_iter()
            .map(|mut word| {
                report.total += 1;
                if self.convert_word(&mut word) {
                    report.converted += 1;
                }
                word
            })
            .collect();

        info!(
            converted = report.converted,
            total = report.total,
            target = %self.target,
            "converted lemmata"
        );
        (converted, report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph() -> EquivalenceGraph {
        let mut graph = EquivalenceGraph::new();
        graph.import_row(&[("bridge", "puer"), ("lsj", "boy")]);
        graph.import_row(&[("bridge", "arma"), ("lsj", "arms")]);
        graph.import_row(&[("bridge", "arma"), ("lsj", "weapons")]);
        graph
    }

    #[test]
    fn test_convert_words() {
        let graph = graph();
        let converter = LemmaConverter::new(&graph, "bridge", "LSJ");
        let words = vec![
            Word::new("pueri", Some("puer"), "1"),
            Word::new("arma", Some("arma"), "1"),
            Word::new("cano", None, "2"),
            Word::new("Troiae", Some("Troia"), "2"),
        ];

        let (converted, report) = converter.convert_words(words);
        assert_eq!(report, ConversionReport { converted: 1, total: 4 });
        assert_eq!(converted[0].lemma.as_deref(), Some("boy"));
        assert_eq!(converted[1].lemma.as_deref(), Some("bridge: arma"));
        assert_eq!(converted[2].lemma, None);
        assert_eq!(converted[3].lemma.as_deref(), Some("bridge: Troia"));
        assert_eq!(converted[3].form, "Troiae");
    }

    #[test]
    fn test_include_ambiguous() {
        let graph = graph();
        let converter = LemmaConverter::new(&graph, "bridge", "lsj").include_ambiguous(true);
        let mut word = Word::new("arma", Some("arma"), "1");
        assert!(converter.convert_word(&mut word));
        assert_eq!(word.lemma.as_deref(), Some("arms"));
    }

    #[test]
    fn test_convert_reports_error() {
        let graph = graph();
        let converter = LemmaConverter::new(&graph, "bridge", "lsj");
        assert!(matches!(
            converter.convert("arma"),
            Err(EquivalenceError::Ambiguous { count: 2, .. })
        ));
        assert!(matches!(
            converter.convert("Troia"),
            Err(EquivalenceError::UnknownLemma { .. })
        ));
    }
}
