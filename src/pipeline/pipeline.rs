use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter},
    path::{Path, PathBuf},
};

use rustc_hash::FxHashSet;
use tracing::{info, warn};

use crate::{
    config::config::Config,
    equivalence::{
        equivalence_graph::{EquivalenceGraph, LemmaNode},
        equivalence_table::{EquivalenceTable, ImportSummary},
        lemma_converter::{ConversionReport, LemmaConverter},
    },
    error::{Error, Result},
    extractor::extractor::{Word, WordExtractor},
    lemmatizer::lemmatizer::{DictionaryLemmatizer, Lemmatizer},
    normalizer::normalizer::Normalizer,
    sections::sections::{GroupBy, WordGroups},
    segmenter::segmenter::LocationSegmenter,
    utils::paths::{get_adjacency_export_path, get_equivalence_graph_path},
    vocabulary::vocabulary::Vocabulary,
};

pub type FileWords<'a> = WordExtractor<LocationSegmenter<BufReader<File>>, &'a dyn Lemmatizer>;

/// Ties the stages together for one language: text files go in, words,
/// sections and vocabularies come out, and lemmata can be converted
/// between naming conventions through the equivalence graph.
pub struct Pipeline {
    config: Config,
    lemmatizer: Box<dyn Lemmatizer>,
    ignored_lemmata: FxHashSet<String>,
    graph: EquivalenceGraph,
    graph_path: PathBuf,
}

impl Pipeline {
    pub fn new(config: Config, lemmatizer: Box<dyn Lemmatizer>) -> Result<Self> {
        let data_dir = Path::new(&config.data_dir);
        if !data_dir.is_dir() {
            return Err(Error::MissingPath(config.data_dir.clone()));
        }
        if lemmatizer.language() != config.language {
            warn!(
                configured = %config.language,
                lemmatizer = %lemmatizer.language(),
                "lemmatizer language differs from the configured language"
            );
        }

        let graph_path = get_equivalence_graph_path(data_dir, config.language);
        let graph = EquivalenceGraph::load_from_path(&graph_path)?;
        let ignored_lemmata = config.ignored_lemmata_set();
        Ok(Self {
            config,
            lemmatizer,
            ignored_lemmata,
            graph,
            graph_path,
        })
    }

    /// Builds a pipeline around the dictionary lexicon named in `config`.
    pub fn from_config(config: Config) -> Result<Self> {
        let lemmatizer = DictionaryLemmatizer::from_path(config.language, &config.lexicon_path)?;
        Self::new(config, Box::new(lemmatizer))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn graph(&self) -> &EquivalenceGraph {
        &self.graph
    }

    pub fn normalizer(&self) -> Normalizer {
        Normalizer::new(self.config.language, self.config.orthography)
    }

    pub fn words<R: BufRead>(&self, reader: R) -> WordExtractor<LocationSegmenter<R>, &dyn Lemmatizer> {
        let locations = LocationSegmenter::new(reader, self.config.segmenter_options());
        WordExtractor::new(locations, self.lemmatizer.as_ref(), self.normalizer())
            .with_ignored_lemmata(self.ignored_lemmata.clone())
    }

    pub fn words_from_path<P: AsRef<Path>>(&self, path: P) -> Result<FileWords<'_>> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::MissingPath(path.display().to_string()));
        }
        if path.extension().and_then(|s| s.to_str()) != Some("txt") {
            warn!(path = %path.display(), "only plain text input is supported");
        }
        info!(path = %path.display(), "loading text");
        let file = File::open(path)?;
        Ok(self.words(BufReader::new(file)))
    }

    pub fn groups_from_path<P: AsRef<Path>>(&self, path: P) -> Result<WordGroups<FileWords<'_>>> {
        self.groups_from_path_by(path, self.config.group_by)
    }

    pub fn groups_from_path_by<P: AsRef<Path>>(
        &self,
        path: P,
        group_by: GroupBy,
    ) -> Result<WordGroups<FileWords<'_>>> {
        let words = self.words_from_path(path)?;
        Ok(WordGroups::new(words, group_by))
    }

    pub fn vocabulary_from_path<P: AsRef<Path>>(
        &self,
        path: P,
        include_duplicates: bool,
    ) -> Result<Vocabulary> {
        let words = self.words_from_path(path)?.collect::<Result<Vec<Word>>>()?;
        Ok(Vocabulary::from_words(words, include_duplicates))
    }

    /// Applies the configured display options to a lemma.
    pub fn format_lemma(&self, lemma: &str) -> String {
        self.config.lemma_format.apply(lemma)
    }

    pub fn import_table<P: AsRef<Path>>(&mut self, path: P) -> Result<ImportSummary> {
        let path = path.as_ref();
        info!(path = %path.display(), "importing new equivalencies");
        EquivalenceTable::from_path(path)?.import_into(&mut self.graph)
    }

    pub fn resolve(&self, display: &str, source: &str, target: &str) -> Result<&LemmaNode> {
        let node = LemmaNode::new(display, source.to_lowercase());
        Ok(self
            .graph
            .resolve(&node, &target.to_lowercase(), self.config.include_ambiguous)?)
    }

    pub fn converter(&self, source: &str, target: &str) -> LemmaConverter<'_> {
        LemmaConverter::new(&self.graph, source, target).include_ambiguous(self.config.include_ambiguous)
    }

    pub fn convert<I>(&self, words: I, source: &str, target: &str) -> (Vec<Word>, ConversionReport)
    where
        I: IntoIterator<Item = Word>,
    {
        self.converter(source, target).convert_words(words)
    }

    /// Lemmatises the text at `path` and converts its lemmata from `source`
    /// to `target` convention.
    pub fn convert_path<P: AsRef<Path>>(
        &self,
        path: P,
        source: &str,
        target: &str,
    ) -> Result<(Vec<Word>, ConversionReport)> {
        let words = self.words_from_path(path)?.collect::<Result<Vec<Word>>>()?;
        Ok(self.convert(words, source, target))
    }

    pub fn save_graph(&self) -> Result<()> {
        self.graph.save_to_path(&self.graph_path)
    }

    pub fn export_graph(&self) -> Result<PathBuf> {
        let path = get_adjacency_export_path(&self.config.data_dir, self.config.language);
        let file = File::create(&path)?;
        self.graph.export_adjacency(BufWriter::new(file))?;
        info!(path = %path.display(), "exported equivalence graph");
        Ok(path)
    }
}
