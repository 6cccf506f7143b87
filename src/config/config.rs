use std::{fs, path::Path};

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    extractor::extractor::DEFAULT_IGNORED_LEMMATA,
    normalizer::normalizer::{Language, Orthography},
    sections::sections::GroupBy,
    segmenter::segmenter::SegmenterOptions,
    utils::lemma_format::LemmaFormat,
};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub language: Language,
    pub use_line_numbers: bool,
    pub emit_empty_tail: bool,
    pub orthography: Orthography,
    pub ignored_lemmata: Vec<String>,
    pub lexicon_path: String,
    pub data_dir: String,
    pub include_ambiguous: bool,
    pub group_by: GroupBy,
    pub lemma_format: LemmaFormat,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            language: Language::Latin,
            use_line_numbers: false,
            emit_empty_tail: false,
            orthography: Orthography::Ui,
            ignored_lemmata: DEFAULT_IGNORED_LEMMATA.iter().map(|s| s.to_string()).collect(),
            lexicon_path: "lexicon.json".to_string(),
            data_dir: ".".to_string(),
            include_ambiguous: false,
            group_by: GroupBy::Section,
            lemma_format: LemmaFormat::default(),
        }
    }
}

impl Config {
    pub fn segmenter_options(&self) -> SegmenterOptions {
        SegmenterOptions {
            use_line_numbers: self.use_line_numbers,
            emit_empty_tail: self.emit_empty_tail,
        }
    }

    pub fn ignored_lemmata_set(&self) -> FxHashSet<String> {
        self.ignored_lemmata.iter().cloned().collect()
    }
}

/// Reads the configuration at `path`, falling back to the defaults when the
/// file is missing or cannot be parsed.
pub fn load_config<P: AsRef<Path>>(path: P) -> Config {
    let path = path.as_ref();
    if path.exists() {
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    info!(path = %path.display(), "loaded configuration");
                    return config;
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "error parsing configuration, using defaults");
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "error reading configuration, using defaults");
            }
        }
    } else {
        info!(path = %path.display(), "configuration not found, using defaults");
    }

    Config::default()
}
