use std::path::{Path, PathBuf};

use crate::normalizer::normalizer::Language;

pub fn get_equivalence_graph_path<P: AsRef<Path>>(path: P, language: Language) -> PathBuf {
    path.as_ref()
        .join(format!("{}_lemmata_equivalencies.json", language))
}

pub fn get_adjacency_export_path<P: AsRef<Path>>(path: P, language: Language) -> PathBuf {
    path.as_ref()
        .join(format!("{}_lemmata_equivalencies_dictionary.json", language))
}
