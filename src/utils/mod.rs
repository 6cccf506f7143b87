pub mod lemma_format;
pub mod paths;
