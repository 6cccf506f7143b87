use std::io;

use thiserror::Error;

use crate::normalizer::normalizer::Language;

/// Per-form failures while resolving a lemma. The extractor logs and skips
/// these; they never abort a run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LemmaError {
    #[error("'{form}' has multiple lemmata: {candidates:?}")]
    Ambiguous {
        form: String,
        candidates: Vec<String>,
    },

    #[error("no lemma found for '{form}'")]
    NotFound { form: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenizeError {
    #[error("tokenization is not supported for {0}")]
    UnsupportedLanguage(Language),
}

/// Failures of an equivalence lookup, surfaced to whoever asked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EquivalenceError {
    #[error("no {target} lemma found for {display}")]
    NoEquivalent { display: String, target: String },

    #[error("no unique {target} lemma found for {display} ({count} candidates)")]
    Ambiguous {
        display: String,
        target: String,
        count: usize,
    },

    #[error("{display} ({convention}) is not in the equivalence graph")]
    UnknownLemma { display: String, convention: String },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid equivalence table: {0}")]
    InvalidTable(String),

    #[error("invalid option: {0}")]
    InvalidOption(String),

    #[error("path does not exist: {0}")]
    MissingPath(String),

    #[error(transparent)]
    Equivalence(#[from] EquivalenceError),
}

pub type Result<T> = std::result::Result<T, Error>;
