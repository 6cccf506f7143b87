use std::collections::VecDeque;

use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::{LemmaError, Result, TokenizeError},
    lemmatizer::{lemmatizer::Lemmatizer, tokenizer::WordTokenizer},
    normalizer::normalizer::Normalizer,
    segmenter::segmenter::Location,
};

static NON_LETTERS_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\P{L}+").unwrap());

/// Dictionary outputs known to be wrong for the forms that produce them.
pub const DEFAULT_IGNORED_LEMMATA: &[&str] = &[
    "publica",
    "tanto",
    "multi",
    "verro",
    "medio",
    "privo",
    "consento",
    "quieto",
    "mirabile",
    "retineo",
    "subeo",
    "Arruntius",
    "disparo",
    "prius",
    "scelerato",
];

pub fn default_ignored_lemmata() -> FxHashSet<String> {
    DEFAULT_IGNORED_LEMMATA.iter().map(|s| s.to_string()).collect()
}

/// A word form found in the text together with its lemma and the label of
/// the location it was found in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    pub form: String,
    pub lemma: Option<String>,
    pub location: String,
}

impl Word {
    pub fn new(form: impl Into<String>, lemma: Option<&str>, location: impl Into<String>) -> Self {
        Self {
            form: form.into(),
            lemma: lemma.map(String::from),
            location: location.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionStats {
    pub words: usize,
    pub ambiguous: usize,
    pub not_found: usize,
}

fn capitalize(form: &str) -> String {
    let mut chars = form.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Resolves a single form to its lemma.
///
/// Lookup is done on the lowercased form, retrying once with the
/// capitalised form when nothing is found. A single candidate on the
/// `ignored` list resolves to no lemma.
pub fn resolve_lemma<L: Lemmatizer + ?Sized>(
    lemmatizer: &L,
    form: &str,
    ignored: &FxHashSet<String>,
) -> std::result::Result<Option<String>, LemmaError> {
    let lowercase = form.to_lowercase();
    let mut candidates = lemmatizer.lemmatize(&lowercase);
    if candidates.is_empty() {
        candidates = lemmatizer.lemmatize(&capitalize(&lowercase));
    }

    match candidates.len() {
        0 => Err(LemmaError::NotFound {
            form: form.to_string(),
        }),
        1 => {
            let lemma = candidates.swap_remove(0);
            if ignored.contains(&lemma) {
                Ok(None)
            } else {
                Ok(Some(lemma))
            }
        }
        _ => Err(LemmaError::Ambiguous {
            form: form.to_string(),
            candidates,
        }),
    }
}

/// Splits a token around its non-letter characters.
pub fn forms_in_token(token: &str) -> impl Iterator<Item = &str> {
    NON_LETTERS_REGEX
        .split(token)
        .filter(|fragment| !fragment.is_empty())
}

/// Lazily turns a stream of locations into a stream of lemmatised words,
/// in document order. Forms that cannot be resolved to exactly one lemma
/// are skipped.
pub struct WordExtractor<I, L> {
    locations: I,
    lemmatizer: L,
    normalizer: Normalizer,
    fallback_tokenizer: WordTokenizer,
    ignored: FxHashSet<String>,
    current_label: String,
    pending_forms: VecDeque<String>,
    stats: ExtractionStats,
}

impl<I, L> WordExtractor<I, L>
where
    I: Iterator<Item = Result<Location>>,
    L: Lemmatizer,
{
    pub fn new(locations: I, lemmatizer: L, normalizer: Normalizer) -> Self {
        Self {
            locations,
            lemmatizer,
            normalizer,
            fallback_tokenizer: WordTokenizer::new(),
            ignored: default_ignored_lemmata(),
            current_label: String::new(),
            pending_forms: VecDeque::with_capacity(64),
            stats: ExtractionStats::default(),
        }
    }

    pub fn with_ignored_lemmata(mut self, ignored: FxHashSet<String>) -> Self {
        self.ignored = ignored;
        self
    }

    pub fn stats(&self) -> ExtractionStats {
        self.stats
    }

    fn tokenize(&self, text: &str) -> Vec<String> {
        match self.lemmatizer.tokenize(text) {
            Ok(tokens) => tokens,
            Err(TokenizeError::UnsupportedLanguage(language)) => {
                debug!(%language, "no tokenizer for language, using whitespace tokenizer");
                self.fallback_tokenizer.tokenize(text)
            }
        }
    }

    fn load_location(&mut self, location: Location) {
        let text = self.normalizer.normalize(&location.text);
        for token in self.tokenize(&text) {
            self.pending_forms
                .extend(forms_in_token(&token).map(String::from));
        }
        self.current_label = location.label;
    }
}

impl<I, L> Iterator for WordExtractor<I, L>
where
    I: Iterator<Item = Result<Location>>,
    L: Lemmatizer,
{
    type Item = Result<Word>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            while let Some(form) = self.pending_forms.pop_front() {
                match resolve_lemma(&self.lemmatizer, &form, &self.ignored) {
                    Ok(lemma) => {
                        self.stats.words += 1;
                        return Some(Ok(Word {
                            form,
                            lemma,
                            location: self.current_label.clone(),
                        }));
                    }
                    Err(e) => {
                        match e {
                            LemmaError::Ambiguous { .. } => self.stats.ambiguous += 1,
                            LemmaError::NotFound { .. } => self.stats.not_found += 1,
                        }
                        debug!(location = %self.current_label, error = %e, "skipping form");
                    }
                }
            }

            match self.locations.next()? {
                Ok(location) => self.load_location(location),
                Err(e) => return Some(Err(e)),
            }
        }
    }
}
