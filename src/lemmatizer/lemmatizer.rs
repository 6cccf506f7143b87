use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use rustc_hash::FxHashMap;
use tracing::info;

use crate::{
    error::{Result, TokenizeError},
    normalizer::normalizer::Language,
};

/// The dictionary capability the extractor consumes.
///
/// `lemmatize` receives a single word form and returns every candidate
/// lemma the backing data knows for it, or nothing. `tokenize` splits
/// normalised text into tokens; backends without a tokenizer for their
/// language keep the default, which makes the caller fall back to the
/// generic [`WordTokenizer`](super::tokenizer::WordTokenizer).
pub trait Lemmatizer {
    fn language(&self) -> Language;

    fn lemmatize(&self, form: &str) -> Vec<String>;

    fn tokenize(&self, _text: &str) -> std::result::Result<Vec<String>, TokenizeError> {
        Err(TokenizeError::UnsupportedLanguage(self.language()))
    }
}

impl<L: Lemmatizer + ?Sized> Lemmatizer for &L {
    fn language(&self) -> Language {
        (**self).language()
    }

    fn lemmatize(&self, form: &str) -> Vec<String> {
        (**self).lemmatize(form)
    }

    fn tokenize(&self, text: &str) -> std::result::Result<Vec<String>, TokenizeError> {
        (**self).tokenize(text)
    }
}

impl<L: Lemmatizer + ?Sized> Lemmatizer for Box<L> {
    fn language(&self) -> Language {
        (**self).language()
    }

    fn lemmatize(&self, form: &str) -> Vec<String> {
        (**self).lemmatize(form)
    }

    fn tokenize(&self, text: &str) -> std::result::Result<Vec<String>, TokenizeError> {
        (**self).tokenize(text)
    }
}

/// A lemmatizer backed by an in-memory table of forms and their candidate
/// lemmata, loaded from JSON of the shape `{"form": ["lemma", ...]}`.
#[derive(Debug, Clone)]
pub struct DictionaryLemmatizer {
    language: Language,
    lemmas: FxHashMap<String, Vec<String>>,
}

impl DictionaryLemmatizer {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            lemmas: FxHashMap::default(),
        }
    }

    pub fn from_reader<R: Read>(language: Language, reader: R) -> Result<Self> {
        let lemmas: FxHashMap<String, Vec<String>> = serde_json::from_reader(reader)?;
        Ok(Self { language, lemmas })
    }

    pub fn from_path<P: AsRef<Path>>(language: Language, path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let lemmatizer = Self::from_reader(language, BufReader::new(file))?;
        info!(
            path = %path.as_ref().display(),
            forms = lemmatizer.len(),
            "loaded lexicon"
        );
        Ok(lemmatizer)
    }

    pub fn insert(&mut self, form: impl Into<String>, lemma: impl Into<String>) {
        let lemmas = self.lemmas.entry(form.into()).or_default();
        let lemma = lemma.into();
        if !lemmas.contains(&lemma) {
            lemmas.push(lemma);
        }
    }

    pub fn len(&self) -> usize {
        self.lemmas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lemmas.is_empty()
    }
}

impl Lemmatizer for DictionaryLemmatizer {
    fn language(&self) -> Language {
        self.language
    }

    fn lemmatize(&self, form: &str) -> Vec<String> {
        self.lemmas.get(form).cloned().unwrap_or_default()
    }
}
