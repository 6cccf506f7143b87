use std::collections::BTreeMap;

use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::{extractor::extractor::Word, sections::sections::section_of};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VocabularyEntry {
    pub lemma: String,
    pub locations: Vec<String>,
}

impl VocabularyEntry {
    pub fn joined_locations(&self) -> String {
        self.locations.join(", ")
    }
}

/// The lemmata of a text, each with the locations it occurs at, sorted by
/// lemma.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Vocabulary {
    entries: Vec<VocabularyEntry>,
}

impl Vocabulary {
    /// Builds the vocabulary of `words`. Without `include_duplicates` a
    /// lemma is listed once per section, at its first location there.
    /// Words without a lemma are left out.
    pub fn from_words<I>(words: I, include_duplicates: bool) -> Self
    where
        I: IntoIterator<Item = Word>,
    {
        let mut lemmata: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut seen: FxHashSet<(Option<String>, String)> = FxHashSet::default();

        for word in words {
            let Some(lemma) = word.lemma else {
                continue;
            };
            if !include_duplicates {
                let section = section_of(&word.location).map(String::from);
                if !seen.insert((section, lemma.clone())) {
                    continue;
                }
            }
            lemmata.entry(lemma).or_default().push(word.location);
        }

        let entries = lemmata
            .into_iter()
            .map(|(lemma, locations)| VocabularyEntry { lemma, locations })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[VocabularyEntry] {
        &self.entries
    }

    pub fn get(&self, lemma: &str) -> Option<&VocabularyEntry> {
        self.entries
            .binary_search_by(|entry| entry.lemma.as_str().cmp(lemma))
            .ok()
            .map(|i| &self.entries[i])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
