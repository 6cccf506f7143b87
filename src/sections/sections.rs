use std::{iter::Peekable, str::FromStr};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    extractor::extractor::Word,
};

// A run of digits, Latin letters or Greek capitals, case-insensitively
static SECTION_RUN_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:[0-9]+|[A-Z]+|[Α-Ω]+)").unwrap());

/// The coarse section of a location label: its leading run of digits or
/// letters. `"1.2"` and `"9a"` belong to sections `"1"` and `"9"`.
pub fn section_of(label: &str) -> Option<&str> {
    SECTION_RUN_REGEX.find(label).map(|found| found.as_str())
}

/// The detailed section of a location label: everything but its innermost
/// component. `"1.1.3"` belongs to `"1.1"` and `"9a1"` to `"9a"`.
pub fn detailed_section_of(label: &str) -> Option<&str> {
    let reversed: String = label.chars().rev().collect();
    let found = SECTION_RUN_REGEX.find(&reversed)?;
    let rest = &label[..label.len() - found.end()];
    let mut chars = rest.chars();
    match chars.next_back() {
        Some(separator) if !separator.is_alphanumeric() => Some(chars.as_str()),
        _ => Some(rest),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    #[default]
    Section,
    DetailedSection,
    Location,
}

impl GroupBy {
    pub fn key_of(&self, word: &Word) -> Option<String> {
        match self {
            GroupBy::Section => section_of(&word.location).map(String::from),
            GroupBy::DetailedSection => detailed_section_of(&word.location).map(String::from),
            GroupBy::Location => Some(word.location.clone()),
        }
    }
}

impl FromStr for GroupBy {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "section" => Ok(GroupBy::Section),
            "detailed_section" | "detailed-section" => Ok(GroupBy::DetailedSection),
            "location" => Ok(GroupBy::Location),
            other => Err(Error::InvalidOption(format!("unknown grouping '{}'", other))),
        }
    }
}

/// One run of consecutive words sharing a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordGroup {
    pub key: Option<String>,
    pub words: Vec<Word>,
}

/// Coalesces adjacent words with equal keys into groups. The input is
/// expected to be in document order already; words with the same key that
/// are not adjacent end up in separate groups.
pub struct WordGroups<I: Iterator<Item = Result<Word>>> {
    words: Peekable<I>,
    group_by: GroupBy,
}

impl<I: Iterator<Item = Result<Word>>> WordGroups<I> {
    pub fn new(words: I, group_by: GroupBy) -> Self {
        Self {
            words: words.peekable(),
            group_by,
        }
    }
}

impl<I: Iterator<Item = Result<Word>>> Iterator for WordGroups<I> {
    type Item = Result<WordGroup>;

    fn next(&mut self) -> Option<Self::Item> {
        let first = match self.words.next()? {
            Ok(word) => word,
            Err(e) => return Some(Err(e)),
        };
        let key = self.group_by.key_of(&first);
        let mut words = vec![first];

        while let Some(Ok(word)) = self.words.peek() {
            if self.group_by.key_of(word) != key {
                break;
            }
            if let Some(Ok(word)) = self.words.next() {
                words.push(word);
            }
        }

        Some(Ok(WordGroup { key, words }))
    }
}

pub fn group_words<I>(words: I, group_by: GroupBy) -> WordGroups<I::IntoIter>
where
    I: IntoIterator<Item = Result<Word>>,
{
    WordGroups::new(words.into_iter(), group_by)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn word(form: &str, location: &str) -> Result<Word> {
        Ok(Word::new(form, Some(form), location))
    }

    fn keys(groups: Vec<WordGroup>) -> Vec<(Option<String>, usize)> {
        groups.into_iter().map(|g| (g.key, g.words.len())).collect()
    }

    #[test]
    fn test_section_of() {
        assert_eq!(section_of("3.2.7"), Some("3"));
        assert_eq!(section_of("9a"), Some("9"));
        assert_eq!(section_of("9b"), Some("9"));
        assert_eq!(section_of("xii.4"), Some("xii"));
        assert_eq!(section_of("Αβ3"), Some("Αβ"));
        assert_eq!(section_of(".3"), None);
        assert_eq!(section_of(""), None);
    }

    #[test]
    fn test_detailed_section_of() {
        assert_eq!(detailed_section_of("3.2.7"), Some("3.2"));
        assert_eq!(detailed_section_of("1.1.3"), Some("1.1"));
        assert_eq!(detailed_section_of("9a1"), Some("9a"));
        assert_eq!(detailed_section_of("9a"), Some("9"));
        assert_eq!(detailed_section_of("7"), Some(""));
        assert_eq!(detailed_section_of("3."), None);
    }

    #[test]
    fn test_adjacent_words_are_coalesced() {
        let words = vec![
            word("arma", "1.1"),
            word("virumque", "1.2"),
            word("cano", "2.1"),
            word("Troiae", "2.1"),
        ];
        let groups: Vec<WordGroup> = group_words(words, GroupBy::Section)
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(
            keys(groups),
            vec![(Some("1".to_string()), 2), (Some("2".to_string()), 2)]
        );
    }

    #[test]
    fn test_runs_are_not_merged() {
        let words = vec![word("arma", "1"), word("cano", "2"), word("qui", "1")];
        let groups: Vec<WordGroup> = group_words(words, GroupBy::Location)
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(
            keys(groups),
            vec![
                (Some("1".to_string()), 1),
                (Some("2".to_string()), 1),
                (Some("1".to_string()), 1),
            ]
        );
    }

    #[test]
    fn test_detailed_grouping() {
        let words = vec![
            word("arma", "1.1.1"),
            word("virumque", "1.1.2"),
            word("cano", "1.2.1"),
        ];
        let groups: Vec<WordGroup> = group_words(words, GroupBy::DetailedSection)
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(
            keys(groups),
            vec![(Some("1.1".to_string()), 2), (Some("1.2".to_string()), 1)]
        );
    }

    #[test]
    fn test_unlabelled_words_form_a_null_group() {
        let words = vec![word("arma", "-"), word("cano", "-"), word("qui", "1")];
        let groups: Vec<WordGroup> = group_words(words, GroupBy::Section)
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(keys(groups), vec![(None, 2), (Some("1".to_string()), 1)]);
    }

    #[test]
    fn test_error_ends_group() {
        let words = vec![
            word("arma", "1"),
            Err(Error::Io(io::Error::new(io::ErrorKind::Other, "read failed"))),
            word("cano", "1"),
        ];
        let mut groups = group_words(words, GroupBy::Section);
        assert_eq!(groups.next().unwrap().unwrap().words.len(), 1);
        assert!(groups.next().unwrap().is_err());
        assert_eq!(groups.next().unwrap().unwrap().words.len(), 1);
        assert!(groups.next().is_none());
    }

    #[test]
    fn test_group_by_from_str() {
        assert_eq!("section".parse::<GroupBy>().unwrap(), GroupBy::Section);
        assert_eq!(
            "detailed-section".parse::<GroupBy>().unwrap(),
            GroupBy::DetailedSection
        );
        assert!("file".parse::<GroupBy>().is_err());
    }
}
