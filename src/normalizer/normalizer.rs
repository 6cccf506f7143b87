use std::fmt;

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

const COMBINING_MACRON: char = '\u{0304}';
const COMBINING_DIAERESIS: char = '\u{0308}';
const COMBINING_GRAVE: char = '\u{0300}';
const COMBINING_ACUTE: char = '\u{0301}';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Latin,
    Greek,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Latin => "latin",
            Language::Greek => "greek",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How Latin u/v and i/j are spelled. Both conventions write j as i.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orthography {
    /// v is written u ("uirumque")
    #[default]
    Ui,
    /// u is written v ("vivo", "qvi")
    Vi,
}

impl Orthography {
    pub fn respell_char(&self, c: char) -> char {
        match (self, c) {
            (_, 'j') => 'i',
            (_, 'J') => 'I',
            (Orthography::Ui, 'v') => 'u',
            (Orthography::Ui, 'V') => 'U',
            (Orthography::Vi, 'u') => 'v',
            (Orthography::Vi, 'U') => 'V',
            _ => c,
        }
    }

    pub fn respell(&self, text: &str) -> String {
        text.chars().map(|c| self.respell_char(c)).collect()
    }
}

/// Applies `f` to the canonical decomposition of `text` and recomposes the
/// result, so combining marks can be edited as separate characters.
pub fn with_decomposition<F>(text: &str, f: F) -> String
where
    F: Fn(char) -> Option<char>,
{
    text.nfd().filter_map(f).nfc().collect()
}

/// Orthographic normalisation applied to text before tokenization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Normalizer {
    language: Language,
    orthography: Orthography,
}

impl Normalizer {
    pub fn new(language: Language, orthography: Orthography) -> Self {
        Self {
            language,
            orthography,
        }
    }

    pub fn normalize(&self, text: &str) -> String {
        match self.language {
            Language::Latin => {
                let orthography = self.orthography;
                with_decomposition(text, |c| {
                    (c != COMBINING_MACRON).then(|| orthography.respell_char(c))
                })
            }
            Language::Greek => with_decomposition(text, |c| match c {
                COMBINING_DIAERESIS => None,
                COMBINING_GRAVE => Some(COMBINING_ACUTE),
                _ => Some(c),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latin_macrons_and_spelling() {
        let normalizer = Normalizer::new(Language::Latin, Orthography::Ui);
        assert_eq!(normalizer.normalize("Trōiae quī prīmus"), "Troiae qui primus");
        assert_eq!(normalizer.normalize("virumque Iulius Julius"), "uirumque Iulius Iulius");
    }

    #[test]
    fn test_latin_vi_convention() {
        let normalizer = Normalizer::new(Language::Latin, Orthography::Vi);
        assert_eq!(normalizer.normalize("uirumque iam"), "virvmqve iam");
    }

    #[test]
    fn test_greek_marks() {
        let normalizer = Normalizer::new(Language::Greek, Orthography::default());
        // grave on the final syllable becomes acute
        assert_eq!(normalizer.normalize("καὶ"), "καί");
        // diaeresis is dropped
        assert_eq!(normalizer.normalize("προΐημι"), "προίημι");
        assert_eq!(normalizer.normalize("ἀϋτή"), "ἀυτή");
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let samples = [
            (Language::Latin, "Ārma virumque canō, Trōiae quī prīmus ab ōrīs"),
            (Language::Greek, "μῆνιν ἄειδε θεὰ Πηληϊάδεω Ἀχιλῆος"),
        ];
        for (language, text) in samples {
            let normalizer = Normalizer::new(language, Orthography::Ui);
            let once = normalizer.normalize(text);
            assert_eq!(normalizer.normalize(&once), once);
        }
    }

    #[test]
    fn test_output_is_composed() {
        let normalizer = Normalizer::new(Language::Greek, Orthography::Ui);
        let result = normalizer.normalize("θεὰ");
        assert_eq!(result, "θεά".nfc().collect::<String>());
        assert_eq!(result.chars().count(), 3);
    }
}
