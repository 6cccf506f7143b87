use serde::{Deserialize, Serialize};

use crate::normalizer::normalizer::Orthography;

/// Display options applied to lemmata on output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LemmaFormat {
    pub lowercase: bool,
    pub uppercase: bool,
    pub no_trailing_digits: bool,
    pub no_punctuation: bool,
    pub respell: Option<Orthography>,
}

impl LemmaFormat {
    pub fn apply(&self, lemma: &str) -> String {
        let mut lemma = lemma.to_string();
        if self.lowercase {
            lemma = lemma.to_lowercase();
        }
        if self.uppercase {
            lemma = lemma.to_uppercase();
        }
        if self.no_trailing_digits {
            lemma.truncate(lemma.trim_end_matches(|c: char| c.is_ascii_digit()).len());
        }
        if self.no_punctuation {
            lemma.retain(char::is_alphabetic);
        }
        if let Some(orthography) = self.respell {
            lemma = orthography.respell(&lemma);
        }
        lemma
    }
}
