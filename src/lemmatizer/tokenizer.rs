// Generic tokenizer used when the lemmatizer has no tokenizer of its own
// for a language. Words are separated by whitespace; punctuation stuck to
// either end of a word becomes a token of its own.

#[derive(Debug, Clone, Default)]
pub struct WordTokenizer;

fn is_punctuation(c: char) -> bool {
    !c.is_alphanumeric()
}

impl WordTokenizer {
    pub fn new() -> Self {
        WordTokenizer
    }

    pub fn tokenize(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let mut tokens = Vec::new();
        for word in text.split_whitespace() {
            let core = word.trim_matches(is_punctuation);
            if core.is_empty() {
                tokens.push(word.to_string());
                continue;
            }

            let start = word.len() - word.trim_start_matches(is_punctuation).len();
            let end = start + core.len();

            tokens.extend(word[..start].chars().map(String::from));
            tokens.push(core.to_string());
            tokens.extend(word[end..].chars().map(String::from));
        }

        tokens
    }
}
