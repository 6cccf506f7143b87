pub mod lemmatizer;
pub mod tokenizer;
