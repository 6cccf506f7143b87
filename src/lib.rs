pub mod config;
pub mod equivalence;
pub mod error;
pub mod extractor;
pub mod lemmatizer;
pub mod normalizer;
pub mod pipeline;
pub mod sections;
pub mod segmenter;
pub mod utils;
pub mod vocabulary;
