//! Text normalisation and tokenisation shared by every encoder.

pub mod cleaner;
pub mod tokenizer;

pub use cleaner::{Cleaner, CleanerError};
pub use tokenizer::{TokenInfo, Tokenizer, TokenizerError};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PreprocessorError {
    #[error("Cleaning failed: {0}")]
    Cleaner(#[from] CleanerError),
    #[error("Tokenization failed: {0}")]
    Tokenizer(#[from] TokenizerError),
}

pub struct Preprocessor;

impl Preprocessor {
    /// Clean, then tokenize. No truncation happens here.
    pub fn process(input: &str) -> Result<TokenInfo, PreprocessorError> {
        let cleaned = Cleaner::clean(input)?;
        let tokens = Tokenizer::tokenize(&cleaned)?;
        Ok(tokens)
    }
}
