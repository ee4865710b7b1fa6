//! Lightweight search query wrapper.

use super::ScoringError;

#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub text: String,
    pub top_k: usize,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>, top_k: usize) -> Result<Self, ScoringError> {
        if top_k == 0 {
            return Err(ScoringError::InvalidK);
        }
        Ok(Self {
            text: text.into(),
            top_k,
        })
    }
}
