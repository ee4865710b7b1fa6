use crate::config::ConfigError;
use crate::embedding::EncoderError;
use crate::memory::StoreError;
use crate::retrieval::ScoringError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("Got {documents} documents but {metadatas} metadata entries")]
    MetadataLengthMismatch { documents: usize, metadatas: usize },
    #[error("Encoder error: {0}")]
    Encoder(#[from] EncoderError),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Scoring error: {0}")]
    Scoring(#[from] ScoringError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, RetrievalError>;
