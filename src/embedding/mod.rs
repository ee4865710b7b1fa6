//! Token-level (multi-vector) encoders.
//!
//! An encoder turns one text into a matrix with one L2-normalised row per
//! retained token. Model weights live behind the [`Encoder`] trait; the crate
//! ships [`HashingEncoder`], a deterministic stand-in that needs no model files.

pub mod hashing;
pub mod max_length;

pub use hashing::HashingEncoder;
pub use max_length::inference_max_tokens;

use crate::config::EncoderConfig;
use crate::preprocessing::{Cleaner, Tokenizer};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum EncoderError {
    #[error("Document {index} has no tokens")]
    EmptyInput { index: usize },
    #[error("Embedding row has width {actual}, expected {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("Embedding dimension must be greater than zero")]
    ZeroDimension,
    #[error("Encoding failed: {reason}")]
    EncodingFailed { reason: String },
}

pub type Result<T> = std::result::Result<T, EncoderError>;

/// Row-major `len x dim` matrix of token embeddings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenEmbeddings {
    dim: usize,
    data: Vec<f32>,
}

impl TokenEmbeddings {
    pub fn with_dim(dim: usize) -> Result<Self> {
        if dim == 0 {
            return Err(EncoderError::ZeroDimension);
        }
        Ok(Self {
            dim,
            data: Vec::new(),
        })
    }

    pub fn from_rows(dim: usize, rows: Vec<Vec<f32>>) -> Result<Self> {
        let mut matrix = Self::with_dim(dim)?;
        matrix.data.reserve(rows.len() * dim);
        for row in &rows {
            matrix.push_row(row)?;
        }
        Ok(matrix)
    }

    pub fn push_row(&mut self, row: &[f32]) -> Result<()> {
        if row.len() != self.dim {
            return Err(EncoderError::DimensionMismatch {
                expected: self.dim,
                actual: row.len(),
            });
        }
        self.data.extend_from_slice(row);
        Ok(())
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f32]> + '_ {
        self.data.chunks_exact(self.dim)
    }

    pub fn row(&self, index: usize) -> Option<&[f32]> {
        let start = index.checked_mul(self.dim)?;
        self.data.get(start..start + self.dim)
    }

    /// Number of token rows.
    pub fn len(&self) -> usize {
        self.data.len() / self.dim
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn truncate(&mut self, max_rows: usize) {
        self.data.truncate(max_rows * self.dim);
    }
}

#[async_trait]
pub trait Encoder: Send + Sync {
    fn config(&self) -> &EncoderConfig;

    fn dimension(&self) -> usize {
        self.config().dim
    }

    /// Tokens in `text` before any truncation, counted on the cleaned text
    /// the encoder actually sees.
    fn count_tokens(&self, text: &str) -> usize {
        Cleaner::clean(text)
            .map(|cleaned| Tokenizer::count(&cleaned))
            .unwrap_or(0)
    }

    /// One matrix per text, each at most `max_tokens` rows. Texts are never
    /// split; anything past `max_tokens` is dropped.
    async fn encode_documents(
        &self,
        texts: &[String],
        max_tokens: usize,
    ) -> Result<Vec<TokenEmbeddings>>;

    /// Query matrix, truncated to `query_max_tokens`. A query with no
    /// tokens yields a matrix with no rows, which scores 0 everywhere.
    async fn encode_query(&self, query: &str) -> Result<TokenEmbeddings>;
}
