//! Append / clear logic and result index assignment.

use crate::embedding::TokenEmbeddings;
use crate::memory::record::{EncodedDocument, Metadata};
use std::ops::Range;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum StoreError {
    #[error("Embedding width {actual} does not match store width {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// One pending insertion: content, its token matrix, optional metadata.
pub type NewDocument = (String, TokenEmbeddings, Option<Metadata>);

#[derive(Debug, Clone, Default)]
pub struct EncodedStore {
    docs: Vec<EncodedDocument>,
    // fixed by the first append, forgotten on clear
    dim: Option<usize>,
}

impl EncodedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a batch and return the result indices it received.
    ///
    /// The whole batch is checked before anything is inserted, so a width
    /// mismatch leaves the store untouched.
    pub fn append(&mut self, batch: Vec<NewDocument>) -> Result<Range<usize>, StoreError> {
        let expected = self
            .dim
            .or_else(|| batch.first().map(|(_, emb, _)| emb.dim()));
        if let Some(expected) = expected {
            if let Some((_, emb, _)) = batch.iter().find(|(_, emb, _)| emb.dim() != expected) {
                return Err(StoreError::DimensionMismatch {
                    expected,
                    actual: emb.dim(),
                });
            }
            self.dim = Some(expected);
        }

        let start = self.docs.len();
        self.docs.reserve(batch.len());
        for (offset, (content, embedding, metadata)) in batch.into_iter().enumerate() {
            self.docs.push(EncodedDocument {
                result_index: start + offset,
                content,
                embedding,
                metadata,
            });
        }
        Ok(start..self.docs.len())
    }

    /// Drop every document; indexing restarts at zero. Returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.docs.len();
        self.docs.clear();
        self.dim = None;
        removed
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn dim(&self) -> Option<usize> {
        self.dim
    }

    pub fn get(&self, result_index: usize) -> Option<&EncodedDocument> {
        self.docs.get(result_index)
    }

    pub fn documents(&self) -> &[EncodedDocument] {
        &self.docs
    }
}
