//! Owned retrieval state: encoder, in-memory store and expiry controller.
//!
//! `Retriever` is a cheap, clonable handle. All clones share one store.
//! Lifecycle: `new` creates an empty store, `encode` grows it,
//! `clear_encoded_docs` empties it (now or after the configured delay) and
//! `shutdown` stops any pending countdown.

use crate::config::RetrieverConfig;
use crate::embedding::{inference_max_tokens, Encoder, EncoderError, HashingEncoder};
use crate::error::{Result, RetrievalError};
use crate::expiry::{ClearOutcome, ExpiryController, PendingClear};
use crate::memory::{EncodedStore, Metadata, SharedStore};
use crate::retrieval::{self, ScoredResult, SearchQuery};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// What one `encode` call added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncodeSummary {
    pub added: usize,
    /// `result_index` of the first new document
    pub first_index: usize,
    /// Per-document token cap used for this call
    pub max_tokens: usize,
}

#[derive(Clone)]
pub struct Retriever {
    encoder: Arc<dyn Encoder>,
    store: SharedStore,
    expiry: ExpiryController,
    config: Arc<RetrieverConfig>,
}

impl Retriever {
    /// Builds a retriever backed by [`HashingEncoder`].
    pub fn new(config: RetrieverConfig) -> Result<Self> {
        config.validate()?;
        let encoder = HashingEncoder::new(config.encoder.clone())?;
        Self::with_encoder(config, Arc::new(encoder))
    }

    /// Token limits come from `encoder.config()`; `config.encoder` is only
    /// used by [`Retriever::new`].
    pub fn with_encoder(config: RetrieverConfig, encoder: Arc<dyn Encoder>) -> Result<Self> {
        config.validate()?;
        let store = SharedStore::new();
        let expiry = ExpiryController::new(store.clone(), config.clear_delay());
        info!(
            dim = encoder.dimension(),
            model_max_tokens = encoder.config().model_max_tokens,
            clear_delay_secs = config.clear_delay_secs,
            "Retriever initialized"
        );
        Ok(Self {
            encoder,
            store,
            expiry,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &RetrieverConfig {
        &self.config
    }

    /// Encode `documents` and append them to the store.
    ///
    /// Documents are not chunked. `document_metadatas`, when given, must
    /// line up one-to-one with `documents`; a mismatch is rejected before
    /// anything is encoded.
    #[instrument(skip_all, fields(count = documents.len()))]
    pub async fn encode(
        &self,
        documents: Vec<String>,
        document_metadatas: Option<Vec<Metadata>>,
    ) -> Result<EncodeSummary> {
        if let Some(metadatas) = &document_metadatas {
            if metadatas.len() != documents.len() {
                return Err(RetrievalError::MetadataLengthMismatch {
                    documents: documents.len(),
                    metadatas: metadatas.len(),
                });
            }
        }

        let lengths: Vec<usize> = documents
            .iter()
            .map(|d| self.encoder.count_tokens(d))
            .collect();
        let max_tokens = inference_max_tokens(&lengths, self.encoder.config());

        if documents.is_empty() {
            return Ok(EncodeSummary {
                added: 0,
                first_index: self.store.len().await,
                max_tokens,
            });
        }

        let embeddings = self.encoder.encode_documents(&documents, max_tokens).await?;
        if embeddings.len() != documents.len() {
            return Err(EncoderError::EncodingFailed {
                reason: format!(
                    "encoder returned {} matrices for {} documents",
                    embeddings.len(),
                    documents.len()
                ),
            }
            .into());
        }

        let metadatas: Vec<Option<Metadata>> = match document_metadatas {
            Some(m) => m.into_iter().map(Some).collect(),
            None => vec![None; documents.len()],
        };
        let batch = documents
            .into_iter()
            .zip(embeddings)
            .zip(metadatas)
            .map(|((content, embedding), metadata)| (content, embedding, metadata))
            .collect();

        let range = self.store.append(batch).await?;
        info!(
            added = range.len(),
            first_index = range.start,
            max_tokens,
            "Encoded documents into memory"
        );

        Ok(EncodeSummary {
            added: range.len(),
            first_index: range.start,
            max_tokens,
        })
    }

    /// Top `k` stored documents for `query`, best first.
    ///
    /// Scores a snapshot taken at call time; a clear that lands mid-search
    /// does not affect the result.
    #[instrument(skip(self))]
    pub async fn search_encoded_docs(&self, query: &str, k: usize) -> Result<Vec<ScoredResult>> {
        let query = SearchQuery::new(query, k)?;
        let snapshot = self.store.snapshot().await;
        if snapshot.is_empty() {
            debug!("Search on empty store");
            return Ok(Vec::new());
        }

        let encoded = self.encoder.encode_query(&query.text).await?;
        let results = retrieval::search(&encoded, &snapshot, query.top_k)?;
        debug!(
            returned = results.len(),
            scanned = snapshot.len(),
            "Scored stored encodings"
        );
        Ok(results)
    }

    /// With `force`, deletes everything now. Otherwise warns and schedules a
    /// deletion after `clear_delay_secs`.
    pub async fn clear_encoded_docs(&self, force: bool) -> ClearOutcome {
        self.expiry.clear(force).await
    }

    pub fn pending_clear(&self) -> Option<PendingClear> {
        self.expiry.pending()
    }

    pub async fn snapshot(&self) -> Arc<EncodedStore> {
        self.store.snapshot().await
    }

    pub async fn len(&self) -> usize {
        self.store.len().await
    }

    pub async fn is_empty(&self) -> bool {
        self.store.is_empty().await
    }

    /// Stops any pending countdown; stored encodings are left as they are.
    pub fn shutdown(&self) {
        if self.expiry.cancel_pending() {
            info!("Pending clear cancelled on shutdown");
        }
    }
}

#[cfg(test)]
mod tests;
