//! In-memory, index-free late-interaction retrieval.
//!
//! Documents are encoded into one embedding per token, kept in an owned
//! in-memory store, scored against queries with MaxSim and cleared in bulk,
//! either immediately or after a cancellable countdown.

pub mod config;
pub mod embedding;
pub mod error;
pub mod expiry;
pub mod memory;
pub mod preprocessing;
pub mod retrieval;
pub mod retriever;

pub use config::{EncoderConfig, RetrieverConfig};
pub use embedding::{Encoder, HashingEncoder, TokenEmbeddings};
pub use error::{Result, RetrievalError};
pub use expiry::{ClearOutcome, ClearStatus, PendingClear};
pub use memory::{EncodedDocument, Metadata};
pub use retrieval::ScoredResult;
pub use retriever::{EncodeSummary, Retriever};
