//! Defines `EncodedDocument` and the metadata map attached to it.

use crate::embedding::TokenEmbeddings;
use serde::{Deserialize, Serialize};

/// String-keyed metadata; values may be any JSON scalar or structure.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodedDocument {
    /// Insertion position within the current store lifetime.
    pub result_index: usize,
    pub content: String,
    pub embedding: TokenEmbeddings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}
