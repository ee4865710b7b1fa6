//! Ranked match returned to callers; serializes to the public JSON shape.

use crate::memory::Metadata;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredResult {
    pub content: String,
    pub score: f32,
    /// 0-based position in the returned list
    pub rank: usize,
    pub result_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_metadata: Option<Metadata>,
}
