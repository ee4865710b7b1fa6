//! MaxSim scoring and top-k selection.

use super::{ScoredResult, ScoringError};
use crate::embedding::TokenEmbeddings;
use crate::memory::{EncodedDocument, EncodedStore};
use std::cmp::Ordering;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Sum over query tokens of the best dot product against any document token.
/// Rows are unit length, so each term is a cosine similarity.
pub fn maxsim(query: &TokenEmbeddings, doc: &TokenEmbeddings) -> f32 {
    if doc.is_empty() {
        return 0.0;
    }
    query
        .rows()
        .map(|q| {
            doc.rows()
                .map(|d| dot(q, d))
                .fold(f32::NEG_INFINITY, f32::max)
        })
        .sum()
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn score_documents(query: &TokenEmbeddings, docs: &[EncodedDocument]) -> Vec<(usize, f32)> {
    #[cfg(feature = "parallel")]
    let iter = docs.par_iter();
    #[cfg(not(feature = "parallel"))]
    let iter = docs.iter();

    iter.map(|doc| (doc.result_index, maxsim(query, &doc.embedding)))
        .collect()
}

// descending score, then ascending result_index
fn by_rank(a: &(usize, f32), b: &(usize, f32)) -> Ordering {
    b.1.total_cmp(&a.1).then(a.0.cmp(&b.0))
}

/// Best `k` entries in rank order.
pub fn top_k(mut scored: Vec<(usize, f32)>, k: usize) -> Vec<(usize, f32)> {
    if k == 0 {
        return Vec::new();
    }
    if k < scored.len() {
        scored.select_nth_unstable_by(k - 1, by_rank);
        scored.truncate(k);
    }
    scored.sort_unstable_by(by_rank);
    scored
}

/// Score every document in `store` and return at most `k` ranked results.
pub fn search(
    query: &TokenEmbeddings,
    store: &EncodedStore,
    k: usize,
) -> Result<Vec<ScoredResult>, ScoringError> {
    if k == 0 {
        return Err(ScoringError::InvalidK);
    }
    let Some(expected) = store.dim() else {
        return Ok(Vec::new());
    };
    if query.dim() != expected {
        return Err(ScoringError::DimensionMismatch {
            expected,
            actual: query.dim(),
        });
    }

    let docs = store.documents();
    let ranked = top_k(score_documents(query, docs), k);

    Ok(ranked
        .into_iter()
        .enumerate()
        .filter_map(|(rank, (index, score))| {
            store.get(index).map(|doc| ScoredResult {
                content: doc.content.clone(),
                score,
                rank,
                result_index: index,
                document_metadata: doc.metadata.clone(),
            })
        })
        .collect())
}
