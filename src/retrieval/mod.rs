//! Index-free late-interaction search over a store snapshot.

pub mod query;
pub mod result;
pub mod scorer;

pub use query::SearchQuery;
pub use result::ScoredResult;
pub use scorer::{maxsim, search};

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ScoringError {
    #[error("k must be greater than zero")]
    InvalidK,
    #[error("Query width {actual} does not match document width {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
}
