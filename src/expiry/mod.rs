//! Bulk deletion of stored encodings, immediate or after a countdown.
//! A delayed clear runs as a background tokio task that can be cancelled
//! until its deadline.

pub mod scheduler;

pub use scheduler::{ClearOutcome, ClearStatus, ExpiryController, PendingClear};
