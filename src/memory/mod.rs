//! In-memory, append-only store of encoded documents.
//! Holds token matrices plus metadata; no persistence, no partial deletion.

pub mod record;
pub mod shared;
pub mod store;

pub use record::{EncodedDocument, Metadata};
pub use shared::SharedStore;
pub use store::{EncodedStore, NewDocument, StoreError};
