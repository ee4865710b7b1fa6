//! Shared handle over the store with snapshot reads.
//!
//! Readers clone an `Arc` of the current store under a short read lock and
//! work on that snapshot; writers copy-on-write under the write lock. A clear
//! swaps in a fresh store, so in-flight readers keep the pre-clear view.

use crate::memory::store::{EncodedStore, NewDocument, StoreError};
use std::ops::Range;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone, Default)]
pub struct SharedStore {
    inner: Arc<RwLock<Arc<EncodedStore>>>,
}

impl SharedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> Arc<EncodedStore> {
        Arc::clone(&*self.inner.read().await)
    }

    pub async fn append(&self, batch: Vec<NewDocument>) -> Result<Range<usize>, StoreError> {
        let mut guard = self.inner.write().await;
        Arc::make_mut(&mut *guard).append(batch)
    }

    /// Returns the number of documents removed. Clears in place when no
    /// snapshot is outstanding, otherwise swaps in an empty store.
    pub async fn clear(&self) -> usize {
        let mut guard = self.inner.write().await;
        match Arc::get_mut(&mut *guard) {
            Some(store) => store.clear(),
            None => {
                let removed = guard.len();
                *guard = Arc::new(EncodedStore::new());
                removed
            }
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}
