use crate::memory::SharedStore;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::{watch, Notify};
use tokio::time::{self, Instant};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Final state of a delayed clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ClearStatus {
    Completed { removed: usize },
    Cancelled,
}

#[derive(Debug, Clone)]
pub enum ClearOutcome {
    Cleared { removed: usize },
    Scheduled(PendingClear),
}

/// Handle to a scheduled clear. Clones refer to the same task.
#[derive(Debug, Clone)]
pub struct PendingClear {
    id: Uuid,
    deadline: Instant,
    scheduled_for: DateTime<Utc>,
    cancel: Arc<Notify>,
    status: watch::Receiver<Option<ClearStatus>>,
}

impl PendingClear {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Wall-clock estimate of the deadline, for display.
    pub fn scheduled_for(&self) -> DateTime<Utc> {
        self.scheduled_for
    }

    /// Stops the countdown. No-op once the clear has run.
    pub fn cancel(&self) {
        self.cancel.notify_one();
    }

    pub fn status(&self) -> Option<ClearStatus> {
        *self.status.borrow()
    }

    pub async fn wait(mut self) -> ClearStatus {
        loop {
            if let Some(status) = *self.status.borrow_and_update() {
                return status;
            }
            if self.status.changed().await.is_err() {
                // task gone without reporting; treat as cancelled
                return self.status().unwrap_or(ClearStatus::Cancelled);
            }
        }
    }
}

fn release_slot(pending: &Mutex<Option<PendingClear>>, id: Uuid) -> bool {
    let mut slot = pending.lock().unwrap_or_else(|e| e.into_inner());
    if slot.as_ref().map(|p| p.id) == Some(id) {
        *slot = None;
        true
    } else {
        false
    }
}

#[derive(Clone)]
pub struct ExpiryController {
    store: SharedStore,
    delay: Duration,
    pending: Arc<Mutex<Option<PendingClear>>>,
}

impl ExpiryController {
    pub fn new(store: SharedStore, delay: Duration) -> Self {
        Self {
            store,
            delay,
            pending: Arc::new(Mutex::new(None)),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn pending(&self) -> Option<PendingClear> {
        self.slot().clone()
    }

    fn slot(&self) -> MutexGuard<'_, Option<PendingClear>> {
        // the slot holds a plain Option, so a poisoned guard is still consistent
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// `force` deletes now; otherwise a countdown is scheduled (or the
    /// already-pending one is returned).
    pub async fn clear(&self, force: bool) -> ClearOutcome {
        if force {
            ClearOutcome::Cleared {
                removed: self.clear_now().await,
            }
        } else {
            ClearOutcome::Scheduled(self.schedule())
        }
    }

    /// Cancels any countdown and empties the store immediately.
    pub async fn clear_now(&self) -> usize {
        self.cancel_pending();
        let removed = self.store.clear().await;
        info!(removed, "Cleared in-memory encodings");
        removed
    }

    pub fn schedule(&self) -> PendingClear {
        let mut slot = self.slot();
        if let Some(existing) = slot.as_ref() {
            debug!(id = %existing.id, "Delayed clear already pending");
            return existing.clone();
        }

        let id = Uuid::new_v4();
        let deadline = Instant::now() + self.delay;
        let scheduled_for = Utc::now()
            + chrono::Duration::from_std(self.delay).unwrap_or_else(|_| chrono::Duration::zero());
        let cancel = Arc::new(Notify::new());
        let (status_tx, status_rx) = watch::channel(None);

        let handle = PendingClear {
            id,
            deadline,
            scheduled_for,
            cancel: Arc::clone(&cancel),
            status: status_rx,
        };
        *slot = Some(handle.clone());
        drop(slot);

        warn!(
            %id,
            delay_secs = self.delay.as_secs_f64(),
            at = %scheduled_for,
            "All in-memory encodings will be deleted when the countdown ends; \
             cancel it to keep them, or clear with force to skip the wait"
        );

        let store = self.store.clone();
        let pending = Arc::clone(&self.pending);
        tokio::spawn(async move {
            let fired = tokio::select! {
                _ = time::sleep_until(deadline) => true,
                _ = cancel.notified() => false,
            };

            // free the slot before deleting, so a request arriving during the
            // clear starts a new countdown instead of joining this one
            release_slot(&pending, id);

            let status = if fired {
                let removed = store.clear().await;
                info!(%id, removed, "Delayed clear completed");
                ClearStatus::Completed { removed }
            } else {
                info!(%id, "Delayed clear cancelled");
                ClearStatus::Cancelled
            };
            let _ = status_tx.send(Some(status));
        });

        handle
    }

    /// Returns true if a countdown was pending.
    pub fn cancel_pending(&self) -> bool {
        match self.slot().take() {
            Some(pending) => {
                pending.cancel();
                true
            }
            None => false,
        }
    }
}
