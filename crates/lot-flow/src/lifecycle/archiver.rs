//! # Deferred Auto-Archive
//!
//! When a lot's seventh step completes, the lot is not archived immediately:
//! it stays visible as `completed` for a short settling delay, then a
//! deferred job retires it. This module owns those deferred jobs.
//!
//! ## Archive Policy
//!
//! The [`Archiver`] arms one timer per lot, keyed on the write stamp of the
//! completing write:
//!
//! - **Fires clean**: if nothing touched the lot during the delay, the timer's
//!   conditional archive matches the stamp and the lot moves to `archived`.
//! - **Canceled by interleaved writes**: any write to the lot during the delay
//!   changes its `updated_at`, so the conditional archive is rejected and the
//!   timer gives up. Whoever made that write decides what happens next; a
//!   re-completion of the final step arms a fresh timer with the new stamp.
//! - **Replaced by re-arming**: arming a lot that already has a pending timer
//!   aborts the old timer first. At most one archive is ever pending per lot.
//! - **Dropped on deletion**: a timer whose lot has been deleted finds nothing
//!   to archive and discards itself.
//!
//! The conditional write is what makes this safe: the timer never clobbers
//! state it did not observe, which the fixed-delay-then-blind-write approach
//! it replaces could not guarantee.

use crate::lot_actor::LotAction;
use crate::model::{Lot, LotId};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use store_actor::{StoreClient, StoreError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Configuration for the deferred archiver.
#[derive(Debug, Clone)]
pub struct ArchiverConfig {
    /// How long a fully completed lot stays visible before it is archived.
    pub delay: Duration,
}

impl Default for ArchiverConfig {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(1),
        }
    }
}

struct PendingArchive {
    generation: u64,
    handle: JoinHandle<()>,
}

struct ArchiverInner {
    client: StoreClient<Lot>,
    delay: Duration,
    pending: Mutex<HashMap<LotId, PendingArchive>>,
    next_generation: AtomicU64,
}

/// Schedules conditional archive writes for completed lots.
///
/// Cloneable handle around shared state, so the lot client and the system
/// orchestrator can hold the same scheduler. Timers run as plain Tokio tasks;
/// nothing here is global.
#[derive(Clone)]
pub struct Archiver {
    inner: Arc<ArchiverInner>,
}

impl Archiver {
    pub fn new(client: StoreClient<Lot>, config: ArchiverConfig) -> Self {
        Self {
            inner: Arc::new(ArchiverInner {
                client,
                delay: config.delay,
                pending: Mutex::new(HashMap::new()),
                next_generation: AtomicU64::new(0),
            }),
        }
    }

    /// Arms (or re-arms) the archive timer for `id`.
    ///
    /// `completed_at` must be the `updated_at` stamp of the write that
    /// completed the lot; the deferred archive runs conditionally on the lot
    /// still carrying that stamp when the timer fires.
    pub fn arm(&self, id: LotId, completed_at: DateTime<Utc>) {
        let generation = self.inner.next_generation.fetch_add(1, Ordering::Relaxed);
        let task_inner = Arc::clone(&self.inner);
        let task_id = id.clone();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(task_inner.delay).await;
            archive_if_untouched(&task_inner.client, task_id.clone(), completed_at).await;

            // Clear our own bookkeeping, unless a re-arm already replaced it.
            let mut pending = task_inner.pending.lock().expect("lock poisoned");
            if pending
                .get(&task_id)
                .is_some_and(|p| p.generation == generation)
            {
                pending.remove(&task_id);
            }
        });

        let mut pending = self.inner.pending.lock().expect("lock poisoned");
        if let Some(previous) = pending.insert(id.clone(), PendingArchive { generation, handle }) {
            previous.handle.abort();
            debug!(lot_id = %id, "Replaced pending archive timer");
        }
    }

    /// Number of timers currently pending.
    pub fn pending_count(&self) -> usize {
        self.inner.pending.lock().expect("lock poisoned").len()
    }

    /// Aborts every pending timer and waits for the tasks to wind down.
    ///
    /// Part of system shutdown: once this returns, no timer task holds a
    /// store client anymore, so dropping the remaining handles closes the
    /// store channel.
    pub async fn shutdown(&self) {
        let drained: Vec<PendingArchive> = {
            let mut pending = self.inner.pending.lock().expect("lock poisoned");
            pending.drain().map(|(_, p)| p).collect()
        };
        for archive in drained {
            archive.handle.abort();
            if let Err(e) = archive.handle.await {
                if !e.is_cancelled() {
                    warn!("Archive timer task failed: {:?}", e);
                }
            }
        }
    }
}

/// The body of one timer: archive the lot if and only if its last write is
/// still the completing write the timer was armed with.
async fn archive_if_untouched(client: &StoreClient<Lot>, id: LotId, completed_at: DateTime<Utc>) {
    match client
        .perform_action_guarded(id.clone(), LotAction::Archive, completed_at)
        .await
    {
        Ok(_) => {
            info!(lot_id = %id, "Auto-archived completed lot");
        }
        Err(StoreError::Superseded { expected, actual }) => {
            debug!(
                lot_id = %id,
                %expected,
                %actual,
                "Auto-archive canceled, lot was written to during the settling delay"
            );
        }
        Err(StoreError::NotFound(_)) => {
            debug!(lot_id = %id, "Auto-archive dropped, lot no longer exists");
        }
        Err(e) => {
            warn!(lot_id = %id, "Auto-archive failed: {}", e);
        }
    }
}
