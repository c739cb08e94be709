//! # Lot Subscriptions
//!
//! Live views of the lot collection: every subscriber receives a full
//! snapshot of the lots matching its filter, newest write first, re-delivered
//! on every change to the collection.
//!
//! ## Multiplexing
//!
//! All subscribers share one underlying store feed. [`LotWatch`] opens that
//! feed when the first subscriber arrives, fans each published snapshot out
//! through per-subscriber filters, and tears the feed down again when the
//! last subscription is dropped. The manager is an owned value wired in by
//! the system orchestrator; there is no global registry of listeners.
//!
//! ## Delivery Semantics
//!
//! - **Full resnapshots**: each delivery replaces the previous one entirely.
//!   Consumers render the latest value; there is no diff to apply.
//! - **Coalescing**: a slow consumer skips intermediate snapshots and picks up
//!   at the latest one. Because deliveries are complete snapshots, skipping is
//!   unobservable except as reduced churn.
//! - **Ordering**: lots arrive sorted by `updated_at` descending.
//! - **End of stream**: [`LotSubscription::next`] returns `None` once the
//!   system shuts down.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let mut sub = system.watch.subscribe(LotFilter {
//!     status: Some(LotStatus::InProgress),
//!     viewer: Some(UserId::from("u1")),
//! }).await?;
//!
//! while let Some(lots) = sub.next().await {
//!     render(&lots);
//! }
//! // Dropping `sub` unsubscribes; the last drop closes the shared feed.
//! ```

use crate::lot_actor::LotError;
use crate::model::{Lot, LotStatus, UserId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use store_actor::{Snapshot, StoreClient};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::debug;

/// Narrows a subscription to a slice of the collection.
///
/// An empty filter matches every lot. Both criteria together act as an AND.
#[derive(Debug, Clone, Default)]
pub struct LotFilter {
    /// Keep only lots with this status.
    pub status: Option<LotStatus>,
    /// Keep only lots this user may read: globally accessible ones plus those
    /// the user created or is assigned to.
    pub viewer: Option<UserId>,
}

impl LotFilter {
    pub fn matches(&self, lot: &Lot) -> bool {
        if let Some(status) = self.status {
            if lot.status != status {
                return false;
            }
        }
        if let Some(viewer) = &self.viewer {
            if !lot.readable_by(viewer) {
                return false;
            }
        }
        true
    }
}

struct Subscriber {
    filter: LotFilter,
    tx: watch::Sender<Vec<Lot>>,
}

struct HubState {
    subscribers: HashMap<u64, Subscriber>,
    /// Last snapshot seen from the store feed. `Some` exactly while the
    /// fanout task runs.
    latest: Option<Snapshot<Lot>>,
    task: Option<JoinHandle<()>>,
    next_token: u64,
}

/// Reference-counted subscription manager for the lot collection.
///
/// Owns the single underlying store feed and the fanout task that applies
/// per-subscriber filters. Constructed once by the system orchestrator and
/// handed to callers by reference.
pub struct LotWatch {
    client: StoreClient<Lot>,
    state: Arc<Mutex<HubState>>,
}

impl LotWatch {
    pub fn new(client: StoreClient<Lot>) -> Self {
        Self {
            client,
            state: Arc::new(Mutex::new(HubState {
                subscribers: HashMap::new(),
                latest: None,
                task: None,
                next_token: 0,
            })),
        }
    }

    /// Registers a subscriber and returns its live view.
    ///
    /// The first subscriber opens the shared store feed; later ones reuse it.
    /// The returned subscription's first [`next`](LotSubscription::next)
    /// yields the current matching set immediately.
    pub async fn subscribe(&self, filter: LotFilter) -> Result<LotSubscription, LotError> {
        {
            let mut state = self.state.lock().expect("lock poisoned");
            if state.task.is_some() {
                return Ok(self.register(&mut state, filter));
            }
        }

        // No feed yet. Open one without holding the lock across the await,
        // then re-check: a concurrent first subscriber may have won the race,
        // in which case this feed is simply dropped.
        let feed = self.client.watch().await.map_err(LotError::from)?;
        let mut state = self.state.lock().expect("lock poisoned");
        if state.task.is_none() {
            state.latest = Some(Arc::clone(&feed.initial));
            state.task = Some(tokio::spawn(fanout(
                Arc::clone(&self.state),
                feed.updates,
            )));
            debug!("Opened shared lot feed");
        }
        Ok(self.register(&mut state, filter))
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.state.lock().expect("lock poisoned").subscribers.len()
    }

    /// Whether the shared store feed is currently open.
    pub fn feed_open(&self) -> bool {
        self.state.lock().expect("lock poisoned").task.is_some()
    }

    fn register(&self, state: &mut HubState, filter: LotFilter) -> LotSubscription {
        let token = state.next_token;
        state.next_token += 1;

        let initial = match &state.latest {
            Some(snapshot) => filtered(snapshot, &filter),
            None => Vec::new(),
        };
        let (tx, rx) = watch::channel(initial);
        state.subscribers.insert(token, Subscriber { filter, tx });

        LotSubscription {
            rx,
            pending_initial: true,
            _guard: SubscriberGuard {
                token,
                state: Arc::clone(&self.state),
            },
        }
    }
}

impl Drop for LotWatch {
    /// Ends every subscription when the manager itself goes away, so
    /// consumers see end-of-stream instead of waiting on a feed nobody
    /// drives anymore.
    fn drop(&mut self) {
        let mut state = self.state.lock().expect("lock poisoned");
        if let Some(task) = state.task.take() {
            task.abort();
        }
        state.subscribers.clear();
        state.latest = None;
    }
}

/// Consumes the store feed and fans filtered snapshots out to subscribers.
async fn fanout(state: Arc<Mutex<HubState>>, mut updates: broadcast::Receiver<Snapshot<Lot>>) {
    loop {
        match updates.recv().await {
            Ok(snapshot) => {
                let mut state = state.lock().expect("lock poisoned");
                state.latest = Some(Arc::clone(&snapshot));
                for subscriber in state.subscribers.values() {
                    subscriber
                        .tx
                        .send_replace(filtered(&snapshot, &subscriber.filter));
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                // Deliveries are full snapshots; dropping stale ones loses
                // nothing.
                debug!(skipped, "Lot feed lagged, catching up at latest snapshot");
            }
            Err(broadcast::error::RecvError::Closed) => {
                let mut state = state.lock().expect("lock poisoned");
                state.subscribers.clear();
                state.latest = None;
                state.task = None;
                debug!("Store feed closed, ending all lot subscriptions");
                break;
            }
        }
    }
}

fn filtered(snapshot: &Snapshot<Lot>, filter: &LotFilter) -> Vec<Lot> {
    snapshot
        .iter()
        .filter(|lot| filter.matches(lot))
        .cloned()
        .collect()
}

/// Removes its subscriber on drop; the last one out tears down the shared
/// feed.
struct SubscriberGuard {
    token: u64,
    state: Arc<Mutex<HubState>>,
}

impl Drop for SubscriberGuard {
    fn drop(&mut self) {
        let mut state = self.state.lock().expect("lock poisoned");
        state.subscribers.remove(&self.token);
        if state.subscribers.is_empty() {
            if let Some(task) = state.task.take() {
                task.abort();
            }
            state.latest = None;
            debug!("Last subscriber gone, closed shared lot feed");
        }
    }
}

/// One subscriber's live view of the lot collection.
///
/// Yields full filtered snapshots, newest write first. Dropping the value
/// unsubscribes.
pub struct LotSubscription {
    rx: watch::Receiver<Vec<Lot>>,
    pending_initial: bool,
    _guard: SubscriberGuard,
}

impl LotSubscription {
    /// The next snapshot of the matching lots.
    ///
    /// The first call resolves immediately with the state at subscribe time
    /// (or newer, if writes already landed). Later calls wait for a change.
    /// Returns `None` once the feed is gone.
    pub async fn next(&mut self) -> Option<Vec<Lot>> {
        if self.pending_initial {
            self.pending_initial = false;
            return Some(self.rx.borrow_and_update().clone());
        }
        match self.rx.changed().await {
            Ok(()) => Some(self.rx.borrow_and_update().clone()),
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LotCreate, LotId};
    use chrono::Utc;

    fn lot_for(creator: &str, globally_accessible: bool) -> Lot {
        let mut params = LotCreate::new("AV-2025-001", UserId::from(creator));
        params.globally_accessible = globally_accessible;
        Lot::new(LotId(1), params, Utc::now())
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = LotFilter::default();
        assert!(filter.matches(&lot_for("u1", true)));
        assert!(filter.matches(&lot_for("u1", false)));
    }

    #[test]
    fn status_filter_narrows() {
        let filter = LotFilter {
            status: Some(LotStatus::Archived),
            viewer: None,
        };
        let mut lot = lot_for("u1", true);
        assert!(!filter.matches(&lot));
        lot.archive();
        assert!(filter.matches(&lot));
    }

    #[test]
    fn viewer_filter_applies_access_rule() {
        let filter = LotFilter {
            status: None,
            viewer: Some(UserId::from("u3")),
        };
        // Restricted lot, u3 is neither creator nor assigned.
        let mut lot = lot_for("u1", false);
        assert!(!filter.matches(&lot));

        lot.assign_user(UserId::from("u3"));
        assert!(filter.matches(&lot));

        lot.unassign_user(&UserId::from("u3"));
        lot.globally_accessible = true;
        assert!(filter.matches(&lot));
    }

    #[test]
    fn criteria_combine_as_and() {
        let filter = LotFilter {
            status: Some(LotStatus::Draft),
            viewer: Some(UserId::from("u2")),
        };
        // Right status, wrong access.
        assert!(!filter.matches(&lot_for("u1", false)));
        // Right status and accessible.
        assert!(filter.matches(&lot_for("u1", true)));
    }
}
