//! # Generic Messages
//!
//! This module defines the generic message types used for communication between
//! the `StoreClient` and `StoreActor`.

use crate::document::Document;
use crate::error::StoreError;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use tokio::sync::{broadcast, oneshot};

/// Type alias for the one-shot response channel used by store actors.
pub type Response<T> = oneshot::Sender<Result<T, StoreError>>;

/// A point-in-time view of a whole collection, most recently written document
/// first. Shared behind an `Arc` so publishing to many watchers never clones
/// the documents themselves.
pub type Snapshot<T> = Arc<Vec<T>>;

/// The two halves a `Watch` request returns: the collection as it stood when
/// the request was processed, and a feed of every snapshot published after it.
///
/// The receiver is subscribed before the initial snapshot is taken, inside the
/// actor's sequential loop, so no write can fall between the two.
pub struct WatchFeed<T: Document> {
    pub initial: Snapshot<T>,
    pub updates: broadcast::Receiver<Snapshot<T>>,
}

impl<T: Document> fmt::Debug for WatchFeed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchFeed")
            .field("initial_len", &self.initial.len())
            .finish_non_exhaustive()
    }
}

/// Internal message type sent to the actor to request operations.
///
/// # The CRUD Pattern
/// The variants map directly to standard **CRUD** operations, plus two
/// extensions:
///
/// - **Create**: Lifecycle start. Uses [`Document::Create`] to initialize a new document.
/// - **Get (Read)**: Retrieval. Fetches the current state of the document by ID.
/// - **Update**: State mutation. Uses [`Document::Update`] to modify an existing document.
/// - **Delete**: Lifecycle end. Removes the document.
/// - **Action**: Extensibility. Executes a custom [`Document::Action`]. Carries
///   an optional `guard` stamp; when set, the actor rejects the action with
///   [`StoreError::Superseded`] unless the document's `updated_at` still equals
///   it. This is the conditional-write primitive deferred jobs use to detect
///   interleaved writes.
/// - **Watch**: Subscription. Returns a [`WatchFeed`] of full-collection snapshots.
///
/// # Document Interaction
/// This type is generic over `T: Document` and uses the associated types of
/// the [`Document`] trait, so a payload for one collection can never be sent
/// to another.
#[derive(Debug)]
pub enum StoreRequest<T: Document> {
    Create {
        params: T::Create,
        respond_to: Response<T::Id>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    Update {
        id: T::Id,
        update: T::Update,
        respond_to: Response<T>,
    },
    Delete {
        id: T::Id,
        respond_to: Response<()>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        guard: Option<DateTime<Utc>>,
        respond_to: Response<T::ActionResult>,
    },
    Watch {
        respond_to: Response<WatchFeed<T>>,
    },
}
