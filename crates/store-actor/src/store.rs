//! # Generic Store Actor
//!
//! This module defines the `StoreActor`, the core component that manages the
//! lifecycle and state of a document collection. It implements the "Server"
//! side of the Actor Model, processing messages sequentially and ensuring
//! exclusive access to the collection.

use crate::client::StoreClient;
use crate::clock::WriteClock;
use crate::document::Document;
use crate::error::StoreError;
use crate::message::{Snapshot, StoreRequest, WatchFeed};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

/// Snapshots buffered on the change feed before slow watchers start lagging.
/// A lagging watcher is skipped ahead; since every snapshot is the full
/// collection, skipped intermediates are unobservable.
const FEED_CAPACITY: usize = 16;

/// The generic actor that manages a collection of documents.
///
/// # Architecture Note
/// This struct is the "Server" half of the actor. It owns the state (`store`)
/// and the receiver end of the channel.
///
/// **Concurrency Model**:
/// Each actor processes its messages *sequentially* in a loop, so the `store`
/// needs no `Mutex` or `RwLock`, and a read-modify-write inside one message
/// can never interleave with another. All domain mutations run inside this
/// loop, which is what makes the optional write guard on `Action` requests a
/// true compare-and-set rather than a best-effort check.
///
/// **Write Stamps**:
/// The actor owns a [`WriteClock`] and stamps every successful mutation.
/// Stamps are strictly increasing per store, which gives snapshots a total
/// "most recently written first" order.
///
/// **Change Feed**:
/// After every successful write the actor publishes a fresh [`Snapshot`] of
/// the whole collection on a broadcast channel. `Watch` requests subscribe to
/// that channel and receive the current snapshot in the same message, so a
/// watcher never misses a write that happened after its initial view.
///
/// # Usage Pattern
///
/// 1.  **Create**: Call `StoreActor::new()` to get the `actor` (server) and `client` (interface).
/// 2.  **Wire**: Pass dependencies (other clients) into `actor.run(context)`.
/// 3.  **Run**: Spawn the actor's run loop in a background task.
///
/// ```rust
/// use async_trait::async_trait;
/// use chrono::{DateTime, Utc};
/// use store_actor::{Document, StoreActor};
///
/// // Minimal document definition
/// #[derive(Clone, Debug)]
/// struct Note {
///     id: u32,
///     body: String,
///     created_at: DateTime<Utc>,
///     updated_at: DateTime<Utc>,
/// }
/// #[derive(Debug)] struct NoteCreate { body: String }
/// #[derive(Debug)] struct NoteUpdate { body: Option<String> }
/// #[derive(Debug)] enum NoteAction {}
/// #[derive(Debug, thiserror::Error)] #[error("note error")] struct NoteError;
///
/// #[async_trait]
/// impl Document for Note {
///     type Id = u32;
///     type Create = NoteCreate;
///     type Update = NoteUpdate;
///     type Action = NoteAction;
///     type ActionResult = ();
///     type Context = (); // No dependencies in this example
///     type Error = NoteError;
///
///     fn from_create_params(id: u32, params: NoteCreate, at: DateTime<Utc>) -> Result<Self, Self::Error> {
///         Ok(Self { id, body: params.body, created_at: at, updated_at: at })
///     }
///     fn updated_at(&self) -> DateTime<Utc> { self.updated_at }
///     fn touch(&mut self, at: DateTime<Utc>) { self.updated_at = at; }
///     async fn on_update(&mut self, update: NoteUpdate, _: &()) -> Result<(), Self::Error> {
///         if let Some(body) = update.body { self.body = body; }
///         Ok(())
///     }
///     async fn handle_action(&mut self, _: NoteAction, _: DateTime<Utc>, _: &()) -> Result<(), Self::Error> {
///         Ok(())
///     }
/// }
///
/// #[tokio::main]
/// async fn main() {
///     // 1. Create
///     let (actor, client) = StoreActor::<Note>::new(10);
///
///     // 2. Wire & Run
///     tokio::spawn(actor.run(()));
///
///     // 3. Use
///     let id = client.create(NoteCreate { body: "hello".into() }).await.unwrap();
///     let note = client.get(id).await.unwrap().unwrap();
///     assert_eq!(note.body, "hello");
/// }
/// ```
///
/// # Implementation Details
///
/// The actor maintains an internal `HashMap` (`store`) mapping IDs to
/// documents, a `u32` counter (`next_id`) for ID generation, the write
/// clock, and the broadcast sender for the change feed.
///
/// ## Operations
///
/// * **Create**: generates the next ID, takes a write stamp, builds the
///   document via `from_create_params`, runs `on_create`, inserts, publishes.
/// * **Get**: returns a clone of the document, or `None`. Never stamps.
/// * **Update**: stamps the document, runs `on_update`, publishes. The
///   previous stamp is restored if the hook fails.
/// * **Delete**: runs `on_delete`, removes, publishes.
/// * **Action**: checks the optional guard against the current `updated_at`
///   (failing with `Superseded` on mismatch), stamps, runs `handle_action`
///   with the stamp, publishes. The previous stamp is restored on hook
///   failure.
/// * **Watch**: subscribes a new receiver to the change feed and snapshots
///   the collection, both inside the loop, so the pair is gap-free.
pub struct StoreActor<T: Document> {
    receiver: mpsc::Receiver<StoreRequest<T>>,
    store: HashMap<T::Id, T>,
    next_id: u32,
    clock: WriteClock,
    feed: broadcast::Sender<Snapshot<T>>,
}

impl<T: Document> StoreActor<T> {
    /// Creates a new `StoreActor` and its associated `StoreClient`.
    ///
    /// # Arguments
    ///
    /// * `buffer_size` - The capacity of the MPSC channel. If the channel is full,
    ///   calls to the client will wait until there is space.
    ///
    /// # Returns
    ///
    /// A tuple containing:
    /// 1. The `StoreActor` instance (the server), which must be run via `.run()`.
    /// 2. The `StoreClient` instance, which can be cloned and shared to send requests.
    pub fn new(buffer_size: usize) -> (Self, StoreClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let (feed, _) = broadcast::channel(FEED_CAPACITY);
        let actor = Self {
            receiver,
            store: HashMap::new(),
            next_id: 1,
            clock: WriteClock::new(),
            feed,
        };
        let client = StoreClient::new(sender);
        (actor, client)
    }

    /// Snapshot of the whole collection, most recently written first.
    fn snapshot(&self) -> Snapshot<T> {
        let mut docs: Vec<T> = self.store.values().cloned().collect();
        docs.sort_by(|a, b| b.updated_at().cmp(&a.updated_at()));
        Arc::new(docs)
    }

    /// Publishes a fresh snapshot after a successful write. Skipped entirely
    /// while nobody is watching, so unwatched stores never pay for cloning.
    fn publish(&self) {
        if self.feed.receiver_count() == 0 {
            return;
        }
        let _ = self.feed.send(self.snapshot());
    }

    /// Runs the actor's event loop, processing messages until the channel closes.
    ///
    /// # Context Injection
    /// The `context` argument is injected into every document hook. This allows
    /// documents to access external dependencies (like other clients) that were
    /// created *after* the actor was instantiated but *before* the loop started.
    pub async fn run(mut self, context: T::Context) {
        // Extract just the type name (e.g., "Lot" instead of "lot_flow::model::lot::Lot")
        let entity_type = std::any::type_name::<T>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        info!(entity_type, "Store actor started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                StoreRequest::Create { params, respond_to } => {
                    debug!(entity_type, ?params, "Create");
                    let id = T::Id::from(self.next_id);
                    self.next_id += 1;
                    let at = self.clock.next();

                    match T::from_create_params(id.clone(), params, at) {
                        Ok(mut item) => {
                            // Await the async hook
                            if let Err(e) = item.on_create(&context).await {
                                warn!(entity_type, error = %e, "on_create failed");
                                let _ =
                                    respond_to.send(Err(StoreError::DocumentError(Box::new(e))));
                                continue;
                            }
                            self.store.insert(id.clone(), item);
                            info!(entity_type, %id, size = self.store.len(), "Created");
                            self.publish();
                            let _ = respond_to.send(Ok(id));
                        }
                        Err(e) => {
                            warn!(entity_type, error = %e, "Create failed");
                            let _ = respond_to.send(Err(StoreError::DocumentError(Box::new(e))));
                        }
                    }
                }
                StoreRequest::Get { id, respond_to } => {
                    let item = self.store.get(&id).cloned();
                    let found = item.is_some();
                    debug!(entity_type, %id, found, "Get");
                    let _ = respond_to.send(Ok(item));
                }
                StoreRequest::Update {
                    id,
                    update,
                    respond_to,
                } => {
                    debug!(entity_type, %id, ?update, "Update");
                    let reply = match self.store.get_mut(&id) {
                        Some(item) => {
                            let prev = item.updated_at();
                            item.touch(self.clock.next());
                            // Await the async hook
                            match item.on_update(update, &context).await {
                                Ok(()) => {
                                    info!(entity_type, %id, "Updated");
                                    Ok(item.clone())
                                }
                                Err(e) => {
                                    item.touch(prev);
                                    warn!(entity_type, %id, error = %e, "Update failed");
                                    Err(StoreError::DocumentError(Box::new(e)))
                                }
                            }
                        }
                        None => {
                            warn!(entity_type, %id, "Not found");
                            Err(StoreError::NotFound(id.to_string()))
                        }
                    };
                    if reply.is_ok() {
                        self.publish();
                    }
                    let _ = respond_to.send(reply);
                }
                StoreRequest::Delete { id, respond_to } => {
                    debug!(entity_type, %id, "Delete");
                    if let Some(item) = self.store.get(&id) {
                        // Await the async hook
                        if let Err(e) = item.on_delete(&context).await {
                            warn!(entity_type, %id, error = %e, "on_delete failed");
                            let _ = respond_to.send(Err(StoreError::DocumentError(Box::new(e))));
                            continue;
                        }
                        self.store.remove(&id);
                        info!(entity_type, %id, size = self.store.len(), "Deleted");
                        self.publish();
                        let _ = respond_to.send(Ok(()));
                    } else {
                        warn!(entity_type, %id, "Not found");
                        let _ = respond_to.send(Err(StoreError::NotFound(id.to_string())));
                    }
                }
                StoreRequest::Action {
                    id,
                    action,
                    guard,
                    respond_to,
                } => {
                    debug!(entity_type, %id, ?action, "Action");
                    let reply = match self.store.get_mut(&id) {
                        Some(item) => {
                            if let Some(expected) = guard {
                                let actual = item.updated_at();
                                if actual != expected {
                                    debug!(entity_type, %id, %expected, %actual, "Guard mismatch");
                                    let _ = respond_to
                                        .send(Err(StoreError::Superseded { expected, actual }));
                                    continue;
                                }
                            }
                            let at = self.clock.next();
                            let prev = item.updated_at();
                            item.touch(at);
                            // Await the async hook
                            match item.handle_action(action, at, &context).await {
                                Ok(result) => {
                                    info!(entity_type, %id, "Action ok");
                                    Ok(result)
                                }
                                Err(e) => {
                                    item.touch(prev);
                                    warn!(entity_type, %id, error = %e, "Action failed");
                                    Err(StoreError::DocumentError(Box::new(e)))
                                }
                            }
                        }
                        None => {
                            warn!(entity_type, %id, "Not found");
                            Err(StoreError::NotFound(id.to_string()))
                        }
                    };
                    if reply.is_ok() {
                        self.publish();
                    }
                    let _ = respond_to.send(reply);
                }
                StoreRequest::Watch { respond_to } => {
                    let updates = self.feed.subscribe();
                    let initial = self.snapshot();
                    debug!(
                        entity_type,
                        watchers = self.feed.receiver_count(),
                        docs = initial.len(),
                        "Watch"
                    );
                    let _ = respond_to.send(Ok(WatchFeed { initial, updates }));
                }
            }
        }

        info!(entity_type, size = self.store.len(), "Shutdown");
    }
}
