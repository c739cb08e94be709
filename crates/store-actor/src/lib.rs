//! # Store Actor
//!
//! This crate provides the foundational building blocks for type-safe,
//! concurrent document stores in Rust. Each store is an **actor** owning one
//! collection of documents: all reads and writes for that collection flow
//! through a single Tokio task as messages, processed strictly one at a time.
//!
//! ## Why an Actor per Collection?
//!
//! - **Isolated state**: the collection lives inside one task; no shared
//!   memory, no locks.
//! - **Sequential writes**: a read-modify-write performed inside one message
//!   can never interleave with another. Updates that would be racy against a
//!   shared map (check a field, then write it) are atomic here by
//!   construction.
//! - **Real conditional writes**: because the actor is the only writer, the
//!   optional guard stamp on actions is a true compare-and-set: the check and
//!   the mutation happen inside the same message.
//!
//! ## Architecture Overview
//!
//! The crate separates concerns into three layers:
//!
//! 1. **Document Layer** ([`Document`]) - Your business logic and domain models
//! 2. **Runtime Layer** ([`StoreActor`]) - Message processing and concurrency
//! 3. **Interface Layer** ([`StoreClient`]) - Type-safe communication
//!
//! You write your business logic **once** in the document trait, and the
//! store handles the async message passing, write stamping, error handling,
//! and state management.
//!
//! ## Write Stamps and Snapshots
//!
//! Every successful write is stamped by the store's [`clock::WriteClock`],
//! which hands out strictly increasing `DateTime<Utc>` values. Stamps drive
//! two features:
//!
//! - **Snapshots** are always ordered most recently written first, with no
//!   ties possible.
//! - **Guarded actions** compare a caller-supplied stamp against the
//!   document's current `updated_at` and refuse to run if any write landed
//!   in between ([`StoreError::Superseded`]).
//!
//! ## Watching a Collection
//!
//! [`StoreClient::watch`] returns a [`WatchFeed`]: the current snapshot plus
//! a broadcast receiver carrying every snapshot published after it. The
//! subscription and the initial snapshot are taken inside the actor's loop,
//! so no write can fall in the gap. Consumers that lag are skipped ahead;
//! since every snapshot is the full collection, nothing is lost.
//!
//! ## Quick Start
//!
//! ```rust
//! use async_trait::async_trait;
//! use chrono::{DateTime, Utc};
//! use store_actor::{Document, StoreActor};
//!
//! // 1. Define the document
//! #[derive(Clone, Debug)]
//! struct Counter {
//!     id: u32,
//!     value: i64,
//!     updated_at: DateTime<Utc>,
//! }
//!
//! #[derive(Debug)] struct CounterCreate { start: i64 }
//! #[derive(Debug)] struct CounterUpdate { set_to: Option<i64> }
//! #[derive(Debug)] enum CounterAction { Increment }
//! #[derive(Debug, thiserror::Error)] #[error("counter error")] struct CounterError;
//!
//! #[async_trait]
//! impl Document for Counter {
//!     type Id = u32;
//!     type Create = CounterCreate;
//!     type Update = CounterUpdate;
//!     type Action = CounterAction;
//!     type ActionResult = i64;
//!     type Context = ();
//!     type Error = CounterError;
//!
//!     fn from_create_params(id: u32, params: CounterCreate, at: DateTime<Utc>) -> Result<Self, Self::Error> {
//!         Ok(Self { id, value: params.start, updated_at: at })
//!     }
//!     fn updated_at(&self) -> DateTime<Utc> { self.updated_at }
//!     fn touch(&mut self, at: DateTime<Utc>) { self.updated_at = at; }
//!
//!     async fn on_update(&mut self, update: CounterUpdate, _: &()) -> Result<(), Self::Error> {
//!         if let Some(v) = update.set_to { self.value = v; }
//!         Ok(())
//!     }
//!
//!     async fn handle_action(&mut self, action: CounterAction, _: DateTime<Utc>, _: &()) -> Result<i64, Self::Error> {
//!         match action {
//!             CounterAction::Increment => {
//!                 self.value += 1;
//!                 Ok(self.value)
//!             }
//!         }
//!     }
//! }
//!
//! // 2. Use the store
//! #[tokio::main]
//! async fn main() {
//!     let (actor, client) = StoreActor::<Counter>::new(10);
//!     tokio::spawn(actor.run(()));
//!
//!     let id = client.create(CounterCreate { start: 41 }).await.unwrap();
//!     let value = client.perform_action(id, CounterAction::Increment).await.unwrap();
//!     assert_eq!(value, 42);
//! }
//! ```
//!
//! ## Context Injection Pattern
//!
//! Dependencies are injected at **runtime** via the `run()` method, not at
//! construction time. Create every actor first, then wire clients into the
//! contexts as the actors are spawned. This "late binding" solves circular
//! dependencies between stores, and makes every dependency explicit: there
//! are no globals anywhere in this crate, so two stores in one process never
//! share state.
//!
//! ## Testing
//!
//! The [`mock`] module provides `MockStore`, which implements the same
//! `StoreClient<T>` API as a real store but answers from scripted
//! expectations. Use it to unit test client wrappers; use real actors for
//! everything involving snapshots, stamps, or timing.

pub mod client;
pub mod clock;
pub mod document;
pub mod error;
pub mod handle;
pub mod message;
pub mod mock;
pub mod store;
pub mod tracing;

// Re-export core types for convenience
pub use client::StoreClient;
pub use document::Document;
pub use error::StoreError;
pub use handle::StoreHandle;
pub use message::{Response, Snapshot, StoreRequest, WatchFeed};
pub use store::StoreActor;
pub use tracing::setup_tracing;
