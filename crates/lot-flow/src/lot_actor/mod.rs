//! # Lot Actor
//!
//! This module implements the Lot resource actor, the single owner of the lot
//! collection and its lifecycle rules.
//!
//! ## Overview
//!
//! Every read and write on lots flows through one actor task, which is what
//! makes lifecycle operations atomic: a step completion reads, derives, and
//! writes the document without any interleaved mutation. Custom actions cover
//! the lifecycle verbs (complete a step, archive, force-complete, manage
//! assignments); plain CRUD covers the rest.
//!
//! ## Structure
//!
//! - [`entity`] - [`Document`](store_actor::Document) implementation for [`Lot`]
//! - [`error`] - [`LotError`] type for type-safe error handling
//! - [`actions`] - [`LotAction`] and [`LotActionResult`] for lifecycle operations
//! - [`new()`] - Factory function that creates the actor and client
//!
//! ## Custom Actions
//!
//! The Lot actor's Action pattern carries the full written document back to
//! the caller, so follow-ups can key on the exact write stamp:
//!
//! ```rust,ignore
//! // Complete a pipeline step (mutating, derives status)
//! let outcome = lot_client.complete_step(lot_id, stage_update).await?;
//! if outcome.completed {
//!     // all seven steps done; auto-archive has been scheduled
//! }
//!
//! // Retire a lot immediately
//! lot_client.archive_lot(lot_id).await?;
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use lot_flow::lot_actor;
//! use lot_flow::model::{LotCreate, UserId};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Create actor and client
//!     let (actor, client) = lot_actor::new();
//!
//!     // Start the actor (no dependencies, so context is ())
//!     tokio::spawn(actor.run(()));
//!
//!     // Create a lot
//!     let params = LotCreate::new("AV-2025-001", UserId::from("u1"));
//!     let id = client.create(params).await?;
//!
//!     let lot = client.get(id).await?;
//!     assert!(lot.is_some());
//!     Ok(())
//! }
//! ```
//!
//! ## Key Features
//!
//! - **Single writer**: every lifecycle rule runs inside the actor task
//! - **Conditional writes**: deferred jobs guard their action on the write stamp
//! - **Type-safe errors**: all operations return `Result<T, LotError>`

pub mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;

use crate::model::Lot;
use store_actor::{StoreActor, StoreClient};

/// Creates a new Lot actor and its client.
pub fn new() -> (StoreActor<Lot>, StoreClient<Lot>) {
    StoreActor::new(32)
}
