//! # Document Trait
//!
//! The `Document` trait defines the contract that every document type (Lot,
//! Shipment, …) must implement to be managed by the generic `StoreActor`. It
//! specifies associated types for IDs, DTOs, actions, context, and errors, and
//! provides lifecycle hooks (`on_create`, `on_update`, `on_delete`,
//! `handle_action`). Implementing this trait gives the store a uniform
//! CRUD + Action API for any domain model.
//!
//! # Write Stamps
//!
//! Every document carries a server-assigned `updated_at` stamp. The store owns
//! the clock: it stamps the document *before* invoking a mutating hook and
//! passes the same stamp into hooks that need to record it (for example to set
//! a completion time). Documents only store the value; they never read the
//! wall clock themselves. This keeps stamps strictly increasing per store and
//! makes conditional writes (compare on `updated_at`) reliable.
//!
//! # Provided Methods (Hooks)
//!
//! This trait includes default implementations for two lifecycle hooks:
//! - [`Document::on_create`]
//! - [`Document::on_delete`]
//!
//! You do **not** need to implement these unless you want side effects around
//! creation or deletion. The default implementation does nothing (`Ok(())`).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Trait that any document type must implement to be managed by a `StoreActor`.
///
/// # Architecture Note
/// By defining one contract that all document types satisfy, the `StoreActor`
/// logic is written *once* and reused for every collection.
///
/// # Async & Context
/// This trait is `#[async_trait]` to allow asynchronous operations in hooks
/// (e.g., calling other actors). It also defines a `Context` type, which is
/// injected into every hook. This allows "Late Binding" of dependencies
/// (passing clients to `run()` instead of `new()`).
///
/// # Hook Failure Contract
/// The store restores the previous write stamp when a mutating hook returns
/// `Err`. Hooks must therefore validate before mutating: a failing hook may
/// not leave partial changes behind.
#[async_trait]
pub trait Document: Clone + Send + Sync + 'static {
    /// The unique identifier for this document.
    /// Must be convertible from u32 for automatic ID generation.
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug + From<u32>;

    /// The data required to create a new instance (DTO - Data Transfer Object).
    type Create: Send + Sync + Debug;

    /// The data required to update an existing instance.
    type Update: Send + Sync + Debug;

    /// Enum representing document-specific operations (e.g., `CompleteStep`).
    type Action: Send + Sync + Debug;

    /// The result type returned by custom actions.
    type ActionResult: Send + Sync + Debug;

    /// The runtime context (dependencies) injected into the actor.
    /// Use `()` if no dependencies are needed.
    type Context: Send + Sync;

    /// The error type for this document.
    /// Must implement std::error::Error for proper error propagation.
    ///
    /// One error enum covers the whole document type rather than one per
    /// action. Clients deal with a single error type, at the cost of the enum
    /// being the union of everything any hook can raise.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Construct the full document from its ID, the creation payload, and the
    /// creation stamp. Called synchronously before `on_create`. The stamp is
    /// the document's initial `created_at` and `updated_at`.
    fn from_create_params(
        id: Self::Id,
        params: Self::Create,
        at: DateTime<Utc>,
    ) -> Result<Self, Self::Error>;

    /// The stamp of the last successful write to this document.
    fn updated_at(&self) -> DateTime<Utc>;

    /// Set the write stamp. Called by the store around every mutation; domain
    /// code should not call this.
    fn touch(&mut self, at: DateTime<Utc>);

    // --- Lifecycle Hooks (Async) ---

    /// Called immediately after the document is created and initialized.
    /// Use this hook to perform validation or side effects (e.g., checking other actors).
    async fn on_create(&mut self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called when an update request is received. The document has already
    /// been stamped with the new `updated_at` when this runs.
    async fn on_update(
        &mut self,
        update: Self::Update,
        _ctx: &Self::Context,
    ) -> Result<(), Self::Error>;

    /// Called immediately before the document is removed from the store.
    async fn on_delete(&self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    // --- Action Handler (Async) ---

    /// Handle a custom document-specific action. `at` is the stamp of this
    /// write, already applied to `updated_at`; hooks that record times (e.g.
    /// a completion stamp) use it instead of reading the clock.
    async fn handle_action(
        &mut self,
        action: Self::Action,
        at: DateTime<Utc>,
        _ctx: &Self::Context,
    ) -> Result<Self::ActionResult, Self::Error>;
}
