//! # StoreHandle Trait
//!
//! Provides a common interface for document-specific clients, adding default
//! `get` and `delete` methods built on top of a generic `StoreClient`.

use crate::{Document, StoreClient, StoreError};
use async_trait::async_trait;

/// Trait for document-specific clients to inherit standard CRUD operations.
///
/// This trait reduces boilerplate by providing default implementations for
/// common operations like `get` and `delete`.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use chrono::{DateTime, Utc};
/// use store_actor::{Document, StoreClient, StoreError, StoreHandle};
///
/// // 1. Define Document
/// #[derive(Clone, Debug)]
/// struct Ticket { id: u32, open: bool, updated_at: DateTime<Utc> }
/// #[derive(Debug)] struct TicketCreate;
/// #[derive(Debug)] struct TicketUpdate;
/// #[derive(Debug)] enum TicketAction {}
/// #[derive(Debug, thiserror::Error)] #[error("{0}")] struct TicketError(String);
///
/// #[async_trait]
/// impl Document for Ticket {
///     type Id = u32;
///     type Create = TicketCreate;
///     type Update = TicketUpdate;
///     type Action = TicketAction;
///     type ActionResult = ();
///     type Context = ();
///     type Error = TicketError;
///
///     fn from_create_params(id: u32, _: TicketCreate, at: DateTime<Utc>) -> Result<Self, Self::Error> {
///         Ok(Self { id, open: true, updated_at: at })
///     }
///     fn updated_at(&self) -> DateTime<Utc> { self.updated_at }
///     fn touch(&mut self, at: DateTime<Utc>) { self.updated_at = at; }
///     async fn on_update(&mut self, _: TicketUpdate, _: &()) -> Result<(), Self::Error> { Ok(()) }
///     async fn handle_action(&mut self, _: TicketAction, _: DateTime<Utc>, _: &()) -> Result<(), Self::Error> {
///         Ok(())
///     }
/// }
///
/// // 2. Define Client Wrapper
/// struct TicketClient {
///     inner: StoreClient<Ticket>,
/// }
///
/// // 3. Implement StoreHandle
/// #[async_trait]
/// impl StoreHandle<Ticket> for TicketClient {
///     type Error = TicketError;
///
///     fn inner(&self) -> &StoreClient<Ticket> {
///         &self.inner
///     }
///
///     fn map_error(e: StoreError) -> Self::Error {
///         TicketError(e.to_string())
///     }
/// }
///
/// // 4. Usage
/// async fn usage(client: TicketClient) {
///     // get() and delete() are provided automatically!
///     let _ = client.get(1).await;
///     let _ = client.delete(1).await;
/// }
/// ```
#[async_trait]
pub trait StoreHandle<T: Document>: Send + Sync {
    /// The document-specific error type.
    type Error: Send + Sync;

    /// Access the inner generic StoreClient.
    fn inner(&self) -> &StoreClient<T>;

    /// Map store errors to the specific document error type.
    fn map_error(e: StoreError) -> Self::Error;

    /// Fetch a document by ID.
    #[tracing::instrument(skip(self))]
    async fn get(&self, id: T::Id) -> Result<Option<T>, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().get(id).await.map_err(Self::map_error)
    }

    /// Delete a document by ID.
    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: T::Id) -> Result<(), Self::Error> {
        tracing::debug!("Sending request");
        self.inner().delete(id).await.map_err(Self::map_error)
    }
}
