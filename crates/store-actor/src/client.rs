//! # Generic Client
//!
//! This module defines the generic client for communicating with store actors.

use crate::document::Document;
use crate::error::StoreError;
use crate::message::{StoreRequest, WatchFeed};
use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, oneshot};

/// A type-safe client for interacting with a `StoreActor`.
///
/// The `StoreClient<T>` provides a type-safe, async API for a
/// `StoreActor<T>`. It forwards CRUD + Action + Watch requests over a Tokio
/// mpsc channel and returns results via oneshot channels.
///
/// * **Cloneable** - holds only a sender, so cloning is inexpensive.
/// * **Async API** - all methods return `Future`s that resolve to `Result<…, StoreError>`.
/// * **Generic** - works with any type that implements `Document`.
#[derive(Clone)]
pub struct StoreClient<T: Document> {
    sender: mpsc::Sender<StoreRequest<T>>,
}

impl<T: Document> StoreClient<T> {
    pub fn new(sender: mpsc::Sender<StoreRequest<T>>) -> Self {
        Self { sender }
    }

    pub async fn create(&self, params: T::Create) -> Result<T::Id, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::Create { params, respond_to })
            .await
            .map_err(|_| StoreError::StoreClosed)?;
        response.await.map_err(|_| StoreError::StoreDropped)?
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<T>, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::Get { id, respond_to })
            .await
            .map_err(|_| StoreError::StoreClosed)?;
        response.await.map_err(|_| StoreError::StoreDropped)?
    }

    pub async fn update(&self, id: T::Id, update: T::Update) -> Result<T, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::Update {
                id,
                update,
                respond_to,
            })
            .await
            .map_err(|_| StoreError::StoreClosed)?;
        response.await.map_err(|_| StoreError::StoreDropped)?
    }

    pub async fn delete(&self, id: T::Id) -> Result<(), StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::Delete { id, respond_to })
            .await
            .map_err(|_| StoreError::StoreClosed)?;
        response.await.map_err(|_| StoreError::StoreDropped)?
    }

    pub async fn perform_action(
        &self,
        id: T::Id,
        action: T::Action,
    ) -> Result<T::ActionResult, StoreError> {
        self.send_action(id, action, None).await
    }

    /// Like [`StoreClient::perform_action`], but the action only runs if the
    /// document's `updated_at` still equals `if_unmodified_since`. Any write
    /// that landed in between makes the actor reject the action with
    /// [`StoreError::Superseded`] without touching the document.
    pub async fn perform_action_guarded(
        &self,
        id: T::Id,
        action: T::Action,
        if_unmodified_since: DateTime<Utc>,
    ) -> Result<T::ActionResult, StoreError> {
        self.send_action(id, action, Some(if_unmodified_since)).await
    }

    async fn send_action(
        &self,
        id: T::Id,
        action: T::Action,
        guard: Option<DateTime<Utc>>,
    ) -> Result<T::ActionResult, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::Action {
                id,
                action,
                guard,
                respond_to,
            })
            .await
            .map_err(|_| StoreError::StoreClosed)?;
        response.await.map_err(|_| StoreError::StoreDropped)?
    }

    /// Opens a change feed: the current snapshot plus a receiver for every
    /// snapshot published after it.
    pub async fn watch(&self) -> Result<WatchFeed<T>, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::Watch { respond_to })
            .await
            .map_err(|_| StoreError::StoreClosed)?;
        response.await.map_err(|_| StoreError::StoreDropped)?
    }
}
