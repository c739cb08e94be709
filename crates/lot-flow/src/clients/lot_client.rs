//! # Lot Client
//!
//! Provides a high-level API for interacting with the `Lot` actor.
//! It wraps a `StoreClient<Lot>` and exposes domain-specific methods, and it
//! owns the one side effect that outlives a request: completing the final
//! step arms the deferred auto-archive timer.

use crate::lifecycle::Archiver;
use crate::lot_actor::{LotAction, LotActionResult, LotError, StepOutcome};
use crate::model::{Lot, LotCreate, LotId, LotUpdate, StageUpdate, UserId};
use async_trait::async_trait;
use store_actor::{StoreClient, StoreError, StoreHandle};
use tracing::{debug, instrument};

/// Client for interacting with the Lot actor.
#[derive(Clone)]
pub struct LotClient {
    inner: StoreClient<Lot>,
    archiver: Archiver,
}

impl LotClient {
    /// The archiver is injected rather than constructed here so every part of
    /// the system shares one timer table.
    pub fn new(inner: StoreClient<Lot>, archiver: Archiver) -> Self {
        Self { inner, archiver }
    }
}

#[async_trait]
impl StoreHandle<Lot> for LotClient {
    type Error = LotError;

    fn inner(&self) -> &StoreClient<Lot> {
        &self.inner
    }

    fn map_error(e: StoreError) -> Self::Error {
        LotError::from(e)
    }
}

impl LotClient {
    // Custom create method as it needs specific payload conversion

    #[instrument(skip(self))]
    pub async fn create_lot(&self, params: LotCreate) -> Result<LotId, LotError> {
        debug!("Sending request");
        self.inner.create(params).await.map_err(LotError::from)
    }

    /// Partially update a lot's own fields.
    ///
    /// Stage data passed here is written without completing its step; use
    /// [`LotClient::complete_step`] to advance the pipeline.
    #[instrument(skip(self))]
    pub async fn update_lot(&self, id: LotId, update: LotUpdate) -> Result<Lot, LotError> {
        debug!("Sending request");
        self.inner.update(id, update).await.map_err(LotError::from)
    }

    /// Complete one pipeline step and merge its stage data.
    ///
    /// If this completion finishes the pipeline, the deferred auto-archive is
    /// armed on the write's stamp before the outcome is returned.
    #[instrument(skip(self))]
    pub async fn complete_step(
        &self,
        id: LotId,
        update: StageUpdate,
    ) -> Result<StepOutcome, LotError> {
        debug!("Completing step {} for lot {}", update.step(), id);
        match self
            .inner
            .perform_action(id, LotAction::CompleteStep(update))
            .await
        {
            Ok(LotActionResult::CompleteStep(outcome)) => {
                if outcome.completed {
                    self.archiver
                        .arm(outcome.lot.id.clone(), outcome.lot.updated_at);
                }
                Ok(outcome)
            }
            Ok(_) => unreachable!("CompleteStep action must return CompleteStep result"),
            Err(e) => Err(LotError::from(e)),
        }
    }

    /// Retire a lot immediately. Idempotent, callable from any status.
    #[instrument(skip(self))]
    pub async fn archive_lot(&self, id: LotId) -> Result<Lot, LotError> {
        debug!("Archiving lot {}", id);
        match self.inner.perform_action(id, LotAction::Archive).await {
            Ok(LotActionResult::Archive(lot)) => Ok(lot),
            Ok(_) => unreachable!("Archive action must return Archive result"),
            Err(e) => Err(LotError::from(e)),
        }
    }

    /// Mark a lot completed without requiring all seven steps.
    ///
    /// Does not arm the auto-archive; an operator completing a lot by hand
    /// decides when to retire it.
    #[instrument(skip(self))]
    pub async fn complete_lot(&self, id: LotId) -> Result<Lot, LotError> {
        debug!("Force-completing lot {}", id);
        match self
            .inner
            .perform_action(id, LotAction::ForceComplete)
            .await
        {
            Ok(LotActionResult::ForceComplete(lot)) => Ok(lot),
            Ok(_) => unreachable!("ForceComplete action must return ForceComplete result"),
            Err(e) => Err(LotError::from(e)),
        }
    }

    /// Add a user to the lot's assignment set. No-op if already assigned.
    #[instrument(skip(self))]
    pub async fn add_user_to_lot(&self, id: LotId, user: UserId) -> Result<Lot, LotError> {
        debug!("Assigning user {} to lot {}", user, id);
        match self
            .inner
            .perform_action(id, LotAction::AssignUser(user))
            .await
        {
            Ok(LotActionResult::AssignUser(lot)) => Ok(lot),
            Ok(_) => unreachable!("AssignUser action must return AssignUser result"),
            Err(e) => Err(LotError::from(e)),
        }
    }

    /// Remove a user from the lot's assignment set. No-op if absent.
    #[instrument(skip(self))]
    pub async fn remove_user_from_lot(&self, id: LotId, user: UserId) -> Result<Lot, LotError> {
        debug!("Unassigning user {} from lot {}", user, id);
        match self
            .inner
            .perform_action(id, LotAction::UnassignUser(user))
            .await
        {
            Ok(LotActionResult::UnassignUser(lot)) => Ok(lot),
            Ok(_) => unreachable!("UnassignUser action must return UnassignUser result"),
            Err(e) => Err(LotError::from(e)),
        }
    }
}
