//! Document trait implementation for the Lot domain type.
//!
//! This module contains the [`Document`] implementation that enables [`Lot`]
//! to be managed by the generic [`StoreActor`](store_actor::StoreActor).
//!
//! Lot operations have no failure modes of their own: archiving is
//! unconditional, assignment changes are set no-ops when redundant, and step
//! completion always succeeds. The error type is therefore [`Infallible`];
//! storage-level failures (missing id, lost conditional write) are raised by
//! the store, not by this implementation.

use crate::lot_actor::{LotAction, LotActionResult, StepOutcome};
use crate::model::{Lot, LotCreate, LotId, LotUpdate};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::convert::Infallible;
use store_actor::Document;

#[async_trait]
impl Document for Lot {
    type Id = LotId;
    type Create = LotCreate;
    type Update = LotUpdate;
    type Action = LotAction;
    type ActionResult = LotActionResult;
    type Context = ();
    type Error = Infallible;

    fn from_create_params(
        id: LotId,
        params: LotCreate,
        at: DateTime<Utc>,
    ) -> Result<Self, Self::Error> {
        Ok(Lot::new(id, params, at))
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn touch(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }

    /// Applies a partial update. Stage data carried here is a plain field
    /// write; it does not mark the step completed.
    async fn on_update(&mut self, update: LotUpdate, _ctx: &()) -> Result<(), Self::Error> {
        if let Some(lot_number) = update.lot_number {
            self.lot_number = lot_number;
        }
        if let Some(globally_accessible) = update.globally_accessible {
            self.globally_accessible = globally_accessible;
        }
        if let Some(stage) = update.stage {
            self.apply_stage(stage);
        }
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: LotAction,
        at: DateTime<Utc>,
        _ctx: &(),
    ) -> Result<LotActionResult, Self::Error> {
        match action {
            LotAction::CompleteStep(update) => {
                let completed = self.complete_step(update, at);
                Ok(LotActionResult::CompleteStep(StepOutcome {
                    lot: self.clone(),
                    completed,
                }))
            }
            LotAction::Archive => {
                self.archive();
                Ok(LotActionResult::Archive(self.clone()))
            }
            LotAction::ForceComplete => {
                self.force_complete(at);
                Ok(LotActionResult::ForceComplete(self.clone()))
            }
            LotAction::AssignUser(user) => {
                self.assign_user(user);
                Ok(LotActionResult::AssignUser(self.clone()))
            }
            LotAction::UnassignUser(user) => {
                self.unassign_user(&user);
                Ok(LotActionResult::UnassignUser(self.clone()))
            }
        }
    }
}
