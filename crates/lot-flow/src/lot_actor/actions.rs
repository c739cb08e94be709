//! Custom actions for the Lot actor.
//!
//! This module defines the lifecycle operations that can be performed on a
//! [`Lot`](crate::model::Lot) beyond standard CRUD: completing pipeline
//! steps, archiving, force-completing, and managing the assignment set.
//! These actions are handled by [`Document::handle_action`](store_actor::Document::handle_action).

use crate::model::{Lot, StageUpdate, UserId};

/// Custom actions for Lot entities.
///
/// Every variant mutates the lot inside the actor's single task, so an
/// action is atomic with respect to every other write on the collection.
#[derive(Debug, Clone)]
pub enum LotAction {
    /// Marks the payload's step completed, merges its stage data, and derives
    /// the follow-on status, pipeline position, and completion stamp.
    ///
    /// Completing the seventh distinct step reports `completed = true` in the
    /// result so the caller can schedule the archive follow-up.
    CompleteStep(StageUpdate),
    /// Retires the lot. No precondition on current status.
    Archive,
    /// Marks the lot completed regardless of how many steps are done.
    ///
    /// Operator override for lots finished outside the system; deliberately
    /// skips the seven-step check.
    ForceComplete,
    /// Adds a user to the assignment set. No-op if already present.
    AssignUser(UserId),
    /// Removes a user from the assignment set. No-op if absent.
    UnassignUser(UserId),
}

/// Results from LotActions - variants match 1:1 with LotAction
#[derive(Debug, Clone)]
pub enum LotActionResult {
    /// Result from CompleteStep action - the written lot plus whether this
    /// completion finished the pipeline
    CompleteStep(StepOutcome),
    /// Result from Archive action - the written lot
    Archive(Lot),
    /// Result from ForceComplete action - the written lot
    ForceComplete(Lot),
    /// Result from AssignUser action - the written lot
    AssignUser(Lot),
    /// Result from UnassignUser action - the written lot
    UnassignUser(Lot),
}

/// What a step completion wrote.
///
/// `lot` is the post-write document, carrying the `updated_at` stamp of this
/// exact write. Deferred follow-ups key their conditional writes on that
/// stamp.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub lot: Lot,
    /// True when this completion made all seven steps done.
    pub completed: bool,
}
