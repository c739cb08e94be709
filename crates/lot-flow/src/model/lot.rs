//! The lot document: a batch of produce tracked across the seven-stage
//! pipeline from harvest to delivery.

use crate::model::{
    DeliveryRecord, ExportRecord, HarvestRecord, LotStatus, PackagingRecord, SortingRecord,
    StageUpdate, Step, StorageRecord, TransportRecord,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::Display;

/// Type-safe identifier for lots.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LotId(pub u32);

impl From<u32> for LotId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for LotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "lot_{}", self.0)
    }
}

/// Identifier of a user as issued by the upstream auth system.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A produce lot and everything recorded about it.
///
/// Serializes as one flat document: the seven stage records are flattened so
/// their fields sit as top-level siblings of the step bookkeeping, the shape
/// downstream consumers of the change feed already expect.
///
/// `current_step` is the next stage expected, not the last one done. It only
/// ever moves forward, so completing an earlier step again never rewinds the
/// pipeline position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lot {
    pub id: LotId,
    pub lot_number: String,
    pub status: LotStatus,
    pub current_step: Step,
    pub completed_steps: BTreeSet<Step>,
    pub created_by: UserId,
    pub assigned_users: BTreeSet<UserId>,
    pub globally_accessible: bool,
    #[serde(flatten)]
    pub harvest: HarvestRecord,
    #[serde(flatten)]
    pub transport: TransportRecord,
    #[serde(flatten)]
    pub sorting: SortingRecord,
    #[serde(flatten)]
    pub packaging: PackagingRecord,
    #[serde(flatten)]
    pub storage: StorageRecord,
    #[serde(flatten)]
    pub export: ExportRecord,
    #[serde(flatten)]
    pub delivery: DeliveryRecord,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Payload for creating a new lot.
#[derive(Debug, Clone)]
pub struct LotCreate {
    pub lot_number: String,
    pub created_by: UserId,
    pub globally_accessible: bool,
    /// Stage data known at intake time. Applied as plain field writes; no
    /// step is marked completed by creation.
    pub initial_stages: Vec<StageUpdate>,
}

impl LotCreate {
    /// Creation payload with the policy default of global visibility.
    pub fn new(lot_number: impl Into<String>, created_by: UserId) -> Self {
        Self {
            lot_number: lot_number.into(),
            created_by,
            globally_accessible: true,
            initial_stages: Vec::new(),
        }
    }
}

/// Partial update for a lot's own fields.
///
/// `stage` writes stage data without completing the step; completing goes
/// through the step-completion action instead.
#[derive(Debug, Clone, Default)]
pub struct LotUpdate {
    pub lot_number: Option<String>,
    pub globally_accessible: Option<bool>,
    pub stage: Option<StageUpdate>,
}

impl Lot {
    /// Builds a fresh lot in `draft` with no steps completed and the creator
    /// as its first assigned user.
    pub fn new(id: LotId, params: LotCreate, at: DateTime<Utc>) -> Self {
        let mut lot = Self {
            id,
            lot_number: params.lot_number,
            status: LotStatus::Draft,
            current_step: Step::Harvest,
            completed_steps: BTreeSet::new(),
            created_by: params.created_by.clone(),
            assigned_users: BTreeSet::from([params.created_by]),
            globally_accessible: params.globally_accessible,
            harvest: HarvestRecord::default(),
            transport: TransportRecord::default(),
            sorting: SortingRecord::default(),
            packaging: PackagingRecord::default(),
            storage: StorageRecord::default(),
            export: ExportRecord::default(),
            delivery: DeliveryRecord::default(),
            created_at: at,
            updated_at: at,
            completed_at: None,
        };
        for stage in params.initial_stages {
            lot.apply_stage(stage);
        }
        lot
    }

    /// Merges stage data onto the document without touching step bookkeeping.
    pub fn apply_stage(&mut self, update: StageUpdate) {
        match update {
            StageUpdate::Harvest(record) => self.harvest.merge(record),
            StageUpdate::Transport(record) => self.transport.merge(record),
            StageUpdate::Sorting(record) => self.sorting.merge(record),
            StageUpdate::Packaging(record) => self.packaging.merge(record),
            StageUpdate::Storage(record) => self.storage.merge(record),
            StageUpdate::Export(record) => self.export.merge(record),
            StageUpdate::Delivery(record) => self.delivery.merge(record),
        }
    }

    /// Marks the update's step completed, merges its stage data, and derives
    /// the follow-on state. Returns whether the lot is now fully completed.
    ///
    /// Idempotent on the step set: completing a step twice re-applies its
    /// stage data last-write-wins but the set gains nothing. `completed_at`
    /// is stamped on every call that ends with all seven done, so
    /// re-completing the final step refreshes it.
    pub fn complete_step(&mut self, update: StageUpdate, at: DateTime<Utc>) -> bool {
        let step = update.step();
        self.apply_stage(update);
        self.completed_steps.insert(step);
        self.current_step = self.current_step.max(step.next());
        self.status = self.status.after_step_completion(self.completed_steps.len());
        let completed = self.all_steps_complete();
        if completed {
            self.completed_at = Some(at);
        }
        completed
    }

    /// Marks the lot completed regardless of how many steps are done.
    ///
    /// Operator override for lots finished outside the system (paper
    /// records, partial shipments written off). Deliberately skips the
    /// seven-step check.
    pub fn force_complete(&mut self, at: DateTime<Utc>) {
        self.status = LotStatus::Completed;
        self.completed_at = Some(at);
    }

    /// Retires the lot. No precondition on current status; archiving an
    /// already archived lot changes nothing but the write stamp.
    pub fn archive(&mut self) {
        self.status = LotStatus::Archived;
    }

    /// Adds a user to the assignment set. Returns false if already present.
    pub fn assign_user(&mut self, user: UserId) -> bool {
        self.assigned_users.insert(user)
    }

    /// Removes a user from the assignment set. Returns false if absent.
    pub fn unassign_user(&mut self, user: &UserId) -> bool {
        self.assigned_users.remove(user)
    }

    /// True once every one of the seven steps is completed.
    pub fn all_steps_complete(&self) -> bool {
        self.completed_steps.len() == Step::COUNT
    }

    /// Whether `user` may see this lot: it is globally accessible, or the
    /// user created it, or the user is assigned to it.
    pub fn readable_by(&self, user: &UserId) -> bool {
        self.globally_accessible || self.created_by == *user || self.assigned_users.contains(user)
    }
}
