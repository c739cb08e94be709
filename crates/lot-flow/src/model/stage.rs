//! The seven-stage pipeline: step numbering and per-stage data records.
//!
//! A lot moves through a fixed pipeline of seven stages, numbered 1-7:
//! harvest, transport, sorting, packaging, storage, export, delivery. Each
//! stage has its own flat record of domain fields (dates, identifiers,
//! measurements), every one of them optional until the stage is completed.
//!
//! Stage records serialize *flattened* into the lot document: the fields land
//! as top-level siblings of the step bookkeeping, not nested under a stage
//! key. Field names are prefixed per stage so the flattened document never
//! collides.

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// One of the seven pipeline stages, numbered 1-7.
///
/// Serialized as its number, so `completed_steps` round-trips as a plain
/// integer set. Invalid numbers are unrepresentable; deserializing one fails
/// with [`StepOutOfRange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Step {
    Harvest = 1,
    Transport = 2,
    Sorting = 3,
    Packaging = 4,
    Storage = 5,
    Export = 6,
    Delivery = 7,
}

/// Raised when a step number outside 1-7 reaches a typed boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Step number out of range 1-7: {0}")]
pub struct StepOutOfRange(pub u8);

impl Step {
    /// Every stage, in pipeline order.
    pub const ALL: [Step; 7] = [
        Step::Harvest,
        Step::Transport,
        Step::Sorting,
        Step::Packaging,
        Step::Storage,
        Step::Export,
        Step::Delivery,
    ];

    /// Number of stages in the pipeline.
    pub const COUNT: usize = Self::ALL.len();

    /// The stage's position in the pipeline, 1-7.
    pub fn number(self) -> u8 {
        self as u8
    }

    /// The stage after this one. Saturates at [`Step::Delivery`]: the pipeline
    /// has no step 8, so `current_step` caps at 7.
    pub fn next(self) -> Step {
        match self {
            Step::Harvest => Step::Transport,
            Step::Transport => Step::Sorting,
            Step::Sorting => Step::Packaging,
            Step::Packaging => Step::Storage,
            Step::Storage => Step::Export,
            Step::Export => Step::Delivery,
            Step::Delivery => Step::Delivery,
        }
    }
}

impl From<Step> for u8 {
    fn from(step: Step) -> Self {
        step.number()
    }
}

impl TryFrom<u8> for Step {
    type Error = StepOutOfRange;

    fn try_from(number: u8) -> Result<Self, Self::Error> {
        match number {
            1 => Ok(Step::Harvest),
            2 => Ok(Step::Transport),
            3 => Ok(Step::Sorting),
            4 => Ok(Step::Packaging),
            5 => Ok(Step::Storage),
            6 => Ok(Step::Export),
            7 => Ok(Step::Delivery),
            other => Err(StepOutOfRange(other)),
        }
    }
}

impl Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Step::Harvest => "harvest",
            Step::Transport => "transport",
            Step::Sorting => "sorting",
            Step::Packaging => "packaging",
            Step::Storage => "storage",
            Step::Export => "export",
            Step::Delivery => "delivery",
        };
        write!(f, "{name}")
    }
}

/// Overwrite `dst` only when the patch actually carries a value. Fields left
/// `None` in a patch keep whatever an earlier write put there.
fn merge_field<T>(dst: &mut Option<T>, src: Option<T>) {
    if src.is_some() {
        *dst = src;
    }
}

/// Field data recorded at the harvest stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarvestRecord {
    pub harvest_date: Option<chrono::NaiveDate>,
    pub orchard: Option<String>,
    pub variety: Option<String>,
    pub harvest_weight_kg: Option<f64>,
}

impl HarvestRecord {
    /// Last-write-wins shallow merge: every field present in `patch`
    /// overwrites, absent fields are preserved.
    pub fn merge(&mut self, patch: HarvestRecord) {
        merge_field(&mut self.harvest_date, patch.harvest_date);
        merge_field(&mut self.orchard, patch.orchard);
        merge_field(&mut self.variety, patch.variety);
        merge_field(&mut self.harvest_weight_kg, patch.harvest_weight_kg);
    }
}

/// Field data recorded at the transport stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportRecord {
    pub transport_date: Option<chrono::NaiveDate>,
    pub carrier: Option<String>,
    pub vehicle_plate: Option<String>,
    pub transport_temp_c: Option<f64>,
}

impl TransportRecord {
    pub fn merge(&mut self, patch: TransportRecord) {
        merge_field(&mut self.transport_date, patch.transport_date);
        merge_field(&mut self.carrier, patch.carrier);
        merge_field(&mut self.vehicle_plate, patch.vehicle_plate);
        merge_field(&mut self.transport_temp_c, patch.transport_temp_c);
    }
}

/// Field data recorded at the sorting stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortingRecord {
    pub sorting_date: Option<chrono::NaiveDate>,
    pub quality_grade: Option<String>,
    pub sorted_weight_kg: Option<f64>,
    pub rejected_weight_kg: Option<f64>,
}

impl SortingRecord {
    pub fn merge(&mut self, patch: SortingRecord) {
        merge_field(&mut self.sorting_date, patch.sorting_date);
        merge_field(&mut self.quality_grade, patch.quality_grade);
        merge_field(&mut self.sorted_weight_kg, patch.sorted_weight_kg);
        merge_field(&mut self.rejected_weight_kg, patch.rejected_weight_kg);
    }
}

/// Field data recorded at the packaging stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackagingRecord {
    pub packaging_date: Option<chrono::NaiveDate>,
    pub box_count: Option<u32>,
    pub box_format: Option<String>,
    pub pallet_id: Option<String>,
}

impl PackagingRecord {
    pub fn merge(&mut self, patch: PackagingRecord) {
        merge_field(&mut self.packaging_date, patch.packaging_date);
        merge_field(&mut self.box_count, patch.box_count);
        merge_field(&mut self.box_format, patch.box_format);
        merge_field(&mut self.pallet_id, patch.pallet_id);
    }
}

/// Field data recorded at the storage stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageRecord {
    pub storage_date: Option<chrono::NaiveDate>,
    pub cold_room: Option<String>,
    pub storage_temp_c: Option<f64>,
    pub humidity_pct: Option<f64>,
}

impl StorageRecord {
    pub fn merge(&mut self, patch: StorageRecord) {
        merge_field(&mut self.storage_date, patch.storage_date);
        merge_field(&mut self.cold_room, patch.cold_room);
        merge_field(&mut self.storage_temp_c, patch.storage_temp_c);
        merge_field(&mut self.humidity_pct, patch.humidity_pct);
    }
}

/// Field data recorded at the export stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRecord {
    pub export_date: Option<chrono::NaiveDate>,
    pub destination_country: Option<String>,
    pub container_number: Option<String>,
    pub customs_reference: Option<String>,
}

impl ExportRecord {
    pub fn merge(&mut self, patch: ExportRecord) {
        merge_field(&mut self.export_date, patch.export_date);
        merge_field(&mut self.destination_country, patch.destination_country);
        merge_field(&mut self.container_number, patch.container_number);
        merge_field(&mut self.customs_reference, patch.customs_reference);
    }
}

/// Field data recorded at the delivery stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryRecord {
    pub delivery_date: Option<chrono::NaiveDate>,
    pub received_by: Option<String>,
    pub delivered_weight_kg: Option<f64>,
    pub delivery_notes: Option<String>,
}

impl DeliveryRecord {
    pub fn merge(&mut self, patch: DeliveryRecord) {
        merge_field(&mut self.delivery_date, patch.delivery_date);
        merge_field(&mut self.received_by, patch.received_by);
        merge_field(&mut self.delivered_weight_kg, patch.delivered_weight_kg);
        merge_field(&mut self.delivery_notes, patch.delivery_notes);
    }
}

/// Stage data pinned to its step.
///
/// A step completion always carries the payload for exactly that stage; the
/// enum makes a mismatched pair (say, step 3 with packaging fields)
/// unrepresentable rather than a runtime validation concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StageUpdate {
    Harvest(HarvestRecord),
    Transport(TransportRecord),
    Sorting(SortingRecord),
    Packaging(PackagingRecord),
    Storage(StorageRecord),
    Export(ExportRecord),
    Delivery(DeliveryRecord),
}

impl StageUpdate {
    /// The step this payload belongs to.
    pub fn step(&self) -> Step {
        match self {
            StageUpdate::Harvest(_) => Step::Harvest,
            StageUpdate::Transport(_) => Step::Transport,
            StageUpdate::Sorting(_) => Step::Sorting,
            StageUpdate::Packaging(_) => Step::Packaging,
            StageUpdate::Storage(_) => Step::Storage,
            StageUpdate::Export(_) => Step::Export,
            StageUpdate::Delivery(_) => Step::Delivery,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_numbers_round_trip() {
        for step in Step::ALL {
            assert_eq!(Step::try_from(step.number()), Ok(step));
        }
        assert_eq!(Step::try_from(0), Err(StepOutOfRange(0)));
        assert_eq!(Step::try_from(8), Err(StepOutOfRange(8)));
    }

    #[test]
    fn next_saturates_at_delivery() {
        assert_eq!(Step::Harvest.next(), Step::Transport);
        assert_eq!(Step::Export.next(), Step::Delivery);
        assert_eq!(Step::Delivery.next(), Step::Delivery);
    }

    #[test]
    fn steps_order_by_pipeline_position() {
        assert!(Step::Harvest < Step::Delivery);
        let mut sorted = Step::ALL;
        sorted.sort();
        assert_eq!(sorted, Step::ALL);
    }

    #[test]
    fn merge_is_last_write_wins_per_field() {
        let mut record = HarvestRecord {
            harvest_date: Some(chrono::NaiveDate::from_ymd_opt(2025, 9, 1).unwrap()),
            orchard: Some("north-7".into()),
            variety: Some("hass".into()),
            harvest_weight_kg: Some(1250.0),
        };

        // A later partial write overwrites what it carries, keeps the rest.
        record.merge(HarvestRecord {
            harvest_weight_kg: Some(1310.5),
            ..Default::default()
        });

        assert_eq!(record.harvest_weight_kg, Some(1310.5));
        assert_eq!(record.orchard.as_deref(), Some("north-7"));
        assert_eq!(record.variety.as_deref(), Some("hass"));
    }

    #[test]
    fn stage_update_knows_its_step() {
        assert_eq!(
            StageUpdate::Harvest(HarvestRecord::default()).step(),
            Step::Harvest
        );
        assert_eq!(
            StageUpdate::Delivery(DeliveryRecord::default()).step(),
            Step::Delivery
        );
    }
}
