//! # Lot Flow
//!
//! A lot lifecycle manager for produce traceability: batches move through a
//! fixed seven-stage pipeline from harvest to delivery, with derived status,
//! deferred auto-archive, and live filtered views.
//!
//! ## 🚀 Core Components
//!
//! - **[store_actor]**: The generic storage layer. Contains the [`StoreActor`](store_actor::StoreActor) and [`Document`](store_actor::Document) trait.
//! - **[model]**: Pure data structures ([`Lot`](model::Lot), stage records) that implement the `Document` trait.
//! - **[clients]**: Type-safe wrapper ([`LotClient`](clients::LotClient)) that hides the complexity of message passing.
//! - **[watch]**: Live filtered views of the collection, multiplexed onto one feed.
//! - **[lifecycle]**: Orchestration layer that wires the system and runs deferred jobs.
//!
//! ## 📚 Quick Start
//!
//! The application entry point is in [`main`], which demonstrates:
//! 1.  Setting up the [`LotSystem`].
//! 2.  Driving a lot through all seven pipeline stages.
//! 3.  Watching the auto-archive land through a live subscription.
//!
//! ## 🧪 Testing
//!
//! See [`store_actor::mock`] for utilities to test clients without spawning
//! full actors.

use lot_flow::lifecycle::{setup_tracing, LotSystem};
use lot_flow::model::{
    DeliveryRecord, ExportRecord, HarvestRecord, LotCreate, LotStatus, PackagingRecord,
    SortingRecord, StageUpdate, StorageRecord, TransportRecord, UserId,
};
use lot_flow::watch::LotFilter;
use tracing::{info, Instrument};

/// The stage data a real season's lot would accumulate on its way from the
/// orchard to the customer dock.
fn pipeline_stages() -> Vec<StageUpdate> {
    vec![
        StageUpdate::Harvest(HarvestRecord {
            harvest_date: chrono::NaiveDate::from_ymd_opt(2025, 9, 1),
            orchard: Some("Loma Verde".to_string()),
            variety: Some("Hass".to_string()),
            harvest_weight_kg: Some(1250.0),
        }),
        StageUpdate::Transport(TransportRecord {
            transport_date: chrono::NaiveDate::from_ymd_opt(2025, 9, 2),
            carrier: Some("TransFrio".to_string()),
            vehicle_plate: Some("KL-8842".to_string()),
            transport_temp_c: Some(7.5),
        }),
        StageUpdate::Sorting(SortingRecord {
            sorting_date: chrono::NaiveDate::from_ymd_opt(2025, 9, 3),
            quality_grade: Some("Extra".to_string()),
            sorted_weight_kg: Some(1180.0),
            rejected_weight_kg: Some(70.0),
        }),
        StageUpdate::Packaging(PackagingRecord {
            packaging_date: chrono::NaiveDate::from_ymd_opt(2025, 9, 4),
            box_count: Some(295),
            box_format: Some("4kg".to_string()),
            pallet_id: Some("PAL-0117".to_string()),
        }),
        StageUpdate::Storage(StorageRecord {
            storage_date: chrono::NaiveDate::from_ymd_opt(2025, 9, 5),
            cold_room: Some("CR-2".to_string()),
            storage_temp_c: Some(5.0),
            humidity_pct: Some(90.0),
        }),
        StageUpdate::Export(ExportRecord {
            export_date: chrono::NaiveDate::from_ymd_opt(2025, 9, 8),
            destination_country: Some("France".to_string()),
            container_number: Some("MSKU-7301124".to_string()),
            customs_reference: Some("EXP-2025-4471".to_string()),
        }),
        StageUpdate::Delivery(DeliveryRecord {
            delivery_date: chrono::NaiveDate::from_ymd_opt(2025, 9, 15),
            received_by: Some("Rungis dock 12".to_string()),
            delivered_weight_kg: Some(1176.0),
            delivery_notes: Some("Two boxes refused, pressure marks".to_string()),
        }),
    ]
}

#[tokio::main]
async fn main() -> Result<(), String> {
    // Setup tracing once for the entire application
    setup_tracing();

    info!("Starting lot lifecycle system");

    // Create the entire lot system (starts the actor and deferred jobs)
    let system = LotSystem::new();

    // Intake: register the lot and its field team
    let span = tracing::info_span!("lot_intake");
    let lot_id = async {
        info!("Creating lot");
        let id = system
            .lot_client
            .create_lot(LotCreate::new("AV-2025-014", UserId::from("ana")))
            .await
            .map_err(|e| e.to_string())?;
        system
            .lot_client
            .add_user_to_lot(id.clone(), UserId::from("marc"))
            .await
            .map_err(|e| e.to_string())?;
        Ok::<_, String>(id)
    }
    .instrument(span)
    .await?;

    info!(lot_id = %lot_id, "Lot created");

    // Watch the collection while the pipeline runs
    let mut subscription = system
        .watch
        .subscribe(LotFilter::default())
        .await
        .map_err(|e| e.to_string())?;

    // Drive the lot through all seven stages
    let span = tracing::info_span!("pipeline");
    async {
        for update in pipeline_stages() {
            let step = update.step();
            let outcome = system
                .lot_client
                .complete_step(lot_id.clone(), update)
                .await
                .map_err(|e| e.to_string())?;
            info!(
                step = %step,
                status = %outcome.lot.status,
                "Step completed"
            );
        }
        Ok::<_, String>(())
    }
    .instrument(span)
    .await?;

    // The seventh step armed the auto-archive; watch it land
    while let Some(lots) = subscription.next().await {
        let Some(lot) = lots.iter().find(|l| l.id == lot_id) else {
            continue;
        };
        info!(status = %lot.status, "Snapshot delivered");
        if lot.status == LotStatus::Archived {
            info!(
                completed_at = ?lot.completed_at,
                "Lot archived after settling delay"
            );
            break;
        }
    }
    drop(subscription);

    // Shutdown system gracefully
    system.shutdown().await?;

    info!("Application completed successfully");
    Ok(())
}
