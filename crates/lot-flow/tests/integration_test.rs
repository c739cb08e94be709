//! Full end-to-end tests with the real system: actor, client, deferred
//! archiver, and subscription hub wired together by [`LotSystem`].
//!
//! Timer-dependent tests run under paused time, so the one-second settling
//! delay elapses instantly and deterministically.

use std::time::Duration;

use lot_flow::lifecycle::{ArchiverConfig, LotSystem, LotSystemConfig};
use lot_flow::lot_actor::LotError;
use lot_flow::model::{LotCreate, LotStatus, LotUpdate, StageUpdate, UserId};
use lot_flow::watch::LotFilter;
use store_actor::StoreHandle;

/// All seven stage payloads in pipeline order, with empty records.
fn all_stages() -> [StageUpdate; 7] {
    [
        StageUpdate::Harvest(Default::default()),
        StageUpdate::Transport(Default::default()),
        StageUpdate::Sorting(Default::default()),
        StageUpdate::Packaging(Default::default()),
        StageUpdate::Storage(Default::default()),
        StageUpdate::Export(Default::default()),
        StageUpdate::Delivery(Default::default()),
    ]
}

/// Scenario: a lot runs the whole pipeline, the subscription shows it
/// completed, and the deferred archive retires it after the settling delay.
#[tokio::test(start_paused = true)]
async fn test_full_lifecycle_auto_archives_after_settling_delay() {
    let system = LotSystem::new();

    let id = system
        .lot_client
        .create_lot(LotCreate::new("AV-2025-010", UserId::from("ana")))
        .await
        .expect("Failed to create lot");

    let mut subscription = system
        .watch
        .subscribe(LotFilter::default())
        .await
        .expect("Failed to subscribe");
    let initial = subscription.next().await.expect("Feed ended early");
    assert_eq!(initial.len(), 1);
    assert_eq!(initial[0].status, LotStatus::Draft);

    // Drive the lot through all seven stages
    let mut last_outcome = None;
    for update in all_stages() {
        last_outcome = Some(
            system
                .lot_client
                .complete_step(id.clone(), update)
                .await
                .expect("Failed to complete step"),
        );
    }
    let outcome = last_outcome.unwrap();
    assert!(outcome.completed);
    assert_eq!(outcome.lot.status, LotStatus::Completed);

    // The completing write armed exactly one archive timer
    assert_eq!(system.archiver().pending_count(), 1);

    // Watch the snapshots: the lot shows as completed first, then the timer
    // fires and the archive lands
    let mut saw_completed = false;
    let archived = loop {
        let lots = subscription.next().await.expect("Feed ended early");
        let lot = lots
            .iter()
            .find(|l| l.id == id)
            .expect("Lot missing from snapshot")
            .clone();
        match lot.status {
            LotStatus::Completed => saw_completed = true,
            LotStatus::Archived => break lot,
            _ => {}
        }
    };
    assert!(
        saw_completed,
        "Lot must be visible as completed during the settling delay"
    );
    assert!(archived.completed_at.is_some());
    assert_eq!(archived.completed_steps.len(), 7);

    drop(subscription);
    system.shutdown().await.expect("Failed to shutdown system");
}

/// Scenario: an edit lands during the settling delay. The deferred archive's
/// conditional write loses and the lot stays completed; re-completing the
/// final step arms a fresh timer that then succeeds.
#[tokio::test(start_paused = true)]
async fn test_interleaved_write_cancels_auto_archive() {
    let system = LotSystem::with_config(LotSystemConfig {
        archiver: ArchiverConfig {
            delay: Duration::from_millis(500),
        },
    });

    let id = system
        .lot_client
        .create_lot(LotCreate::new("AV-2025-011", UserId::from("ana")))
        .await
        .unwrap();
    for update in all_stages() {
        system
            .lot_client
            .complete_step(id.clone(), update)
            .await
            .unwrap();
    }
    assert_eq!(system.archiver().pending_count(), 1);

    // A correction lands before the delay elapses
    let edited = system
        .lot_client
        .update_lot(
            id.clone(),
            LotUpdate {
                lot_number: Some("AV-2025-011-CORRECTED".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    // Let the timer fire; its guard no longer matches, so it gives up
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(system.archiver().pending_count(), 0);

    let lot = system.lot_client.get(id.clone()).await.unwrap().unwrap();
    assert_eq!(lot.status, LotStatus::Completed);
    assert_eq!(lot.lot_number, "AV-2025-011-CORRECTED");
    assert_eq!(lot.updated_at, edited.updated_at);

    // Re-completing the final step arms a fresh timer on the new stamp
    let outcome = system
        .lot_client
        .complete_step(id.clone(), StageUpdate::Delivery(Default::default()))
        .await
        .unwrap();
    assert!(outcome.completed);
    assert_eq!(system.archiver().pending_count(), 1);

    tokio::time::sleep(Duration::from_secs(1)).await;
    let lot = system.lot_client.get(id.clone()).await.unwrap().unwrap();
    assert_eq!(lot.status, LotStatus::Archived);

    system.shutdown().await.expect("Failed to shutdown system");
}

/// Scenario: two subscribers on the same filter share one underlying feed,
/// observe an assignment appear and disappear in successive snapshots, and
/// the feed closes when the last subscriber leaves.
#[tokio::test]
async fn test_subscribers_share_one_feed_with_refcounted_teardown() {
    let system = LotSystem::new();
    assert!(!system.watch.feed_open());

    let id = system
        .lot_client
        .create_lot(LotCreate::new("AV-2025-012", UserId::from("ana")))
        .await
        .unwrap();

    let mut sub_a = system.watch.subscribe(LotFilter::default()).await.unwrap();
    let mut sub_b = system.watch.subscribe(LotFilter::default()).await.unwrap();
    assert!(system.watch.feed_open());
    assert_eq!(system.watch.subscriber_count(), 2);

    assert_eq!(sub_a.next().await.unwrap().len(), 1);
    assert_eq!(sub_b.next().await.unwrap().len(), 1);

    // Both subscribers watch the assignment appear...
    system
        .lot_client
        .add_user_to_lot(id.clone(), UserId::from("marc"))
        .await
        .unwrap();
    let marc = UserId::from("marc");
    assert!(sub_a.next().await.unwrap()[0].assigned_users.contains(&marc));
    assert!(sub_b.next().await.unwrap()[0].assigned_users.contains(&marc));

    // ...and disappear again in the following snapshot
    system
        .lot_client
        .remove_user_from_lot(id.clone(), marc.clone())
        .await
        .unwrap();
    assert!(!sub_a.next().await.unwrap()[0].assigned_users.contains(&marc));
    assert!(!sub_b.next().await.unwrap()[0].assigned_users.contains(&marc));

    // One subscriber leaving keeps the shared feed open
    drop(sub_a);
    assert!(system.watch.feed_open());
    assert_eq!(system.watch.subscriber_count(), 1);

    // The last one leaving tears it down
    drop(sub_b);
    assert!(!system.watch.feed_open());
    assert_eq!(system.watch.subscriber_count(), 0);

    // A later subscriber reopens it
    let mut sub_c = system.watch.subscribe(LotFilter::default()).await.unwrap();
    assert!(system.watch.feed_open());
    assert_eq!(sub_c.next().await.unwrap().len(), 1);

    drop(sub_c);
    system.shutdown().await.expect("Failed to shutdown system");
}

/// Scenario: a restricted lot is invisible to outsiders until the global
/// flag flips or the user is assigned.
#[tokio::test]
async fn test_access_filter_gates_restricted_lots() {
    let system = LotSystem::new();

    let mut params = LotCreate::new("AV-2025-013", UserId::from("ana"));
    params.globally_accessible = false;
    let id = system.lot_client.create_lot(params).await.unwrap();

    let mut stranger = system
        .watch
        .subscribe(LotFilter {
            status: None,
            viewer: Some(UserId::from("zoe")),
        })
        .await
        .unwrap();
    let mut creator = system
        .watch
        .subscribe(LotFilter {
            status: None,
            viewer: Some(UserId::from("ana")),
        })
        .await
        .unwrap();

    // The creator sees the restricted lot, the stranger does not
    assert!(stranger.next().await.unwrap().is_empty());
    assert_eq!(creator.next().await.unwrap().len(), 1);

    // Opening the lot up makes it appear on the stranger's next snapshot
    system
        .lot_client
        .update_lot(
            id.clone(),
            LotUpdate {
                globally_accessible: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(stranger.next().await.unwrap().len(), 1);

    // Restricting it again hides it
    system
        .lot_client
        .update_lot(
            id.clone(),
            LotUpdate {
                globally_accessible: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(stranger.next().await.unwrap().is_empty());

    // Assignment grants access without the global flag
    system
        .lot_client
        .add_user_to_lot(id.clone(), UserId::from("zoe"))
        .await
        .unwrap();
    assert_eq!(stranger.next().await.unwrap().len(), 1);

    drop(stranger);
    drop(creator);
    system.shutdown().await.expect("Failed to shutdown system");
}

/// Scenario: the manual lifecycle verbs. Force-complete bypasses the step
/// count, archive is idempotent from any status, delete ends the lot.
#[tokio::test]
async fn test_manual_overrides_and_delete() {
    let system = LotSystem::new();

    let id = system
        .lot_client
        .create_lot(LotCreate::new("AV-2025-014", UserId::from("ana")))
        .await
        .unwrap();

    // Force-complete a draft with zero completed steps
    let lot = system.lot_client.complete_lot(id.clone()).await.unwrap();
    assert_eq!(lot.status, LotStatus::Completed);
    assert!(lot.completed_at.is_some());
    assert!(lot.completed_steps.is_empty());

    // Manual completion leaves retirement to the operator
    assert_eq!(system.archiver().pending_count(), 0);

    let lot = system.lot_client.archive_lot(id.clone()).await.unwrap();
    assert_eq!(lot.status, LotStatus::Archived);

    // Archiving again is a harmless no-op
    let lot = system.lot_client.archive_lot(id.clone()).await.unwrap();
    assert_eq!(lot.status, LotStatus::Archived);

    system.lot_client.delete(id.clone()).await.unwrap();
    assert!(system.lot_client.get(id.clone()).await.unwrap().is_none());

    let err = system.lot_client.archive_lot(id).await.unwrap_err();
    assert!(matches!(err, LotError::NotFound(_)));

    system.shutdown().await.expect("Failed to shutdown system");
}
