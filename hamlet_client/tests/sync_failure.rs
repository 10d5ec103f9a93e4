mod common;

use uuid::Uuid;

use hamlet_app::sync::{SyncOperation, SyncStatus};
use hamlet_game::models::inbox::NotificationKind;
use hamlet_types::{Result, buildings::BuildingName};

use common::{MockBackend, TestClient};

#[tokio::test]
async fn test_failed_sync_keeps_local_progress() -> Result<()> {
    let client = TestClient::new(Uuid::new_v4(), MockBackend::new()).await;
    client.backend.reject_writes(true);
    let session = client.open().await?;

    session
        .build_or_upgrade(BuildingName::TownHall, None)
        .await?;
    session.wait_for_sync().await;

    let intents = session.sync_intents().await?;
    assert_eq!(intents.len(), 1);
    assert_eq!(intents[0].status, SyncStatus::Failed);
    assert_eq!(intents[0].attempts, 1);
    assert!(
        intents[0]
            .last_error
            .as_deref()
            .unwrap()
            .contains("maintenance")
    );

    let notifications = session.notifications().await?;
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].kind, NotificationKind::Warning);
    assert_eq!(notifications[0].title, "Sync Failed");

    // the local timer still runs
    assert_eq!(client.advance(&session, 120).await?, 1);
    assert_eq!(session.overview().await?.town_hall_level, 1);
    assert_eq!(
        client.backend.level_of(client.player_id, BuildingName::TownHall),
        None
    );
    Ok(())
}

#[tokio::test]
async fn test_failed_intents_wait_for_reconcile() -> Result<()> {
    let client = TestClient::new(Uuid::new_v4(), MockBackend::new()).await;
    client.backend.reject_writes(true);
    let session = client.open().await?;
    session
        .build_or_upgrade(BuildingName::TownHall, None)
        .await?;
    session.wait_for_sync().await;
    client.advance(&session, 120).await?;

    client.backend.reject_writes(false);

    // a later build only sends its own intent
    session
        .build_or_upgrade(BuildingName::Warehouse, None)
        .await?;
    session.wait_for_sync().await;
    assert_eq!(client.backend.requests().len(), 2);
    assert_eq!(
        client.backend.level_of(client.player_id, BuildingName::TownHall),
        None
    );

    let report = session.reconcile().await?;
    assert_eq!(report.confirmed, 1);
    assert_eq!(report.failed, 0);

    let intents = session.sync_intents().await?;
    assert_eq!(intents.len(), 2);
    assert_eq!(intents[0].building, BuildingName::TownHall);
    assert_eq!(intents[0].operation, SyncOperation::Build);
    assert_eq!(intents[0].status, SyncStatus::Confirmed);
    assert_eq!(intents[0].attempts, 2);
    assert_eq!(intents[1].status, SyncStatus::Confirmed);
    assert_eq!(
        client.backend.level_of(client.player_id, BuildingName::TownHall),
        Some(1)
    );

    // nothing left to send
    let report = session.reconcile().await?;
    assert_eq!(report.confirmed, 0);
    Ok(())
}

#[tokio::test]
async fn test_pending_intents_are_sent_on_next_open() -> Result<()> {
    let client = TestClient::new(Uuid::new_v4(), MockBackend::new()).await;
    client.backend.reject_writes(true);
    let session = client.open().await?;
    session
        .build_or_upgrade(BuildingName::TownHall, None)
        .await?;
    session.wait_for_sync().await;
    session.logout().await;

    // failed intents stay failed across restarts until reconciled
    client.backend.reject_writes(false);
    let session = client.open().await?;
    session.wait_for_sync().await;
    assert_eq!(
        session.sync_intents().await?[0].status,
        SyncStatus::Failed
    );

    session.reconcile().await?;
    assert_eq!(
        session.sync_intents().await?[0].status,
        SyncStatus::Confirmed
    );
    Ok(())
}
