mod common;

use std::collections::BTreeMap;
use uuid::Uuid;

use hamlet_types::{
    Result,
    buildings::BuildingName,
    common::ResourceGroup,
    errors::{ApplicationError, GameError},
    warriors::WarriorName,
};

use common::{MockBackend, TestClient};

async fn client_with_barracks() -> TestClient {
    let player_id = Uuid::new_v4();
    let backend = MockBackend::new()
        .with_building(player_id, BuildingName::TownHall, 1)
        .with_building(player_id, BuildingName::Barracks, 1);
    TestClient::new(player_id, backend).await
}

#[tokio::test]
async fn test_training_adds_units_one_by_one() -> Result<()> {
    let client = client_with_barracks().await;
    let session = client.open().await?;
    let before = session.overview().await?.resources;

    session
        .train(BTreeMap::from([(WarriorName::Swordsman, 2)]))
        .await?;

    // one unit at level 1 costs round(base * 1.2)
    let after = session.overview().await?.resources;
    assert_eq!(
        after,
        before.checked_sub(&ResourceGroup::new(120, 72, 144, 48)).unwrap()
    );
    let swordsman = |roster: &[hamlet_app::cqrs::queries::WarriorView]| {
        roster
            .iter()
            .find(|w| w.name == WarriorName::Swordsman)
            .cloned()
            .unwrap()
    };
    let roster = session.roster().await?;
    assert_eq!(swordsman(&roster).queued, 2);
    assert_eq!(swordsman(&roster).count, 0);

    assert_eq!(client.advance(&session, 30).await?, 1);
    let roster = session.roster().await?;
    assert_eq!(swordsman(&roster).count, 1);
    assert_eq!(swordsman(&roster).queued, 1);
    assert!(session.mail().await?.is_empty());

    assert_eq!(client.advance(&session, 30).await?, 1);
    let roster = session.roster().await?;
    assert_eq!(swordsman(&roster).count, 2);
    assert_eq!(swordsman(&roster).queued, 0);

    let mail = session.mail().await?;
    assert_eq!(mail.len(), 1);
    assert_eq!(mail[0].subject, "Swordsman training complete");
    assert!(session.job_queue().await?.is_empty());

    // training never reaches the backend
    assert!(client.backend.requests().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_units_due_while_away_all_arrive_on_reopen() -> Result<()> {
    let client = client_with_barracks().await;
    let session = client.open().await?;
    session
        .train(BTreeMap::from([(WarriorName::Swordsman, 3)]))
        .await?;
    session.logout().await;

    client.clock.advance(3600);
    let session = client.open().await?;
    assert_eq!(session.process_due_jobs().await?, 3);

    let roster = session.roster().await?;
    let swordsman = roster
        .iter()
        .find(|w| w.name == WarriorName::Swordsman)
        .unwrap();
    assert_eq!(swordsman.count, 3);
    assert_eq!(swordsman.queued, 0);
    assert_eq!(session.mail().await?.len(), 1);
    assert!(session.job_queue().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_oversized_batch_is_rejected_without_overflow() -> Result<()> {
    let client = client_with_barracks().await;
    let session = client.open().await?;

    let err = session
        .train(BTreeMap::from([
            (WarriorName::Swordsman, u32::MAX),
            (WarriorName::Archer, 1),
        ]))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::Game(GameError::BarracksFull {
            capacity: 60,
            current: 0,
            requested: u32::MAX,
        })
    ));
    assert!(session.job_queue().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_full_barracks_reject_the_whole_batch() -> Result<()> {
    let client = client_with_barracks().await;
    let session = client.open().await?;
    let capacity = session.overview().await?.troop_capacity;
    assert_eq!(capacity, 60);

    let err = session
        .train(BTreeMap::from([
            (WarriorName::Swordsman, 50),
            (WarriorName::Spearman, 11),
        ]))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::Game(GameError::BarracksFull {
            capacity: 60,
            current: 0,
            requested: 61,
        })
    ));
    assert_eq!(session.overview().await?.total_troops, 0);
    assert!(session.job_queue().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_expensive_batch_is_unaffordable() -> Result<()> {
    let client = client_with_barracks().await;
    let session = client.open().await?;

    let err = session
        .train(BTreeMap::from([(WarriorName::Catapult, 2)]))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::Game(GameError::InsufficientResources { .. })
    ));
    Ok(())
}
