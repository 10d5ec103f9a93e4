mod common;

use uuid::Uuid;

use hamlet_types::{
    Result,
    buildings::BuildingName,
    common::ResourceGroup,
    errors::{ApplicationError, GameError},
    warriors::WarriorName,
};

use common::{MockBackend, TestClient};

async fn client_with_academy(level: u8) -> TestClient {
    let player_id = Uuid::new_v4();
    let backend = MockBackend::new()
        .with_building(player_id, BuildingName::TownHall, 2)
        .with_building(player_id, BuildingName::Academy, level);
    TestClient::new(player_id, backend).await
}

#[tokio::test]
async fn test_level_up_charges_iron_and_crop() -> Result<()> {
    let client = client_with_academy(2).await;
    let session = client.open().await?;

    session.level_up(WarriorName::Swordsman).await?;

    // 40 iron and 30 crop times 1.5^2
    assert_eq!(
        session.overview().await?.resources,
        ResourceGroup::new(1000, 1000, 910, 932)
    );
    let queue = session.job_queue().await?;
    assert_eq!(queue.len(), 1);
    assert_eq!(
        queue[0].finishes_at,
        common::t0() + chrono::Duration::seconds(120)
    );

    // a second level-up waits for the first
    let err = session.level_up(WarriorName::Swordsman).await.unwrap_err();
    assert!(matches!(
        err,
        ApplicationError::Game(GameError::AlreadyInProgress(_))
    ));

    assert_eq!(client.advance(&session, 120).await?, 1);
    let roster = session.roster().await?;
    let swordsman = roster
        .iter()
        .find(|w| w.name == WarriorName::Swordsman)
        .unwrap();
    assert_eq!(swordsman.level, 2);
    assert!(swordsman.level_up.is_none());

    let notifications = session.notifications().await?;
    assert_eq!(notifications[0].title, "Warrior Upgraded");
    Ok(())
}

#[tokio::test]
async fn test_academy_gates_higher_tiers() -> Result<()> {
    let client = client_with_academy(2).await;
    let session = client.open().await?;

    let err = session.level_up(WarriorName::Horseman).await.unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::Game(GameError::PrerequisiteNotMet {
            building: BuildingName::Academy,
            level: 3,
            current: 2,
        })
    ));
    assert_eq!(
        session.overview().await?.resources,
        ResourceGroup::new(1000, 1000, 1000, 1000)
    );
    Ok(())
}
