use std::sync::Arc;
use tracing::info;

use hamlet_game::models::{village::Village, warriors::WarriorCatalog};
use hamlet_types::errors::ApplicationError;

use crate::{
    config::Config,
    cqrs::{CommandHandler, commands::InitializeVillage},
    uow::UnitOfWork,
};

pub struct InitializeVillageCommandHandler {}

impl InitializeVillageCommandHandler {
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait::async_trait]
impl CommandHandler<InitializeVillage> for InitializeVillageCommandHandler {
    async fn handle(
        &self,
        command: InitializeVillage,
        uow: &Box<dyn UnitOfWork<'_> + '_>,
        _config: &Arc<Config>,
    ) -> Result<(), ApplicationError> {
        let village_repo = uow.villages();

        let village = match village_repo.find_by_player_id(command.player_id).await? {
            Some(mut village) => {
                village.accrue_production(command.now);
                village.sync_buildings(command.catalog, &command.remote_buildings);
                village
            }
            None => {
                info!(player_id = %command.player_id, "Creating a new village");
                Village::from_remote(
                    command.player_id,
                    command.catalog,
                    WarriorCatalog::default(),
                    &command.remote_buildings,
                    command.now,
                )
            }
        };

        village_repo.save(&village).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use uuid::Uuid;

    use hamlet_game::{
        models::{
            buildings::{BuildingInstance, default_catalog},
            ledger::STARTING_RESOURCES,
        },
        test_utils::{VillageFactoryOptions, village_factory},
    };
    use hamlet_types::{Result, buildings::BuildingName, common::ResourceGroup};

    use super::*;
    use crate::test_utils::tests::MockUnitOfWork;

    #[tokio::test]
    async fn test_creates_village_with_remote_buildings() -> Result<()> {
        let uow: Box<dyn UnitOfWork<'_> + '_> = Box::new(MockUnitOfWork::new());
        let player_id = Uuid::new_v4();
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();

        let mut town_hall = BuildingInstance::unbuilt(BuildingName::TownHall);
        town_hall.built = true;
        town_hall.level = 2;

        let command = InitializeVillage {
            player_id,
            catalog: default_catalog(),
            remote_buildings: vec![town_hall],
            now,
        };
        InitializeVillageCommandHandler::new()
            .handle(command, &uow, &Arc::new(Config::from_env()))
            .await?;

        let village = uow.villages().get_by_player_id(player_id).await?;
        assert_eq!(village.id, player_id);
        assert_eq!(village.town_hall_level(), 2);
        assert_eq!(village.resources(), STARTING_RESOURCES);
        assert_eq!(village.buildings().len(), default_catalog().types().len());
        Ok(())
    }

    #[tokio::test]
    async fn test_existing_village_keeps_local_state_and_accrues() -> Result<()> {
        let uow: Box<dyn UnitOfWork<'_> + '_> = Box::new(MockUnitOfWork::new());
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        let village = village_factory(VillageFactoryOptions {
            building_levels: vec![(BuildingName::Warehouse, 1), (BuildingName::Sawmill, 1)],
            resources: Some(ResourceGroup::new(100, 100, 100, 100)),
            now: Some(now),
            ..Default::default()
        });
        uow.villages().save(&village).await?;

        // the backend still thinks the warehouse is unbuilt
        let command = InitializeVillage {
            player_id: village.player_id,
            catalog: default_catalog(),
            remote_buildings: vec![BuildingInstance::unbuilt(BuildingName::Warehouse)],
            now: now + Duration::hours(1),
        };
        InitializeVillageCommandHandler::new()
            .handle(command, &uow, &Arc::new(Config::from_env()))
            .await?;

        let stored = uow.villages().get_by_player_id(village.player_id).await?;
        assert_eq!(stored.building_level(BuildingName::Warehouse), 1);
        // Sawmill level 1 yields round(100 * 1.2) = 120 wood per hour
        assert_eq!(stored.resources().wood(), 220);
        Ok(())
    }
}
