use hamlet_types::errors::ApplicationError;

use crate::{
    config::Config,
    cqrs::{
        QueryHandler,
        queries::{GetVillageOverview, VillageOverview},
    },
    uow::UnitOfWork,
};

pub struct GetVillageOverviewHandler {}

impl GetVillageOverviewHandler {
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait::async_trait]
impl QueryHandler<GetVillageOverview> for GetVillageOverviewHandler {
    async fn handle(
        &self,
        query: GetVillageOverview,
        uow: &Box<dyn UnitOfWork<'_> + '_>,
        _config: &std::sync::Arc<Config>,
    ) -> Result<VillageOverview, ApplicationError> {
        let mut village = uow.villages().get_by_player_id(query.player_id).await?;
        // accrued on the loaded copy only, the query never writes
        village.accrue_production(query.now);

        let stats = *village.village_stats();
        Ok(VillageOverview {
            village_id: village.id,
            resources: village.resources(),
            production: stats.production,
            storage_capacity: stats.storage_capacity,
            troop_capacity: stats.troop_capacity,
            total_troops: village.total_troops(),
            scouting_duration_secs: stats.scouting_duration_secs,
            town_hall_level: village.town_hall_level(),
            academy_level: village.academy_level(),
            stats: *village.player_stats(),
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use std::sync::Arc;

    use hamlet_game::test_utils::{VillageFactoryOptions, village_factory};
    use hamlet_types::{Result, buildings::BuildingName, common::ResourceGroup};

    use super::*;
    use crate::test_utils::tests::MockUnitOfWork;

    #[tokio::test]
    async fn test_overview_shows_accrued_resources_and_capacities() -> Result<()> {
        let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        let uow: Box<dyn UnitOfWork<'_> + '_> = Box::new(MockUnitOfWork::new());
        let village = village_factory(VillageFactoryOptions {
            building_levels: vec![
                (BuildingName::Warehouse, 1),
                (BuildingName::GrainMill, 1),
                (BuildingName::Barracks, 1),
            ],
            resources: Some(ResourceGroup::new(0, 0, 0, 0)),
            now: Some(t0),
            ..Default::default()
        });
        uow.villages().save(&village).await?;

        let overview = GetVillageOverviewHandler::new()
            .handle(
                GetVillageOverview {
                    player_id: village.player_id,
                    now: t0 + Duration::minutes(30),
                },
                &uow,
                &Arc::new(Config::from_env()),
            )
            .await?;

        assert_eq!(overview.storage_capacity, 6000);
        assert_eq!(overview.troop_capacity, 60);
        assert_eq!(overview.production, ResourceGroup::new(0, 0, 0, 120));
        assert_eq!(overview.resources, ResourceGroup::new(0, 0, 0, 60));

        // nothing was written back
        let stored = uow.villages().get_by_player_id(village.player_id).await?;
        assert_eq!(stored.resources(), ResourceGroup::zero());
        Ok(())
    }
}
