use hamlet_types::errors::{AppError, ApplicationError};

use crate::{
    config::Config,
    cqrs::{
        QueryHandler,
        queries::{BuildingView, GetVillageBuildings},
    },
    queries_handlers::views::building_view,
    uow::UnitOfWork,
};

pub struct GetVillageBuildingsHandler {}

impl GetVillageBuildingsHandler {
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait::async_trait]
impl QueryHandler<GetVillageBuildings> for GetVillageBuildingsHandler {
    async fn handle(
        &self,
        query: GetVillageBuildings,
        uow: &Box<dyn UnitOfWork<'_> + '_>,
        _config: &std::sync::Arc<Config>,
    ) -> Result<Vec<BuildingView>, ApplicationError> {
        let village = uow.villages().get_by_player_id(query.player_id).await?;
        if village.id != query.village_id {
            return Err(ApplicationError::App(AppError::VillageMismatch {
                village_id: query.village_id,
                player_id: query.player_id,
            }));
        }

        Ok(village
            .buildings()
            .iter()
            .filter_map(|instance| {
                village
                    .catalog()
                    .get(instance.name)
                    .map(|t| building_view(t, instance, query.now))
            })
            .collect())
    }
}
