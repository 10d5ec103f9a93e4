use hamlet_types::errors::ApplicationError;

use crate::{
    config::Config,
    cqrs::{
        QueryHandler,
        queries::{BuildingView, FindBuildingByName},
    },
    queries_handlers::views::building_view,
    uow::UnitOfWork,
};

pub struct FindBuildingByNameHandler {}

impl FindBuildingByNameHandler {
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait::async_trait]
impl QueryHandler<FindBuildingByName> for FindBuildingByNameHandler {
    async fn handle(
        &self,
        query: FindBuildingByName,
        uow: &Box<dyn UnitOfWork<'_> + '_>,
        _config: &std::sync::Arc<Config>,
    ) -> Result<Option<BuildingView>, ApplicationError> {
        let village = uow.villages().get_by_player_id(query.player_id).await?;
        let view = village
            .catalog()
            .get(query.name)
            .zip(village.find_building(query.name))
            .map(|(t, instance)| building_view(t, instance, query.now));
        Ok(view)
    }
}
