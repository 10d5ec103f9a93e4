use hamlet_game::models::buildings::{BuildingCatalog, default_catalog};
use hamlet_types::errors::ApplicationError;

use crate::{
    config::Config,
    cqrs::{QueryHandler, queries::GetBuildingCatalog},
    uow::UnitOfWork,
};

pub struct GetBuildingCatalogHandler {}

impl GetBuildingCatalogHandler {
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait::async_trait]
impl QueryHandler<GetBuildingCatalog> for GetBuildingCatalogHandler {
    async fn handle(
        &self,
        query: GetBuildingCatalog,
        uow: &Box<dyn UnitOfWork<'_> + '_>,
        _config: &std::sync::Arc<Config>,
    ) -> Result<BuildingCatalog, ApplicationError> {
        let cached = uow.villages().get_cached_catalog(query.player_id).await?;
        Ok(cached.unwrap_or_else(default_catalog))
    }
}
