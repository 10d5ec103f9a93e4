use uuid::Uuid;

use hamlet_game::models::{buildings::BuildingCatalog, village::Village};
use hamlet_types::errors::ApplicationError;

#[async_trait::async_trait]
pub trait VillageRepository: Send + Sync {
    /// Loads the player's village, failing with `VillageNotFound` if none is stored.
    async fn get_by_player_id(&self, player_id: Uuid) -> Result<Village, ApplicationError>;

    async fn find_by_player_id(&self, player_id: Uuid)
    -> Result<Option<Village>, ApplicationError>;

    /// Persists resources, buildings, catalog, warriors and stats.
    async fn save(&self, village: &Village) -> Result<(), ApplicationError>;

    /// The building catalog saved with the village, if any.
    async fn get_cached_catalog(
        &self,
        player_id: Uuid,
    ) -> Result<Option<BuildingCatalog>, ApplicationError>;
}
