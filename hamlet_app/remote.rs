use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hamlet_game::models::buildings::{BuildingCatalog, BuildingInstance};
use hamlet_types::errors::ApplicationError;

/// Body of `POST /user/buildings/build` and `POST /user/buildings/upgrade`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingRequest {
    pub user_id: Uuid,
    pub building_type_id: u32,
    pub location: Option<u32>,
    pub level: u8,
}

/// A persisted building instance as the backend returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingRecord {
    #[serde(default)]
    pub user_id: Option<Uuid>,
    pub building_type_id: u32,
    #[serde(default)]
    pub location: Option<u32>,
    pub level: u8,
}

impl BuildingRecord {
    /// Resolves the record against the catalog. Records of unknown types are dropped.
    pub fn into_instance(self, catalog: &BuildingCatalog) -> Option<BuildingInstance> {
        let building_type = catalog.get_by_id(self.building_type_id)?;
        let mut instance = BuildingInstance::unbuilt(building_type.name);
        if self.level > 0 {
            instance.built = true;
            instance.level = self.level.min(building_type.max_level);
            instance.cost = building_type.cost_for_level(instance.level);
        }
        instance.location = self.location;
        Some(instance)
    }
}

/// The remote collaborator persisting building progression.
#[async_trait]
pub trait BuildingsApi: Send + Sync {
    async fn fetch_building_types(&self) -> Result<BuildingCatalog, ApplicationError>;

    async fn fetch_buildings(&self, player_id: Uuid)
    -> Result<Vec<BuildingRecord>, ApplicationError>;

    async fn build(&self, request: &BuildingRequest) -> Result<(), ApplicationError>;

    async fn upgrade(&self, request: &BuildingRequest) -> Result<(), ApplicationError>;
}
