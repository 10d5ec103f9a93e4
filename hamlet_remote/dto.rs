use serde::{Deserialize, Serialize};
use tracing::warn;

use hamlet_game::models::buildings::{
    BuildingCatalog, BuildingStat, BuildingType, DEFAULT_MAX_LEVEL,
};
use hamlet_types::{
    buildings::BuildingName,
    common::{ResourceGroup, ResourceKind},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostDto {
    pub wood: u32,
    pub clay: u32,
    pub iron: u32,
    pub crop: u32,
}

impl From<CostDto> for ResourceGroup {
    fn from(cost: CostDto) -> Self {
        ResourceGroup::new(cost.wood, cost.clay, cost.iron, cost.crop)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionDto {
    pub resource: ResourceKind,
    pub rate: u32,
}

/// A catalog entry as `GET /user/buildings/types` returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingTypeDto {
    pub id: u32,
    pub name: String,
    pub cost: CostDto,
    pub build_time: u32,
    #[serde(default)]
    pub town_hall_requirements: Vec<u8>,
    #[serde(default)]
    pub max_level: Option<u8>,
    #[serde(default)]
    pub storage_capacity: Option<u32>,
    #[serde(default)]
    pub troop_capacity: Option<u32>,
    #[serde(default)]
    pub production: Option<ProductionDto>,
    #[serde(default)]
    pub scouting_durations: Option<Vec<u32>>,
}

impl BuildingTypeDto {
    /// The first stat field present wins.
    fn stat(&self) -> Option<BuildingStat> {
        if let Some(capacity) = self.storage_capacity {
            return Some(BuildingStat::Storage(capacity));
        }
        if let Some(capacity) = self.troop_capacity {
            return Some(BuildingStat::TroopCapacity(capacity));
        }
        if let Some(p) = self.production {
            return Some(BuildingStat::Production {
                resource: p.resource,
                rate: p.rate,
            });
        }
        self.scouting_durations
            .clone()
            .map(BuildingStat::ScoutingDurations)
    }

    pub fn into_building_type(self) -> Option<BuildingType> {
        let name = match self.name.parse::<BuildingName>() {
            Ok(name) => name,
            Err(e) => {
                warn!(id = self.id, error = %e, "Skipping unknown building type");
                return None;
            }
        };

        Some(BuildingType {
            id: self.id,
            name,
            cost: self.cost.into(),
            build_time_secs: self.build_time,
            stat: self.stat(),
            town_hall_requirements: self.town_hall_requirements,
            max_level: self.max_level.unwrap_or(DEFAULT_MAX_LEVEL).max(1),
        })
    }
}

impl From<&BuildingType> for BuildingTypeDto {
    fn from(t: &BuildingType) -> Self {
        let mut dto = Self {
            id: t.id,
            name: t.name.to_string(),
            cost: CostDto {
                wood: t.cost.wood(),
                clay: t.cost.clay(),
                iron: t.cost.iron(),
                crop: t.cost.crop(),
            },
            build_time: t.build_time_secs,
            town_hall_requirements: t.town_hall_requirements.clone(),
            max_level: Some(t.max_level),
            storage_capacity: None,
            troop_capacity: None,
            production: None,
            scouting_durations: None,
        };
        match &t.stat {
            Some(BuildingStat::Storage(capacity)) => dto.storage_capacity = Some(*capacity),
            Some(BuildingStat::TroopCapacity(capacity)) => dto.troop_capacity = Some(*capacity),
            Some(BuildingStat::Production { resource, rate }) => {
                dto.production = Some(ProductionDto {
                    resource: *resource,
                    rate: *rate,
                })
            }
            Some(BuildingStat::ScoutingDurations(table)) => {
                dto.scouting_durations = Some(table.clone())
            }
            None => {}
        }
        dto
    }
}

pub fn catalog_from_dtos(dtos: Vec<BuildingTypeDto>) -> BuildingCatalog {
    BuildingCatalog::new(
        dtos.into_iter()
            .filter_map(BuildingTypeDto::into_building_type)
            .collect(),
    )
}

/// Reply of the build and upgrade endpoints: `{"ok": true}` or `{"error": "..."}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReply {
    #[serde(default)]
    pub ok: Option<bool>,
    #[serde(default)]
    pub error: Option<String>,
}

impl SyncReply {
    /// The reason the backend refused the request, if it did.
    pub fn rejection(&self) -> Option<String> {
        match (&self.error, self.ok) {
            (Some(error), _) => Some(error.clone()),
            (None, Some(false)) => Some("backend answered ok=false".to_string()),
            _ => None,
        }
    }
}
