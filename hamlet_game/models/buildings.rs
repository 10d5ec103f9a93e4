use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hamlet_types::{
    buildings::BuildingName,
    common::{ResourceGroup, ResourceKind},
};

/// Each upgrade step multiplies the previous step's cost by this factor.
pub const UPGRADE_COST_FACTOR: f64 = 1.2;
/// Growth of production, storage and troop capacity per building level.
pub const STAT_GROWTH_FACTOR: f64 = 1.2;
pub const DEFAULT_SCOUTING_DURATION_SECS: u32 = 60;
pub const DEFAULT_MAX_LEVEL: u8 = 10;

/// Type-specific base value of a building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildingStat {
    Storage(u32),
    TroopCapacity(u32),
    Production { resource: ResourceKind, rate: u32 },
    ScoutingDurations(Vec<u32>),
}

/// A stat computed for a building at a given level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DerivedValue {
    Storage(u32),
    TroopCapacity(u32),
    Production { resource: ResourceKind, rate: u32 },
    ScoutingDuration(u32),
}

/// Immutable catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingType {
    pub id: u32,
    pub name: BuildingName,
    /// Cost of the first build.
    pub cost: ResourceGroup,
    pub build_time_secs: u32,
    /// Town Hall level required to reach level `idx + 1`.
    pub town_hall_requirements: Vec<u8>,
    pub max_level: u8,
    pub stat: Option<BuildingStat>,
}

impl BuildingType {
    /// Town Hall level needed to reach `target_level`, 0 when the table doesn't say.
    pub fn required_town_hall_level(&self, target_level: u8) -> u8 {
        if target_level == 0 {
            return 0;
        }
        self.town_hall_requirements
            .get(target_level as usize - 1)
            .copied()
            .unwrap_or(0)
    }

    /// Cost to reach `target_level`. The first build pays the base cost,
    /// every following step costs 1.2 times the previous one.
    pub fn cost_for_level(&self, target_level: u8) -> ResourceGroup {
        if target_level <= 1 {
            return self.cost;
        }
        self.cost * UPGRADE_COST_FACTOR.powi(target_level as i32 - 1)
    }

    /// Returns the building stat at `level`, if this type has one.
    pub fn derived_at_level(&self, level: u8) -> Option<DerivedValue> {
        let value = match self.stat.as_ref()? {
            BuildingStat::Storage(base) => DerivedValue::Storage(scaled_stat(*base, level)),
            BuildingStat::TroopCapacity(base) => {
                DerivedValue::TroopCapacity(scaled_stat(*base, level))
            }
            BuildingStat::Production { resource, rate } => DerivedValue::Production {
                resource: *resource,
                rate: scaled_stat(*rate, level),
            },
            BuildingStat::ScoutingDurations(table) => {
                DerivedValue::ScoutingDuration(scouting_duration(table, level))
            }
        };
        Some(value)
    }
}

/// `round(base × 1.2^level)`.
pub fn scaled_stat(base: u32, level: u8) -> u32 {
    (base as f64 * STAT_GROWTH_FACTOR.powi(level as i32)).round() as u32
}

/// Looks up the scouting duration for `level`, clamping to the last entry.
pub fn scouting_duration(table: &[u32], level: u8) -> u32 {
    if level == 0 {
        return DEFAULT_SCOUTING_DURATION_SECS;
    }
    table
        .get(level as usize - 1)
        .or_else(|| table.last())
        .copied()
        .unwrap_or(DEFAULT_SCOUTING_DURATION_SECS)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingCatalog {
    types: Vec<BuildingType>,
}

impl BuildingCatalog {
    pub fn new(mut types: Vec<BuildingType>) -> Self {
        types.sort_by_key(|t| t.name);
        types.dedup_by_key(|t| t.name);
        Self { types }
    }

    pub fn get(&self, name: BuildingName) -> Option<&BuildingType> {
        self.types.iter().find(|t| t.name == name)
    }

    pub fn get_by_id(&self, id: u32) -> Option<&BuildingType> {
        self.types.iter().find(|t| t.id == id)
    }

    pub fn types(&self) -> &[BuildingType] {
        &self.types
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Default for BuildingCatalog {
    fn default() -> Self {
        default_catalog()
    }
}

/// Construction staged on an instance until its timer fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Construction {
    pub finish_time: DateTime<Utc>,
    pub pending_level: u8,
    pub pending_cost: ResourceGroup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildingStatus {
    Unbuilt,
    UnderConstruction {
        target_level: u8,
        finish_time: DateTime<Utc>,
    },
    Built {
        level: u8,
    },
}

/// One building slot of a village.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingInstance {
    pub name: BuildingName,
    pub built: bool,
    pub level: u8,
    pub location: Option<u32>,
    /// What was paid for the current level.
    pub cost: ResourceGroup,
    pub construction: Option<Construction>,
}

impl BuildingInstance {
    pub fn unbuilt(name: BuildingName) -> Self {
        Self {
            name,
            built: false,
            level: 0,
            location: None,
            cost: ResourceGroup::zero(),
            construction: None,
        }
    }

    pub fn next_level(&self) -> u8 {
        if self.built { self.level + 1 } else { 1 }
    }

    pub fn is_under_construction(&self) -> bool {
        self.construction.is_some()
    }

    pub fn finish_time(&self) -> Option<DateTime<Utc>> {
        self.construction.as_ref().map(|c| c.finish_time)
    }

    /// Level the building has for gameplay purposes (0 when unbuilt).
    pub fn effective_level(&self) -> u8 {
        if self.built { self.level } else { 0 }
    }

    /// State of the instance as seen at `now`. A construction whose finish
    /// time has passed already reads as built, even before its completion
    /// job commits it.
    pub fn status_at(&self, now: DateTime<Utc>) -> BuildingStatus {
        match &self.construction {
            Some(c) if c.finish_time <= now => BuildingStatus::Built {
                level: c.pending_level,
            },
            Some(c) => BuildingStatus::UnderConstruction {
                target_level: c.pending_level,
                finish_time: c.finish_time,
            },
            None if self.built => BuildingStatus::Built { level: self.level },
            None => BuildingStatus::Unbuilt,
        }
    }
}

/// Builds the village's instance list: one per catalog type, taking the local
/// copy when there is one, the remote record otherwise, else a fresh unbuilt slot.
pub fn merge_instances(
    catalog: &BuildingCatalog,
    remote: &[BuildingInstance],
    local: &[BuildingInstance],
) -> Vec<BuildingInstance> {
    catalog
        .types()
        .iter()
        .map(|t| {
            local
                .iter()
                .find(|i| i.name == t.name)
                .or_else(|| remote.iter().find(|i| i.name == t.name))
                .cloned()
                .unwrap_or_else(|| BuildingInstance::unbuilt(t.name))
        })
        .collect()
}

// ==================== BEGIN BUILDINGS STATIC DATA ====================

struct BuildingSeed {
    id: u32,
    name: BuildingName,
    cost: ResourceGroup,
    build_time_secs: u32,
    town_hall_requirements: &'static [u8],
    stat: Option<SeedStat>,
}

enum SeedStat {
    Storage(u32),
    TroopCapacity(u32),
    Production(ResourceKind, u32),
    ScoutingDurations(&'static [u32]),
}

static BUILDING_SEEDS: [BuildingSeed; 9] = [
    BuildingSeed {
        id: 1,
        name: BuildingName::TownHall,
        cost: ResourceGroup::new(200, 200, 150, 100),
        build_time_secs: 120,
        town_hall_requirements: &[],
        stat: None,
    },
    BuildingSeed {
        id: 2,
        name: BuildingName::Warehouse,
        cost: ResourceGroup::new(150, 130, 80, 40),
        build_time_secs: 90,
        town_hall_requirements: &[1, 1, 2, 2, 3, 3, 4, 4, 5, 5],
        stat: Some(SeedStat::Storage(5000)),
    },
    BuildingSeed {
        id: 3,
        name: BuildingName::Barracks,
        cost: ResourceGroup::new(210, 140, 260, 120),
        build_time_secs: 150,
        town_hall_requirements: &[1, 2, 2, 3, 3, 4, 4, 5, 5, 6],
        stat: Some(SeedStat::TroopCapacity(50)),
    },
    BuildingSeed {
        id: 4,
        name: BuildingName::Academy,
        cost: ResourceGroup::new(220, 160, 90, 40),
        build_time_secs: 180,
        town_hall_requirements: &[2, 2, 3, 3, 4, 4, 5, 5, 6, 6],
        stat: None,
    },
    BuildingSeed {
        id: 5,
        name: BuildingName::GrainMill,
        cost: ResourceGroup::new(120, 100, 80, 20),
        build_time_secs: 60,
        town_hall_requirements: &[1, 1, 2, 2, 3, 3, 4, 4, 5, 5],
        stat: Some(SeedStat::Production(ResourceKind::Crop, 100)),
    },
    BuildingSeed {
        id: 6,
        name: BuildingName::Brickyard,
        cost: ResourceGroup::new(100, 80, 70, 40),
        build_time_secs: 60,
        town_hall_requirements: &[1, 1, 2, 2, 3, 3, 4, 4, 5, 5],
        stat: Some(SeedStat::Production(ResourceKind::Clay, 100)),
    },
    BuildingSeed {
        id: 7,
        name: BuildingName::Sawmill,
        cost: ResourceGroup::new(80, 120, 70, 40),
        build_time_secs: 60,
        town_hall_requirements: &[1, 1, 2, 2, 3, 3, 4, 4, 5, 5],
        stat: Some(SeedStat::Production(ResourceKind::Wood, 100)),
    },
    BuildingSeed {
        id: 8,
        name: BuildingName::IronFoundry,
        cost: ResourceGroup::new(200, 150, 50, 60),
        build_time_secs: 75,
        town_hall_requirements: &[1, 2, 2, 3, 3, 4, 4, 5, 5, 6],
        stat: Some(SeedStat::Production(ResourceKind::Iron, 100)),
    },
    BuildingSeed {
        id: 9,
        name: BuildingName::ScoutingPost,
        cost: ResourceGroup::new(100, 100, 100, 50),
        build_time_secs: 100,
        town_hall_requirements: &[2, 2, 3, 3, 4, 4, 5, 5, 6, 6],
        stat: Some(SeedStat::ScoutingDurations(&[
            60, 55, 50, 45, 40, 36, 32, 28, 24, 20,
        ])),
    },
];

/// The built-in catalog, used when the backend can't provide one.
pub fn default_catalog() -> BuildingCatalog {
    let types = BUILDING_SEEDS
        .iter()
        .map(|seed| BuildingType {
            id: seed.id,
            name: seed.name,
            cost: seed.cost,
            build_time_secs: seed.build_time_secs,
            town_hall_requirements: seed.town_hall_requirements.to_vec(),
            max_level: DEFAULT_MAX_LEVEL,
            stat: seed.stat.as_ref().map(|s| match s {
                SeedStat::Storage(v) => BuildingStat::Storage(*v),
                SeedStat::TroopCapacity(v) => BuildingStat::TroopCapacity(*v),
                SeedStat::Production(resource, rate) => BuildingStat::Production {
                    resource: *resource,
                    rate: *rate,
                },
                SeedStat::ScoutingDurations(table) => BuildingStat::ScoutingDurations(table.to_vec()),
            }),
        })
        .collect();

    BuildingCatalog::new(types)
}
