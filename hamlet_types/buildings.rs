use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, PartialOrd, Ord, Deserialize, Serialize)]
pub enum BuildingName {
    TownHall,
    Warehouse,
    Barracks,
    Academy,
    GrainMill,
    Brickyard,
    Sawmill,
    IronFoundry,
    ScoutingPost,
}

impl BuildingName {
    pub const ALL: [BuildingName; 9] = [
        BuildingName::TownHall,
        BuildingName::Warehouse,
        BuildingName::Barracks,
        BuildingName::Academy,
        BuildingName::GrainMill,
        BuildingName::Brickyard,
        BuildingName::Sawmill,
        BuildingName::IronFoundry,
        BuildingName::ScoutingPost,
    ];
}

impl fmt::Display for BuildingName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BuildingName::TownHall => "Town Hall",
            BuildingName::Warehouse => "Warehouse",
            BuildingName::Barracks => "Barracks",
            BuildingName::Academy => "Academy",
            BuildingName::GrainMill => "Grain Mill",
            BuildingName::Brickyard => "Brickyard",
            BuildingName::Sawmill => "Sawmill",
            BuildingName::IronFoundry => "Iron Foundry",
            BuildingName::ScoutingPost => "Scouting Post",
        };

        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownBuildingName(pub String);

impl fmt::Display for UnknownBuildingName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown building name '{}'", self.0)
    }
}

impl std::error::Error for UnknownBuildingName {}

/// Accepts display names ("Town Hall") as well as identifiers ("TownHall", "town_hall").
impl FromStr for BuildingName {
    type Err = UnknownBuildingName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();

        BuildingName::ALL
            .into_iter()
            .find(|name| {
                let candidate: String = name
                    .to_string()
                    .chars()
                    .filter(|c| c.is_ascii_alphanumeric())
                    .map(|c| c.to_ascii_lowercase())
                    .collect();
                candidate == normalized
            })
            .ok_or_else(|| UnknownBuildingName(s.to_string()))
    }
}
