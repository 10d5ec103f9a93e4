use serde::{Deserialize, Serialize};

use hamlet_types::{buildings::BuildingName, warriors::WarriorName};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingCompletedTask {
    pub building: BuildingName,
    pub level: u8,
}

/// Completes one unit; re-schedules itself while `quantity > 1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarriorTrainedTask {
    pub warrior: WarriorName,
    pub quantity: u32,
    pub time_per_unit_secs: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarriorLevelUpTask {
    pub warrior: WarriorName,
    pub level: u8,
}
