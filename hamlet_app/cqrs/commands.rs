use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use uuid::Uuid;

use hamlet_game::models::buildings::{BuildingCatalog, BuildingInstance};
use hamlet_types::{buildings::BuildingName, warriors::WarriorName};

use crate::cqrs::Command;

/// Loads or creates the player's village and merges the remote state into it.
#[derive(Debug, Clone)]
pub struct InitializeVillage {
    pub player_id: Uuid,
    pub catalog: BuildingCatalog,
    pub remote_buildings: Vec<BuildingInstance>,
    pub now: DateTime<Utc>,
}

impl Command for InitializeVillage {}

/// Builds the building when unbuilt, upgrades it otherwise.
#[derive(Debug, Clone)]
pub struct BuildOrUpgradeBuilding {
    pub player_id: Uuid,
    pub building: BuildingName,
    pub location: Option<u32>,
    pub requested_at: DateTime<Utc>,
}

impl Command for BuildOrUpgradeBuilding {}

#[derive(Debug, Clone)]
pub struct TrainWarriors {
    pub player_id: Uuid,
    pub selections: BTreeMap<WarriorName, u32>,
    pub requested_at: DateTime<Utc>,
}

impl Command for TrainWarriors {}

#[derive(Debug, Clone)]
pub struct LevelUpWarrior {
    pub player_id: Uuid,
    pub warrior: WarriorName,
    pub requested_at: DateTime<Utc>,
}

impl Command for LevelUpWarrior {}

#[derive(Debug, Clone)]
pub struct MarkNotificationRead {
    pub player_id: Uuid,
    pub notification_id: Uuid,
}

impl Command for MarkNotificationRead {}

#[derive(Debug, Clone)]
pub struct MarkMailRead {
    pub player_id: Uuid,
    pub mail_id: Uuid,
}

impl Command for MarkMailRead {}
