use chrono::{DateTime, Utc};
use uuid::Uuid;

use hamlet_game::models::{
    buildings::{BuildingCatalog, BuildingStatus, DerivedValue},
    inbox::{MailMessage, Notification},
    player::PlayerStats,
    warriors::LevelUp,
};
use hamlet_types::{buildings::BuildingName, common::ResourceGroup, warriors::WarriorName};

use crate::{cqrs::Query, jobs::JobStatus, sync::SyncIntent};

/// The building catalog in use: the cached copy, else the built-in one.
pub struct GetBuildingCatalog {
    pub player_id: Uuid,
}

impl Query for GetBuildingCatalog {
    type Output = BuildingCatalog;
}

/// Every building slot of a village, catalog and derived data included.
pub struct GetVillageBuildings {
    pub player_id: Uuid,
    pub village_id: Uuid,
    pub now: DateTime<Utc>,
}

impl Query for GetVillageBuildings {
    type Output = Vec<BuildingView>;
}

pub struct FindBuildingByName {
    pub player_id: Uuid,
    pub name: BuildingName,
    pub now: DateTime<Utc>,
}

impl Query for FindBuildingByName {
    type Output = Option<BuildingView>;
}

pub struct GetVillageOverview {
    pub player_id: Uuid,
    pub now: DateTime<Utc>,
}

impl Query for GetVillageOverview {
    type Output = VillageOverview;
}

pub struct GetWarriorRoster {
    pub player_id: Uuid,
}

impl Query for GetWarriorRoster {
    type Output = Vec<WarriorView>;
}

pub struct GetNotifications {
    pub player_id: Uuid,
}

impl Query for GetNotifications {
    type Output = Vec<Notification>;
}

pub struct GetMail {
    pub player_id: Uuid,
}

impl Query for GetMail {
    type Output = Vec<MailMessage>;
}

/// Pending completions, soonest first.
pub struct GetJobQueue {
    pub player_id: Uuid,
}

impl Query for GetJobQueue {
    type Output = Vec<QueueItem>;
}

pub struct GetSyncIntents {
    pub player_id: Uuid,
}

impl Query for GetSyncIntents {
    type Output = Vec<SyncIntent>;
}

/// A building slot joined with its catalog entry and derived values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildingView {
    pub name: BuildingName,
    pub type_id: u32,
    pub level: u8,
    pub built: bool,
    pub location: Option<u32>,
    pub status: BuildingStatus,
    pub max_level: u8,
    /// Cost of the next build or upgrade, `None` at max level.
    pub next_cost: Option<ResourceGroup>,
    pub required_town_hall_level: u8,
    pub build_time_secs: u32,
    pub derived: Option<DerivedValue>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VillageOverview {
    pub village_id: Uuid,
    pub resources: ResourceGroup,
    /// Per hour.
    pub production: ResourceGroup,
    pub storage_capacity: u32,
    pub troop_capacity: u32,
    pub total_troops: u32,
    pub scouting_duration_secs: u32,
    pub town_hall_level: u8,
    pub academy_level: u8,
    pub stats: PlayerStats,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarriorView {
    pub name: WarriorName,
    pub level: u8,
    pub count: u32,
    pub queued: u32,
    pub attack: u32,
    pub defense: u32,
    pub speed: u32,
    pub training_cost: ResourceGroup,
    pub training_time_secs: u32,
    pub level_up: Option<LevelUp>,
    /// Academy level the next level-up needs.
    pub required_academy_level: u8,
    pub level_up_cost: ResourceGroup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueItemKind {
    Construction { building: BuildingName, level: u8 },
    Training { warrior: WarriorName, remaining: u32 },
    LevelUp { warrior: WarriorName, level: u8 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueItem {
    pub job_id: Uuid,
    pub kind: QueueItemKind,
    pub status: JobStatus,
    pub finishes_at: DateTime<Utc>,
}
