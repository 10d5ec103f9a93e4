use chrono::{DateTime, Utc};
use std::collections::HashMap;
use uuid::Uuid;

use hamlet_app::{
    jobs::{Job, JobPayload, JobStatus},
    sync::SyncIntent,
};
use hamlet_game::models::{
    buildings::{BuildingCatalog, BuildingInstance, default_catalog},
    ledger::ResourceLedger,
    player::PlayerStats,
    village::{ProductionClock, Village},
    warriors::{WarriorCatalog, WarriorRoster},
};
use hamlet_types::errors::DbError;

use crate::models as db_models;

/// Per-player keys of the key-value table.
pub mod keys {
    pub const RESOURCES: &str = "resources";
    pub const PRODUCTION: &str = "production";
    pub const STATS: &str = "stats";
    pub const NOTIFICATIONS: &str = "notifications";
    pub const MAIL: &str = "mail";
    pub const WARRIORS: &str = "warriors";
    pub const BUILDINGS: &str = "buildings";
    pub const BUILDING_TYPES: &str = "building_types";
}

pub fn to_millis(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

pub fn from_millis(ms: i64) -> Result<DateTime<Utc>, DbError> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| decode_error(format!("timestamp out of range: {ms}")))
}

fn decode_error(message: String) -> DbError {
    DbError::Database(sqlx::Error::Decode(message.into()))
}

impl TryFrom<db_models::Job> for Job {
    type Error = DbError;

    fn try_from(row: db_models::Job) -> Result<Self, Self::Error> {
        let task: JobPayload = serde_json::from_str(&row.task)?;
        let status: JobStatus = row.status.parse().map_err(decode_error)?;

        Ok(Job {
            id: row.id,
            player_id: row.player_id,
            village_id: row.village_id,
            task,
            status,
            completed_at: from_millis(row.completed_at)?,
            created_at: from_millis(row.created_at)?,
            updated_at: from_millis(row.updated_at)?,
        })
    }
}

impl TryFrom<db_models::SyncIntent> for SyncIntent {
    type Error = DbError;

    fn try_from(row: db_models::SyncIntent) -> Result<Self, Self::Error> {
        Ok(SyncIntent {
            id: row.id,
            player_id: row.player_id,
            building: row
                .building
                .parse()
                .map_err(|_| decode_error(format!("unknown building: {}", row.building)))?,
            operation: row.operation.parse().map_err(decode_error)?,
            request: serde_json::from_str(&row.request)?,
            status: row.status.parse().map_err(decode_error)?,
            attempts: row.attempts.max(0) as u32,
            last_error: row.last_error,
            created_at: from_millis(row.created_at)?,
            updated_at: from_millis(row.updated_at)?,
        })
    }
}

/// Rebuilds a village from its key-value entries. Without a `buildings` entry
/// the player has no village yet; any other missing key falls back to defaults.
pub fn village_from_entries(
    player_id: Uuid,
    entries: Vec<db_models::KvEntry>,
    now: DateTime<Utc>,
) -> Result<Option<Village>, DbError> {
    let values: HashMap<String, String> = entries.into_iter().map(|e| (e.key, e.value)).collect();

    let Some(buildings) = values.get(keys::BUILDINGS) else {
        return Ok(None);
    };
    let buildings: Vec<BuildingInstance> = serde_json::from_str(buildings)?;

    let catalog: BuildingCatalog = match values.get(keys::BUILDING_TYPES) {
        Some(v) => serde_json::from_str(v)?,
        None => default_catalog(),
    };
    let warrior_catalog = WarriorCatalog::default();
    let ledger: ResourceLedger = match values.get(keys::RESOURCES) {
        Some(v) => serde_json::from_str(v)?,
        None => ResourceLedger::default(),
    };
    let roster: WarriorRoster = match values.get(keys::WARRIORS) {
        Some(v) => serde_json::from_str(v)?,
        None => WarriorRoster::for_catalog(&warrior_catalog),
    };
    let stats: PlayerStats = match values.get(keys::STATS) {
        Some(v) => serde_json::from_str(v)?,
        None => PlayerStats::default(),
    };
    let production_clock: ProductionClock = match values.get(keys::PRODUCTION) {
        Some(v) => serde_json::from_str(v)?,
        None => ProductionClock::starting_at(now),
    };

    Ok(Some(Village::from_persistence(
        player_id,
        player_id,
        catalog,
        warrior_catalog,
        ledger,
        buildings,
        roster,
        stats,
        production_clock,
    )))
}
