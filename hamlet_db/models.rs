use sqlx::FromRow;
use uuid::Uuid;

/// Timestamps are stored as milliseconds since the epoch.
#[derive(Debug, FromRow, Clone)]
pub struct Job {
    pub id: Uuid,
    pub player_id: Uuid,
    pub village_id: Uuid,
    pub task: String,
    pub status: String,
    pub completed_at: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, FromRow, Clone)]
pub struct SyncIntent {
    pub id: Uuid,
    pub player_id: Uuid,
    pub building: String,
    pub operation: String,
    pub request: String,
    pub status: String,
    pub attempts: i64,
    pub last_error: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, FromRow, Clone)]
pub struct KvEntry {
    pub key: String,
    pub value: String,
}
