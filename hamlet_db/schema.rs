use sqlx::SqlitePool;
use tracing::debug;

use hamlet_types::errors::DbError;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS kv_store (
        player_id BLOB NOT NULL,
        key TEXT NOT NULL,
        value TEXT NOT NULL,
        updated_at INTEGER NOT NULL,
        PRIMARY KEY (player_id, key)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS jobs (
        id BLOB PRIMARY KEY,
        player_id BLOB NOT NULL,
        village_id BLOB NOT NULL,
        task TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'Pending',
        error_message TEXT,
        completed_at INTEGER NOT NULL,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_jobs_status_completed_at ON jobs (status, completed_at)",
    "CREATE INDEX IF NOT EXISTS idx_jobs_player_id ON jobs (player_id)",
    r#"
    CREATE TABLE IF NOT EXISTS sync_intents (
        id BLOB PRIMARY KEY,
        player_id BLOB NOT NULL,
        building TEXT NOT NULL,
        operation TEXT NOT NULL,
        request TEXT NOT NULL,
        status TEXT NOT NULL,
        attempts INTEGER NOT NULL DEFAULT 0,
        last_error TEXT,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_sync_intents_player_id ON sync_intents (player_id, status)",
];

/// Creates the tables the local store needs. Safe to run on every start.
pub async fn bootstrap_schema(pool: &SqlitePool) -> Result<(), DbError> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    debug!("Local schema ready");
    Ok(())
}
