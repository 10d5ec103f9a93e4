use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::{str::FromStr, time::Duration};

use hamlet_types::errors::DbError;

use crate::schema::bootstrap_schema;

pub type DbPool = SqlitePool;

/// Opens (creating it if needed) the local store at `database_url` and makes
/// sure the schema exists.
pub async fn establish_connection_pool(database_url: &str) -> Result<DbPool, DbError> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .busy_timeout(Duration::from_secs(5));

    // SQLite has a single writer: one connection keeps transactions from
    // tripping over each other's locks.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    bootstrap_schema(&pool).await?;
    Ok(pool)
}

/// A private in-memory database, alive as long as the pool.
pub async fn establish_test_connection_pool() -> Result<DbPool, DbError> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;

    bootstrap_schema(&pool).await?;
    Ok(pool)
}
