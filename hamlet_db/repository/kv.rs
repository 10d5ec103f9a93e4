use chrono::Utc;
use serde::{Serialize, de::DeserializeOwned};
use sqlx::SqliteConnection;
use uuid::Uuid;

use hamlet_types::errors::DbError;

use crate::{mapping::to_millis, models as db_models};

pub async fn get_value<T: DeserializeOwned>(
    conn: &mut SqliteConnection,
    player_id: Uuid,
    key: &str,
) -> Result<Option<T>, DbError> {
    let value: Option<String> =
        sqlx::query_scalar("SELECT value FROM kv_store WHERE player_id = ? AND key = ?")
            .bind(player_id)
            .bind(key)
            .fetch_optional(&mut *conn)
            .await?;

    value
        .map(|v| serde_json::from_str(&v))
        .transpose()
        .map_err(DbError::from)
}

pub async fn get_all(
    conn: &mut SqliteConnection,
    player_id: Uuid,
) -> Result<Vec<db_models::KvEntry>, DbError> {
    Ok(sqlx::query_as::<_, db_models::KvEntry>(
        "SELECT key, value FROM kv_store WHERE player_id = ?",
    )
    .bind(player_id)
    .fetch_all(&mut *conn)
    .await?)
}

pub async fn put_value<T: Serialize + ?Sized>(
    conn: &mut SqliteConnection,
    player_id: Uuid,
    key: &str,
    value: &T,
) -> Result<(), DbError> {
    let value = serde_json::to_string(value)?;
    sqlx::query(
        r#"
        INSERT INTO kv_store (player_id, key, value, updated_at)
        VALUES (?, ?, ?, ?)
        ON CONFLICT (player_id, key)
        DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
        "#,
    )
    .bind(player_id)
    .bind(key)
    .bind(value)
    .bind(to_millis(Utc::now()))
    .execute(&mut *conn)
    .await?;

    Ok(())
}
