use sqlx::{Sqlite, Transaction};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use hamlet_app::{repository::SyncIntentRepository, sync::SyncIntent};
use hamlet_types::errors::{ApplicationError, DbError};

use crate::{mapping::to_millis, models as db_models};

const INTENT_COLUMNS: &str = "id, player_id, building, operation, request, status, attempts, \
     last_error, created_at, updated_at";

#[derive(Clone)]
pub struct SqliteSyncIntentRepository<'a> {
    tx: Arc<Mutex<Transaction<'a, Sqlite>>>,
}

impl<'a> SqliteSyncIntentRepository<'a> {
    pub fn new(tx: Arc<Mutex<Transaction<'a, Sqlite>>>) -> Self {
        Self { tx }
    }

    async fn list_where(
        &self,
        player_id: Uuid,
        filter: &str,
    ) -> Result<Vec<SyncIntent>, ApplicationError> {
        let mut tx_guard = self.tx.lock().await;
        let rows = sqlx::query_as::<_, db_models::SyncIntent>(&format!(
            r#"
            SELECT {INTENT_COLUMNS} FROM sync_intents
            WHERE player_id = ? {filter}
            ORDER BY created_at ASC, rowid ASC
            "#
        ))
        .bind(player_id)
        .fetch_all(&mut *tx_guard.as_mut())
        .await
        .map_err(|e| ApplicationError::Db(DbError::Database(e)))?;

        rows.into_iter()
            .map(|row| SyncIntent::try_from(row).map_err(ApplicationError::Db))
            .collect()
    }
}

#[async_trait::async_trait]
impl<'a> SyncIntentRepository for SqliteSyncIntentRepository<'a> {
    async fn add(&self, intent: &SyncIntent) -> Result<(), ApplicationError> {
        let mut tx_guard = self.tx.lock().await;
        sqlx::query(&format!(
            "INSERT INTO sync_intents ({INTENT_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(intent.id)
        .bind(intent.player_id)
        .bind(intent.building.to_string())
        .bind(intent.operation.as_str())
        .bind(serde_json::to_string(&intent.request)?)
        .bind(intent.status.as_str())
        .bind(intent.attempts as i64)
        .bind(intent.last_error.as_deref())
        .bind(to_millis(intent.created_at))
        .bind(to_millis(intent.updated_at))
        .execute(&mut *tx_guard.as_mut())
        .await
        .map_err(|e| ApplicationError::Db(DbError::Database(e)))?;

        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<SyncIntent, ApplicationError> {
        let mut tx_guard = self.tx.lock().await;
        let row = sqlx::query_as::<_, db_models::SyncIntent>(&format!(
            "SELECT {INTENT_COLUMNS} FROM sync_intents WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&mut *tx_guard.as_mut())
        .await
        .map_err(|e| ApplicationError::Db(DbError::Database(e)))?
        .ok_or(ApplicationError::Db(DbError::SyncIntentNotFound(id)))?;

        Ok(row.try_into()?)
    }

    async fn list_by_player_id(
        &self,
        player_id: Uuid,
    ) -> Result<Vec<SyncIntent>, ApplicationError> {
        self.list_where(player_id, "").await
    }

    async fn list_unconfirmed(
        &self,
        player_id: Uuid,
    ) -> Result<Vec<SyncIntent>, ApplicationError> {
        self.list_where(player_id, "AND status IN ('Pending', 'Failed')")
            .await
    }

    async fn update(&self, intent: &SyncIntent) -> Result<(), ApplicationError> {
        let mut tx_guard = self.tx.lock().await;
        let result = sqlx::query(
            r#"
            UPDATE sync_intents
            SET status = ?, attempts = ?, last_error = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(intent.status.as_str())
        .bind(intent.attempts as i64)
        .bind(intent.last_error.as_deref())
        .bind(to_millis(intent.updated_at))
        .bind(intent.id)
        .execute(&mut *tx_guard.as_mut())
        .await
        .map_err(|e| ApplicationError::Db(DbError::Database(e)))?;

        if result.rows_affected() == 0 {
            return Err(ApplicationError::Db(DbError::SyncIntentNotFound(intent.id)));
        }
        Ok(())
    }
}
