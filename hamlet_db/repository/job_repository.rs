use chrono::{DateTime, Utc};
use sqlx::{Sqlite, Transaction};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use hamlet_app::{jobs::Job, repository::JobRepository};
use hamlet_types::errors::{ApplicationError, DbError};

use crate::{mapping::to_millis, models as db_models};

const JOB_COLUMNS: &str =
    "id, player_id, village_id, task, status, completed_at, created_at, updated_at";

#[derive(Clone)]
pub struct SqliteJobRepository<'a> {
    tx: Arc<Mutex<Transaction<'a, Sqlite>>>,
}

impl<'a> SqliteJobRepository<'a> {
    pub fn new(tx: Arc<Mutex<Transaction<'a, Sqlite>>>) -> Self {
        Self { tx }
    }
}

fn into_jobs(rows: Vec<db_models::Job>) -> Result<Vec<Job>, ApplicationError> {
    rows.into_iter()
        .map(|row| Job::try_from(row).map_err(ApplicationError::Db))
        .collect()
}

#[async_trait::async_trait]
impl<'a> JobRepository for SqliteJobRepository<'a> {
    async fn add(&self, job: &Job) -> Result<(), ApplicationError> {
        let mut tx_guard = self.tx.lock().await;
        sqlx::query(
            r#"
            INSERT INTO jobs
                (id, player_id, village_id, task, status, completed_at, created_at, updated_at)
            VALUES (?, ?, ?, ?, 'Pending', ?, ?, ?)
            "#,
        )
        .bind(job.id)
        .bind(job.player_id)
        .bind(job.village_id)
        .bind(serde_json::to_string(&job.task)?)
        .bind(to_millis(job.completed_at))
        .bind(to_millis(job.created_at))
        .bind(to_millis(job.updated_at))
        .execute(&mut *tx_guard.as_mut())
        .await
        .map_err(|e| ApplicationError::Db(DbError::Database(e)))?;

        Ok(())
    }

    async fn get_by_id(&self, job_id: Uuid) -> Result<Job, ApplicationError> {
        let mut tx_guard = self.tx.lock().await;
        let row = sqlx::query_as::<_, db_models::Job>(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE id = ?"
        ))
        .bind(job_id)
        .fetch_optional(&mut *tx_guard.as_mut())
        .await
        .map_err(|e| ApplicationError::Db(DbError::Database(e)))?
        .ok_or(ApplicationError::Db(DbError::JobNotFound(job_id)))?;

        Ok(row.try_into()?)
    }

    async fn list_by_player_id(&self, player_id: Uuid) -> Result<Vec<Job>, ApplicationError> {
        let mut tx_guard = self.tx.lock().await;
        let rows = sqlx::query_as::<_, db_models::Job>(&format!(
            r#"
            SELECT {JOB_COLUMNS} FROM jobs
            WHERE player_id = ? AND status IN ('Pending', 'Processing')
            ORDER BY completed_at ASC
            "#
        ))
        .bind(player_id)
        .fetch_all(&mut *tx_guard.as_mut())
        .await
        .map_err(|e| ApplicationError::Db(DbError::Database(e)))?;

        into_jobs(rows)
    }

    async fn find_and_lock_due_jobs(
        &self,
        now: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<Job>, ApplicationError> {
        let mut tx_guard = self.tx.lock().await;
        let now_ms = to_millis(now);
        let rows = sqlx::query_as::<_, db_models::Job>(&format!(
            r#"
            UPDATE jobs
            SET status = 'Processing', updated_at = ?
            WHERE id IN (
                SELECT id FROM jobs
                WHERE status = 'Pending' AND completed_at <= ?
                ORDER BY completed_at ASC
                LIMIT ?
            )
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(now_ms)
        .bind(now_ms)
        .bind(limit)
        .fetch_all(&mut *tx_guard.as_mut())
        .await
        .map_err(|e| ApplicationError::Db(DbError::Database(e)))?;

        // RETURNING gives no ordering guarantee
        let mut jobs = into_jobs(rows)?;
        jobs.sort_by_key(|j| j.completed_at);
        Ok(jobs)
    }

    async fn requeue_processing(&self, player_id: Uuid) -> Result<u64, ApplicationError> {
        let mut tx_guard = self.tx.lock().await;
        let result = sqlx::query(
            r#"
            UPDATE jobs SET status = 'Pending', updated_at = ?
            WHERE player_id = ? AND status = 'Processing'
            "#,
        )
        .bind(to_millis(Utc::now()))
        .bind(player_id)
        .execute(&mut *tx_guard.as_mut())
        .await
        .map_err(|e| ApplicationError::Db(DbError::Database(e)))?;
        Ok(result.rows_affected())
    }

    async fn mark_as_completed(&self, job_id: Uuid) -> Result<(), ApplicationError> {
        let mut tx_guard = self.tx.lock().await;
        sqlx::query("UPDATE jobs SET status = 'Completed', updated_at = ? WHERE id = ?")
            .bind(to_millis(Utc::now()))
            .bind(job_id)
            .execute(&mut *tx_guard.as_mut())
            .await
            .map_err(|e| ApplicationError::Db(DbError::Database(e)))?;
        Ok(())
    }

    async fn mark_as_failed(
        &self,
        job_id: Uuid,
        error_message: &str,
    ) -> Result<(), ApplicationError> {
        let mut tx_guard = self.tx.lock().await;
        sqlx::query(
            "UPDATE jobs SET status = 'Failed', error_message = ?, updated_at = ? WHERE id = ?",
        )
        .bind(error_message)
        .bind(to_millis(Utc::now()))
        .bind(job_id)
        .execute(&mut *tx_guard.as_mut())
        .await
        .map_err(|e| ApplicationError::Db(DbError::Database(e)))?;
        Ok(())
    }
}
