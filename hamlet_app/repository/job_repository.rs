use chrono::{DateTime, Utc};
use uuid::Uuid;

use hamlet_types::errors::ApplicationError;

use crate::jobs::Job;

#[async_trait::async_trait]
pub trait JobRepository: Send + Sync {
    /// Stores a new pending job.
    async fn add(&self, job: &Job) -> Result<(), ApplicationError>;

    async fn get_by_id(&self, id: Uuid) -> Result<Job, ApplicationError>;

    /// Lists pending/processing jobs of a player, soonest first.
    async fn list_by_player_id(&self, player_id: Uuid) -> Result<Vec<Job>, ApplicationError>;

    /// Marks up to `limit` pending jobs due at `now` as "Processing" and returns
    /// them in due order.
    async fn find_and_lock_due_jobs(
        &self,
        now: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<Job>, ApplicationError>;

    /// Returns the player's "Processing" jobs to "Pending". Returns how many.
    async fn requeue_processing(&self, player_id: Uuid) -> Result<u64, ApplicationError>;

    async fn mark_as_completed(&self, job_id: Uuid) -> Result<(), ApplicationError>;

    async fn mark_as_failed(&self, job_id: Uuid, error_message: &str)
    -> Result<(), ApplicationError>;
}
