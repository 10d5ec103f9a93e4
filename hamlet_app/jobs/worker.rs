use chrono::{DateTime, Utc};
use std::{sync::Arc, time::Duration};
use tokio::{task::JoinHandle, time};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use hamlet_types::errors::ApplicationError;

use crate::{
    clock::Clock,
    config::Config,
    jobs::{
        Job,
        handler::{JobHandlerContext, JobRegistry},
    },
    uow::UnitOfWorkProvider,
};

/// Polls the scheduled-event table and runs due completions.
pub struct JobWorker {
    uow_provider: Arc<dyn UnitOfWorkProvider>,
    registry: Arc<dyn JobRegistry>,
    config: Arc<Config>,
    clock: Arc<dyn Clock>,
}

impl JobWorker {
    pub fn new(
        uow_provider: Arc<dyn UnitOfWorkProvider>,
        registry: Arc<dyn JobRegistry>,
        config: Arc<Config>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            uow_provider,
            registry,
            config,
            clock,
        }
    }

    /// Runs the polling loop inside a tokio task until the handle is aborted.
    pub fn run(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval =
                time::interval(Duration::from_millis(self.config.worker_interval_ms));
            info!(
                interval_ms = self.config.worker_interval_ms,
                "Job worker started"
            );

            loop {
                interval.tick().await;
                let now = self.clock.now();
                if let Err(e) = self.drain_due_jobs_at(now).await {
                    error!(error = %e, "Error while processing due jobs");
                }
            }
        })
    }

    /// Locks the jobs due at `now` and runs them in due order. Returns how many ran.
    pub async fn process_due_jobs_at(&self, now: DateTime<Utc>) -> Result<usize, ApplicationError> {
        let due_jobs = {
            let uow = self.uow_provider.begin().await?;
            // bound first: the repository handle must be gone before commit
            let locked = uow
                .jobs()
                .find_and_lock_due_jobs(now, self.config.max_jobs_per_tick)
                .await;
            match locked {
                Ok(jobs) => {
                    uow.commit().await?;
                    jobs
                }
                Err(e) => {
                    uow.rollback().await?;
                    return Err(e);
                }
            }
        };

        if due_jobs.is_empty() {
            return Ok(0);
        }
        info!(count = due_jobs.len(), "Found due jobs");

        self.process_jobs(&due_jobs).await?;
        Ok(due_jobs.len())
    }

    /// Keeps running passes at `now` until nothing is due. Jobs that queue a
    /// follow-up already due (training batches) complete in the same call.
    pub async fn drain_due_jobs_at(&self, now: DateTime<Utc>) -> Result<usize, ApplicationError> {
        let mut total = 0;
        loop {
            let ran = self.process_due_jobs_at(now).await?;
            if ran == 0 {
                return Ok(total);
            }
            total += ran;
        }
    }

    /// Puts the player's `Processing` jobs back to `Pending`. A pass cut short
    /// by a logout or a crash leaves them locked otherwise.
    pub async fn requeue_interrupted(&self, player_id: Uuid) -> Result<u64, ApplicationError> {
        let uow = self.uow_provider.begin().await?;
        let requeued = uow.jobs().requeue_processing(player_id).await;
        match requeued {
            Ok(count) => {
                uow.commit().await?;
                if count > 0 {
                    warn!(player_id = %player_id, count, "Requeued interrupted jobs");
                }
                Ok(count)
            }
            Err(e) => {
                uow.rollback().await?;
                Err(e)
            }
        }
    }

    /// Runs each job in its own transaction. A failing job is marked as failed
    /// and doesn't stop the others.
    pub async fn process_jobs(&self, jobs: &[Job]) -> Result<(), ApplicationError> {
        for job in jobs {
            if let Err(e) = self.run_job(job).await {
                error!(
                    job_id = %job.id,
                    task_type = %job.task.task_type,
                    error = %e,
                    "Job has failed"
                );
                let uow = self.uow_provider.begin().await?;
                uow.jobs().mark_as_failed(job.id, &e.to_string()).await?;
                uow.commit().await?;
            }
        }
        Ok(())
    }

    #[instrument(skip_all, fields(job_id = %job.id))]
    async fn run_job(&self, job: &Job) -> Result<(), ApplicationError> {
        let handler = self
            .registry
            .get_handler(&job.task.task_type, &job.task.data)?;

        let ctx = JobHandlerContext {
            uow: self.uow_provider.begin().await?,
            config: self.config.clone(),
        };

        let result = match handler.handle(&ctx, job).await {
            Ok(()) => ctx.uow.jobs().mark_as_completed(job.id).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => ctx.uow.commit().await,
            Err(e) => {
                ctx.uow.rollback().await?;
                Err(e)
            }
        }
    }
}
