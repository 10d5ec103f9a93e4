use async_trait::async_trait;
use tracing::{info, instrument};

use hamlet_game::models::inbox::Notification;
use hamlet_types::errors::ApplicationError;

use crate::{
    job_handlers::helpers::load_job_village,
    jobs::{
        Job,
        handler::{JobHandler, JobHandlerContext},
        tasks::BuildingCompletedTask,
    },
};

pub struct BuildingCompletedJobHandler {
    payload: BuildingCompletedTask,
}

impl BuildingCompletedJobHandler {
    pub fn new(payload: BuildingCompletedTask) -> Self {
        Self { payload }
    }
}

#[async_trait]
impl JobHandler for BuildingCompletedJobHandler {
    #[instrument(skip_all, fields(
        task_type = "BuildingCompleted",
        building = ?self.payload.building,
        level = self.payload.level,
        player_id = %job.player_id,
    ))]
    async fn handle<'ctx, 'a>(
        &'ctx self,
        ctx: &'ctx JobHandlerContext<'a>,
        job: &'ctx Job,
    ) -> Result<(), ApplicationError> {
        info!("Executing BuildingCompleted job");

        let mut village = load_job_village(&ctx.uow, job).await?;
        village.accrue_production(job.completed_at);
        let completed = village.complete_construction(self.payload.building)?;
        ctx.uow.villages().save(&village).await?;

        let inbox = ctx.uow.inbox();
        inbox
            .add_notification(
                job.player_id,
                &Notification::info(
                    "Building Completed",
                    format!(
                        "{} reached level {} (+{} XP)",
                        completed.name, completed.level, completed.experience
                    ),
                    job.completed_at,
                ),
            )
            .await?;

        if completed.player_levels_gained > 0 {
            let level = village.player_stats().level;
            info!(level, "Player leveled up");
            inbox
                .add_notification(
                    job.player_id,
                    &Notification::info(
                        "Level Up",
                        format!("You reached level {level}"),
                        job.completed_at,
                    ),
                )
                .await?;
        }

        Ok(())
    }
}
