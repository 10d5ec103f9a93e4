use async_trait::async_trait;
use tracing::{info, instrument};

use hamlet_game::models::inbox::Notification;
use hamlet_types::errors::ApplicationError;

use crate::{
    job_handlers::helpers::load_job_village,
    jobs::{
        Job,
        handler::{JobHandler, JobHandlerContext},
        tasks::WarriorLevelUpTask,
    },
};

pub struct WarriorLevelUpJobHandler {
    payload: WarriorLevelUpTask,
}

impl WarriorLevelUpJobHandler {
    pub fn new(payload: WarriorLevelUpTask) -> Self {
        Self { payload }
    }
}

#[async_trait]
impl JobHandler for WarriorLevelUpJobHandler {
    #[instrument(skip_all, fields(
        task_type = "WarriorLevelUp",
        warrior = ?self.payload.warrior,
        level = self.payload.level,
        player_id = %job.player_id,
    ))]
    async fn handle<'ctx, 'a>(
        &'ctx self,
        ctx: &'ctx JobHandlerContext<'a>,
        job: &'ctx Job,
    ) -> Result<(), ApplicationError> {
        info!("Executing WarriorLevelUp job");

        let mut village = load_job_village(&ctx.uow, job).await?;
        village.accrue_production(job.completed_at);
        let level = village.complete_warrior_level_up(self.payload.warrior)?;
        ctx.uow.villages().save(&village).await?;

        ctx.uow
            .inbox()
            .add_notification(
                job.player_id,
                &Notification::info(
                    "Warrior Upgraded",
                    format!("{} reached level {level}", self.payload.warrior),
                    job.completed_at,
                ),
            )
            .await?;

        Ok(())
    }
}
