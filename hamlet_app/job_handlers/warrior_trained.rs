use async_trait::async_trait;
use tracing::{info, instrument};

use hamlet_game::models::inbox::MailMessage;
use hamlet_types::errors::ApplicationError;

use crate::{
    job_handlers::helpers::load_job_village,
    jobs::{
        Job, JobPayload,
        handler::{JobHandler, JobHandlerContext},
        tasks::WarriorTrainedTask,
    },
};

pub struct WarriorTrainedJobHandler {
    payload: WarriorTrainedTask,
}

impl WarriorTrainedJobHandler {
    pub fn new(payload: WarriorTrainedTask) -> Self {
        Self { payload }
    }
}

#[async_trait]
impl JobHandler for WarriorTrainedJobHandler {
    #[instrument(skip_all, fields(
        task_type = "WarriorTrained",
        warrior = ?self.payload.warrior,
        quantity = self.payload.quantity,
        player_id = %job.player_id,
    ))]
    async fn handle<'ctx, 'a>(
        &'ctx self,
        ctx: &'ctx JobHandlerContext<'a>,
        job: &'ctx Job,
    ) -> Result<(), ApplicationError> {
        info!("Executing WarriorTrained job");

        let mut village = load_job_village(&ctx.uow, job).await?;
        village.accrue_production(job.completed_at);
        let count = village.complete_warrior_training(self.payload.warrior)?;
        ctx.uow.villages().save(&village).await?;

        if self.payload.quantity > 1 {
            let next_payload = WarriorTrainedTask {
                quantity: self.payload.quantity - 1,
                ..self.payload.clone()
            };
            let next_job = Job::new(
                job.player_id,
                job.village_id,
                job.completed_at,
                self.payload.time_per_unit_secs as i64,
                JobPayload::new("WarriorTrained", serde_json::to_value(&next_payload)?),
            );
            ctx.uow.jobs().add(&next_job).await?;
            info!(next_job_id = %next_job.id, "Queued next unit training job");
        } else {
            let mail = MailMessage::new(
                "Barracks",
                format!("{} training complete", self.payload.warrior),
                format!(
                    "The last {} left the training grounds. You now command {count} of them.",
                    self.payload.warrior
                ),
                job.completed_at,
            );
            ctx.uow.inbox().add_mail(job.player_id, &mail).await?;
        }

        Ok(())
    }
}
