use std::sync::Arc;
use tracing::info;

use hamlet_types::errors::ApplicationError;

use crate::{
    config::Config,
    cqrs::{CommandHandler, commands::TrainWarriors},
    jobs::{Job, JobPayload, tasks::WarriorTrainedTask},
    uow::UnitOfWork,
};

pub struct TrainWarriorsCommandHandler {}

impl TrainWarriorsCommandHandler {
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait::async_trait]
impl CommandHandler<TrainWarriors> for TrainWarriorsCommandHandler {
    async fn handle(
        &self,
        command: TrainWarriors,
        uow: &Box<dyn UnitOfWork<'_> + '_>,
        _config: &Arc<Config>,
    ) -> Result<(), ApplicationError> {
        let village_repo = uow.villages();
        let job_repo = uow.jobs();
        let mut village = village_repo.get_by_player_id(command.player_id).await?;

        village.accrue_production(command.requested_at);
        let orders = village.init_warrior_training(&command.selections)?;
        village_repo.save(&village).await?;

        for order in orders {
            let payload = WarriorTrainedTask {
                warrior: order.name,
                quantity: order.quantity,
                time_per_unit_secs: order.time_per_unit_secs,
            };
            // Schedule the *first* unit, each completion queues the next one.
            let job = Job::new(
                command.player_id,
                village.id,
                command.requested_at,
                order.time_per_unit_secs as i64,
                JobPayload::new("WarriorTrained", serde_json::to_value(&payload)?),
            );
            job_repo.add(&job).await?;

            info!(warrior = %order.name, quantity = order.quantity, cost = %order.cost, "Training queued");
        }

        Ok(())
    }
}
