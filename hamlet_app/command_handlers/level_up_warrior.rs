use std::sync::Arc;
use tracing::info;

use hamlet_types::errors::ApplicationError;

use crate::{
    config::Config,
    cqrs::{CommandHandler, commands::LevelUpWarrior},
    jobs::{Job, JobPayload, tasks::WarriorLevelUpTask},
    uow::UnitOfWork,
};

pub struct LevelUpWarriorCommandHandler {}

impl LevelUpWarriorCommandHandler {
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait::async_trait]
impl CommandHandler<LevelUpWarrior> for LevelUpWarriorCommandHandler {
    async fn handle(
        &self,
        command: LevelUpWarrior,
        uow: &Box<dyn UnitOfWork<'_> + '_>,
        _config: &Arc<Config>,
    ) -> Result<(), ApplicationError> {
        let village_repo = uow.villages();
        let mut village = village_repo.get_by_player_id(command.player_id).await?;

        village.accrue_production(command.requested_at);
        let order = village.init_warrior_level_up(command.warrior, command.requested_at)?;
        village_repo.save(&village).await?;

        let payload = WarriorLevelUpTask {
            warrior: order.name,
            level: order.target_level,
        };
        let job = Job::with_deadline(
            command.player_id,
            village.id,
            JobPayload::new("WarriorLevelUp", serde_json::to_value(&payload)?),
            command.requested_at,
            order.finish_time,
        );
        uow.jobs().add(&job).await?;

        info!(warrior = %order.name, level = order.target_level, "Level-up started");
        Ok(())
    }
}
