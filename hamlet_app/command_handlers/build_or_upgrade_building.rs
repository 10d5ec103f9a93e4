use std::sync::Arc;
use tracing::info;

use hamlet_types::errors::ApplicationError;

use crate::{
    config::Config,
    cqrs::{CommandHandler, commands::BuildOrUpgradeBuilding},
    jobs::{Job, JobPayload, tasks::BuildingCompletedTask},
    remote::BuildingRequest,
    sync::{SyncIntent, SyncOperation},
    uow::UnitOfWork,
};

pub struct BuildOrUpgradeBuildingCommandHandler {}

impl BuildOrUpgradeBuildingCommandHandler {
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait::async_trait]
impl CommandHandler<BuildOrUpgradeBuilding> for BuildOrUpgradeBuildingCommandHandler {
    async fn handle(
        &self,
        command: BuildOrUpgradeBuilding,
        uow: &Box<dyn UnitOfWork<'_> + '_>,
        _config: &Arc<Config>,
    ) -> Result<(), ApplicationError> {
        let village_repo = uow.villages();
        let mut village = village_repo.get_by_player_id(command.player_id).await?;

        village.accrue_production(command.requested_at);
        let order = village.init_building_construction(
            command.building,
            command.location,
            command.requested_at,
        )?;
        village_repo.save(&village).await?;

        let payload = BuildingCompletedTask {
            building: order.name,
            level: order.target_level,
        };
        let job = Job::with_deadline(
            command.player_id,
            village.id,
            JobPayload::new("BuildingCompleted", serde_json::to_value(&payload)?),
            command.requested_at,
            order.finish_time,
        );
        uow.jobs().add(&job).await?;

        let operation = if order.is_upgrade {
            SyncOperation::Upgrade
        } else {
            SyncOperation::Build
        };
        let intent = SyncIntent::new(
            command.player_id,
            order.name,
            operation,
            BuildingRequest {
                user_id: command.player_id,
                building_type_id: order.building_type_id,
                location: order.location,
                level: order.target_level,
            },
            command.requested_at,
        );
        uow.sync_intents().add(&intent).await?;

        info!(
            building = %order.name,
            level = order.target_level,
            finish_time = %order.finish_time,
            "Construction started"
        );
        Ok(())
    }
}
