use std::sync::Arc;

use hamlet_types::errors::ApplicationError;

use crate::{
    config::Config,
    cqrs::{CommandHandler, commands::MarkNotificationRead},
    uow::UnitOfWork,
};

pub struct MarkNotificationReadCommandHandler {}

impl MarkNotificationReadCommandHandler {
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait::async_trait]
impl CommandHandler<MarkNotificationRead> for MarkNotificationReadCommandHandler {
    async fn handle(
        &self,
        command: MarkNotificationRead,
        uow: &Box<dyn UnitOfWork<'_> + '_>,
        _config: &Arc<Config>,
    ) -> Result<(), ApplicationError> {
        uow.inbox()
            .mark_notification_read(command.player_id, command.notification_id)
            .await
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use hamlet_game::models::inbox::Notification;
    use hamlet_types::{Result, errors::DbError};

    use super::*;
    use crate::test_utils::tests::MockUnitOfWork;

    #[tokio::test]
    async fn test_mark_notification_read() -> Result<()> {
        let uow: Box<dyn UnitOfWork<'_> + '_> = Box::new(MockUnitOfWork::new());
        let player_id = Uuid::new_v4();
        let notification = Notification::info("Building Completed", "Sawmill reached level 1", Utc::now());
        uow.inbox().add_notification(player_id, &notification).await?;

        let handler = MarkNotificationReadCommandHandler::new();
        handler
            .handle(
                MarkNotificationRead {
                    player_id,
                    notification_id: notification.id,
                },
                &uow,
                &Arc::new(Config::from_env()),
            )
            .await?;

        let list = uow.inbox().list_notifications(player_id).await?;
        assert!(list[0].read);

        let missing = Uuid::new_v4();
        let result = handler
            .handle(
                MarkNotificationRead {
                    player_id,
                    notification_id: missing,
                },
                &uow,
                &Arc::new(Config::from_env()),
            )
            .await;
        assert!(matches!(
            result,
            Err(ApplicationError::Db(DbError::NotificationNotFound(id))) if id == missing
        ));
        Ok(())
    }
}
