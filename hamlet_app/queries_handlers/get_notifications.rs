use hamlet_game::models::inbox::Notification;
use hamlet_types::errors::ApplicationError;

use crate::{
    config::Config,
    cqrs::{QueryHandler, queries::GetNotifications},
    uow::UnitOfWork,
};

pub struct GetNotificationsHandler {}

impl GetNotificationsHandler {
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait::async_trait]
impl QueryHandler<GetNotifications> for GetNotificationsHandler {
    async fn handle(
        &self,
        query: GetNotifications,
        uow: &Box<dyn UnitOfWork<'_> + '_>,
        _config: &std::sync::Arc<Config>,
    ) -> Result<Vec<Notification>, ApplicationError> {
        uow.inbox().list_notifications(query.player_id).await
    }
}
