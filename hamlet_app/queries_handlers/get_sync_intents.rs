use hamlet_types::errors::ApplicationError;

use crate::{
    config::Config,
    cqrs::{QueryHandler, queries::GetSyncIntents},
    sync::SyncIntent,
    uow::UnitOfWork,
};

pub struct GetSyncIntentsHandler {}

impl GetSyncIntentsHandler {
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait::async_trait]
impl QueryHandler<GetSyncIntents> for GetSyncIntentsHandler {
    async fn handle(
        &self,
        query: GetSyncIntents,
        uow: &Box<dyn UnitOfWork<'_> + '_>,
        _config: &std::sync::Arc<Config>,
    ) -> Result<Vec<SyncIntent>, ApplicationError> {
        uow.sync_intents().list_by_player_id(query.player_id).await
    }
}
