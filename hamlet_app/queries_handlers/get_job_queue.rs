use hamlet_types::errors::ApplicationError;

use crate::{
    config::Config,
    cqrs::{
        QueryHandler,
        queries::{GetJobQueue, QueueItem},
    },
    queries_handlers::queue_converters::queue_item_from_job,
    uow::UnitOfWork,
};

pub struct GetJobQueueHandler {}

impl GetJobQueueHandler {
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait::async_trait]
impl QueryHandler<GetJobQueue> for GetJobQueueHandler {
    async fn handle(
        &self,
        query: GetJobQueue,
        uow: &Box<dyn UnitOfWork<'_> + '_>,
        _config: &std::sync::Arc<Config>,
    ) -> Result<Vec<QueueItem>, ApplicationError> {
        let jobs = uow.jobs().list_by_player_id(query.player_id).await?;

        let mut entries: Vec<QueueItem> = jobs.iter().filter_map(queue_item_from_job).collect();
        entries.sort_by_key(|item| item.finishes_at);
        Ok(entries)
    }
}
