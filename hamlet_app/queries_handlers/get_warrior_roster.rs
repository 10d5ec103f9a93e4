use hamlet_types::errors::ApplicationError;

use crate::{
    config::Config,
    cqrs::{
        QueryHandler,
        queries::{GetWarriorRoster, WarriorView},
    },
    queries_handlers::views::warrior_view,
    uow::UnitOfWork,
};

pub struct GetWarriorRosterHandler {}

impl GetWarriorRosterHandler {
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait::async_trait]
impl QueryHandler<GetWarriorRoster> for GetWarriorRosterHandler {
    async fn handle(
        &self,
        query: GetWarriorRoster,
        uow: &Box<dyn UnitOfWork<'_> + '_>,
        _config: &std::sync::Arc<Config>,
    ) -> Result<Vec<WarriorView>, ApplicationError> {
        let village = uow.villages().get_by_player_id(query.player_id).await?;

        Ok(village
            .roster()
            .warriors()
            .iter()
            .filter_map(|state| {
                village
                    .warrior_catalog()
                    .get(state.name)
                    .map(|t| warrior_view(t, state))
            })
            .collect())
    }
}
