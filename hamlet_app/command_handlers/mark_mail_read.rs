use std::sync::Arc;

use hamlet_types::errors::ApplicationError;

use crate::{
    config::Config,
    cqrs::{CommandHandler, commands::MarkMailRead},
    uow::UnitOfWork,
};

pub struct MarkMailReadCommandHandler {}

impl MarkMailReadCommandHandler {
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait::async_trait]
impl CommandHandler<MarkMailRead> for MarkMailReadCommandHandler {
    async fn handle(
        &self,
        command: MarkMailRead,
        uow: &Box<dyn UnitOfWork<'_> + '_>,
        _config: &Arc<Config>,
    ) -> Result<(), ApplicationError> {
        uow.inbox()
            .mark_mail_read(command.player_id, command.mail_id)
            .await
    }
}
