use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use hamlet_types::errors::ApplicationError;

use crate::{config::Config, jobs::Job, uow::UnitOfWork};

/// Context which contains JobHandler dependencies.
pub struct JobHandlerContext<'a> {
    pub uow: Box<dyn UnitOfWork<'a> + 'a>,
    pub config: Arc<Config>,
}

#[async_trait]
pub trait JobHandler: Send + Sync {
    async fn handle<'ctx, 'a>(
        &'ctx self,
        ctx: &'ctx JobHandlerContext<'a>,
        job: &'ctx Job,
    ) -> Result<(), ApplicationError>;
}

/// Maps a task type and its JSON data to the handler that completes it.
pub trait JobRegistry: Send + Sync {
    fn get_handler(
        &self,
        task_type: &str,
        data: &Value,
    ) -> Result<Box<dyn JobHandler>, ApplicationError>;
}
