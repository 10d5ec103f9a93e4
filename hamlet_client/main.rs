use clap::Parser;
use std::sync::Arc;

use hamlet_app::{
    clock::SystemClock, config::Config, job_registry::AppJobRegistry, session::SessionDeps,
};
use hamlet_db::{establish_connection_pool, uow::SqliteUnitOfWorkProvider};
use hamlet_remote::HttpBuildingsApi;
use hamlet_types::{Result, errors::ApplicationError};

mod cli;
mod logs;

use cli::Cli;
use logs::setup_logging;

#[tokio::main]
#[cfg(not(tarpaulin_include))]
async fn main() -> Result<(), ApplicationError> {
    setup_logging();
    let args = Cli::parse();
    let deps = setup_deps().await?;

    cli::run(args, deps).await
}

async fn setup_deps() -> Result<SessionDeps, ApplicationError> {
    let config = Arc::new(Config::from_env());
    let pool = establish_connection_pool(&config.database_url).await?;
    tracing::debug!(database_url = %config.database_url, "Local store ready");

    let uow_provider = Arc::new(SqliteUnitOfWorkProvider::new(pool));
    let api = Arc::new(HttpBuildingsApi::new(&config)?);

    Ok(SessionDeps {
        config,
        uow_provider,
        api,
        registry: Arc::new(AppJobRegistry::new()),
        clock: Arc::new(SystemClock),
    })
}
