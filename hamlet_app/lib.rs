pub mod app;
pub mod clock;
pub mod command_handlers;
pub mod config;
pub mod cqrs;
pub mod job_handlers;
pub mod job_registry;
pub mod jobs;
pub mod queries_handlers;
pub mod remote;
pub mod repository;
pub mod session;
pub mod sync;
pub mod uow;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
