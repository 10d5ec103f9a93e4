pub mod mapping;
pub mod uow;

mod connection;
mod models;
mod repository;
mod schema;

pub use connection::{DbPool, establish_connection_pool, establish_test_connection_pool};
pub use repository::*;
pub use schema::bootstrap_schema;
