pub mod buildings;
pub mod common;
pub mod errors;
pub mod warriors;

pub use errors::Result;
