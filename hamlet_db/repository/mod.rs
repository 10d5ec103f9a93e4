mod inbox_repository;
mod job_repository;
mod kv;
mod sync_intent_repository;
mod village_repository;

pub use inbox_repository::SqliteInboxRepository;
pub use job_repository::SqliteJobRepository;
pub use sync_intent_repository::SqliteSyncIntentRepository;
pub use village_repository::SqliteVillageRepository;
