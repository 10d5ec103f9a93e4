mod inbox_repository;
mod job_repository;
mod sync_intent_repository;
mod village_repository;

pub use inbox_repository::InboxRepository;
pub use job_repository::JobRepository;
pub use sync_intent_repository::SyncIntentRepository;
pub use village_repository::VillageRepository;
