mod find_building_by_name;
mod get_building_catalog;
mod get_job_queue;
mod get_mail;
mod get_notifications;
mod get_sync_intents;
mod get_village_buildings;
mod get_village_overview;
mod get_warrior_roster;
mod queue_converters;
mod views;

pub use find_building_by_name::FindBuildingByNameHandler;
pub use get_building_catalog::GetBuildingCatalogHandler;
pub use get_job_queue::GetJobQueueHandler;
pub use get_mail::GetMailHandler;
pub use get_notifications::GetNotificationsHandler;
pub use get_sync_intents::GetSyncIntentsHandler;
pub use get_village_buildings::GetVillageBuildingsHandler;
pub use get_village_overview::GetVillageOverviewHandler;
pub use get_warrior_roster::GetWarriorRosterHandler;
