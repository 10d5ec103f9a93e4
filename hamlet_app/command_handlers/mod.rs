mod build_or_upgrade_building;
mod initialize_village;
mod level_up_warrior;
mod mark_mail_read;
mod mark_notification_read;
mod train_warriors;

pub use build_or_upgrade_building::BuildOrUpgradeBuildingCommandHandler;
pub use initialize_village::InitializeVillageCommandHandler;
pub use level_up_warrior::LevelUpWarriorCommandHandler;
pub use mark_mail_read::MarkMailReadCommandHandler;
pub use mark_notification_read::MarkNotificationReadCommandHandler;
pub use train_warriors::TrainWarriorsCommandHandler;
