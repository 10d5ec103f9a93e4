use chrono::{DateTime, Utc};
use rand::Rng;
use uuid::Uuid;

use hamlet_types::{buildings::BuildingName, common::ResourceGroup};

use super::models::{
    buildings::{BuildingCatalog, BuildingType, default_catalog},
    inbox::MailMessage,
    village::Village,
    warriors::{WarriorCatalog, default_warrior_catalog},
};

#[derive(Default, Clone)]
pub struct VillageFactoryOptions {
    pub player_id: Option<Uuid>,
    pub catalog: Option<BuildingCatalog>,
    pub warrior_catalog: Option<WarriorCatalog>,
    pub resources: Option<ResourceGroup>,
    /// Buildings set as built at the given level.
    pub building_levels: Vec<(BuildingName, u8)>,
    pub now: Option<DateTime<Utc>>,
}

#[derive(Default, Clone)]
pub struct CatalogFactoryOptions {
    /// Replaces entries of the default catalog by name.
    pub overrides: Vec<BuildingType>,
    /// Drops entries from the default catalog.
    pub without: Vec<BuildingName>,
}

#[derive(Default, Clone)]
pub struct MailFactoryOptions {
    pub from: Option<String>,
    pub subject: Option<String>,
    pub received_at: Option<DateTime<Utc>>,
}

pub fn village_factory(options: VillageFactoryOptions) -> Village {
    let player_id = options.player_id.unwrap_or_else(Uuid::new_v4);
    let mut village = Village::new(
        player_id,
        options.catalog.unwrap_or_else(default_catalog),
        options
            .warrior_catalog
            .unwrap_or_else(default_warrior_catalog),
        options.now.unwrap_or_else(Utc::now),
    );

    for (name, level) in options.building_levels {
        village.set_building_level_for_test(name, level);
    }
    if let Some(resources) = options.resources {
        village.set_resources_for_test(resources);
    }

    village
}

pub fn catalog_factory(options: CatalogFactoryOptions) -> BuildingCatalog {
    let mut types: Vec<BuildingType> = default_catalog()
        .types()
        .iter()
        .filter(|t| !options.without.contains(&t.name))
        .filter(|t| !options.overrides.iter().any(|o| o.name == t.name))
        .cloned()
        .collect();
    types.extend(options.overrides);
    BuildingCatalog::new(types)
}

pub fn mail_factory(options: MailFactoryOptions) -> MailMessage {
    let n = rand::thread_rng().r#gen::<u16>();
    MailMessage::new(
        options.from.unwrap_or_else(|| format!("scout_{n}")),
        options
            .subject
            .unwrap_or_else(|| format!("Report #{n}")),
        "All quiet at the border.",
        options.received_at.unwrap_or_else(Utc::now),
    )
}
