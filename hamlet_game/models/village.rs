use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hamlet_types::{
    buildings::BuildingName,
    common::{ResourceGroup, ResourceKind},
    errors::GameError,
    warriors::WarriorName,
};

use super::{
    buildings::{
        BuildingCatalog, BuildingInstance, Construction, DEFAULT_SCOUTING_DURATION_SECS,
        DerivedValue, merge_instances,
    },
    ledger::ResourceLedger,
    player::{CONSTRUCTION_XP_PER_LEVEL, PlayerStats},
    warriors::{LevelUp, WarriorCatalog, WarriorRoster},
};

/// Storage capacity of a village without a Warehouse.
pub const DEFAULT_STORAGE_CAPACITY: u32 = 800;

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Values computed from the built buildings. Never persisted, always
/// recomputed after a level change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VillageStats {
    /// Units per hour, per resource.
    pub production: ResourceGroup,
    pub storage_capacity: u32,
    pub troop_capacity: u32,
    pub scouting_duration_secs: u32,
}

impl Default for VillageStats {
    fn default() -> Self {
        Self {
            production: ResourceGroup::zero(),
            storage_capacity: DEFAULT_STORAGE_CAPACITY,
            troop_capacity: 0,
            scouting_duration_secs: DEFAULT_SCOUTING_DURATION_SECS,
        }
    }
}

/// When production was last credited, with the fractional units not yet paid out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProductionClock {
    pub updated_at: DateTime<Utc>,
    pub carry: [f64; 4],
}

impl ProductionClock {
    pub fn starting_at(now: DateTime<Utc>) -> Self {
        Self {
            updated_at: now,
            carry: [0.0; 4],
        }
    }
}

/// A construction accepted by the village, to be scheduled for completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructionOrder {
    pub name: BuildingName,
    pub building_type_id: u32,
    pub target_level: u8,
    pub is_upgrade: bool,
    pub location: Option<u32>,
    pub cost: ResourceGroup,
    pub build_time_secs: u32,
    pub finish_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstructionCompleted {
    pub name: BuildingName,
    pub level: u8,
    pub experience: u32,
    pub player_levels_gained: u32,
}

/// Units of one type paid for and queued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingOrder {
    pub name: WarriorName,
    pub quantity: u32,
    pub time_per_unit_secs: u32,
    pub cost: ResourceGroup,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelUpOrder {
    pub name: WarriorName,
    pub target_level: u8,
    pub cost: ResourceGroup,
    pub duration_secs: u32,
    pub finish_time: DateTime<Utc>,
}

/// The player's village: resources, building slots, warriors and stats.
/// A player owns exactly one village.
#[derive(Debug, Clone, PartialEq)]
pub struct Village {
    pub id: Uuid,
    pub player_id: Uuid,
    catalog: BuildingCatalog,
    warrior_catalog: WarriorCatalog,
    ledger: ResourceLedger,
    buildings: Vec<BuildingInstance>,
    roster: WarriorRoster,
    player_stats: PlayerStats,
    production_clock: ProductionClock,
    village_stats: VillageStats,
}

impl Village {
    /// A fresh village: starting resources, every building unbuilt, level 1 warriors.
    pub fn new(
        player_id: Uuid,
        catalog: BuildingCatalog,
        warrior_catalog: WarriorCatalog,
        now: DateTime<Utc>,
    ) -> Self {
        let roster = WarriorRoster::for_catalog(&warrior_catalog);
        Self::from_persistence(
            player_id,
            player_id,
            catalog,
            warrior_catalog,
            ResourceLedger::default(),
            vec![],
            roster,
            PlayerStats::default(),
            ProductionClock::starting_at(now),
        )
    }

    /// A fresh village whose slots start from the backend's records.
    pub fn from_remote(
        player_id: Uuid,
        catalog: BuildingCatalog,
        warrior_catalog: WarriorCatalog,
        remote: &[BuildingInstance],
        now: DateTime<Utc>,
    ) -> Self {
        let mut village = Self::new(player_id, catalog, warrior_catalog, now);
        village.buildings = merge_instances(&village.catalog, remote, &[]);
        village.update_state();
        village
    }

    /// Re-hydrates a village from local storage. Missing building slots and
    /// warrior entries are filled with defaults.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persistence(
        id: Uuid,
        player_id: Uuid,
        catalog: BuildingCatalog,
        warrior_catalog: WarriorCatalog,
        ledger: ResourceLedger,
        buildings: Vec<BuildingInstance>,
        mut roster: WarriorRoster,
        player_stats: PlayerStats,
        production_clock: ProductionClock,
    ) -> Self {
        let buildings = merge_instances(&catalog, &[], &buildings);
        roster.fill_missing(&warrior_catalog);

        let mut village = Self {
            id,
            player_id,
            catalog,
            warrior_catalog,
            ledger,
            buildings,
            roster,
            player_stats,
            production_clock,
            village_stats: VillageStats::default(),
        };
        village.update_state();
        village
    }

    /// Swaps in a freshly fetched catalog and rebuilds the slot list. Local
    /// instances win over the `remote` records.
    pub fn sync_buildings(&mut self, catalog: BuildingCatalog, remote: &[BuildingInstance]) {
        self.buildings = merge_instances(&catalog, remote, &self.buildings);
        self.catalog = catalog;
        self.update_state();
    }

    /// Validates a build or upgrade, debits its cost and stages the construction.
    pub fn init_building_construction(
        &mut self,
        name: BuildingName,
        location: Option<u32>,
        now: DateTime<Utc>,
    ) -> Result<ConstructionOrder, GameError> {
        let building_type = self
            .catalog
            .get(name)
            .cloned()
            .ok_or(GameError::BuildingNotFound(name))?;
        let instance = self
            .find_building(name)
            .ok_or(GameError::BuildingNotFound(name))?;

        if instance.is_under_construction() {
            return Err(GameError::AlreadyInProgress(format!("{name} construction")));
        }

        let target_level = instance.next_level();
        if target_level > building_type.max_level {
            return Err(GameError::MaxLevelReached {
                building: name,
                max_level: building_type.max_level,
            });
        }

        let required = building_type.required_town_hall_level(target_level);
        let town_hall_level = self.town_hall_level();
        if town_hall_level < required {
            return Err(GameError::PrerequisiteNotMet {
                building: BuildingName::TownHall,
                level: required,
                current: town_hall_level,
            });
        }

        let is_upgrade = instance.built;
        let cost = building_type.cost_for_level(target_level);
        self.ledger.debit(&cost)?;

        let finish_time = now + Duration::seconds(building_type.build_time_secs as i64);
        let instance = self
            .find_building_mut(name)
            .ok_or(GameError::BuildingNotFound(name))?;
        if !instance.built && instance.location.is_none() {
            instance.location = location;
        }
        instance.construction = Some(Construction {
            finish_time,
            pending_level: target_level,
            pending_cost: cost,
        });

        Ok(ConstructionOrder {
            name,
            building_type_id: building_type.id,
            target_level,
            is_upgrade,
            location: instance.location,
            cost,
            build_time_secs: building_type.build_time_secs,
            finish_time,
        })
    }

    /// Commits a staged construction, recomputes derived values and awards experience.
    pub fn complete_construction(
        &mut self,
        name: BuildingName,
    ) -> Result<ConstructionCompleted, GameError> {
        let instance = self
            .find_building_mut(name)
            .ok_or(GameError::BuildingNotFound(name))?;
        let construction = instance
            .construction
            .take()
            .ok_or(GameError::ConstructionNotInProgress(name))?;

        instance.built = true;
        instance.level = construction.pending_level;
        instance.cost = construction.pending_cost;
        let level = instance.level;

        self.update_state();

        let experience = CONSTRUCTION_XP_PER_LEVEL * level as u32;
        let player_levels_gained = self.player_stats.add_experience(experience);

        Ok(ConstructionCompleted {
            name,
            level,
            experience,
            player_levels_gained,
        })
    }

    /// Validates a training batch against barracks space and resources, debits
    /// the whole cost and queues the units. Nothing changes on failure.
    pub fn init_warrior_training(
        &mut self,
        selections: &BTreeMap<WarriorName, u32>,
    ) -> Result<Vec<TrainingOrder>, GameError> {
        let selections: Vec<(WarriorName, u32)> = selections
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(name, count)| (*name, *count))
            .collect();
        if selections.is_empty() {
            return Err(GameError::NoWarriorsSelected);
        }

        let mut orders = Vec::with_capacity(selections.len());
        for (name, quantity) in &selections {
            let warrior_type = self
                .warrior_catalog
                .get(*name)
                .ok_or(GameError::WarriorNotFound(*name))?;
            let state = self
                .roster
                .get(*name)
                .ok_or(GameError::WarriorNotFound(*name))?;
            if state.level_up.is_some() {
                return Err(GameError::AlreadyInProgress(format!("{name} level-up")));
            }
            orders.push(TrainingOrder {
                name: *name,
                quantity: *quantity,
                time_per_unit_secs: warrior_type.training_time_secs,
                cost: warrior_type
                    .training_cost_at(state.level)
                    .saturating_mul(*quantity),
            });
        }

        let requested = orders
            .iter()
            .fold(0u32, |acc, o| acc.saturating_add(o.quantity));
        let capacity = self.barracks_capacity();
        let current = self.total_troops();
        if current.saturating_add(requested) > capacity {
            return Err(GameError::BarracksFull {
                capacity,
                current,
                requested,
            });
        }

        let total_cost = orders
            .iter()
            .fold(ResourceGroup::zero(), |acc, o| acc.saturating_add(&o.cost));
        self.ledger.debit(&total_cost)?;

        for order in &orders {
            if let Some(state) = self.roster.get_mut(order.name) {
                state.queued += order.quantity;
            }
        }

        Ok(orders)
    }

    /// Moves one queued unit into the trained count. Returns the new count.
    pub fn complete_warrior_training(&mut self, name: WarriorName) -> Result<u32, GameError> {
        let state = self
            .roster
            .get_mut(name)
            .ok_or(GameError::WarriorNotFound(name))?;
        if state.queued == 0 {
            return Err(GameError::NoTrainingQueued(name));
        }
        state.queued -= 1;
        state.count += 1;
        Ok(state.count)
    }

    /// Validates a level-up against the Academy level and resources, debits the
    /// crop and iron cost and stages the new level.
    pub fn init_warrior_level_up(
        &mut self,
        name: WarriorName,
        now: DateTime<Utc>,
    ) -> Result<LevelUpOrder, GameError> {
        let warrior_type = self
            .warrior_catalog
            .get(name)
            .cloned()
            .ok_or(GameError::WarriorNotFound(name))?;
        let state = self
            .roster
            .get(name)
            .ok_or(GameError::WarriorNotFound(name))?;
        if state.level_up.is_some() {
            return Err(GameError::AlreadyInProgress(format!("{name} level-up")));
        }

        let current_level = state.level;
        let target_level = current_level.saturating_add(1);
        let required = warrior_type.required_academy_level(target_level);
        let academy_level = self.academy_level();
        if academy_level < required {
            return Err(GameError::PrerequisiteNotMet {
                building: BuildingName::Academy,
                level: required,
                current: academy_level,
            });
        }

        let cost = warrior_type.level_up_cost(target_level);
        self.ledger.debit(&cost)?;

        let duration_secs = warrior_type.level_up_time_secs(current_level);
        let finish_time = now + Duration::seconds(duration_secs as i64);
        if let Some(state) = self.roster.get_mut(name) {
            state.level_up = Some(LevelUp {
                finish_time,
                pending_level: target_level,
                pending_cost: cost,
                pending_upgrading_time_secs: duration_secs,
            });
        }

        Ok(LevelUpOrder {
            name,
            target_level,
            cost,
            duration_secs,
            finish_time,
        })
    }

    /// Commits a staged level-up. Returns the new level.
    pub fn complete_warrior_level_up(&mut self, name: WarriorName) -> Result<u8, GameError> {
        let state = self
            .roster
            .get_mut(name)
            .ok_or(GameError::WarriorNotFound(name))?;
        let level_up = state
            .level_up
            .take()
            .ok_or(GameError::LevelUpNotInProgress(name))?;
        state.level = level_up.pending_level;
        Ok(state.level)
    }

    /// Credits production since the last accrual, never filling a resource
    /// past storage capacity. Returns what was credited.
    pub fn accrue_production(&mut self, now: DateTime<Utc>) -> ResourceGroup {
        let elapsed_ms = (now - self.production_clock.updated_at).num_milliseconds();
        if elapsed_ms <= 0 {
            return ResourceGroup::zero();
        }
        let hours = elapsed_ms as f64 / 1000.0 / SECONDS_PER_HOUR;

        let capacity = self.village_stats.storage_capacity;
        let balance = self.ledger.balance();
        let mut credited = ResourceGroup::zero();

        for (idx, kind) in ResourceKind::ALL.iter().enumerate() {
            let produced = self.village_stats.production.get(*kind) as f64 * hours
                + self.production_clock.carry[idx];
            let whole = produced.floor();
            let room = capacity.saturating_sub(balance.get(*kind));

            if whole as u64 >= room as u64 {
                // storage full, the remainder is lost
                self.production_clock.carry[idx] = 0.0;
                credited = credited + ResourceGroup::only(*kind, room);
            } else {
                self.production_clock.carry[idx] = produced - whole;
                credited = credited + ResourceGroup::only(*kind, whole as u32);
            }
        }

        self.ledger.credit(&credited);
        self.production_clock.updated_at = now;
        credited
    }

    pub fn catalog(&self) -> &BuildingCatalog {
        &self.catalog
    }

    pub fn warrior_catalog(&self) -> &WarriorCatalog {
        &self.warrior_catalog
    }

    pub fn ledger(&self) -> &ResourceLedger {
        &self.ledger
    }

    pub fn resources(&self) -> ResourceGroup {
        self.ledger.balance()
    }

    pub fn buildings(&self) -> &[BuildingInstance] {
        &self.buildings
    }

    pub fn find_building(&self, name: BuildingName) -> Option<&BuildingInstance> {
        self.buildings.iter().find(|b| b.name == name)
    }

    fn find_building_mut(&mut self, name: BuildingName) -> Option<&mut BuildingInstance> {
        self.buildings.iter_mut().find(|b| b.name == name)
    }

    pub fn building_level(&self, name: BuildingName) -> u8 {
        self.find_building(name)
            .map(|b| b.effective_level())
            .unwrap_or(0)
    }

    pub fn town_hall_level(&self) -> u8 {
        self.building_level(BuildingName::TownHall)
    }

    pub fn academy_level(&self) -> u8 {
        self.building_level(BuildingName::Academy)
    }

    pub fn barracks_capacity(&self) -> u32 {
        self.village_stats.troop_capacity
    }

    pub fn total_troops(&self) -> u32 {
        self.roster.total_troops()
    }

    pub fn roster(&self) -> &WarriorRoster {
        &self.roster
    }

    pub fn player_stats(&self) -> &PlayerStats {
        &self.player_stats
    }

    pub fn village_stats(&self) -> &VillageStats {
        &self.village_stats
    }

    pub fn production_clock(&self) -> &ProductionClock {
        &self.production_clock
    }

    #[cfg(any(test, feature = "test-utils"))]
    pub fn set_building_level_for_test(&mut self, name: BuildingName, level: u8) {
        if let Some(instance) = self.find_building_mut(name) {
            instance.built = level > 0;
            instance.level = level;
            instance.construction = None;
        }
        self.update_state();
    }

    #[cfg(any(test, feature = "test-utils"))]
    pub fn set_resources_for_test(&mut self, resources: ResourceGroup) {
        self.ledger = ResourceLedger::new(resources);
    }

    #[cfg(any(test, feature = "test-utils"))]
    pub fn set_warrior_for_test(&mut self, name: WarriorName, level: u8, count: u32) {
        if let Some(state) = self.roster.get_mut(name) {
            state.level = level;
            state.count = count;
        }
    }

    /// Recomputes production, storage, troop capacity and scouting duration
    /// from the built buildings.
    fn update_state(&mut self) {
        let mut stats = VillageStats {
            storage_capacity: 0,
            ..Default::default()
        };

        for instance in self.buildings.iter().filter(|b| b.built) {
            let Some(building_type) = self.catalog.get(instance.name) else {
                continue;
            };
            match building_type.derived_at_level(instance.level) {
                Some(DerivedValue::Storage(capacity)) => stats.storage_capacity += capacity,
                Some(DerivedValue::TroopCapacity(capacity)) => stats.troop_capacity += capacity,
                Some(DerivedValue::Production { resource, rate }) => {
                    stats.production = stats.production + ResourceGroup::only(resource, rate)
                }
                Some(DerivedValue::ScoutingDuration(secs)) => stats.scouting_duration_secs = secs,
                None => continue,
            }
        }

        if stats.storage_capacity == 0 {
            stats.storage_capacity = DEFAULT_STORAGE_CAPACITY;
        }
        self.village_stats = stats;
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::{
        models::buildings::{BuildingStatus, default_catalog},
        test_utils::{VillageFactoryOptions, village_factory},
    };

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    fn village_with(levels: &[(BuildingName, u8)]) -> Village {
        village_factory(VillageFactoryOptions {
            building_levels: levels.to_vec(),
            now: Some(t0()),
            ..Default::default()
        })
    }

    #[test]
    fn test_build_warehouse_then_complete() {
        let mut village = village_with(&[(BuildingName::TownHall, 1)]);
        assert_eq!(village.village_stats().storage_capacity, DEFAULT_STORAGE_CAPACITY);

        let order = village
            .init_building_construction(BuildingName::Warehouse, Some(4), t0())
            .unwrap();
        assert_eq!(order.target_level, 1);
        assert!(!order.is_upgrade);
        assert_eq!(order.cost, ResourceGroup::new(150, 130, 80, 40));
        assert_eq!(village.resources(), ResourceGroup::new(850, 870, 920, 960));

        let warehouse = village.find_building(BuildingName::Warehouse).unwrap();
        assert_eq!(warehouse.location, Some(4));
        assert!(matches!(
            warehouse.status_at(t0() + Duration::seconds(89)),
            BuildingStatus::UnderConstruction { .. }
        ));
        assert_eq!(
            warehouse.status_at(t0() + Duration::seconds(90)),
            BuildingStatus::Built { level: 1 }
        );

        let completed = village.complete_construction(BuildingName::Warehouse).unwrap();
        assert_eq!(completed.level, 1);
        assert_eq!(completed.experience, 20);
        assert_eq!(village.village_stats().storage_capacity, 6000);
        assert_eq!(village.player_stats().experience, 20);
    }

    #[test]
    fn test_upgrade_cost_is_scaled() {
        let mut village = village_with(&[(BuildingName::TownHall, 1)]);
        let order = village
            .init_building_construction(BuildingName::TownHall, None, t0())
            .unwrap();
        assert!(order.is_upgrade);
        assert_eq!(order.target_level, 2);
        assert_eq!(order.cost, ResourceGroup::new(240, 240, 180, 120));
    }

    #[test]
    fn test_town_hall_gate_blocks_without_debit() {
        let mut village = village_with(&[(BuildingName::TownHall, 1)]);
        let before = village.resources();

        let err = village
            .init_building_construction(BuildingName::Academy, None, t0())
            .unwrap_err();

        assert_eq!(
            err,
            GameError::PrerequisiteNotMet {
                building: BuildingName::TownHall,
                level: 2,
                current: 1,
            }
        );
        assert_eq!(village.resources(), before);
        assert!(
            !village
                .find_building(BuildingName::Academy)
                .unwrap()
                .is_under_construction()
        );
    }

    #[test]
    fn test_insufficient_resources_names_shortfall() {
        let mut village = village_with(&[(BuildingName::TownHall, 1)]);
        village.set_resources_for_test(ResourceGroup::new(100, 500, 500, 500));

        let err = village
            .init_building_construction(BuildingName::Warehouse, None, t0())
            .unwrap_err();

        assert_eq!(
            err,
            GameError::InsufficientResources {
                missing: ResourceGroup::new(50, 0, 0, 0),
            }
        );
        assert_eq!(err.to_string(), "Not enough resources: missing 50 wood");
    }

    #[test]
    fn test_second_request_while_building_is_rejected() {
        let mut village = village_with(&[(BuildingName::TownHall, 1)]);
        village
            .init_building_construction(BuildingName::Sawmill, None, t0())
            .unwrap();
        let before = village.resources();

        let err = village
            .init_building_construction(BuildingName::Sawmill, None, t0())
            .unwrap_err();

        assert!(matches!(err, GameError::AlreadyInProgress(_)));
        assert_eq!(village.resources(), before);
    }

    #[test]
    fn test_concurrent_constructions_on_different_buildings() {
        let mut village = village_with(&[(BuildingName::TownHall, 1)]);
        village
            .init_building_construction(BuildingName::Sawmill, None, t0())
            .unwrap();
        village
            .init_building_construction(BuildingName::Brickyard, None, t0())
            .unwrap();
    }

    #[test]
    fn test_max_level_reached() {
        let mut village = village_with(&[(BuildingName::TownHall, 10)]);
        let err = village
            .init_building_construction(BuildingName::TownHall, None, t0())
            .unwrap_err();
        assert_eq!(
            err,
            GameError::MaxLevelReached {
                building: BuildingName::TownHall,
                max_level: 10,
            }
        );
    }

    #[test]
    fn test_location_is_fixed_on_first_build_only() {
        let mut village = village_with(&[(BuildingName::TownHall, 5)]);
        village
            .init_building_construction(BuildingName::Sawmill, Some(3), t0())
            .unwrap();
        village.complete_construction(BuildingName::Sawmill).unwrap();
        village
            .init_building_construction(BuildingName::Sawmill, Some(9), t0())
            .unwrap();
        assert_eq!(
            village.find_building(BuildingName::Sawmill).unwrap().location,
            Some(3)
        );
    }

    #[test]
    fn test_complete_without_construction_fails() {
        let mut village = village_with(&[]);
        assert_eq!(
            village.complete_construction(BuildingName::Warehouse),
            Err(GameError::ConstructionNotInProgress(BuildingName::Warehouse))
        );
    }

    #[test]
    fn test_training_debits_and_queues() {
        let mut village = village_with(&[(BuildingName::Barracks, 1)]);
        let selections = BTreeMap::from([(WarriorName::Swordsman, 3), (WarriorName::Archer, 0)]);

        let orders = village.init_warrior_training(&selections).unwrap();

        assert_eq!(orders.len(), 1);
        // 50,30,60,20 × 1.2 = 60,36,72,24 per unit
        assert_eq!(orders[0].cost, ResourceGroup::new(180, 108, 216, 72));
        assert_eq!(village.resources(), ResourceGroup::new(820, 892, 784, 928));
        assert_eq!(village.roster().get(WarriorName::Swordsman).unwrap().queued, 3);

        assert_eq!(village.complete_warrior_training(WarriorName::Swordsman), Ok(1));
        let swordsman = village.roster().get(WarriorName::Swordsman).unwrap();
        assert_eq!((swordsman.count, swordsman.queued), (1, 2));
    }

    #[test]
    fn test_training_over_capacity_rejects_whole_batch() {
        let mut village = village_with(&[(BuildingName::Barracks, 1)]);
        // barracks level 1 holds 60
        village.set_warrior_for_test(WarriorName::Spearman, 1, 55);
        let before = village.resources();
        let selections = BTreeMap::from([(WarriorName::Swordsman, 3), (WarriorName::Archer, 3)]);

        let err = village.init_warrior_training(&selections).unwrap_err();

        assert_eq!(
            err,
            GameError::BarracksFull {
                capacity: 60,
                current: 55,
                requested: 6,
            }
        );
        assert_eq!(village.resources(), before);
        assert_eq!(village.roster().get(WarriorName::Swordsman).unwrap().queued, 0);
    }

    #[test]
    fn test_huge_batch_saturates_instead_of_overflowing() {
        let mut village = village_with(&[(BuildingName::Barracks, 1)]);
        let before = village.resources();
        let selections =
            BTreeMap::from([(WarriorName::Swordsman, u32::MAX), (WarriorName::Archer, 1)]);

        let err = village.init_warrior_training(&selections).unwrap_err();

        assert_eq!(
            err,
            GameError::BarracksFull {
                capacity: 60,
                current: 0,
                requested: u32::MAX,
            }
        );
        assert_eq!(village.resources(), before);
    }

    #[test]
    fn test_training_without_barracks_is_full() {
        let mut village = village_with(&[]);
        let err = village
            .init_warrior_training(&BTreeMap::from([(WarriorName::Swordsman, 1)]))
            .unwrap_err();
        assert!(matches!(err, GameError::BarracksFull { capacity: 0, .. }));
    }

    #[test]
    fn test_empty_training_batch() {
        let mut village = village_with(&[(BuildingName::Barracks, 1)]);
        assert_eq!(
            village.init_warrior_training(&BTreeMap::new()),
            Err(GameError::NoWarriorsSelected)
        );
    }

    #[test]
    fn test_level_up_with_academy_two() {
        let mut village = village_with(&[(BuildingName::Academy, 2)]);

        let order = village
            .init_warrior_level_up(WarriorName::Swordsman, t0())
            .unwrap();

        assert_eq!(order.target_level, 2);
        assert_eq!(order.cost, ResourceGroup::new(0, 0, 90, 68));
        assert_eq!(order.finish_time, t0() + Duration::seconds(120));
        assert_eq!(village.resources(), ResourceGroup::new(1000, 1000, 910, 932));

        assert_eq!(village.complete_warrior_level_up(WarriorName::Swordsman), Ok(2));
        assert!(
            village
                .roster()
                .get(WarriorName::Swordsman)
                .unwrap()
                .level_up
                .is_none()
        );
    }

    #[test]
    fn test_level_up_gated_by_academy() {
        let mut village = village_with(&[(BuildingName::Academy, 1)]);
        let err = village
            .init_warrior_level_up(WarriorName::Archer, t0())
            .unwrap_err();
        assert_eq!(
            err,
            GameError::PrerequisiteNotMet {
                building: BuildingName::Academy,
                level: 2,
                current: 1,
            }
        );
    }

    #[test]
    fn test_pending_level_up_blocks_training_and_level_up() {
        let mut village =
            village_with(&[(BuildingName::Academy, 2), (BuildingName::Barracks, 1)]);
        village
            .init_warrior_level_up(WarriorName::Swordsman, t0())
            .unwrap();

        assert!(matches!(
            village.init_warrior_level_up(WarriorName::Swordsman, t0()),
            Err(GameError::AlreadyInProgress(_))
        ));
        assert!(matches!(
            village.init_warrior_training(&BTreeMap::from([(WarriorName::Swordsman, 1)])),
            Err(GameError::AlreadyInProgress(_))
        ));
    }

    #[test]
    fn test_accrue_production_respects_capacity() {
        let mut village = village_with(&[(BuildingName::Sawmill, 1), (BuildingName::GrainMill, 1)]);
        village.set_resources_for_test(ResourceGroup::new(100, 100, 100, 790));

        // sawmill level 1: 120 per hour, grain mill too
        let credited = village.accrue_production(t0() + Duration::minutes(30));

        assert_eq!(credited, ResourceGroup::new(60, 0, 0, 10));
        assert_eq!(village.resources(), ResourceGroup::new(160, 100, 100, 800));
    }

    #[test]
    fn test_accrue_production_keeps_fractions() {
        let mut village = village_with(&[(BuildingName::Sawmill, 1)]);
        village.set_resources_for_test(ResourceGroup::zero());

        // 120 per hour is one unit every 30 seconds
        village.accrue_production(t0() + Duration::seconds(20));
        assert_eq!(village.resources().wood(), 0);
        village.accrue_production(t0() + Duration::seconds(40));
        assert_eq!(village.resources().wood(), 1);
    }

    #[test]
    fn test_derived_stats_follow_levels() {
        let village = village_with(&[
            (BuildingName::Warehouse, 2),
            (BuildingName::Barracks, 2),
            (BuildingName::ScoutingPost, 3),
        ]);
        let stats = village.village_stats();
        assert_eq!(stats.storage_capacity, 7200);
        assert_eq!(stats.troop_capacity, 72);
        assert_eq!(stats.scouting_duration_secs, 50);
    }

    #[test]
    fn test_new_village_takes_remote_levels() {
        let remote = vec![BuildingInstance {
            built: true,
            level: 2,
            location: Some(4),
            ..BuildingInstance::unbuilt(BuildingName::Barracks)
        }];
        let village = Village::from_remote(
            Uuid::new_v4(),
            default_catalog(),
            WarriorCatalog::default(),
            &remote,
            t0(),
        );

        assert_eq!(village.building_level(BuildingName::Barracks), 2);
        assert_eq!(village.barracks_capacity(), 72);
        assert_eq!(village.building_level(BuildingName::TownHall), 0);
        assert_eq!(village.buildings().len(), default_catalog().types().len());
    }
}
