use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hamlet_types::{common::ResourceGroup, warriors::WarriorName};

/// Training cost growth per warrior level.
pub const TRAINING_COST_FACTOR: f64 = 1.2;
/// Level-up cost growth, applied to crop and iron only.
pub const LEVEL_UP_COST_FACTOR: f64 = 1.5;
/// Level-up duration growth per level already reached.
pub const LEVEL_UP_TIME_FACTOR: f64 = 1.2;

/// Immutable catalog entry of a troop archetype.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarriorType {
    pub id: u32,
    pub name: WarriorName,
    /// Cost of training one unit at level 1.
    pub training_cost: ResourceGroup,
    /// Base of the level-up cost, only iron and crop are charged.
    pub resource_cost: ResourceGroup,
    pub training_time_secs: u32,
    pub upgrading_time_secs: u32,
    pub attack: u32,
    pub defense: u32,
    pub speed: u32,
    /// Academy level required to reach level `idx + 2`.
    pub upgrade_requirements: Vec<u8>,
}

impl WarriorType {
    /// Cost of training one unit while the type is at `level`.
    pub fn training_cost_at(&self, level: u8) -> ResourceGroup {
        self.training_cost * TRAINING_COST_FACTOR.powi(level as i32)
    }

    /// Academy level needed to reach `target_level`, 0 when the table doesn't say.
    pub fn required_academy_level(&self, target_level: u8) -> u8 {
        if target_level < 2 {
            return 0;
        }
        self.upgrade_requirements
            .get(target_level as usize - 2)
            .copied()
            .unwrap_or(0)
    }

    pub fn level_up_cost(&self, target_level: u8) -> ResourceGroup {
        let factor = LEVEL_UP_COST_FACTOR.powi(target_level as i32);
        ResourceGroup::new(
            0,
            0,
            (self.resource_cost.iron() as f64 * factor).round() as u32,
            (self.resource_cost.crop() as f64 * factor).round() as u32,
        )
    }

    /// Seconds needed to level up from `current_level`.
    pub fn level_up_time_secs(&self, current_level: u8) -> u32 {
        let steps = current_level.saturating_sub(1) as i32;
        (self.upgrading_time_secs as f64 * LEVEL_UP_TIME_FACTOR.powi(steps)).round() as u32
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarriorCatalog {
    types: Vec<WarriorType>,
}

impl WarriorCatalog {
    pub fn new(types: Vec<WarriorType>) -> Self {
        Self { types }
    }

    pub fn get(&self, name: WarriorName) -> Option<&WarriorType> {
        self.types.iter().find(|t| t.name == name)
    }

    pub fn types(&self) -> &[WarriorType] {
        &self.types
    }
}

impl Default for WarriorCatalog {
    fn default() -> Self {
        default_warrior_catalog()
    }
}

/// Level-up staged on a warrior type until its timer fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelUp {
    pub finish_time: DateTime<Utc>,
    pub pending_level: u8,
    pub pending_cost: ResourceGroup,
    pub pending_upgrading_time_secs: u32,
}

/// Per-player progression of one warrior type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarriorState {
    pub name: WarriorName,
    pub level: u8,
    /// Trained units owned.
    pub count: u32,
    /// Units paid for and waiting in the training queue.
    pub queued: u32,
    pub level_up: Option<LevelUp>,
}

impl WarriorState {
    pub fn new(name: WarriorName) -> Self {
        Self {
            name,
            level: 1,
            count: 0,
            queued: 0,
            level_up: None,
        }
    }

    pub fn is_under_training(&self) -> bool {
        self.level_up.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WarriorRoster {
    warriors: Vec<WarriorState>,
}

impl WarriorRoster {
    pub fn new(warriors: Vec<WarriorState>) -> Self {
        Self { warriors }
    }

    /// A roster with one level 1 entry per catalog type.
    pub fn for_catalog(catalog: &WarriorCatalog) -> Self {
        Self {
            warriors: catalog
                .types()
                .iter()
                .map(|t| WarriorState::new(t.name))
                .collect(),
        }
    }

    pub fn get(&self, name: WarriorName) -> Option<&WarriorState> {
        self.warriors.iter().find(|w| w.name == name)
    }

    pub fn get_mut(&mut self, name: WarriorName) -> Option<&mut WarriorState> {
        self.warriors.iter_mut().find(|w| w.name == name)
    }

    pub fn warriors(&self) -> &[WarriorState] {
        &self.warriors
    }

    /// Trained plus queued units, which is what occupies barracks space.
    pub fn total_troops(&self) -> u32 {
        self.warriors.iter().map(|w| w.count + w.queued).sum()
    }

    /// Adds entries for catalog types the roster doesn't know yet.
    pub fn fill_missing(&mut self, catalog: &WarriorCatalog) {
        for t in catalog.types() {
            if self.get(t.name).is_none() {
                self.warriors.push(WarriorState::new(t.name));
            }
        }
    }
}

// ==================== BEGIN WARRIORS STATIC DATA ====================

pub fn default_warrior_catalog() -> WarriorCatalog {
    WarriorCatalog::new(vec![
        WarriorType {
            id: 1,
            name: WarriorName::Swordsman,
            training_cost: ResourceGroup::new(50, 30, 60, 20),
            resource_cost: ResourceGroup::new(0, 0, 40, 30),
            training_time_secs: 30,
            upgrading_time_secs: 120,
            attack: 40,
            defense: 35,
            speed: 6,
            upgrade_requirements: vec![1, 2, 3, 4, 5, 6, 7, 8, 9],
        },
        WarriorType {
            id: 2,
            name: WarriorName::Spearman,
            training_cost: ResourceGroup::new(60, 40, 30, 20),
            resource_cost: ResourceGroup::new(0, 0, 30, 30),
            training_time_secs: 25,
            upgrading_time_secs: 110,
            attack: 30,
            defense: 50,
            speed: 7,
            upgrade_requirements: vec![1, 2, 3, 4, 5, 6, 7, 8, 9],
        },
        WarriorType {
            id: 3,
            name: WarriorName::Archer,
            training_cost: ResourceGroup::new(80, 40, 40, 30),
            resource_cost: ResourceGroup::new(0, 0, 40, 40),
            training_time_secs: 35,
            upgrading_time_secs: 150,
            attack: 55,
            defense: 20,
            speed: 6,
            upgrade_requirements: vec![2, 3, 4, 5, 6, 7, 8, 9, 10],
        },
        WarriorType {
            id: 4,
            name: WarriorName::Horseman,
            training_cost: ResourceGroup::new(140, 120, 160, 60),
            resource_cost: ResourceGroup::new(0, 0, 80, 60),
            training_time_secs: 60,
            upgrading_time_secs: 240,
            attack: 90,
            defense: 60,
            speed: 14,
            upgrade_requirements: vec![3, 4, 5, 6, 7, 8, 9, 10, 10],
        },
        WarriorType {
            id: 5,
            name: WarriorName::Catapult,
            training_cost: ResourceGroup::new(900, 1200, 600, 60),
            resource_cost: ResourceGroup::new(0, 0, 300, 120),
            training_time_secs: 180,
            upgrading_time_secs: 600,
            attack: 75,
            defense: 30,
            speed: 3,
            upgrade_requirements: vec![5, 6, 7, 8, 9, 10, 10, 10, 10],
        },
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn swordsman() -> WarriorType {
        default_warrior_catalog()
            .get(WarriorName::Swordsman)
            .cloned()
            .unwrap()
    }

    #[test]
    fn test_training_cost_scales_with_level() {
        let t = swordsman();
        // level 1: 50 * 1.2 = 60
        assert_eq!(t.training_cost_at(1), ResourceGroup::new(60, 36, 72, 24));
        assert_eq!(t.training_cost_at(0), t.training_cost);
    }

    #[test]
    fn test_level_up_cost_charges_crop_and_iron_only() {
        let t = swordsman();
        // 40 * 1.5^2 = 90, 30 * 1.5^2 = 67.5 -> 68
        assert_eq!(t.level_up_cost(2), ResourceGroup::new(0, 0, 90, 68));
    }

    #[test]
    fn test_required_academy_level_is_indexed_from_level_two() {
        let t = swordsman();
        assert_eq!(t.required_academy_level(2), 1);
        assert_eq!(t.required_academy_level(3), 2);
        assert_eq!(t.required_academy_level(1), 0);
        assert_eq!(t.required_academy_level(40), 0);
    }

    #[test]
    fn test_level_up_time_grows_per_level() {
        let t = swordsman();
        assert_eq!(t.level_up_time_secs(1), 120);
        assert_eq!(t.level_up_time_secs(2), 144);
    }

    #[test]
    fn test_total_troops_counts_queue() {
        let mut roster = WarriorRoster::for_catalog(&default_warrior_catalog());
        roster.get_mut(WarriorName::Archer).unwrap().count = 4;
        roster.get_mut(WarriorName::Spearman).unwrap().queued = 3;
        assert_eq!(roster.total_troops(), 7);
    }
}
