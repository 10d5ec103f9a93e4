use thiserror::Error;

use crate::{buildings::BuildingName, common::ResourceGroup, warriors::WarriorName};

/// Errors for domain logic (game rules).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("Not enough resources: missing {missing}")]
    InsufficientResources { missing: ResourceGroup },

    #[error("Requires {building} at level {level} (currently level {current})")]
    PrerequisiteNotMet {
        building: BuildingName,
        level: u8,
        current: u8,
    },

    #[error(
        "Barracks are full: {current} troops + {requested} requested exceeds capacity of {capacity}"
    )]
    BarracksFull {
        capacity: u32,
        current: u32,
        requested: u32,
    },

    #[error("{0} is already in progress")]
    AlreadyInProgress(String),

    #[error("{building} has already reached max level {max_level}")]
    MaxLevelReached {
        building: BuildingName,
        max_level: u8,
    },

    #[error("Building {0} not found")]
    BuildingNotFound(BuildingName),

    #[error("Warrior type {0} not found")]
    WarriorNotFound(WarriorName),

    #[error("No warriors selected for training")]
    NoWarriorsSelected,

    #[error("{0} is not under construction")]
    ConstructionNotInProgress(BuildingName),

    #[error("{0} has no level-up in progress")]
    LevelUpNotInProgress(WarriorName),

    #[error("{0} has no units queued for training")]
    NoTrainingQueued(WarriorName),
}
