use chrono::{DateTime, Utc};

use hamlet_game::models::{
    buildings::{BuildingInstance, BuildingStatus, BuildingType},
    warriors::{WarriorState, WarriorType},
};

use crate::cqrs::queries::{BuildingView, WarriorView};

/// Joins an instance with its catalog entry as seen at `now`. A construction
/// past its finish time reads as built even before its job commits it.
pub fn building_view(
    building_type: &BuildingType,
    instance: &BuildingInstance,
    now: DateTime<Utc>,
) -> BuildingView {
    let status = instance.status_at(now);
    let (built, level) = match status {
        BuildingStatus::Built { level } => (true, level),
        _ => (instance.built, instance.effective_level()),
    };
    let next_level = level + 1;
    let next_cost = (next_level <= building_type.max_level)
        .then(|| building_type.cost_for_level(next_level));

    BuildingView {
        name: building_type.name,
        type_id: building_type.id,
        level,
        built,
        location: instance.location,
        status,
        max_level: building_type.max_level,
        next_cost,
        required_town_hall_level: building_type.required_town_hall_level(next_level),
        build_time_secs: building_type.build_time_secs,
        derived: if built {
            building_type.derived_at_level(level)
        } else {
            None
        },
    }
}

pub fn warrior_view(warrior_type: &WarriorType, state: &WarriorState) -> WarriorView {
    let next_level = state.level.saturating_add(1);
    WarriorView {
        name: state.name,
        level: state.level,
        count: state.count,
        queued: state.queued,
        attack: warrior_type.attack,
        defense: warrior_type.defense,
        speed: warrior_type.speed,
        training_cost: warrior_type.training_cost_at(state.level),
        training_time_secs: warrior_type.training_time_secs,
        level_up: state.level_up.clone(),
        required_academy_level: warrior_type.required_academy_level(next_level),
        level_up_cost: warrior_type.level_up_cost(next_level),
    }
}
