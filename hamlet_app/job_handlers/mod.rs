pub mod building_completed;
pub mod helpers;
pub mod warrior_level_up;
pub mod warrior_trained;
