use serde_json::Value;

use hamlet_types::errors::{AppError, ApplicationError};

use crate::{
    job_handlers::{
        building_completed::BuildingCompletedJobHandler,
        warrior_level_up::WarriorLevelUpJobHandler, warrior_trained::WarriorTrainedJobHandler,
    },
    jobs::{
        handler::{JobHandler, JobRegistry},
        tasks::*,
    },
};

/// This enum lists all possible job types in the application.
/// It's used for compile-time matching.
enum AppTaskType {
    BuildingCompleted,
    WarriorTrained,
    WarriorLevelUp,
}

impl AppTaskType {
    /// Parse &str into enum variant.
    fn from_str(task_type: &str) -> Option<Self> {
        match task_type {
            "BuildingCompleted" => Some(Self::BuildingCompleted),
            "WarriorTrained" => Some(Self::WarriorTrained),
            "WarriorLevelUp" => Some(Self::WarriorLevelUp),
            _ => None,
        }
    }
}

/// This is the concrete implementation of the JobRegistry trait.
/// It holds the logic for mapping task_type strings to concrete handlers.
#[derive(Default)]
pub struct AppJobRegistry;

impl AppJobRegistry {
    pub fn new() -> Self {
        Self
    }
}

impl JobRegistry for AppJobRegistry {
    fn get_handler(
        &self,
        task_type: &str,
        data: &Value,
    ) -> Result<Box<dyn JobHandler>, ApplicationError> {
        let task = AppTaskType::from_str(task_type)
            .ok_or_else(|| ApplicationError::App(AppError::NoJobHandler(task_type.to_string())))?;

        match task {
            AppTaskType::BuildingCompleted => {
                let payload: BuildingCompletedTask = serde_json::from_value(data.clone())?;
                Ok(Box::new(BuildingCompletedJobHandler::new(payload)))
            }
            AppTaskType::WarriorTrained => {
                let payload: WarriorTrainedTask = serde_json::from_value(data.clone())?;
                Ok(Box::new(WarriorTrainedJobHandler::new(payload)))
            }
            AppTaskType::WarriorLevelUp => {
                let payload: WarriorLevelUpTask = serde_json::from_value(data.clone())?;
                Ok(Box::new(WarriorLevelUpJobHandler::new(payload)))
            }
        }
    }
}
