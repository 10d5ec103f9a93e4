use crate::{
    cqrs::queries::{QueueItem, QueueItemKind},
    jobs::{
        Job,
        tasks::{BuildingCompletedTask, WarriorLevelUpTask, WarriorTrainedTask},
    },
};

/// Turns a pending job into a queue entry. Unknown or malformed payloads are skipped.
pub fn queue_item_from_job(job: &Job) -> Option<QueueItem> {
    let data = job.task.data.clone();
    let kind = match job.task.task_type.as_str() {
        "BuildingCompleted" => {
            let payload: BuildingCompletedTask = serde_json::from_value(data).ok()?;
            QueueItemKind::Construction {
                building: payload.building,
                level: payload.level,
            }
        }
        "WarriorTrained" => {
            let payload: WarriorTrainedTask = serde_json::from_value(data).ok()?;
            QueueItemKind::Training {
                warrior: payload.warrior,
                remaining: payload.quantity,
            }
        }
        "WarriorLevelUp" => {
            let payload: WarriorLevelUpTask = serde_json::from_value(data).ok()?;
            QueueItemKind::LevelUp {
                warrior: payload.warrior,
                level: payload.level,
            }
        }
        _ => return None,
    };

    Some(QueueItem {
        job_id: job.id,
        kind,
        status: job.status,
        finishes_at: job.completed_at,
    })
}
