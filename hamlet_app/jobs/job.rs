use std::{fmt, str::FromStr};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// One row of the scheduled-event table: a completion due at `completed_at`.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: Uuid,
    pub player_id: Uuid,
    pub village_id: Uuid,
    pub task: JobPayload,
    pub status: JobStatus,
    pub completed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// A job due `duration_secs` after `start`.
    pub fn new(
        player_id: Uuid,
        village_id: Uuid,
        start: DateTime<Utc>,
        duration_secs: i64,
        task: JobPayload,
    ) -> Self {
        let completed_at = start + Duration::seconds(duration_secs);
        Self::with_deadline(player_id, village_id, task, start, completed_at)
    }

    pub fn with_deadline(
        player_id: Uuid,
        village_id: Uuid,
        task: JobPayload,
        created_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            player_id,
            village_id,
            task,
            status: JobStatus::Pending,
            completed_at,
            created_at,
            updated_at: created_at,
        }
    }
}

/// Represents the data payload for any job, it holds data for the task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobPayload {
    /// A string key used to find the correct handler registry.
    /// e.g., "BuildingCompleted", "WarriorTrained"
    pub task_type: String,

    /// The full JSON data for the task payload.
    pub data: Value,
}

impl JobPayload {
    pub fn new(task_type: &str, data: Value) -> Self {
        Self {
            task_type: task_type.to_string(),
            data,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "Pending",
            JobStatus::Processing => "Processing",
            JobStatus::Completed => "Completed",
            JobStatus::Failed => "Failed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(JobStatus::Pending),
            "Processing" => Ok(JobStatus::Processing),
            "Completed" => Ok(JobStatus::Completed),
            "Failed" => Ok(JobStatus::Failed),
            other => Err(format!("unknown job status '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::tasks::BuildingCompletedTask;
    use chrono::TimeZone;
    use serde_json::json;

    use hamlet_types::buildings::BuildingName;

    fn create_dummy_payload() -> JobPayload {
        let task_data = BuildingCompletedTask {
            building: BuildingName::Warehouse,
            level: 1,
        };
        JobPayload::new("BuildingCompleted", json!(task_data))
    }

    #[test]
    fn test_job_new() {
        let player_id = Uuid::new_v4();
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();

        let job = Job::new(player_id, player_id, start, 3600, create_dummy_payload());

        assert_eq!(job.player_id, player_id);
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.task.task_type, "BuildingCompleted");
        assert!(job.task.data.is_object());
        assert_eq!(job.created_at, start);
        assert_eq!(job.created_at, job.updated_at);
        assert_eq!((job.completed_at - job.created_at).num_seconds(), 3600);
    }

    #[test]
    fn test_job_new_zero_duration() {
        let start = Utc::now();
        let job = Job::new(Uuid::new_v4(), Uuid::new_v4(), start, 0, create_dummy_payload());
        assert_eq!(job.completed_at, job.created_at);
    }

    #[test]
    fn test_status_round_trips_through_str() {
        for status in [
            JobStatus::Pending,
            JobStatus::Processing,
            JobStatus::Completed,
            JobStatus::Failed,
        ] {
            assert_eq!(status.as_str().parse::<JobStatus>(), Ok(status));
        }
        assert!("Sleeping".parse::<JobStatus>().is_err());
    }
}
