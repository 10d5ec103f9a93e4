use std::{fmt, str::FromStr, sync::Arc};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use hamlet_game::models::inbox::Notification;
use hamlet_types::{buildings::BuildingName, errors::ApplicationError};

use crate::{
    clock::Clock,
    remote::{BuildingRequest, BuildingsApi},
    uow::UnitOfWorkProvider,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncOperation {
    Build,
    Upgrade,
}

impl SyncOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncOperation::Build => "Build",
            SyncOperation::Upgrade => "Upgrade",
        }
    }
}

impl fmt::Display for SyncOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SyncOperation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Build" => Ok(SyncOperation::Build),
            "Upgrade" => Ok(SyncOperation::Upgrade),
            other => Err(format!("unknown sync operation: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncStatus {
    Pending,
    Confirmed,
    Failed,
}

impl SyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Pending => "Pending",
            SyncStatus::Confirmed => "Confirmed",
            SyncStatus::Failed => "Failed",
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SyncStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(SyncStatus::Pending),
            "Confirmed" => Ok(SyncStatus::Confirmed),
            "Failed" => Ok(SyncStatus::Failed),
            other => Err(format!("unknown sync status: {other}")),
        }
    }
}

/// Local record of a build or upgrade the backend hasn't confirmed yet.
/// Written in the same transaction as the local state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncIntent {
    pub id: Uuid,
    pub player_id: Uuid,
    pub building: BuildingName,
    pub operation: SyncOperation,
    pub request: BuildingRequest,
    pub status: SyncStatus,
    pub attempts: u32,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SyncIntent {
    pub fn new(
        player_id: Uuid,
        building: BuildingName,
        operation: SyncOperation,
        request: BuildingRequest,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            player_id,
            building,
            operation,
            request,
            status: SyncStatus::Pending,
            attempts: 0,
            last_error: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn confirm(&mut self, now: DateTime<Utc>) {
        self.status = SyncStatus::Confirmed;
        self.attempts += 1;
        self.last_error = None;
        self.updated_at = now;
    }

    pub fn fail(&mut self, reason: impl Into<String>, now: DateTime<Utc>) {
        self.status = SyncStatus::Failed;
        self.attempts += 1;
        self.last_error = Some(reason.into());
        self.updated_at = now;
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    pub confirmed: usize,
    pub failed: usize,
}

/// Sends unconfirmed intents to the backend and records the outcome.
/// Local state is never rolled back when the backend refuses.
pub struct SyncDispatcher {
    uow_provider: Arc<dyn UnitOfWorkProvider>,
    api: Arc<dyn BuildingsApi>,
    clock: Arc<dyn Clock>,
    // one pass at a time, so an intent is never sent twice concurrently
    lock: Mutex<()>,
}

impl SyncDispatcher {
    pub fn new(
        uow_provider: Arc<dyn UnitOfWorkProvider>,
        api: Arc<dyn BuildingsApi>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            uow_provider,
            api,
            clock,
            lock: Mutex::new(()),
        }
    }

    /// Dispatches the player's pending intents in creation order. With
    /// `include_failed` the failed ones are sent again too.
    pub async fn dispatch_unconfirmed(
        &self,
        player_id: Uuid,
        include_failed: bool,
    ) -> Result<SyncReport, ApplicationError> {
        let _guard = self.lock.lock().await;

        let intents = {
            let uow = self.uow_provider.begin().await?;
            let intents = uow.sync_intents().list_unconfirmed(player_id).await;
            uow.rollback().await?;
            intents?
        };

        let mut report = SyncReport::default();
        for mut intent in intents {
            if intent.status == SyncStatus::Failed && !include_failed {
                continue;
            }

            let outcome = match intent.operation {
                SyncOperation::Build => self.api.build(&intent.request).await,
                SyncOperation::Upgrade => self.api.upgrade(&intent.request).await,
            };
            let now = self.clock.now();

            let uow = self.uow_provider.begin().await?;
            match outcome {
                Ok(()) => {
                    info!(
                        intent_id = %intent.id,
                        building = %intent.building,
                        operation = %intent.operation,
                        "Remote sync confirmed"
                    );
                    intent.confirm(now);
                    report.confirmed += 1;
                }
                Err(e) => {
                    warn!(
                        intent_id = %intent.id,
                        building = %intent.building,
                        operation = %intent.operation,
                        error = %e,
                        "Remote sync failed"
                    );
                    intent.fail(e.to_string(), now);
                    report.failed += 1;
                    uow.inbox()
                        .add_notification(
                            player_id,
                            &Notification::warning(
                                "Sync Failed",
                                format!(
                                    "{} of {} was not saved on the server: {e}",
                                    intent.operation, intent.building
                                ),
                                now,
                            ),
                        )
                        .await?;
                }
            }
            uow.sync_intents().update(&intent).await?;
            uow.commit().await?;
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use hamlet_game::models::inbox::NotificationKind;
    use hamlet_types::Result;

    use super::*;
    use crate::test_utils::tests::{ManualClock, MockBuildingsApi, MockUnitOfWorkProvider};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()
    }

    async fn seed_intent(
        provider: &MockUnitOfWorkProvider,
        player_id: Uuid,
        operation: SyncOperation,
    ) -> Result<SyncIntent> {
        let intent = SyncIntent::new(
            player_id,
            BuildingName::Warehouse,
            operation,
            BuildingRequest {
                user_id: player_id,
                building_type_id: 2,
                location: Some(1),
                level: 1,
            },
            t0(),
        );
        let uow = provider.begin().await?;
        uow.sync_intents().add(&intent).await?;
        uow.commit().await?;
        Ok(intent)
    }

    #[tokio::test]
    async fn test_dispatch_confirms_intent() -> Result<()> {
        let provider = Arc::new(MockUnitOfWorkProvider::new());
        let api = Arc::new(MockBuildingsApi::new());
        let player_id = Uuid::new_v4();
        let intent = seed_intent(&provider, player_id, SyncOperation::Build).await?;

        let dispatcher = SyncDispatcher::new(
            provider.clone(),
            api.clone(),
            Arc::new(ManualClock::new(t0())),
        );
        let report = dispatcher.dispatch_unconfirmed(player_id, false).await?;

        assert_eq!(report, SyncReport { confirmed: 1, failed: 0 });
        assert_eq!(api.build_requests(), vec![intent.request.clone()]);
        let uow = provider.begin().await?;
        let stored = uow.sync_intents().get_by_id(intent.id).await?;
        assert_eq!(stored.status, SyncStatus::Confirmed);
        assert_eq!(stored.attempts, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_sync_warns_and_is_not_retried_automatically() -> Result<()> {
        let provider = Arc::new(MockUnitOfWorkProvider::new());
        let api = Arc::new(MockBuildingsApi::new());
        api.fail_writes(true);
        let player_id = Uuid::new_v4();
        let intent = seed_intent(&provider, player_id, SyncOperation::Upgrade).await?;

        let dispatcher = SyncDispatcher::new(
            provider.clone(),
            api.clone(),
            Arc::new(ManualClock::new(t0())),
        );
        let report = dispatcher.dispatch_unconfirmed(player_id, false).await?;
        assert_eq!(report, SyncReport { confirmed: 0, failed: 1 });

        let uow = provider.begin().await?;
        let stored = uow.sync_intents().get_by_id(intent.id).await?;
        assert_eq!(stored.status, SyncStatus::Failed);
        assert!(stored.last_error.is_some());
        let notifications = uow.inbox().list_notifications(player_id).await?;
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].kind, NotificationKind::Warning);

        // failed intents are skipped unless explicitly reconciled
        let report = dispatcher.dispatch_unconfirmed(player_id, false).await?;
        assert_eq!(report, SyncReport::default());

        api.fail_writes(false);
        let report = dispatcher.dispatch_unconfirmed(player_id, true).await?;
        assert_eq!(report, SyncReport { confirmed: 1, failed: 0 });
        assert_eq!(api.upgrade_requests().len(), 2);
        Ok(())
    }

    #[test]
    fn test_status_round_trips_through_str() {
        for status in [SyncStatus::Pending, SyncStatus::Confirmed, SyncStatus::Failed] {
            assert_eq!(status.as_str().parse::<SyncStatus>(), Ok(status));
        }
        assert!("Lost".parse::<SyncStatus>().is_err());
    }
}
