use std::{
    collections::BTreeMap,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use tokio::{sync::Mutex, task::JoinHandle};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use hamlet_game::models::{
    buildings::{BuildingCatalog, BuildingInstance},
    inbox::{MailMessage, Notification},
};
use hamlet_types::{
    Result,
    buildings::BuildingName,
    errors::{AppError, ApplicationError},
    warriors::WarriorName,
};

use crate::{
    app::AppBus,
    clock::Clock,
    command_handlers::*,
    config::Config,
    cqrs::{commands::*, queries::*},
    jobs::{handler::JobRegistry, worker::JobWorker},
    queries_handlers::*,
    remote::BuildingsApi,
    sync::{SyncDispatcher, SyncIntent, SyncReport},
    uow::UnitOfWorkProvider,
};

/// Everything a session needs, injected by whoever logs the player in.
#[derive(Clone)]
pub struct SessionDeps {
    pub config: Arc<Config>,
    pub uow_provider: Arc<dyn UnitOfWorkProvider>,
    pub api: Arc<dyn BuildingsApi>,
    pub registry: Arc<dyn JobRegistry>,
    pub clock: Arc<dyn Clock>,
}

/// The engine for one logged-in player. Created by [`GameSession::login`],
/// torn down by [`GameSession::logout`].
pub struct GameSession {
    player_id: Uuid,
    village_id: Uuid,
    bus: AppBus,
    worker: Arc<JobWorker>,
    dispatcher: Arc<SyncDispatcher>,
    clock: Arc<dyn Clock>,
    worker_handle: Mutex<Option<JoinHandle<()>>>,
    sync_tasks: Mutex<Vec<JoinHandle<()>>>,
    active: AtomicBool,
}

impl GameSession {
    /// Opens the session and starts the background job worker.
    pub async fn login(player_id: Uuid, deps: SessionDeps) -> Result<Self> {
        let session = Self::open(player_id, deps).await?;
        let handle = session.worker.clone().run();
        *session.worker_handle.lock().await = Some(handle);
        Ok(session)
    }

    /// Loads the catalog and the remote buildings, merges them into the local
    /// village and returns a session without a background worker. Due jobs
    /// then only run through [`GameSession::process_due_jobs`].
    #[instrument(skip_all, fields(player_id = %player_id))]
    pub async fn open(player_id: Uuid, deps: SessionDeps) -> Result<Self> {
        let bus = AppBus::new(deps.config.clone(), deps.uow_provider.clone());
        let now = deps.clock.now();

        let catalog = match deps.api.fetch_building_types().await {
            Ok(catalog) if !catalog.is_empty() => catalog,
            Ok(_) => {
                warn!("Backend returned an empty building catalog, using the local one");
                Self::local_catalog(&bus, player_id).await?
            }
            Err(e) => {
                warn!(error = %e, "Could not fetch building types, using the local catalog");
                Self::local_catalog(&bus, player_id).await?
            }
        };

        let remote_buildings: Vec<BuildingInstance> =
            match deps.api.fetch_buildings(player_id).await {
                Ok(records) => records
                    .into_iter()
                    .filter_map(|r| r.into_instance(&catalog))
                    .collect(),
                Err(e) => {
                    warn!(error = %e, "Could not fetch buildings, keeping local state");
                    Vec::new()
                }
            };

        bus.execute(
            InitializeVillage {
                player_id,
                catalog,
                remote_buildings,
                now,
            },
            InitializeVillageCommandHandler::new(),
        )
        .await?;

        let worker = Arc::new(JobWorker::new(
            deps.uow_provider.clone(),
            deps.registry.clone(),
            deps.config.clone(),
            deps.clock.clone(),
        ));
        // jobs locked by a pass that never finished
        worker.requeue_interrupted(player_id).await?;
        let dispatcher = Arc::new(SyncDispatcher::new(
            deps.uow_provider.clone(),
            deps.api.clone(),
            deps.clock.clone(),
        ));

        let session = Self {
            player_id,
            // one village per player, keyed by the player id
            village_id: player_id,
            bus,
            worker,
            dispatcher,
            clock: deps.clock,
            worker_handle: Mutex::new(None),
            sync_tasks: Mutex::new(Vec::new()),
            active: AtomicBool::new(true),
        };

        // intents left pending by a previous run
        session.spawn_sync(false).await;

        info!("Session opened");
        Ok(session)
    }

    async fn local_catalog(bus: &AppBus, player_id: Uuid) -> Result<BuildingCatalog> {
        bus.query(
            GetBuildingCatalog { player_id },
            GetBuildingCatalogHandler::new(),
        )
        .await
    }

    /// Stops the job worker. The session rejects every call afterwards.
    pub async fn logout(&self) {
        self.active.store(false, Ordering::SeqCst);
        if let Some(handle) = self.worker_handle.lock().await.take() {
            handle.abort();
        }
        info!(player_id = %self.player_id, "Session closed");
    }

    pub fn player_id(&self) -> Uuid {
        self.player_id
    }

    pub fn village_id(&self) -> Uuid {
        self.village_id
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    fn ensure_active(&self) -> Result<()> {
        if !self.is_active() {
            return Err(ApplicationError::App(AppError::SessionNotActive));
        }
        Ok(())
    }

    // ---- commands ----

    /// Builds `building` when unbuilt, upgrades it otherwise. The backend is
    /// told in the background; its answer never undoes the local change.
    pub async fn build_or_upgrade(
        &self,
        building: BuildingName,
        location: Option<u32>,
    ) -> Result<()> {
        self.ensure_active()?;
        self.bus
            .execute(
                BuildOrUpgradeBuilding {
                    player_id: self.player_id,
                    building,
                    location,
                    requested_at: self.clock.now(),
                },
                BuildOrUpgradeBuildingCommandHandler::new(),
            )
            .await?;
        self.spawn_sync(false).await;
        Ok(())
    }

    pub async fn train(&self, selections: BTreeMap<WarriorName, u32>) -> Result<()> {
        self.ensure_active()?;
        self.bus
            .execute(
                TrainWarriors {
                    player_id: self.player_id,
                    selections,
                    requested_at: self.clock.now(),
                },
                TrainWarriorsCommandHandler::new(),
            )
            .await
    }

    pub async fn level_up(&self, warrior: WarriorName) -> Result<()> {
        self.ensure_active()?;
        self.bus
            .execute(
                LevelUpWarrior {
                    player_id: self.player_id,
                    warrior,
                    requested_at: self.clock.now(),
                },
                LevelUpWarriorCommandHandler::new(),
            )
            .await
    }

    pub async fn mark_notification_read(&self, notification_id: Uuid) -> Result<()> {
        self.ensure_active()?;
        self.bus
            .execute(
                MarkNotificationRead {
                    player_id: self.player_id,
                    notification_id,
                },
                MarkNotificationReadCommandHandler::new(),
            )
            .await
    }

    pub async fn mark_mail_read(&self, mail_id: Uuid) -> Result<()> {
        self.ensure_active()?;
        self.bus
            .execute(
                MarkMailRead {
                    player_id: self.player_id,
                    mail_id,
                },
                MarkMailReadCommandHandler::new(),
            )
            .await
    }

    // ---- sync & jobs ----

    /// Sends every pending or failed intent again, in creation order.
    pub async fn reconcile(&self) -> Result<SyncReport> {
        self.ensure_active()?;
        self.wait_for_sync().await;
        self.dispatcher
            .dispatch_unconfirmed(self.player_id, true)
            .await
    }

    /// Runs every job due now, including follow-ups that are already due.
    /// Returns how many ran.
    pub async fn process_due_jobs(&self) -> Result<usize> {
        self.ensure_active()?;
        self.worker.drain_due_jobs_at(self.clock.now()).await
    }

    /// Waits for the background sync passes started so far.
    pub async fn wait_for_sync(&self) {
        loop {
            let tasks = std::mem::take(&mut *self.sync_tasks.lock().await);
            if tasks.is_empty() {
                return;
            }
            for task in tasks {
                if let Err(e) = task.await {
                    error!(error = %e, "Sync task panicked or was cancelled");
                }
            }
        }
    }

    async fn spawn_sync(&self, include_failed: bool) {
        let dispatcher = self.dispatcher.clone();
        let player_id = self.player_id;
        let handle = tokio::spawn(async move {
            match dispatcher
                .dispatch_unconfirmed(player_id, include_failed)
                .await
            {
                Ok(report) => debug!(
                    confirmed = report.confirmed,
                    failed = report.failed,
                    "Sync pass finished"
                ),
                Err(e) => error!(error = %e, "Sync pass aborted"),
            }
        });
        let mut tasks = self.sync_tasks.lock().await;
        tasks.retain(|h| !h.is_finished());
        tasks.push(handle);
    }

    // ---- queries ----

    pub async fn catalog(&self) -> Result<BuildingCatalog> {
        self.ensure_active()?;
        Self::local_catalog(&self.bus, self.player_id).await
    }

    pub async fn buildings(&self) -> Result<Vec<BuildingView>> {
        self.ensure_active()?;
        self.bus
            .query(
                GetVillageBuildings {
                    player_id: self.player_id,
                    village_id: self.village_id,
                    now: self.clock.now(),
                },
                GetVillageBuildingsHandler::new(),
            )
            .await
    }

    pub async fn find_building(&self, name: BuildingName) -> Result<Option<BuildingView>> {
        self.ensure_active()?;
        self.bus
            .query(
                FindBuildingByName {
                    player_id: self.player_id,
                    name,
                    now: self.clock.now(),
                },
                FindBuildingByNameHandler::new(),
            )
            .await
    }

    pub async fn overview(&self) -> Result<VillageOverview> {
        self.ensure_active()?;
        self.bus
            .query(
                GetVillageOverview {
                    player_id: self.player_id,
                    now: self.clock.now(),
                },
                GetVillageOverviewHandler::new(),
            )
            .await
    }

    pub async fn roster(&self) -> Result<Vec<WarriorView>> {
        self.ensure_active()?;
        self.bus
            .query(
                GetWarriorRoster {
                    player_id: self.player_id,
                },
                GetWarriorRosterHandler::new(),
            )
            .await
    }

    pub async fn notifications(&self) -> Result<Vec<Notification>> {
        self.ensure_active()?;
        self.bus
            .query(
                GetNotifications {
                    player_id: self.player_id,
                },
                GetNotificationsHandler::new(),
            )
            .await
    }

    pub async fn mail(&self) -> Result<Vec<MailMessage>> {
        self.ensure_active()?;
        self.bus
            .query(
                GetMail {
                    player_id: self.player_id,
                },
                GetMailHandler::new(),
            )
            .await
    }

    pub async fn job_queue(&self) -> Result<Vec<QueueItem>> {
        self.ensure_active()?;
        self.bus
            .query(
                GetJobQueue {
                    player_id: self.player_id,
                },
                GetJobQueueHandler::new(),
            )
            .await
    }

    pub async fn sync_intents(&self) -> Result<Vec<SyncIntent>> {
        self.ensure_active()?;
        self.bus
            .query(
                GetSyncIntents {
                    player_id: self.player_id,
                },
                GetSyncIntentsHandler::new(),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};

    use hamlet_game::{
        models::buildings::default_catalog,
        test_utils::{CatalogFactoryOptions, catalog_factory},
    };
    use hamlet_types::errors::GameError;

    use super::*;
    use crate::{
        job_registry::AppJobRegistry,
        remote::BuildingRecord,
        sync::SyncStatus,
        test_utils::tests::{ManualClock, MockBuildingsApi, MockUnitOfWorkProvider},
    };

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()
    }

    fn deps(api: Arc<MockBuildingsApi>, clock: Arc<ManualClock>) -> SessionDeps {
        SessionDeps {
            config: Arc::new(Config::from_env()),
            uow_provider: Arc::new(MockUnitOfWorkProvider::new()),
            api,
            registry: Arc::new(AppJobRegistry::new()),
            clock,
        }
    }

    #[tokio::test]
    async fn test_open_merges_remote_buildings() -> Result<()> {
        let player_id = Uuid::new_v4();
        let api = Arc::new(MockBuildingsApi::new());
        let town_hall_id = default_catalog().get(BuildingName::TownHall).unwrap().id;
        api.set_records(
            player_id,
            vec![BuildingRecord {
                user_id: Some(player_id),
                building_type_id: town_hall_id,
                location: Some(1),
                level: 2,
            }],
        );

        let session =
            GameSession::open(player_id, deps(api, Arc::new(ManualClock::new(t0())))).await?;

        let overview = session.overview().await?;
        assert_eq!(overview.village_id, player_id);
        assert_eq!(overview.town_hall_level, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_open_falls_back_to_default_catalog() -> Result<()> {
        let api = Arc::new(MockBuildingsApi::with_catalog(catalog_factory(
            CatalogFactoryOptions {
                without: vec![BuildingName::Academy],
                ..Default::default()
            },
        )));
        api.fail_reads(true);

        let session =
            GameSession::open(Uuid::new_v4(), deps(api, Arc::new(ManualClock::new(t0()))))
                .await?;

        assert_eq!(session.catalog().await?, default_catalog());
        Ok(())
    }

    #[tokio::test]
    async fn test_build_is_synced_in_background() -> Result<()> {
        let api = Arc::new(MockBuildingsApi::new());
        let clock = Arc::new(ManualClock::new(t0()));
        let session = GameSession::open(Uuid::new_v4(), deps(api.clone(), clock.clone())).await?;

        session.build_or_upgrade(BuildingName::TownHall, Some(1)).await?;
        session.wait_for_sync().await;

        let intents = session.sync_intents().await?;
        assert_eq!(intents.len(), 1);
        assert_eq!(intents[0].status, SyncStatus::Confirmed);
        assert_eq!(api.build_requests().len(), 1);

        // still under construction one second before the deadline
        clock.advance(119);
        assert_eq!(session.process_due_jobs().await?, 0);
        clock.advance(1);
        assert_eq!(session.process_due_jobs().await?, 1);
        let town_hall = session.find_building(BuildingName::TownHall).await?.unwrap();
        assert_eq!(town_hall.level, 1);
        assert!(town_hall.built);
        Ok(())
    }

    #[tokio::test]
    async fn test_second_build_while_constructing_is_rejected() -> Result<()> {
        let api = Arc::new(MockBuildingsApi::new());
        let session =
            GameSession::open(Uuid::new_v4(), deps(api, Arc::new(ManualClock::new(t0())))).await?;

        session.build_or_upgrade(BuildingName::TownHall, None).await?;
        let result = session.build_or_upgrade(BuildingName::TownHall, None).await;

        assert!(matches!(
            result,
            Err(ApplicationError::Game(GameError::AlreadyInProgress(_)))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_finished_sync_tasks_are_pruned() -> Result<()> {
        let api = Arc::new(MockBuildingsApi::new());
        let session =
            GameSession::open(Uuid::new_v4(), deps(api, Arc::new(ManualClock::new(t0())))).await?;

        for _ in 0..5 {
            session.spawn_sync(false).await;
            loop {
                let done = session
                    .sync_tasks
                    .lock()
                    .await
                    .iter()
                    .all(|h| h.is_finished());
                if done {
                    break;
                }
                tokio::time::sleep(std::time::Duration::from_millis(1)).await;
            }
        }
        session.spawn_sync(false).await;

        assert_eq!(session.sync_tasks.lock().await.len(), 1);
        session.wait_for_sync().await;
        Ok(())
    }

    #[tokio::test]
    async fn test_logout_deactivates_session() -> Result<()> {
        let api = Arc::new(MockBuildingsApi::new());
        let session =
            GameSession::login(Uuid::new_v4(), deps(api, Arc::new(ManualClock::new(t0())))).await?;

        session.logout().await;

        assert!(!session.is_active());
        assert!(matches!(
            session.overview().await,
            Err(ApplicationError::App(AppError::SessionNotActive))
        ));
        Ok(())
    }
}
