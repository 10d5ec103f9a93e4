#[cfg(any(test, feature = "test-utils"))]
#[cfg(not(tarpaulin_include))]
pub mod tests {
    use async_trait::async_trait;
    use chrono::{DateTime, Duration, Utc};
    use std::{
        collections::HashMap,
        sync::{Arc, Mutex},
    };
    use uuid::Uuid;

    use hamlet_game::models::{
        buildings::{BuildingCatalog, default_catalog},
        inbox::{MailMessage, Notification},
        village::Village,
    };
    use hamlet_types::errors::{AppError, ApplicationError, DbError};

    use crate::{
        clock::Clock,
        jobs::{Job, JobStatus},
        remote::{BuildingRecord, BuildingRequest, BuildingsApi},
        repository::{InboxRepository, JobRepository, SyncIntentRepository, VillageRepository},
        sync::{SyncIntent, SyncStatus},
        uow::{UnitOfWork, UnitOfWorkProvider},
    };

    #[derive(Default, Clone)]
    pub struct MockJobRepository {
        jobs: Arc<Mutex<Vec<Job>>>,
    }

    impl MockJobRepository {
        pub fn new() -> Self {
            Self::default()
        }

        fn set_status(&self, job_id: Uuid, status: JobStatus) -> Result<(), ApplicationError> {
            let mut jobs = self.jobs.lock().unwrap();
            let job = jobs
                .iter_mut()
                .find(|j| j.id == job_id)
                .ok_or_else(|| ApplicationError::Db(DbError::JobNotFound(job_id)))?;
            job.status = status;
            Ok(())
        }
    }

    #[async_trait]
    impl JobRepository for MockJobRepository {
        async fn add(&self, job: &Job) -> Result<(), ApplicationError> {
            self.jobs.lock().unwrap().push(job.clone());
            Ok(())
        }

        async fn get_by_id(&self, id: Uuid) -> Result<Job, ApplicationError> {
            let jobs = self.jobs.lock().unwrap().clone();

            jobs.into_iter()
                .find(|j| j.id == id)
                .ok_or_else(|| ApplicationError::Db(DbError::JobNotFound(id)))
        }

        async fn list_by_player_id(&self, player_id: Uuid) -> Result<Vec<Job>, ApplicationError> {
            let mut jobs: Vec<Job> = self
                .jobs
                .lock()
                .unwrap()
                .iter()
                .filter(|j| j.player_id == player_id)
                .filter(|j| matches!(j.status, JobStatus::Pending | JobStatus::Processing))
                .cloned()
                .collect();
            jobs.sort_by_key(|j| j.completed_at);
            Ok(jobs)
        }

        async fn find_and_lock_due_jobs(
            &self,
            now: DateTime<Utc>,
            limit: i64,
        ) -> Result<Vec<Job>, ApplicationError> {
            let mut jobs = self.jobs.lock().unwrap();
            let mut due: Vec<&mut Job> = jobs
                .iter_mut()
                .filter(|j| j.status == JobStatus::Pending && j.completed_at <= now)
                .collect();
            due.sort_by_key(|j| j.completed_at);

            Ok(due
                .into_iter()
                .take(limit.max(0) as usize)
                .map(|j| {
                    j.status = JobStatus::Processing;
                    j.clone()
                })
                .collect())
        }

        async fn requeue_processing(&self, player_id: Uuid) -> Result<u64, ApplicationError> {
            let mut count = 0;
            for job in self.jobs.lock().unwrap().iter_mut() {
                if job.player_id == player_id && job.status == JobStatus::Processing {
                    job.status = JobStatus::Pending;
                    count += 1;
                }
            }
            Ok(count)
        }

        async fn mark_as_completed(&self, job_id: Uuid) -> Result<(), ApplicationError> {
            self.set_status(job_id, JobStatus::Completed)
        }

        async fn mark_as_failed(
            &self,
            job_id: Uuid,
            _error_message: &str,
        ) -> Result<(), ApplicationError> {
            self.set_status(job_id, JobStatus::Failed)
        }
    }

    #[derive(Default, Clone)]
    pub struct MockVillageRepository {
        villages: Arc<Mutex<HashMap<Uuid, Village>>>,
    }

    #[async_trait]
    impl VillageRepository for MockVillageRepository {
        async fn get_by_player_id(&self, player_id: Uuid) -> Result<Village, ApplicationError> {
            self.villages
                .lock()
                .unwrap()
                .get(&player_id)
                .cloned()
                .ok_or_else(|| ApplicationError::Db(DbError::VillageNotFound(player_id)))
        }

        async fn find_by_player_id(
            &self,
            player_id: Uuid,
        ) -> Result<Option<Village>, ApplicationError> {
            Ok(self.villages.lock().unwrap().get(&player_id).cloned())
        }

        async fn save(&self, village: &Village) -> Result<(), ApplicationError> {
            self.villages
                .lock()
                .unwrap()
                .insert(village.player_id, village.clone());
            Ok(())
        }

        async fn get_cached_catalog(
            &self,
            player_id: Uuid,
        ) -> Result<Option<BuildingCatalog>, ApplicationError> {
            Ok(self
                .villages
                .lock()
                .unwrap()
                .get(&player_id)
                .map(|v| v.catalog().clone()))
        }
    }

    #[derive(Default, Clone)]
    pub struct MockInboxRepository {
        notifications: Arc<Mutex<HashMap<Uuid, Vec<Notification>>>>,
        mail: Arc<Mutex<HashMap<Uuid, Vec<MailMessage>>>>,
    }

    #[async_trait]
    impl InboxRepository for MockInboxRepository {
        async fn list_notifications(
            &self,
            player_id: Uuid,
        ) -> Result<Vec<Notification>, ApplicationError> {
            let mut list = self
                .notifications
                .lock()
                .unwrap()
                .get(&player_id)
                .cloned()
                .unwrap_or_default();
            list.reverse();
            list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(list)
        }

        async fn add_notification(
            &self,
            player_id: Uuid,
            notification: &Notification,
        ) -> Result<(), ApplicationError> {
            self.notifications
                .lock()
                .unwrap()
                .entry(player_id)
                .or_default()
                .push(notification.clone());
            Ok(())
        }

        async fn mark_notification_read(
            &self,
            player_id: Uuid,
            notification_id: Uuid,
        ) -> Result<(), ApplicationError> {
            let mut all = self.notifications.lock().unwrap();
            let notification = all
                .get_mut(&player_id)
                .and_then(|list| list.iter_mut().find(|n| n.id == notification_id))
                .ok_or_else(|| {
                    ApplicationError::Db(DbError::NotificationNotFound(notification_id))
                })?;
            notification.read = true;
            Ok(())
        }

        async fn list_mail(&self, player_id: Uuid) -> Result<Vec<MailMessage>, ApplicationError> {
            let mut list = self
                .mail
                .lock()
                .unwrap()
                .get(&player_id)
                .cloned()
                .unwrap_or_default();
            list.reverse();
            list.sort_by(|a, b| b.received_at.cmp(&a.received_at));
            Ok(list)
        }

        async fn add_mail(
            &self,
            player_id: Uuid,
            mail: &MailMessage,
        ) -> Result<(), ApplicationError> {
            self.mail
                .lock()
                .unwrap()
                .entry(player_id)
                .or_default()
                .push(mail.clone());
            Ok(())
        }

        async fn mark_mail_read(
            &self,
            player_id: Uuid,
            mail_id: Uuid,
        ) -> Result<(), ApplicationError> {
            let mut all = self.mail.lock().unwrap();
            let mail = all
                .get_mut(&player_id)
                .and_then(|list| list.iter_mut().find(|m| m.id == mail_id))
                .ok_or_else(|| ApplicationError::Db(DbError::MailNotFound(mail_id)))?;
            mail.read = true;
            Ok(())
        }
    }

    #[derive(Default, Clone)]
    pub struct MockSyncIntentRepository {
        intents: Arc<Mutex<Vec<SyncIntent>>>,
    }

    #[async_trait]
    impl SyncIntentRepository for MockSyncIntentRepository {
        async fn add(&self, intent: &SyncIntent) -> Result<(), ApplicationError> {
            self.intents.lock().unwrap().push(intent.clone());
            Ok(())
        }

        async fn get_by_id(&self, id: Uuid) -> Result<SyncIntent, ApplicationError> {
            self.intents
                .lock()
                .unwrap()
                .iter()
                .find(|i| i.id == id)
                .cloned()
                .ok_or_else(|| ApplicationError::Db(DbError::SyncIntentNotFound(id)))
        }

        async fn list_by_player_id(
            &self,
            player_id: Uuid,
        ) -> Result<Vec<SyncIntent>, ApplicationError> {
            Ok(self
                .intents
                .lock()
                .unwrap()
                .iter()
                .filter(|i| i.player_id == player_id)
                .cloned()
                .collect())
        }

        async fn list_unconfirmed(
            &self,
            player_id: Uuid,
        ) -> Result<Vec<SyncIntent>, ApplicationError> {
            Ok(self
                .intents
                .lock()
                .unwrap()
                .iter()
                .filter(|i| i.player_id == player_id && i.status != SyncStatus::Confirmed)
                .cloned()
                .collect())
        }

        async fn update(&self, intent: &SyncIntent) -> Result<(), ApplicationError> {
            let mut intents = self.intents.lock().unwrap();
            let stored = intents
                .iter_mut()
                .find(|i| i.id == intent.id)
                .ok_or_else(|| ApplicationError::Db(DbError::SyncIntentNotFound(intent.id)))?;
            *stored = intent.clone();
            Ok(())
        }
    }

    #[derive(Default, Clone)]
    pub struct MockUnitOfWork {
        villages: Arc<MockVillageRepository>,
        jobs: Arc<MockJobRepository>,
        inbox: Arc<MockInboxRepository>,
        sync_intents: Arc<MockSyncIntentRepository>,

        // Flags to check if commit/rollback was called
        committed: Arc<Mutex<bool>>,
        rolled_back: Arc<Mutex<bool>>,
    }

    impl MockUnitOfWork {
        pub fn new() -> Self {
            Default::default()
        }

        /// A unit of work over the same storage, with repository handles of
        /// its own so commit can tell whether any of them is still held.
        fn fork(&self) -> Self {
            Self {
                villages: Arc::new(self.villages.as_ref().clone()),
                jobs: Arc::new(self.jobs.as_ref().clone()),
                inbox: Arc::new(self.inbox.as_ref().clone()),
                sync_intents: Arc::new(self.sync_intents.as_ref().clone()),
                committed: self.committed.clone(),
                rolled_back: self.rolled_back.clone(),
            }
        }

        fn has_live_handles(&self) -> bool {
            Arc::strong_count(&self.villages) > 1
                || Arc::strong_count(&self.jobs) > 1
                || Arc::strong_count(&self.inbox) > 1
                || Arc::strong_count(&self.sync_intents) > 1
        }

        pub fn is_committed(&self) -> bool {
            *self.committed.lock().unwrap()
        }

        pub fn is_rolled_back(&self) -> bool {
            *self.rolled_back.lock().unwrap()
        }
    }

    #[async_trait]
    impl<'a> UnitOfWork<'a> for MockUnitOfWork {
        fn villages(&self) -> Arc<dyn VillageRepository + 'a> {
            self.villages.clone()
        }

        fn jobs(&self) -> Arc<dyn JobRepository + 'a> {
            self.jobs.clone()
        }

        fn inbox(&self) -> Arc<dyn InboxRepository + 'a> {
            self.inbox.clone()
        }

        fn sync_intents(&self) -> Arc<dyn SyncIntentRepository + 'a> {
            self.sync_intents.clone()
        }

        async fn commit(self: Box<Self>) -> Result<(), ApplicationError> {
            // same rule as the SQLite transaction: no repository may outlive it
            if self.has_live_handles() {
                return Err(ApplicationError::Db(DbError::Transaction(
                    "transaction still has multiple owners".to_string(),
                )));
            }
            *self.committed.lock().unwrap() = true;
            Ok(())
        }

        async fn rollback(self: Box<Self>) -> Result<(), ApplicationError> {
            *self.rolled_back.lock().unwrap() = true;
            Ok(())
        }
    }

    /// Hands out units of work sharing the same in-memory repositories, so
    /// what one "transaction" writes the next one reads.
    #[derive(Default, Clone)]
    pub struct MockUnitOfWorkProvider {
        uow: MockUnitOfWork,
    }

    impl MockUnitOfWorkProvider {
        pub fn new() -> Self {
            Self::default()
        }

        /// The shared state, for inspecting commit/rollback flags.
        pub fn state(&self) -> &MockUnitOfWork {
            &self.uow
        }
    }

    #[async_trait]
    impl UnitOfWorkProvider for MockUnitOfWorkProvider {
        async fn begin<'p>(&'p self) -> Result<Box<dyn UnitOfWork<'p> + 'p>, ApplicationError> {
            let uow: Box<dyn UnitOfWork<'_> + '_> = Box::new(self.uow.fork());
            Ok(uow)
        }
    }

    /// In-memory backend. Reads and writes can be switched to fail.
    #[derive(Clone)]
    pub struct MockBuildingsApi {
        catalog: Arc<Mutex<BuildingCatalog>>,
        records: Arc<Mutex<HashMap<Uuid, Vec<BuildingRecord>>>>,
        fail_reads: Arc<Mutex<bool>>,
        fail_writes: Arc<Mutex<bool>>,
        build_requests: Arc<Mutex<Vec<BuildingRequest>>>,
        upgrade_requests: Arc<Mutex<Vec<BuildingRequest>>>,
    }

    impl Default for MockBuildingsApi {
        fn default() -> Self {
            Self {
                catalog: Arc::new(Mutex::new(default_catalog())),
                records: Default::default(),
                fail_reads: Default::default(),
                fail_writes: Default::default(),
                build_requests: Default::default(),
                upgrade_requests: Default::default(),
            }
        }
    }

    impl MockBuildingsApi {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_catalog(catalog: BuildingCatalog) -> Self {
            let api = Self::default();
            *api.catalog.lock().unwrap() = catalog;
            api
        }

        pub fn set_records(&self, player_id: Uuid, records: Vec<BuildingRecord>) {
            self.records.lock().unwrap().insert(player_id, records);
        }

        pub fn fail_reads(&self, fail: bool) {
            *self.fail_reads.lock().unwrap() = fail;
        }

        pub fn fail_writes(&self, fail: bool) {
            *self.fail_writes.lock().unwrap() = fail;
        }

        pub fn build_requests(&self) -> Vec<BuildingRequest> {
            self.build_requests.lock().unwrap().clone()
        }

        pub fn upgrade_requests(&self) -> Vec<BuildingRequest> {
            self.upgrade_requests.lock().unwrap().clone()
        }

        fn check(&self, flag: &Arc<Mutex<bool>>, operation: &str) -> Result<(), ApplicationError> {
            if *flag.lock().unwrap() {
                return Err(ApplicationError::App(AppError::RemoteSyncFailed {
                    operation: operation.to_string(),
                    reason: "backend unavailable".to_string(),
                }));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl BuildingsApi for MockBuildingsApi {
        async fn fetch_building_types(&self) -> Result<BuildingCatalog, ApplicationError> {
            self.check(&self.fail_reads, "fetch building types")?;
            Ok(self.catalog.lock().unwrap().clone())
        }

        async fn fetch_buildings(
            &self,
            player_id: Uuid,
        ) -> Result<Vec<BuildingRecord>, ApplicationError> {
            self.check(&self.fail_reads, "fetch buildings")?;
            Ok(self
                .records
                .lock()
                .unwrap()
                .get(&player_id)
                .cloned()
                .unwrap_or_default())
        }

        async fn build(&self, request: &BuildingRequest) -> Result<(), ApplicationError> {
            self.build_requests.lock().unwrap().push(request.clone());
            self.check(&self.fail_writes, "build")
        }

        async fn upgrade(&self, request: &BuildingRequest) -> Result<(), ApplicationError> {
            self.upgrade_requests.lock().unwrap().push(request.clone());
            self.check(&self.fail_writes, "upgrade")
        }
    }

    /// A clock that only moves when told to.
    pub struct ManualClock {
        now: Mutex<DateTime<Utc>>,
    }

    impl ManualClock {
        pub fn new(now: DateTime<Utc>) -> Self {
            Self {
                now: Mutex::new(now),
            }
        }

        pub fn set(&self, now: DateTime<Utc>) {
            *self.now.lock().unwrap() = now;
        }

        pub fn advance(&self, secs: i64) {
            let mut now = self.now.lock().unwrap();
            *now += Duration::seconds(secs);
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.now.lock().unwrap()
        }
    }
}
