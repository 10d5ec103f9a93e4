#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Value, json};
use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
};
use uuid::Uuid;

use hamlet_app::{
    config::Config,
    job_registry::AppJobRegistry,
    remote::{BuildingRecord, BuildingRequest},
    session::{GameSession, SessionDeps},
    test_utils::tests::ManualClock,
};
use hamlet_db::{establish_test_connection_pool, uow::SqliteUnitOfWorkProvider};
use hamlet_game::models::buildings::{BuildingCatalog, default_catalog};
use hamlet_remote::{HttpBuildingsApi, dto::BuildingTypeDto};
use hamlet_types::{Result, buildings::BuildingName};

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()
}

/// In-memory stand-in for the `/user/buildings` backend.
#[derive(Clone)]
pub struct MockBackend {
    catalog: BuildingCatalog,
    records: Arc<Mutex<HashMap<Uuid, Vec<BuildingRecord>>>>,
    requests: Arc<Mutex<Vec<(String, BuildingRequest)>>>,
    reject_writes: Arc<AtomicBool>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            catalog: default_catalog(),
            records: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            reject_writes: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Seeds a built building for `player_id`.
    pub fn with_building(self, player_id: Uuid, name: BuildingName, level: u8) -> Self {
        let building_type_id = self.catalog.get(name).unwrap().id;
        self.records
            .lock()
            .unwrap()
            .entry(player_id)
            .or_default()
            .push(BuildingRecord {
                user_id: Some(player_id),
                building_type_id,
                location: None,
                level,
            });
        self
    }

    pub fn reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    /// `(endpoint, body)` of every build/upgrade call, accepted or not.
    pub fn requests(&self) -> Vec<(String, BuildingRequest)> {
        self.requests.lock().unwrap().clone()
    }

    pub fn level_of(&self, player_id: Uuid, name: BuildingName) -> Option<u8> {
        let id = self.catalog.get(name)?.id;
        self.records
            .lock()
            .unwrap()
            .get(&player_id)?
            .iter()
            .find(|r| r.building_type_id == id)
            .map(|r| r.level)
    }

    fn write(&self, endpoint: &str, request: BuildingRequest) -> (StatusCode, Json<Value>) {
        self.requests
            .lock()
            .unwrap()
            .push((endpoint.to_string(), request.clone()));
        if self.reject_writes.load(Ordering::SeqCst) {
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "error": "maintenance" })),
            );
        }

        let mut records = self.records.lock().unwrap();
        let player = records.entry(request.user_id).or_default();
        match player
            .iter_mut()
            .find(|r| r.building_type_id == request.building_type_id)
        {
            Some(record) => record.level = request.level,
            None => player.push(BuildingRecord {
                user_id: Some(request.user_id),
                building_type_id: request.building_type_id,
                location: request.location,
                level: request.level,
            }),
        }
        (StatusCode::OK, Json(json!({ "ok": true })))
    }

    pub async fn serve(&self) -> String {
        let router = Router::new()
            .route("/user/buildings/types", get(types))
            .route("/user/buildings/build", post(build))
            .route("/user/buildings/upgrade", post(upgrade))
            .route("/user/buildings/{user_id}", get(buildings))
            .with_state(self.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }
}

async fn types(State(backend): State<MockBackend>) -> Json<Vec<BuildingTypeDto>> {
    Json(
        backend
            .catalog
            .types()
            .iter()
            .map(BuildingTypeDto::from)
            .collect(),
    )
}

async fn buildings(
    State(backend): State<MockBackend>,
    Path(user_id): Path<Uuid>,
) -> Json<Vec<BuildingRecord>> {
    let records = backend.records.lock().unwrap();
    Json(records.get(&user_id).cloned().unwrap_or_default())
}

async fn build(
    State(backend): State<MockBackend>,
    Json(request): Json<BuildingRequest>,
) -> (StatusCode, Json<Value>) {
    backend.write("build", request)
}

async fn upgrade(
    State(backend): State<MockBackend>,
    Json(request): Json<BuildingRequest>,
) -> (StatusCode, Json<Value>) {
    backend.write("upgrade", request)
}

/// A player wired to a SQLite store and a running mock backend.
pub struct TestClient {
    pub player_id: Uuid,
    pub backend: MockBackend,
    pub clock: Arc<ManualClock>,
    pub deps: SessionDeps,
}

impl TestClient {
    pub async fn new(player_id: Uuid, backend: MockBackend) -> Self {
        let base_url = backend.serve().await;
        let config = Arc::new(Config {
            api_url: base_url.clone(),
            database_url: "sqlite::memory:".to_string(),
            worker_interval_ms: 50,
            http_timeout_secs: 5,
            max_jobs_per_tick: 10,
        });
        let pool = establish_test_connection_pool().await.unwrap();
        let clock = Arc::new(ManualClock::new(t0()));

        let deps = SessionDeps {
            config: config.clone(),
            uow_provider: Arc::new(SqliteUnitOfWorkProvider::new(pool)),
            api: Arc::new(HttpBuildingsApi::with_client(
                reqwest::Client::new(),
                &base_url,
            )),
            registry: Arc::new(AppJobRegistry::new()),
            clock: clock.clone(),
        };

        Self {
            player_id,
            backend,
            clock,
            deps,
        }
    }

    /// Opens a session without a background worker.
    pub async fn open(&self) -> Result<GameSession> {
        GameSession::open(self.player_id, self.deps.clone()).await
    }

    /// Moves the clock forward and runs whatever fell due.
    pub async fn advance(&self, session: &GameSession, secs: i64) -> Result<usize> {
        self.clock.advance(secs);
        session.process_due_jobs().await
    }
}
