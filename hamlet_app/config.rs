use dotenvy::dotenv;
use std::env;

pub struct Config {
    /// Base URL of the backend exposing `/user/buildings/*`.
    pub api_url: String,
    pub database_url: String,
    pub worker_interval_ms: u64,
    pub http_timeout_secs: u64,
    pub max_jobs_per_tick: i64,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let api_url = match env::var("HAMLET_API_URL") {
            Ok(val) => val.trim_end_matches('/').to_string(),
            Err(_) => "http://localhost:3000".to_string(),
        };

        let database_url = match env::var("HAMLET_DATABASE_URL") {
            Ok(val) => val,
            Err(_) => "sqlite://hamlet.db?mode=rwc".to_string(),
        };

        let worker_interval_ms = match env::var("HAMLET_WORKER_INTERVAL_MS") {
            Ok(val) => val.parse::<u64>().unwrap_or(1000).clamp(50, 60_000),
            Err(_) => 1000,
        };

        let http_timeout_secs = match env::var("HAMLET_HTTP_TIMEOUT_SECS") {
            Ok(val) => val.parse::<u64>().unwrap_or(10),
            Err(_) => 10,
        };

        let max_jobs_per_tick = match env::var("HAMLET_MAX_JOBS_PER_TICK") {
            Ok(val) => val.parse::<i64>().unwrap_or(10).max(1),
            Err(_) => 10,
        };

        Self {
            api_url,
            database_url,
            worker_interval_ms,
            http_timeout_secs,
            max_jobs_per_tick,
        }
    }
}
