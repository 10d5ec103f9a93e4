use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument};
use uuid::Uuid;

use hamlet_app::{
    config::Config,
    remote::{BuildingRecord, BuildingRequest, BuildingsApi},
};
use hamlet_game::models::buildings::BuildingCatalog;
use hamlet_types::errors::{AppError, ApplicationError};

use crate::dto::{BuildingTypeDto, SyncReply, catalog_from_dtos};

fn remote_error(operation: &str, reason: impl ToString) -> ApplicationError {
    ApplicationError::App(AppError::RemoteSyncFailed {
        operation: operation.to_string(),
        reason: reason.to_string(),
    })
}

/// `BuildingsApi` over the backend's `/user/buildings` endpoints.
#[derive(Debug, Clone)]
pub struct HttpBuildingsApi {
    client: Client,
    base_url: String,
}

impl HttpBuildingsApi {
    pub fn new(config: &Config) -> Result<Self, ApplicationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .map_err(|e| ApplicationError::Infrastructure(e.to_string()))?;
        Ok(Self::with_client(client, &config.api_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/user/buildings/{}", self.base_url, path)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        operation: &str,
        path: &str,
    ) -> Result<T, ApplicationError> {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| remote_error(operation, e))?
            .error_for_status()
            .map_err(|e| remote_error(operation, e))?;

        response
            .json::<T>()
            .await
            .map_err(|e| remote_error(operation, e))
    }

    async fn post_request(
        &self,
        operation: &str,
        path: &str,
        request: &BuildingRequest,
    ) -> Result<(), ApplicationError> {
        let response = self
            .client
            .post(self.url(path))
            .json(request)
            .send()
            .await
            .map_err(|e| remote_error(operation, e))?;

        let status = response.status();
        // Error replies may still carry an `{error}` body worth reporting.
        let reply: SyncReply = response.json().await.unwrap_or_default();
        if let Some(reason) = reply.rejection() {
            return Err(remote_error(operation, reason));
        }
        if !status.is_success() {
            return Err(remote_error(operation, format!("HTTP {status}")));
        }

        debug!(
            operation,
            building_type_id = request.building_type_id,
            level = request.level,
            "Backend accepted request"
        );
        Ok(())
    }
}

#[async_trait]
impl BuildingsApi for HttpBuildingsApi {
    #[instrument(skip_all)]
    async fn fetch_building_types(&self) -> Result<BuildingCatalog, ApplicationError> {
        let dtos: Vec<BuildingTypeDto> = self.get_json("fetch building types", "types").await?;
        debug!(count = dtos.len(), "Fetched building types");
        Ok(catalog_from_dtos(dtos))
    }

    #[instrument(skip_all, fields(player_id = %player_id))]
    async fn fetch_buildings(
        &self,
        player_id: Uuid,
    ) -> Result<Vec<BuildingRecord>, ApplicationError> {
        self.get_json("fetch buildings", &player_id.to_string())
            .await
    }

    #[instrument(skip_all, fields(user_id = %request.user_id))]
    async fn build(&self, request: &BuildingRequest) -> Result<(), ApplicationError> {
        self.post_request("build", "build", request).await
    }

    #[instrument(skip_all, fields(user_id = %request.user_id))]
    async fn upgrade(&self, request: &BuildingRequest) -> Result<(), ApplicationError> {
        self.post_request("upgrade", "upgrade", request).await
    }
}
