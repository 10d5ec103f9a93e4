use chrono::Utc;
use sqlx::{Sqlite, Transaction};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use hamlet_app::repository::VillageRepository;
use hamlet_game::models::{buildings::BuildingCatalog, village::Village};
use hamlet_types::errors::{ApplicationError, DbError};

use crate::{
    mapping::{keys, village_from_entries},
    repository::kv,
};

/// Stores a village as per-player entries of the key-value table.
#[derive(Clone)]
pub struct SqliteVillageRepository<'a> {
    tx: Arc<Mutex<Transaction<'a, Sqlite>>>,
}

impl<'a> SqliteVillageRepository<'a> {
    pub fn new(tx: Arc<Mutex<Transaction<'a, Sqlite>>>) -> Self {
        Self { tx }
    }
}

#[async_trait::async_trait]
impl<'a> VillageRepository for SqliteVillageRepository<'a> {
    async fn get_by_player_id(&self, player_id: Uuid) -> Result<Village, ApplicationError> {
        self.find_by_player_id(player_id)
            .await?
            .ok_or(ApplicationError::Db(DbError::VillageNotFound(player_id)))
    }

    async fn find_by_player_id(
        &self,
        player_id: Uuid,
    ) -> Result<Option<Village>, ApplicationError> {
        let mut tx_guard = self.tx.lock().await;
        let entries = kv::get_all(tx_guard.as_mut(), player_id).await?;
        Ok(village_from_entries(player_id, entries, Utc::now())?)
    }

    async fn save(&self, village: &Village) -> Result<(), ApplicationError> {
        let mut tx_guard = self.tx.lock().await;
        let conn = tx_guard.as_mut();
        let player_id = village.player_id;

        kv::put_value(conn, player_id, keys::RESOURCES, village.ledger()).await?;
        kv::put_value(conn, player_id, keys::PRODUCTION, village.production_clock()).await?;
        kv::put_value(conn, player_id, keys::STATS, village.player_stats()).await?;
        kv::put_value(conn, player_id, keys::WARRIORS, village.roster()).await?;
        kv::put_value(conn, player_id, keys::BUILDINGS, village.buildings()).await?;
        kv::put_value(conn, player_id, keys::BUILDING_TYPES, village.catalog()).await?;

        Ok(())
    }

    async fn get_cached_catalog(
        &self,
        player_id: Uuid,
    ) -> Result<Option<BuildingCatalog>, ApplicationError> {
        let mut tx_guard = self.tx.lock().await;
        Ok(kv::get_value(tx_guard.as_mut(), player_id, keys::BUILDING_TYPES).await?)
    }
}
