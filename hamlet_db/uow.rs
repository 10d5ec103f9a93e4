use sqlx::{Sqlite, SqlitePool, Transaction};
use std::sync::Arc;
use tokio::sync::Mutex;

use hamlet_app::{
    repository::*,
    uow::{UnitOfWork, UnitOfWorkProvider},
};
use hamlet_types::errors::{ApplicationError, DbError};

use crate::repository::*;

#[derive(Debug, Clone)]
pub struct SqliteUnitOfWorkProvider {
    pool: SqlitePool,
}

impl SqliteUnitOfWorkProvider {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl UnitOfWorkProvider for SqliteUnitOfWorkProvider {
    async fn begin<'p>(&'p self) -> Result<Box<dyn UnitOfWork<'p> + 'p>, ApplicationError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| ApplicationError::Db(DbError::Database(e)))?;

        Ok(Box::new(SqliteUnitOfWork {
            tx: Arc::new(Mutex::new(tx)),
        }))
    }
}

#[derive(Debug, Clone)]
pub struct SqliteUnitOfWork<'a> {
    tx: Arc<Mutex<Transaction<'a, Sqlite>>>,
}

#[async_trait::async_trait]
impl<'a> UnitOfWork<'a> for SqliteUnitOfWork<'a> {
    fn villages(&self) -> Arc<dyn VillageRepository + 'a> {
        Arc::new(SqliteVillageRepository::new(self.tx.clone()))
    }

    fn jobs(&self) -> Arc<dyn JobRepository + 'a> {
        Arc::new(SqliteJobRepository::new(self.tx.clone()))
    }

    fn inbox(&self) -> Arc<dyn InboxRepository + 'a> {
        Arc::new(SqliteInboxRepository::new(self.tx.clone()))
    }

    fn sync_intents(&self) -> Arc<dyn SyncIntentRepository + 'a> {
        Arc::new(SqliteSyncIntentRepository::new(self.tx.clone()))
    }

    async fn commit(self: Box<Self>) -> Result<(), ApplicationError> {
        // Any repository still holding a clone of the Arc means the caller
        // leaked it past the unit of work; the transaction rolls back on drop.
        match Arc::try_unwrap(self.tx) {
            Ok(mutex) => mutex
                .into_inner()
                .commit()
                .await
                .map_err(|e| ApplicationError::Db(DbError::Database(e))),
            Err(_) => Err(ApplicationError::Db(DbError::Transaction(
                "transaction still has multiple owners".to_string(),
            ))),
        }
    }

    async fn rollback(self: Box<Self>) -> Result<(), ApplicationError> {
        if let Ok(mutex) = Arc::try_unwrap(self.tx) {
            mutex
                .into_inner()
                .rollback()
                .await
                .map_err(|e| ApplicationError::Db(DbError::Database(e)))?;
        }
        Ok(())
    }
}
