use sqlx::{Sqlite, Transaction};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use hamlet_app::repository::InboxRepository;
use hamlet_game::models::inbox::{MailMessage, Notification};
use hamlet_types::errors::{ApplicationError, DbError};

use crate::{mapping::keys, repository::kv};

/// Notifications and mail live as one JSON list per player in the key-value table.
#[derive(Clone)]
pub struct SqliteInboxRepository<'a> {
    tx: Arc<Mutex<Transaction<'a, Sqlite>>>,
}

impl<'a> SqliteInboxRepository<'a> {
    pub fn new(tx: Arc<Mutex<Transaction<'a, Sqlite>>>) -> Self {
        Self { tx }
    }
}

#[async_trait::async_trait]
impl<'a> InboxRepository for SqliteInboxRepository<'a> {
    async fn list_notifications(
        &self,
        player_id: Uuid,
    ) -> Result<Vec<Notification>, ApplicationError> {
        let mut tx_guard = self.tx.lock().await;
        let mut list: Vec<Notification> =
            kv::get_value(tx_guard.as_mut(), player_id, keys::NOTIFICATIONS)
                .await?
                .unwrap_or_default();
        // stored oldest first
        list.reverse();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(list)
    }

    async fn add_notification(
        &self,
        player_id: Uuid,
        notification: &Notification,
    ) -> Result<(), ApplicationError> {
        let mut tx_guard = self.tx.lock().await;
        let conn = tx_guard.as_mut();
        let mut list: Vec<Notification> = kv::get_value(conn, player_id, keys::NOTIFICATIONS)
            .await?
            .unwrap_or_default();
        list.push(notification.clone());
        kv::put_value(conn, player_id, keys::NOTIFICATIONS, &list).await?;
        Ok(())
    }

    async fn mark_notification_read(
        &self,
        player_id: Uuid,
        notification_id: Uuid,
    ) -> Result<(), ApplicationError> {
        let mut tx_guard = self.tx.lock().await;
        let conn = tx_guard.as_mut();
        let mut list: Vec<Notification> = kv::get_value(conn, player_id, keys::NOTIFICATIONS)
            .await?
            .unwrap_or_default();
        let notification = list
            .iter_mut()
            .find(|n| n.id == notification_id)
            .ok_or(ApplicationError::Db(DbError::NotificationNotFound(
                notification_id,
            )))?;
        notification.read = true;
        kv::put_value(conn, player_id, keys::NOTIFICATIONS, &list).await?;
        Ok(())
    }

    async fn list_mail(&self, player_id: Uuid) -> Result<Vec<MailMessage>, ApplicationError> {
        let mut tx_guard = self.tx.lock().await;
        let mut list: Vec<MailMessage> = kv::get_value(tx_guard.as_mut(), player_id, keys::MAIL)
            .await?
            .unwrap_or_default();
        list.reverse();
        list.sort_by(|a, b| b.received_at.cmp(&a.received_at));
        Ok(list)
    }

    async fn add_mail(&self, player_id: Uuid, mail: &MailMessage) -> Result<(), ApplicationError> {
        let mut tx_guard = self.tx.lock().await;
        let conn = tx_guard.as_mut();
        let mut list: Vec<MailMessage> = kv::get_value(conn, player_id, keys::MAIL)
            .await?
            .unwrap_or_default();
        list.push(mail.clone());
        kv::put_value(conn, player_id, keys::MAIL, &list).await?;
        Ok(())
    }

    async fn mark_mail_read(
        &self,
        player_id: Uuid,
        mail_id: Uuid,
    ) -> Result<(), ApplicationError> {
        let mut tx_guard = self.tx.lock().await;
        let conn = tx_guard.as_mut();
        let mut list: Vec<MailMessage> = kv::get_value(conn, player_id, keys::MAIL)
            .await?
            .unwrap_or_default();
        let mail = list
            .iter_mut()
            .find(|m| m.id == mail_id)
            .ok_or(ApplicationError::Db(DbError::MailNotFound(mail_id)))?;
        mail.read = true;
        kv::put_value(conn, player_id, keys::MAIL, &list).await?;
        Ok(())
    }
}
