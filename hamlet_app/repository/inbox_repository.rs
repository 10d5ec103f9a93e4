use uuid::Uuid;

use hamlet_game::models::inbox::{MailMessage, Notification};
use hamlet_types::errors::ApplicationError;

/// Per-player notifications and mail.
#[async_trait::async_trait]
pub trait InboxRepository: Send + Sync {
    /// Newest first.
    async fn list_notifications(&self, player_id: Uuid)
    -> Result<Vec<Notification>, ApplicationError>;
    async fn add_notification(
        &self,
        player_id: Uuid,
        notification: &Notification,
    ) -> Result<(), ApplicationError>;
    async fn mark_notification_read(
        &self,
        player_id: Uuid,
        notification_id: Uuid,
    ) -> Result<(), ApplicationError>;

    /// Newest first.
    async fn list_mail(&self, player_id: Uuid) -> Result<Vec<MailMessage>, ApplicationError>;
    async fn add_mail(&self, player_id: Uuid, mail: &MailMessage) -> Result<(), ApplicationError>;
    async fn mark_mail_read(&self, player_id: Uuid, mail_id: Uuid)
    -> Result<(), ApplicationError>;
}
