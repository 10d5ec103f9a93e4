use uuid::Uuid;

use hamlet_types::errors::ApplicationError;

use crate::sync::SyncIntent;

#[async_trait::async_trait]
pub trait SyncIntentRepository: Send + Sync {
    async fn add(&self, intent: &SyncIntent) -> Result<(), ApplicationError>;

    async fn get_by_id(&self, id: Uuid) -> Result<SyncIntent, ApplicationError>;

    /// All intents of a player in creation order.
    async fn list_by_player_id(&self, player_id: Uuid)
    -> Result<Vec<SyncIntent>, ApplicationError>;

    /// Pending and failed intents of a player in creation order.
    async fn list_unconfirmed(&self, player_id: Uuid)
    -> Result<Vec<SyncIntent>, ApplicationError>;

    /// Writes back status, attempts and last error.
    async fn update(&self, intent: &SyncIntent) -> Result<(), ApplicationError>;
}
