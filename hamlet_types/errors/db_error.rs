use thiserror::Error;
use uuid::Uuid;

/// Errors for the local storage.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Village for player {0} not found")]
    VillageNotFound(Uuid),

    #[error("Job with ID {0} not found")]
    JobNotFound(Uuid),

    #[error("Sync intent with ID {0} not found")]
    SyncIntentNotFound(Uuid),

    #[error("Notification with ID {0} not found")]
    NotificationNotFound(Uuid),

    #[error("Mail with ID {0} not found")]
    MailNotFound(Uuid),

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
