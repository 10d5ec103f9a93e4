use thiserror::Error;
use uuid::Uuid;

/// Errors for app logic.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("No job handler for {0}")]
    NoJobHandler(String),

    #[error("Remote sync of {operation} failed: {reason}")]
    RemoteSyncFailed { operation: String, reason: String },

    #[error("No active session")]
    SessionNotActive,

    #[error("Village {village_id} does not belong to player {player_id}")]
    VillageMismatch { village_id: Uuid, player_id: Uuid },
}
