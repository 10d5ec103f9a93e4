use thiserror::Error;

mod app_error;
mod db_error;
mod game_error;

pub use app_error::AppError;
pub use db_error::DbError;
pub use game_error::GameError;

pub type Result<T, E = ApplicationError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Game(#[from] GameError),

    #[error(transparent)]
    App(#[from] AppError),

    #[error(transparent)]
    Db(#[from] DbError),

    #[error("JSON error")]
    Json(#[from] serde_json::Error),

    #[error("Infrastructure error: {0}")]
    Infrastructure(String),

    #[error("An unknown error occurred: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for ApplicationError {
    fn from(err: anyhow::Error) -> Self {
        ApplicationError::Unknown(err.to_string())
    }
}

impl ApplicationError {
    /// Returns the game rule violation, if that is what this error is.
    pub fn as_game_error(&self) -> Option<&GameError> {
        match self {
            ApplicationError::Game(e) => Some(e),
            _ => None,
        }
    }
}
