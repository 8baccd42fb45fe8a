use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DashSrvError>;

#[derive(Error, Debug)]
pub enum DashSrvError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid date range: {0}")]
    InvalidRange(String),

    #[error("Astronomy error: {0}")]
    Astronomy(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<sqlx::Error> for DashSrvError {
    fn from(err: sqlx::Error) -> Self {
        DashSrvError::Database(err.to_string())
    }
}

impl From<figment::Error> for DashSrvError {
    fn from(err: figment::Error) -> Self {
        DashSrvError::Config(err.to_string())
    }
}
