use thiserror::Error;

/// Failure to open or prepare the local store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid database name: {0}")]
    InvalidName(String),
    #[error("Failed to prepare data directory: {0}")]
    Io(#[from] std::io::Error),
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),
}
