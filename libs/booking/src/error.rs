//! Error types for booking operations

use thiserror::Error;

/// Failures reported by a store or blob backend
#[derive(Error, Debug)]
pub enum StoreError {
    /// The document store rejected or failed the request
    #[error("Store backend error: {0}")]
    Backend(String),

    /// The blob store failed to accept or remove an object
    #[error("Blob store error: {0}")]
    Blob(String),

    /// A stored value could not be mapped back into a domain type
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Backend(e.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(e: sqlx::migrate::MigrateError) -> Self {
        StoreError::Backend(format!("migration failed: {}", e))
    }
}

/// Error taxonomy surfaced to callers of booking operations
#[derive(Error, Debug)]
pub enum BookingError {
    /// The caller lacks the role or ownership the operation needs
    #[error("Not authorized: {0}")]
    Authorization(String),

    /// Required input is missing or malformed; raised before any I/O
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The referenced document no longer exists
    #[error("Not found: {0}")]
    NotFound(String),

    /// Store, blob or network failure; never retried automatically
    #[error("Transient failure: {0}")]
    Transient(#[from] StoreError),
}

/// Result alias for booking operations
pub type BookingResult<T> = Result<T, BookingError>;

/// Result alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
