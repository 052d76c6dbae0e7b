//! Error types for the registration workflow.

use thiserror::Error;

/// Failures talking to the user store.
///
/// Validation problems are not errors; they come back as
/// [`ValidationErrors`](crate::validation::ValidationErrors).
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("Database error: {0}")]
    Database(#[from] realtime_db_client::DatabaseError),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<serde_json::Error> for RegistrationError {
    fn from(e: serde_json::Error) -> Self {
        RegistrationError::Storage(format!("JSON serialization error: {}", e))
    }
}

/// Result type alias for registration errors.
pub type RegistrationResult<T> = Result<T, RegistrationError>;
