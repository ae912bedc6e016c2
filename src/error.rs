//! Error types for the rating ladder
//!
//! This module defines all error types using anyhow for consistent error handling
//! throughout the application.

use std::path::PathBuf;

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific ladder scenarios
#[derive(Debug, thiserror::Error)]
pub enum LadderError {
    #[error("Invalid match input: {reason}")]
    InvalidMatchInput { reason: String },

    #[error("Failed to persist ratings to {}: {message}", path.display())]
    PersistenceFailure { path: PathBuf, message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl LadderError {
    pub(crate) fn lock_poisoned(kind: &str) -> Self {
        LadderError::Internal {
            message: format!("Failed to acquire ratings {} lock", kind),
        }
    }
}
