//! Error types shared across the Bitsy crates.
//!
//! Errors are categorized by who can act on them:
//! - [`BitsyError::Precondition`]: a required readiness check failed (operator-fixable)
//! - [`BitsyError::Launch`] / [`BitsyError::Storage`]: the host refused an operation
//! - [`BitsyError::Config`]: options could not be loaded or are inconsistent

use std::io;
use thiserror::Error;

/// Errors that can occur while provisioning or starting Bitsy.
#[derive(Debug, Error)]
pub enum BitsyError {
    /// A required readiness check did not pass. Terminal for the invocation.
    #[error("{check} not ready: {message}")]
    Precondition { check: String, message: String },

    /// The application process could not be spawned.
    #[error("launch: {0}")]
    Launch(String),

    /// Reading or writing a state artifact (log, PID file, unit file) failed.
    #[error("storage: {0}")]
    Storage(String),

    /// Options are missing, malformed or contradictory.
    #[error("config: {0}")]
    Config(String),

    /// A provisioning step failed.
    #[error("provision: {0}")]
    Provision(String),

    /// Changing permission bits on a device node failed.
    #[error("permission: {0}")]
    Permission(String),

    /// Generic IO error (catch-all).
    #[error("io: {0}")]
    Io(#[from] io::Error),
}

/// Result alias used by every Bitsy library crate.
pub type BitsyResult<T> = Result<T, BitsyError>;

impl BitsyError {
    /// Create a precondition error for the named check.
    pub fn precondition(check: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Precondition {
            check: check.into(),
            message: message.into(),
        }
    }

    /// Whether this error came from a failed readiness check.
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::Precondition { .. })
    }
}
