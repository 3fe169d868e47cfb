//! services/api/src/error.rs
//!
//! Defines the primary error type for the reminder service.

use crate::config::ConfigError;
use medtrack_core::ReminderError;

/// The primary error type for the `medtrack_api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A reminder workflow step failed during startup.
    #[error("Reminder Error: {0}")]
    Reminder(#[from] ReminderError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migrations could not be applied.
    #[error("Migration Error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}
