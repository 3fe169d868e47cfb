//! crates/medtrack_core/src/error.rs
//!
//! The error type returned by the reminder workflow. Every failure is also
//! posted to the diagnostic surface so the user sees a toast; the typed error
//! lets the caller react as well.

use tracing::error;

use crate::ids::IdError;
use crate::ports::{DiagnosticSurface, PortError};

#[derive(Debug, thiserror::Error)]
pub enum ReminderError {
    #[error("Notification permission denied: {0}")]
    PermissionDenied(String),

    #[error("Platform call failed: {0}")]
    Platform(PortError),

    #[error("Invalid notification id: {0}")]
    InvalidId(#[from] IdError),

    #[error("Could not encode record: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<PortError> for ReminderError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::PermissionDenied(reason) => Self::PermissionDenied(reason),
            other => Self::Platform(other),
        }
    }
}

/// Logs `err`, shows it as a `!!! <LABEL> ERROR` toast, and hands it back.
pub(crate) async fn report_failure(
    diagnostics: &dyn DiagnosticSurface,
    label: &str,
    err: ReminderError,
) -> ReminderError {
    error!(operation = label, "Reminder operation failed: {}", err);
    diagnostics.show(&format!("!!! {label} ERROR: {err}")).await;
    err
}
