//! crates/medtrack_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the reminder workflow.
//! These traits are the boundary between the core and the platform services it
//! drives: the local-notification scheduler, the toast surface, the remote
//! document store and the auth provider. Adapters live in the service crate.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::domain::{
    ActionPerformed, ActionType, LocalNotification, NotificationId, PermissionState, User,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from the platform plugins and stores.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The platform's local-notification plugin. Its pending set is process-wide.
#[async_trait]
pub trait NotificationScheduler: Send + Sync {
    async fn check_permissions(&self) -> PortResult<PermissionState>;

    /// Shows the OS prompt and returns the resulting state.
    async fn request_permissions(&self) -> PortResult<PermissionState>;

    async fn get_pending(&self) -> PortResult<Vec<LocalNotification>>;

    /// Submits a batch. An entry whose id is already pending replaces it.
    async fn schedule(&self, notifications: &[LocalNotification]) -> PortResult<()>;

    async fn cancel(&self, ids: &[NotificationId]) -> PortResult<()>;

    async fn register_action_types(&self, types: &[ActionType]) -> PortResult<()>;

    /// Subscribes a listener to user interactions with delivered notifications.
    async fn on_action_performed(&self, listener: Arc<dyn ActionListener>) -> PortResult<()>;
}

#[async_trait]
pub trait ActionListener: Send + Sync {
    async fn on_action_performed(&self, event: ActionPerformed);
}

/// Fire-and-forget user-visible messages (toasts).
#[async_trait]
pub trait DiagnosticSurface: Send + Sync {
    async fn show(&self, message: &str);
}

/// Append-only remote document store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Appends `record` to `collection` and returns the new document's id.
    async fn add_record(&self, collection: &str, record: serde_json::Value) -> PortResult<String>;
}

/// The current signed-in identity, read at the moment it is needed.
pub trait AuthContext: Send + Sync {
    fn current_user(&self) -> Option<User>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
