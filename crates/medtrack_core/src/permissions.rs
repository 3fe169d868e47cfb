//! crates/medtrack_core/src/permissions.rs
//!
//! Gate in front of the OS permission for posting local notifications.

use std::sync::Arc;
use tracing::{error, info};

use crate::domain::PermissionState;
use crate::ports::{DiagnosticSurface, NotificationScheduler, PortResult};

pub struct PermissionGate {
    notifications: Arc<dyn NotificationScheduler>,
    diagnostics: Arc<dyn DiagnosticSurface>,
}

impl PermissionGate {
    pub fn new(
        notifications: Arc<dyn NotificationScheduler>,
        diagnostics: Arc<dyn DiagnosticSurface>,
    ) -> Self {
        Self {
            notifications,
            diagnostics,
        }
    }

    /// Returns whether notifications may be posted, prompting the user only
    /// when the OS still allows a prompt. A denied state is final: the OS
    /// will not show the prompt again. Failures count as "not granted".
    pub async fn request_permissions(&self) -> bool {
        match self.check_then_request().await {
            Ok(granted) => granted,
            Err(e) => {
                error!("Notification permission check failed: {}", e);
                self.diagnostics
                    .show(&format!("!!! PERMISSION CHECK ERROR: {e}"))
                    .await;
                false
            }
        }
    }

    async fn check_then_request(&self) -> PortResult<bool> {
        self.diagnostics.show("Checking permissions...").await;
        let current = self.notifications.check_permissions().await?;
        self.diagnostics
            .show(&format!("Current status: {current}"))
            .await;

        match current {
            PermissionState::Granted => Ok(true),
            PermissionState::Prompt | PermissionState::PromptWithRationale => {
                self.diagnostics.show("Requesting new permissions...").await;
                let updated = self.notifications.request_permissions().await?;
                self.diagnostics
                    .show(&format!("New status: {updated}"))
                    .await;
                info!(status = %updated, "Notification permission prompt answered");
                Ok(updated == PermissionState::Granted)
            }
            PermissionState::Denied => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeNotifications, RecordingDiagnostics};
    use crate::ports::PortError;

    fn make_gate(notifications: &Arc<FakeNotifications>) -> (PermissionGate, Arc<RecordingDiagnostics>) {
        let diagnostics = Arc::new(RecordingDiagnostics::default());
        (
            PermissionGate::new(notifications.clone(), diagnostics.clone()),
            diagnostics,
        )
    }

    #[tokio::test]
    async fn granted_returns_true_without_prompting() {
        let notifications = Arc::new(FakeNotifications::with_permission(PermissionState::Granted));
        let (gate, _) = make_gate(&notifications);

        assert!(gate.request_permissions().await);
        assert_eq!(notifications.permission_requests(), 0);
    }

    #[tokio::test]
    async fn denied_returns_false_without_prompting() {
        let notifications = Arc::new(FakeNotifications::with_permission(PermissionState::Denied));
        let (gate, _) = make_gate(&notifications);

        assert!(!gate.request_permissions().await);
        assert_eq!(notifications.permission_requests(), 0);
    }

    #[tokio::test]
    async fn prompt_follows_the_users_answer() {
        for state in [PermissionState::Prompt, PermissionState::PromptWithRationale] {
            let notifications = Arc::new(FakeNotifications::with_permission(state));
            notifications.answer_prompt_with(PermissionState::Granted);
            let (gate, _) = make_gate(&notifications);
            assert!(gate.request_permissions().await);
            assert_eq!(notifications.permission_requests(), 1);

            let notifications = Arc::new(FakeNotifications::with_permission(state));
            notifications.answer_prompt_with(PermissionState::Denied);
            let (gate, _) = make_gate(&notifications);
            assert!(!gate.request_permissions().await);
            assert_eq!(notifications.permission_requests(), 1);
        }
    }

    #[tokio::test]
    async fn check_failure_is_reported_and_false() {
        let notifications = Arc::new(FakeNotifications::default());
        notifications.fail_on("check_permissions", PortError::Unexpected("bridge gone".into()));
        let (gate, diagnostics) = make_gate(&notifications);

        assert!(!gate.request_permissions().await);
        assert!(diagnostics
            .messages()
            .iter()
            .any(|m| m.starts_with("!!! PERMISSION CHECK ERROR") && m.contains("bridge gone")));
    }
}
