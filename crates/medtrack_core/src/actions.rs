//! crates/medtrack_core/src/actions.rs
//!
//! Reacts to the user pressing a button on a delivered reminder.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::doses::{DoseEntry, DoseLog};
use crate::domain::{
    ActionPerformed, DoseStatus, LocalNotification, NotificationId, NotificationPayload, Trigger,
};
use crate::error::{report_failure, ReminderError};
use crate::ports::{ActionListener, AuthContext, Clock, DiagnosticSurface, NotificationScheduler};
use crate::reminders::{ReminderAction, ReminderSettings};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotSignedIn,
    IncompletePayload,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    DoseRecorded { dose_id: String },
    Snoozed { id: NotificationId, fire_at: DateTime<Utc> },
    /// Nothing was written. Not an error.
    Skipped(SkipReason),
    /// The action id is not one of ours, e.g. a plain tap.
    Ignored { action_id: String },
}

pub struct ActionHandler {
    notifications: Arc<dyn NotificationScheduler>,
    diagnostics: Arc<dyn DiagnosticSurface>,
    auth: Arc<dyn AuthContext>,
    clock: Arc<dyn Clock>,
    doses: DoseLog,
    snooze: Duration,
}

impl ActionHandler {
    pub fn new(
        notifications: Arc<dyn NotificationScheduler>,
        diagnostics: Arc<dyn DiagnosticSurface>,
        auth: Arc<dyn AuthContext>,
        clock: Arc<dyn Clock>,
        doses: DoseLog,
        settings: &ReminderSettings,
    ) -> Self {
        Self {
            notifications,
            diagnostics,
            auth,
            clock,
            doses,
            snooze: settings.snooze,
        }
    }

    pub async fn handle(&self, event: &ActionPerformed) -> Result<ActionOutcome, ReminderError> {
        match ReminderAction::from_id(&event.action_id) {
            Some(ReminderAction::Take) => self.take(&event.notification).await,
            Some(ReminderAction::Snooze) => self.snooze(&event.notification).await,
            None => {
                debug!(action_id = %event.action_id, "Ignoring notification action");
                Ok(ActionOutcome::Ignored {
                    action_id: event.action_id.clone(),
                })
            }
        }
    }

    async fn take(&self, notification: &LocalNotification) -> Result<ActionOutcome, ReminderError> {
        let Some(user) = self.auth.current_user() else {
            return Ok(ActionOutcome::Skipped(SkipReason::NotSignedIn));
        };
        let Some(payload) = NotificationPayload::from_extra(&notification.extra) else {
            return Ok(ActionOutcome::Skipped(SkipReason::IncompletePayload));
        };
        // Older snapshots may not parse as a whole but still carry a name.
        let medication_name = payload.medication.map(|m| m.name).or_else(|| {
            notification
                .extra
                .pointer("/medication/name")
                .and_then(serde_json::Value::as_str)
                .map(str::to_string)
        });

        let entry = DoseEntry {
            medication_name,
            medication_id: payload.medication_id,
            scheduled_time: payload.scheduled_time,
            status: DoseStatus::Taken,
            action_at: Some(self.clock.now()),
        };

        match self.doses.record(&user, entry).await {
            Ok(dose) => Ok(ActionOutcome::DoseRecorded {
                dose_id: dose.id.unwrap_or_default(),
            }),
            Err(e) => Err(report_failure(self.diagnostics.as_ref(), "DOSE", e).await),
        }
    }

    /// Re-submits the same notification as a one-shot. The platform replaces
    /// the pending entry with the same id.
    async fn snooze(&self, notification: &LocalNotification) -> Result<ActionOutcome, ReminderError> {
        let fire_at = self.clock.now() + self.snooze;
        let snoozed = LocalNotification {
            trigger: Trigger::At {
                fire_at,
                allow_while_idle: true,
            },
            ..notification.clone()
        };

        match self.notifications.schedule(std::slice::from_ref(&snoozed)).await {
            Ok(()) => {
                info!(id = %snoozed.id, %fire_at, "Snoozed reminder");
                Ok(ActionOutcome::Snoozed {
                    id: snoozed.id,
                    fire_at,
                })
            }
            Err(e) => Err(report_failure(self.diagnostics.as_ref(), "SNOOZE", e.into()).await),
        }
    }
}

#[async_trait]
impl ActionListener for ActionHandler {
    async fn on_action_performed(&self, event: ActionPerformed) {
        match self.handle(&event).await {
            Ok(outcome) => debug!(?outcome, "Handled notification action"),
            Err(e) => warn!(action_id = %event.action_id, "Notification action failed: {}", e),
        }
    }
}
