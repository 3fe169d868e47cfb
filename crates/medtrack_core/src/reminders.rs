//! crates/medtrack_core/src/reminders.rs
//!
//! Scheduling and cancelling the daily reminders of a medication.
//!
//! A medication's reminders are never patched in place: every reschedule
//! cancels whatever is pending for that medication and submits the full set
//! again, in one batch.

use chrono::Duration;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::{
    ActionType, LocalNotification, Medication, NotificationAction, NotificationId,
    NotificationPayload, Trigger,
};
use crate::error::{report_failure, ReminderError};
use crate::ids::IdScheme;
use crate::ports::{DiagnosticSurface, NotificationScheduler};

/// Id of the action group attached to every medication reminder.
pub const REMINDER_ACTION_TYPE_ID: &str = "REMINDER_ACTIONS";

/// The buttons a medication reminder offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderAction {
    Take,
    Snooze,
}

impl ReminderAction {
    pub const ALL: [ReminderAction; 2] = [ReminderAction::Take, ReminderAction::Snooze];

    pub fn id(&self) -> &'static str {
        match self {
            Self::Take => "TAKE",
            Self::Snooze => "SNOOZE",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Take => "Take",
            Self::Snooze => "Snooze 5 min",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.id() == id)
    }
}

/// The `REMINDER_ACTIONS` group, registered once at startup.
pub fn reminder_action_types() -> Vec<ActionType> {
    vec![ActionType {
        id: REMINDER_ACTION_TYPE_ID.to_string(),
        actions: ReminderAction::ALL
            .iter()
            .map(|action| NotificationAction {
                id: action.id().to_string(),
                title: action.title().to_string(),
            })
            .collect(),
    }]
}

/// Knobs for the reminder workflow.
#[derive(Debug, Clone)]
pub struct ReminderSettings {
    pub id_scheme: IdScheme,
    pub snooze: Duration,
    pub small_icon: Option<String>,
    pub sound: Option<String>,
    pub doses_collection: String,
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self {
            id_scheme: IdScheme::Legacy,
            snooze: Duration::minutes(5),
            small_icon: Some("ic_stat_icon_name".to_string()),
            sound: Some("default".to_string()),
            doses_collection: "doses".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CancelReport {
    pub cancelled: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleReport {
    pub medication_id: String,
    /// Reminders removed before the new batch went in.
    pub cancelled: usize,
    pub scheduled: Vec<NotificationId>,
    /// Set when the stale reminders could not be cleared. The batch was
    /// still submitted.
    pub cancel_error: Option<String>,
}

pub struct ReminderService {
    notifications: Arc<dyn NotificationScheduler>,
    diagnostics: Arc<dyn DiagnosticSurface>,
    settings: ReminderSettings,
}

impl ReminderService {
    pub fn new(
        notifications: Arc<dyn NotificationScheduler>,
        diagnostics: Arc<dyn DiagnosticSurface>,
        settings: ReminderSettings,
    ) -> Self {
        Self {
            notifications,
            diagnostics,
            settings,
        }
    }

    /// Registers the take/snooze buttons. Must run before the first reminder
    /// is presented, or the platform shows it without buttons.
    pub async fn register_action_types(&self) -> Result<(), ReminderError> {
        match self
            .notifications
            .register_action_types(&reminder_action_types())
            .await
        {
            Ok(()) => {
                info!("Registered {} action types", REMINDER_ACTION_TYPE_ID);
                Ok(())
            }
            Err(e) => Err(report_failure(self.diagnostics.as_ref(), "ACTION TYPES", e.into()).await),
        }
    }

    /// Removes every pending reminder whose payload names `medication_id`.
    /// Other medications' reminders are left alone.
    pub async fn cancel_medication_reminders(
        &self,
        medication_id: &str,
    ) -> Result<CancelReport, ReminderError> {
        match self.cancel_matching(medication_id).await {
            Ok(report) => Ok(report),
            Err(e) => Err(report_failure(self.diagnostics.as_ref(), "CANCEL", e).await),
        }
    }

    async fn cancel_matching(&self, medication_id: &str) -> Result<CancelReport, ReminderError> {
        let pending = self.notifications.get_pending().await?;
        let stale: Vec<NotificationId> = pending
            .iter()
            .filter(|n| NotificationPayload::medication_id_of(&n.extra) == Some(medication_id))
            .map(|n| n.id)
            .collect();

        if stale.is_empty() {
            debug!(medication_id, "No pending reminders to cancel");
            return Ok(CancelReport::default());
        }

        self.diagnostics
            .show(&format!("Cancelling {} old reminders.", stale.len()))
            .await;
        self.notifications.cancel(&stale).await?;
        info!(medication_id, cancelled = stale.len(), "Cancelled pending reminders");

        Ok(CancelReport {
            cancelled: stale.len(),
        })
    }

    /// Replaces the medication's pending reminders with one daily reminder per
    /// schedule slot. An empty schedule leaves the medication with none.
    pub async fn schedule_medication_reminders(
        &self,
        medication: &Medication,
    ) -> Result<ScheduleReport, ReminderError> {
        self.diagnostics
            .show(&format!("Scheduling for {}...", medication.name))
            .await;

        // A failed cancel is already reported; reused ids still replace
        // their pending entries, so the new batch goes in regardless.
        let (cancelled, cancel_error) = match self.cancel_medication_reminders(&medication.id).await {
            Ok(report) => (report.cancelled, None),
            Err(e) => {
                warn!(medication_id = %medication.id, "Scheduling despite failed cancel");
                (0, Some(e.to_string()))
            }
        };

        match self.submit(medication).await {
            Ok(scheduled) => Ok(ScheduleReport {
                medication_id: medication.id.clone(),
                cancelled,
                scheduled,
                cancel_error,
            }),
            Err(e) => Err(report_failure(self.diagnostics.as_ref(), "NOTIFICATION", e).await),
        }
    }

    async fn submit(&self, medication: &Medication) -> Result<Vec<NotificationId>, ReminderError> {
        let batch = self.build_reminders(medication)?;
        if batch.is_empty() {
            debug!(medication_id = %medication.id, "Empty schedule, nothing to submit");
            return Ok(Vec::new());
        }

        self.notifications.schedule(&batch).await?;
        self.diagnostics
            .show(&format!("SUCCESS: Scheduled {} reminders!", batch.len()))
            .await;
        info!(
            medication_id = %medication.id,
            count = batch.len(),
            "Scheduled daily reminders"
        );

        Ok(batch.iter().map(|n| n.id).collect())
    }

    /// Builds the daily reminders for each slot of `medication.schedule`
    /// without touching the platform.
    pub fn build_reminders(
        &self,
        medication: &Medication,
    ) -> Result<Vec<LocalNotification>, ReminderError> {
        medication
            .schedule
            .iter()
            .enumerate()
            .map(|(slot, &at)| -> Result<LocalNotification, ReminderError> {
                let payload = NotificationPayload {
                    medication_id: medication.id.clone(),
                    scheduled_time: at,
                    medication: Some(medication.clone()),
                };

                Ok(LocalNotification {
                    id: self.settings.id_scheme.derive(&medication.id, slot)?,
                    title: format!("Time for your medication: {}", medication.name),
                    body: format!(
                        "It's time to take your dose of {} {}.",
                        medication.dosage, medication.unit
                    ),
                    trigger: Trigger::Daily {
                        at,
                        allow_while_idle: true,
                    },
                    action_type_id: Some(REMINDER_ACTION_TYPE_ID.to_string()),
                    extra: serde_json::to_value(&payload)?,
                    small_icon: self.settings.small_icon.clone(),
                    sound: self.settings.sound.clone(),
                })
            })
            .collect()
    }
}
