pub mod actions;
pub mod domain;
pub mod doses;
pub mod error;
pub mod ids;
pub mod permissions;
pub mod ports;
pub mod reminders;

#[cfg(test)]
mod testing;

pub use actions::{ActionHandler, ActionOutcome, SkipReason};
pub use domain::{
    ActionPerformed, ActionType, Dose, DoseStatus, LocalNotification, Medication,
    NotificationAction, NotificationId, NotificationPayload, PermissionState, ScheduleTime,
    ScheduleTimeError, Trigger, User,
};
pub use doses::{DoseEntry, DoseLog};
pub use error::ReminderError;
pub use ids::{derive_hashed_id, derive_id, IdError, IdScheme};
pub use permissions::PermissionGate;
pub use ports::{
    ActionListener, AuthContext, Clock, DiagnosticSurface, DocumentStore, NotificationScheduler,
    PortError, PortResult, SystemClock,
};
pub use reminders::{
    reminder_action_types, CancelReport, ReminderAction, ReminderService, ReminderSettings,
    ScheduleReport, REMINDER_ACTION_TYPE_ID,
};
