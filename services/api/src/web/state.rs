//! services/api/src/web/state.rs
//!
//! Defines the application's shared state and how it is wired together.

use crate::adapters::{AuthStore, LocalNotificationStore, ToastLog};
use crate::config::Config;
use medtrack_core::{
    ActionHandler, Clock, DiagnosticSurface, DocumentStore, DoseLog, NotificationScheduler,
    PermissionGate, ReminderError, ReminderService,
};
use std::sync::Arc;
use tracing::info;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub reminders: Arc<ReminderService>,
    pub permissions: Arc<PermissionGate>,
    pub doses: DoseLog,
    pub notifications: Arc<LocalNotificationStore>,
    pub auth: Arc<AuthStore>,
    pub toasts: Arc<ToastLog>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Wires the reminder workflow to its adapters, registers the reminder
    /// action buttons and subscribes the action handler to the platform.
    pub async fn assemble(
        config: &Config,
        notifications: Arc<LocalNotificationStore>,
        store: Arc<dyn DocumentStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Arc<Self>, ReminderError> {
        let settings = config.reminder_settings();
        let toasts = Arc::new(ToastLog::new(config.diagnostics_capacity, clock.clone()));
        let diagnostics: Arc<dyn DiagnosticSurface> = toasts.clone();
        let auth = Arc::new(AuthStore::new());
        let doses = DoseLog::new(store, settings.doses_collection.clone());

        let reminders = Arc::new(ReminderService::new(
            notifications.clone(),
            diagnostics.clone(),
            settings.clone(),
        ));
        let permissions = Arc::new(PermissionGate::new(
            notifications.clone(),
            diagnostics.clone(),
        ));
        let actions = Arc::new(ActionHandler::new(
            notifications.clone(),
            diagnostics,
            auth.clone(),
            clock.clone(),
            doses.clone(),
            &settings,
        ));

        // Buttons must exist before any reminder is presented.
        reminders.register_action_types().await?;
        notifications.on_action_performed(actions).await?;
        info!("Reminder workflow assembled");

        Ok(Arc::new(Self {
            reminders,
            permissions,
            doses,
            notifications,
            auth,
            toasts,
            clock,
        }))
    }
}
