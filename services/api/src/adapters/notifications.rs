//! services/api/src/adapters/notifications.rs
//!
//! An in-process stand-in for the device's local-notification plugin. It holds
//! the pending set, the registered action groups and the permission state, and
//! dispatches user actions to the subscribed listeners. It implements the
//! `NotificationScheduler` port from the `core` crate.

use async_trait::async_trait;
use medtrack_core::{
    ActionListener, ActionPerformed, ActionType, LocalNotification, NotificationId,
    NotificationScheduler, PermissionState, PortError, PortResult, Trigger,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

/// Action id the platform reports when the notification body itself is tapped.
pub const TAP_ACTION_ID: &str = "tap";

struct PlatformState {
    permission: PermissionState,
    /// What the user answers when the OS prompt is shown.
    prompt_answer: PermissionState,
    pending: BTreeMap<NotificationId, LocalNotification>,
    action_types: HashMap<String, ActionType>,
}

pub struct LocalNotificationStore {
    state: Mutex<PlatformState>,
    listeners: RwLock<Vec<Arc<dyn ActionListener>>>,
}

impl LocalNotificationStore {
    pub fn new(permission: PermissionState, prompt_answer: PermissionState) -> Self {
        Self {
            state: Mutex::new(PlatformState {
                permission,
                prompt_answer,
                pending: BTreeMap::new(),
                action_types: HashMap::new(),
            }),
            listeners: RwLock::new(Vec::new()),
        }
    }

    /// Simulates the user pressing `action_id` on the pending notification
    /// `id`. Returns how many listeners were notified.
    pub async fn perform_action(&self, id: NotificationId, action_id: &str) -> PortResult<usize> {
        let notification = {
            let mut state = self.state.lock().await;
            let notification = state
                .pending
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::NotFound(format!("Notification {} is not pending", id)))?;

            if action_id != TAP_ACTION_ID && !offers_action(&state.action_types, &notification, action_id) {
                return Err(PortError::NotFound(format!(
                    "Notification {} has no action '{}'",
                    id, action_id
                )));
            }

            // A one-shot is consumed by its delivery; daily reminders stay.
            if matches!(notification.trigger, Trigger::At { .. }) {
                state.pending.remove(&id);
            }
            notification
        };

        let listeners = self.listeners.read().await.clone();
        let event = ActionPerformed {
            action_id: action_id.to_string(),
            notification,
        };
        for listener in &listeners {
            listener.on_action_performed(event.clone()).await;
        }

        debug!(%id, action_id, listeners = listeners.len(), "Dispatched notification action");
        Ok(listeners.len())
    }
}

fn offers_action(
    action_types: &HashMap<String, ActionType>,
    notification: &LocalNotification,
    action_id: &str,
) -> bool {
    notification
        .action_type_id
        .as_ref()
        .and_then(|type_id| action_types.get(type_id))
        .is_some_and(|group| group.actions.iter().any(|a| a.id == action_id))
}

//=========================================================================================
// `NotificationScheduler` Trait Implementation
//=========================================================================================

#[async_trait]
impl NotificationScheduler for LocalNotificationStore {
    async fn check_permissions(&self) -> PortResult<PermissionState> {
        Ok(self.state.lock().await.permission)
    }

    async fn request_permissions(&self) -> PortResult<PermissionState> {
        let mut state = self.state.lock().await;
        // The OS only prompts while the answer is still open.
        if matches!(
            state.permission,
            PermissionState::Prompt | PermissionState::PromptWithRationale
        ) {
            state.permission = state.prompt_answer;
            info!(status = %state.permission, "Notification permission answered");
        }
        Ok(state.permission)
    }

    async fn get_pending(&self) -> PortResult<Vec<LocalNotification>> {
        Ok(self.state.lock().await.pending.values().cloned().collect())
    }

    async fn schedule(&self, notifications: &[LocalNotification]) -> PortResult<()> {
        let mut state = self.state.lock().await;
        if state.permission != PermissionState::Granted {
            return Err(PortError::PermissionDenied(format!(
                "notification permission is {}",
                state.permission
            )));
        }
        for notification in notifications {
            state.pending.insert(notification.id, notification.clone());
        }
        Ok(())
    }

    async fn cancel(&self, ids: &[NotificationId]) -> PortResult<()> {
        let mut state = self.state.lock().await;
        for id in ids {
            state.pending.remove(id);
        }
        Ok(())
    }

    async fn register_action_types(&self, types: &[ActionType]) -> PortResult<()> {
        let mut state = self.state.lock().await;
        for action_type in types {
            state
                .action_types
                .insert(action_type.id.clone(), action_type.clone());
        }
        Ok(())
    }

    async fn on_action_performed(&self, listener: Arc<dyn ActionListener>) -> PortResult<()> {
        self.listeners.write().await.push(listener);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use medtrack_core::{reminder_action_types, ScheduleTime, REMINDER_ACTION_TYPE_ID};
    use serde_json::json;

    fn reminder(id: i32, trigger: Trigger) -> LocalNotification {
        LocalNotification {
            id: NotificationId(id),
            title: "Time for your medication".into(),
            body: "It's time.".into(),
            trigger,
            action_type_id: Some(REMINDER_ACTION_TYPE_ID.into()),
            extra: json!({ "medicationId": "med-1", "scheduledTime": "08:00" }),
            small_icon: None,
            sound: None,
        }
    }

    fn daily(id: i32) -> LocalNotification {
        reminder(
            id,
            Trigger::Daily {
                at: ScheduleTime::new(8, 0).unwrap(),
                allow_while_idle: true,
            },
        )
    }

    #[derive(Default)]
    struct Recorder {
        events: std::sync::Mutex<Vec<ActionPerformed>>,
    }

    #[async_trait]
    impl ActionListener for Recorder {
        async fn on_action_performed(&self, event: ActionPerformed) {
            self.events.lock().unwrap().push(event);
        }
    }

    #[tokio::test]
    async fn prompt_is_answered_once() {
        let store = LocalNotificationStore::new(PermissionState::Prompt, PermissionState::Denied);
        assert_eq!(store.request_permissions().await.unwrap(), PermissionState::Denied);

        // Answering again does not change a denied state.
        assert_eq!(store.request_permissions().await.unwrap(), PermissionState::Denied);
    }

    #[tokio::test]
    async fn schedule_requires_permission() {
        let store = LocalNotificationStore::new(PermissionState::Denied, PermissionState::Denied);
        let err = store.schedule(&[daily(1)]).await.unwrap_err();
        assert!(matches!(err, PortError::PermissionDenied(_)));
    }

    #[tokio::test]
    async fn schedule_replaces_by_id() {
        let store = LocalNotificationStore::new(PermissionState::Granted, PermissionState::Granted);
        store.schedule(&[daily(1), daily(2)]).await.unwrap();

        let fire_at = Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).unwrap();
        let one_shot = reminder(
            1,
            Trigger::At {
                fire_at,
                allow_while_idle: true,
            },
        );
        store.schedule(&[one_shot.clone()]).await.unwrap();

        let pending = store.get_pending().await.unwrap();
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0], one_shot);
    }

    #[tokio::test]
    async fn actions_reach_listeners() {
        let store = LocalNotificationStore::new(PermissionState::Granted, PermissionState::Granted);
        store.register_action_types(&reminder_action_types()).await.unwrap();
        store.schedule(&[daily(7)]).await.unwrap();
        let recorder = Arc::new(Recorder::default());
        store.on_action_performed(recorder.clone()).await.unwrap();

        let notified = store.perform_action(NotificationId(7), "TAKE").await.unwrap();

        assert_eq!(notified, 1);
        let events = recorder.events.lock().unwrap().clone();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].action_id, "TAKE");
        assert_eq!(events[0].notification.id, NotificationId(7));
        // Daily reminders stay pending after delivery.
        assert_eq!(store.get_pending().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unregistered_actions_are_rejected() {
        let store = LocalNotificationStore::new(PermissionState::Granted, PermissionState::Granted);
        store.schedule(&[daily(7)]).await.unwrap();

        assert!(matches!(
            store.perform_action(NotificationId(7), "TAKE").await,
            Err(PortError::NotFound(_))
        ));
        assert!(matches!(
            store.perform_action(NotificationId(8), TAP_ACTION_ID).await,
            Err(PortError::NotFound(_))
        ));
        assert_eq!(store.perform_action(NotificationId(7), TAP_ACTION_ID).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn one_shots_are_consumed_by_delivery() {
        let store = LocalNotificationStore::new(PermissionState::Granted, PermissionState::Granted);
        let fire_at = Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).unwrap();
        store
            .schedule(&[reminder(3, Trigger::At { fire_at, allow_while_idle: true })])
            .await
            .unwrap();

        store.perform_action(NotificationId(3), TAP_ACTION_ID).await.unwrap();

        assert!(store.get_pending().await.unwrap().is_empty());
    }
}
