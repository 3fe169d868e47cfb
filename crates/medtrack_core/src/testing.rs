//! Hand-written fakes of the ports for unit tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};

use crate::domain::{
    ActionType, LocalNotification, Medication, NotificationId, NotificationPayload,
    PermissionState, User,
};
use crate::ports::{
    ActionListener, AuthContext, Clock, DiagnosticSurface, DocumentStore, NotificationScheduler,
    PortError, PortResult,
};

pub fn medication(id: &str, schedule: &[&str]) -> Medication {
    Medication {
        id: id.to_string(),
        name: "Ibuprofen".to_string(),
        dosage: "200".to_string(),
        unit: "mg".to_string(),
        user_id: "user-1".to_string(),
        schedule: schedule.iter().map(|t| t.parse().unwrap()).collect(),
    }
}

pub fn user(uid: &str) -> User {
    User {
        uid: uid.to_string(),
        email: None,
    }
}

struct NotificationState {
    permission: PermissionState,
    prompt_answer: PermissionState,
    permission_requests: usize,
    pending: Vec<LocalNotification>,
    schedule_batches: Vec<usize>,
    cancel_calls: usize,
    action_types: Vec<ActionType>,
    failure: Option<(&'static str, PortError)>,
}

pub struct FakeNotifications {
    state: Mutex<NotificationState>,
}

impl Default for FakeNotifications {
    fn default() -> Self {
        Self::with_permission(PermissionState::Granted)
    }
}

impl FakeNotifications {
    pub fn with_permission(permission: PermissionState) -> Self {
        Self {
            state: Mutex::new(NotificationState {
                permission,
                prompt_answer: PermissionState::Denied,
                permission_requests: 0,
                pending: Vec::new(),
                schedule_batches: Vec::new(),
                cancel_calls: 0,
                action_types: Vec::new(),
                failure: None,
            }),
        }
    }

    pub fn answer_prompt_with(&self, state: PermissionState) {
        self.state.lock().unwrap().prompt_answer = state;
    }

    pub fn fail_on(&self, call: &'static str, err: PortError) {
        self.state.lock().unwrap().failure = Some((call, err));
    }

    pub fn permission_requests(&self) -> usize {
        self.state.lock().unwrap().permission_requests
    }

    pub fn schedule_batches(&self) -> Vec<usize> {
        self.state.lock().unwrap().schedule_batches.clone()
    }

    pub fn cancel_calls(&self) -> usize {
        self.state.lock().unwrap().cancel_calls
    }

    pub fn registered_action_types(&self) -> Vec<ActionType> {
        self.state.lock().unwrap().action_types.clone()
    }

    pub fn pending_for(&self, medication_id: &str) -> Vec<LocalNotification> {
        self.state
            .lock()
            .unwrap()
            .pending
            .iter()
            .filter(|n| NotificationPayload::medication_id_of(&n.extra) == Some(medication_id))
            .cloned()
            .collect()
    }

    fn check(&self, call: &str) -> PortResult<()> {
        match &self.state.lock().unwrap().failure {
            Some((failing, err)) if *failing == call => Err(err.clone()),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl NotificationScheduler for FakeNotifications {
    async fn check_permissions(&self) -> PortResult<PermissionState> {
        self.check("check_permissions")?;
        Ok(self.state.lock().unwrap().permission)
    }

    async fn request_permissions(&self) -> PortResult<PermissionState> {
        self.check("request_permissions")?;
        let mut state = self.state.lock().unwrap();
        state.permission_requests += 1;
        state.permission = state.prompt_answer;
        Ok(state.permission)
    }

    async fn get_pending(&self) -> PortResult<Vec<LocalNotification>> {
        self.check("get_pending")?;
        Ok(self.state.lock().unwrap().pending.clone())
    }

    async fn schedule(&self, notifications: &[LocalNotification]) -> PortResult<()> {
        self.check("schedule")?;
        let mut state = self.state.lock().unwrap();
        state.schedule_batches.push(notifications.len());
        for notification in notifications {
            state.pending.retain(|n| n.id != notification.id);
            state.pending.push(notification.clone());
        }
        Ok(())
    }

    async fn cancel(&self, ids: &[NotificationId]) -> PortResult<()> {
        self.check("cancel")?;
        let mut state = self.state.lock().unwrap();
        state.cancel_calls += 1;
        state.pending.retain(|n| !ids.contains(&n.id));
        Ok(())
    }

    async fn register_action_types(&self, types: &[ActionType]) -> PortResult<()> {
        self.check("register_action_types")?;
        self.state.lock().unwrap().action_types = types.to_vec();
        Ok(())
    }

    async fn on_action_performed(&self, _listener: Arc<dyn ActionListener>) -> PortResult<()> {
        self.check("on_action_performed")?;
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingDiagnostics {
    messages: Mutex<Vec<String>>,
}

impl RecordingDiagnostics {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl DiagnosticSurface for RecordingDiagnostics {
    async fn show(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

#[derive(Default)]
pub struct FakeStore {
    records: Mutex<Vec<(String, serde_json::Value)>>,
    failure: Option<PortError>,
}

impl FakeStore {
    pub fn failing(err: PortError) -> Self {
        Self {
            records: Mutex::default(),
            failure: Some(err),
        }
    }

    pub fn records(&self) -> Vec<(String, serde_json::Value)> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentStore for FakeStore {
    async fn add_record(&self, collection: &str, record: serde_json::Value) -> PortResult<String> {
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        let mut records = self.records.lock().unwrap();
        records.push((collection.to_string(), record));
        Ok(format!("doc-{}", records.len()))
    }
}

pub struct FakeAuth(Option<User>);

impl FakeAuth {
    pub fn new(user: Option<User>) -> Self {
        Self(user)
    }
}

impl AuthContext for FakeAuth {
    fn current_user(&self) -> Option<User> {
        self.0.clone()
    }
}

pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
