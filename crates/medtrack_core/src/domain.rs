//! crates/medtrack_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! The serde shapes match the documents and notification payloads the mobile
//! shell already stores, so field names are camelCase on the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

//=========================================================================================
// Time of Day
//=========================================================================================

/// A time of day in a medication's schedule, written as `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ScheduleTime {
    hour: u8,
    minute: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleTimeError {
    #[error("expected a time formatted as HH:MM, got '{0}'")]
    Malformed(String),
    #[error("time of day out of range: {0}")]
    OutOfRange(String),
}

impl ScheduleTime {
    pub fn new(hour: u8, minute: u8) -> Result<Self, ScheduleTimeError> {
        if hour > 23 || minute > 59 {
            return Err(ScheduleTimeError::OutOfRange(format!("{hour}:{minute:02}")));
        }
        Ok(Self { hour, minute })
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }
}

impl FromStr for ScheduleTime {
    type Err = ScheduleTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ScheduleTimeError::Malformed(s.to_string());
        let (hour, minute) = s.trim().split_once(':').ok_or_else(malformed)?;

        let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(hour) || !all_digits(minute) || hour.len() > 2 || minute.len() != 2 {
            return Err(malformed());
        }

        let hour = hour.parse::<u8>().map_err(|_| malformed())?;
        let minute = minute.parse::<u8>().map_err(|_| malformed())?;
        Self::new(hour, minute)
    }
}

impl TryFrom<String> for ScheduleTime {
    type Error = ScheduleTimeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ScheduleTime> for String {
    fn from(value: ScheduleTime) -> Self {
        value.to_string()
    }
}

impl fmt::Display for ScheduleTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

//=========================================================================================
// Users, Medications and Doses
//=========================================================================================

/// The signed-in identity, as reported by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub uid: String,
    pub email: Option<String>,
}

/// A medication the user takes on a daily schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medication {
    pub id: String,
    pub name: String,
    /// Amount per dose, e.g. "500" or "1".
    pub dosage: String,
    /// e.g. "mg", "tablet(s)".
    pub unit: String,
    pub user_id: String,
    #[serde(default)]
    pub schedule: Vec<ScheduleTime>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DoseStatus {
    Taken,
    Skipped,
    Missed,
}

impl fmt::Display for DoseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Taken => write!(f, "taken"),
            Self::Skipped => write!(f, "skipped"),
            Self::Missed => write!(f, "missed"),
        }
    }
}

/// One recorded outcome for a scheduled dose. Append-only once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dose {
    /// Assigned by the document store on write.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub medication_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medication_name: Option<String>,
    pub user_id: String,
    /// When the user acted. A missed dose has no action time.
    pub action_at: Option<DateTime<Utc>>,
    pub scheduled_time: ScheduleTime,
    pub status: DoseStatus,
}

//=========================================================================================
// Local Notifications
//=========================================================================================

/// The platform's notification id type is a 32-bit signed integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(pub i32);

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// When a local notification fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Trigger {
    /// Repeats every day at the given time.
    Daily {
        at: ScheduleTime,
        allow_while_idle: bool,
    },
    /// Fires once.
    At {
        fire_at: DateTime<Utc>,
        allow_while_idle: bool,
    },
}

/// A local notification, both as submitted for scheduling and as read back
/// from the platform's pending set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalNotification {
    pub id: NotificationId,
    pub title: String,
    pub body: String,
    pub trigger: Trigger,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_type_id: Option<String>,
    /// Opaque key/value bag handed back untouched by the platform.
    #[serde(default)]
    pub extra: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub small_icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sound: Option<String>,
}

/// The payload a reminder carries in its `extra` bag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    pub medication_id: String,
    pub scheduled_time: ScheduleTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medication: Option<Medication>,
}

impl NotificationPayload {
    /// Reads just the medication id out of an opaque `extra` bag.
    pub fn medication_id_of(extra: &serde_json::Value) -> Option<&str> {
        extra.get("medicationId").and_then(serde_json::Value::as_str)
    }

    /// Reads a payload needing only a non-empty `medicationId` and a valid
    /// `scheduledTime`. A snapshot that does not parse is dropped, not fatal.
    pub fn from_extra(extra: &serde_json::Value) -> Option<Self> {
        let medication_id = Self::medication_id_of(extra).filter(|id| !id.is_empty())?;
        let scheduled_time = extra
            .get("scheduledTime")?
            .as_str()?
            .parse::<ScheduleTime>()
            .ok()?;
        let medication = extra
            .get("medication")
            .and_then(|snapshot| Medication::deserialize(snapshot).ok());

        Some(Self {
            medication_id: medication_id.to_string(),
            scheduled_time,
            medication,
        })
    }
}

//=========================================================================================
// Permissions and Actions
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PermissionState {
    Granted,
    Denied,
    Prompt,
    PromptWithRationale,
}

impl fmt::Display for PermissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Granted => write!(f, "granted"),
            Self::Denied => write!(f, "denied"),
            Self::Prompt => write!(f, "prompt"),
            Self::PromptWithRationale => write!(f, "prompt-with-rationale"),
        }
    }
}

/// A button shown on a delivered notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub id: String,
    pub title: String,
}

/// A named group of buttons, referenced by `LocalNotification::action_type_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionType {
    pub id: String,
    pub actions: Vec<NotificationAction>,
}

/// Raised by the platform when the user interacts with a delivered notification.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionPerformed {
    pub action_id: String,
    pub notification: LocalNotification,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn schedule_time_parses_and_pads() {
        let time: ScheduleTime = "8:05".parse().unwrap();
        assert_eq!(time.hour(), 8);
        assert_eq!(time.minute(), 5);
        assert_eq!(time.to_string(), "08:05");
    }

    #[test]
    fn schedule_time_rejects_garbage() {
        assert!(matches!("".parse::<ScheduleTime>(), Err(ScheduleTimeError::Malformed(_))));
        assert!(matches!("0800".parse::<ScheduleTime>(), Err(ScheduleTimeError::Malformed(_))));
        assert!(matches!("8:5".parse::<ScheduleTime>(), Err(ScheduleTimeError::Malformed(_))));
        assert!(matches!("ab:cd".parse::<ScheduleTime>(), Err(ScheduleTimeError::Malformed(_))));
        assert!(matches!("24:00".parse::<ScheduleTime>(), Err(ScheduleTimeError::OutOfRange(_))));
        assert!(matches!("12:60".parse::<ScheduleTime>(), Err(ScheduleTimeError::OutOfRange(_))));
    }

    #[test]
    fn medication_reads_camel_case_document() {
        let med: Medication = serde_json::from_value(json!({
            "id": "med-1234",
            "name": "Ibuprofen",
            "dosage": "200",
            "unit": "mg",
            "userId": "user-1",
            "schedule": ["08:00", "20:00"]
        }))
        .unwrap();

        assert_eq!(med.user_id, "user-1");
        assert_eq!(
            med.schedule,
            vec![ScheduleTime::new(8, 0).unwrap(), ScheduleTime::new(20, 0).unwrap()]
        );
    }

    #[test]
    fn dose_document_shape() {
        let dose = Dose {
            id: None,
            medication_id: "med-1".to_string(),
            medication_name: Some("Aspirin".to_string()),
            user_id: "user-1".to_string(),
            action_at: None,
            scheduled_time: ScheduleTime::new(9, 30).unwrap(),
            status: DoseStatus::Missed,
        };

        let value = serde_json::to_value(&dose).unwrap();
        assert_eq!(value["status"], "missed");
        assert_eq!(value["scheduledTime"], "09:30");
        assert_eq!(value["actionAt"], serde_json::Value::Null);
        assert!(value.get("id").is_none());
    }

    #[test]
    fn payload_medication_id_lookup() {
        let extra = json!({ "medicationId": "med-9", "scheduledTime": "07:00" });
        assert_eq!(NotificationPayload::medication_id_of(&extra), Some("med-9"));
        assert_eq!(NotificationPayload::medication_id_of(&json!({})), None);
        assert_eq!(NotificationPayload::medication_id_of(&serde_json::Value::Null), None);
    }

    #[test]
    fn payload_survives_a_partial_snapshot() {
        let extra = json!({
            "medicationId": "med-9",
            "scheduledTime": "07:00",
            "medication": { "id": "med-9", "name": "Warfarin" },
        });
        let payload = NotificationPayload::from_extra(&extra).unwrap();
        assert_eq!(payload.medication_id, "med-9");
        assert_eq!(payload.scheduled_time, ScheduleTime::new(7, 0).unwrap());
        assert_eq!(payload.medication, None);

        assert_eq!(NotificationPayload::from_extra(&json!({ "medicationId": "med-9" })), None);
        assert_eq!(
            NotificationPayload::from_extra(&json!({ "medicationId": "", "scheduledTime": "07:00" })),
            None
        );
    }

    #[test]
    fn permission_state_uses_platform_names() {
        let state: PermissionState = serde_json::from_value(json!("prompt-with-rationale")).unwrap();
        assert_eq!(state, PermissionState::PromptWithRationale);
        assert_eq!(state.to_string(), "prompt-with-rationale");
    }
}
