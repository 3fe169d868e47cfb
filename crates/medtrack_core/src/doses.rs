//! crates/medtrack_core/src/doses.rs
//!
//! Append-only log of dose outcomes in the remote document store.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;

use crate::domain::{Dose, DoseStatus, ScheduleTime, User};
use crate::error::ReminderError;
use crate::ports::DocumentStore;

/// What the caller knows about a dose when it records one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoseEntry {
    pub medication_id: String,
    pub medication_name: Option<String>,
    pub scheduled_time: ScheduleTime,
    pub status: DoseStatus,
    /// Left empty for doses that were missed.
    pub action_at: Option<DateTime<Utc>>,
}

#[derive(Clone)]
pub struct DoseLog {
    store: Arc<dyn DocumentStore>,
    collection: String,
}

impl DoseLog {
    pub fn new(store: Arc<dyn DocumentStore>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    /// Writes one dose for `user` and returns it with the store-assigned id.
    pub async fn record(&self, user: &User, entry: DoseEntry) -> Result<Dose, ReminderError> {
        let mut dose = Dose {
            id: None,
            medication_id: entry.medication_id,
            medication_name: entry.medication_name,
            user_id: user.uid.clone(),
            action_at: entry.action_at,
            scheduled_time: entry.scheduled_time,
            status: entry.status,
        };

        let record = serde_json::to_value(&dose)?;
        let id = self.store.add_record(&self.collection, record).await?;
        info!(
            dose_id = %id,
            medication_id = %dose.medication_id,
            status = %dose.status,
            "Recorded dose"
        );

        dose.id = Some(id);
        Ok(dose)
    }
}
