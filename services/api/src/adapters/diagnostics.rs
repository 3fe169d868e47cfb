//! services/api/src/adapters/diagnostics.rs
//!
//! Implements the `DiagnosticSurface` port. Every toast goes to the log under
//! the `toast` target, and the most recent ones are kept so the UI shell can
//! show them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use medtrack_core::{Clock, DiagnosticSurface};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub message: String,
    pub shown_at: DateTime<Utc>,
}

pub struct ToastLog {
    capacity: usize,
    clock: Arc<dyn Clock>,
    recent: Mutex<VecDeque<Toast>>,
}

impl ToastLog {
    pub fn new(capacity: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            capacity,
            clock,
            recent: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Oldest first.
    pub async fn recent(&self) -> Vec<Toast> {
        self.recent.lock().await.iter().cloned().collect()
    }
}

#[async_trait]
impl DiagnosticSurface for ToastLog {
    async fn show(&self, message: &str) {
        info!(target: "toast", "{}", message);
        if self.capacity == 0 {
            return;
        }

        let mut recent = self.recent.lock().await;
        if recent.len() == self.capacity {
            recent.pop_front();
        }
        recent.push_back(Toast {
            message: message.to_string(),
            shown_at: self.clock.now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn at(minute: u32) -> Arc<dyn Clock> {
        Arc::new(FixedClock(Utc.with_ymd_and_hms(2026, 2, 1, 9, minute, 0).unwrap()))
    }

    #[tokio::test]
    async fn keeps_only_the_latest_messages() {
        let log = ToastLog::new(2, at(0));
        log.show("one").await;
        log.show("two").await;
        log.show("three").await;

        let messages: Vec<_> = log.recent().await.into_iter().map(|t| t.message).collect();
        assert_eq!(messages, ["two", "three"]);
    }

    #[tokio::test]
    async fn zero_capacity_keeps_nothing() {
        let log = ToastLog::new(0, at(0));
        log.show("dropped").await;
        assert!(log.recent().await.is_empty());
    }

    #[tokio::test]
    async fn stamps_toasts_with_the_injected_clock() {
        let log = ToastLog::new(5, at(30));
        log.show("Checking permissions...").await;

        let toasts = log.recent().await;
        assert_eq!(
            toasts,
            [Toast {
                message: "Checking permissions...".to_string(),
                shown_at: Utc.with_ymd_and_hms(2026, 2, 1, 9, 30, 0).unwrap(),
            }]
        );
    }
}
