//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers the UI shell calls into, and the master
//! definition for the OpenAPI specification.

use crate::web::auth::{AuthStateResponse, SignInRequest};
use crate::web::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use chrono::{DateTime, Utc};
use medtrack_core::{
    DoseEntry, DoseStatus, LocalNotification, Medication, NotificationId, NotificationPayload,
    NotificationScheduler, PortError, ReminderError, ScheduleTime, Trigger, User,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, warn};
use utoipa::{OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::auth::sign_in_handler,
        crate::web::auth::sign_out_handler,
        crate::web::auth::current_session_handler,
        request_permissions_handler,
        schedule_reminders_handler,
        cancel_reminders_handler,
        list_pending_handler,
        perform_action_handler,
        record_dose_handler,
        list_diagnostics_handler,
    ),
    components(
        schemas(
            SignInRequest,
            AuthStateResponse,
            PermissionResponse,
            MedicationRequest,
            ScheduleResponse,
            CancelResponse,
            PendingNotificationView,
            ActionResponse,
            RecordDoseRequest,
            DoseResponse,
            ToastView,
        )
    ),
    tags(
        (name = "Medication Reminder API", description = "Local reminder scheduling and dose tracking.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Serialize, Deserialize, ToSchema)]
pub struct PermissionResponse {
    pub granted: bool,
}

/// A medication as the UI edits it. Times are `HH:MM`.
#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MedicationRequest {
    pub id: String,
    pub name: String,
    pub dosage: String,
    pub unit: String,
    pub user_id: String,
    #[serde(default)]
    pub schedule: Vec<String>,
}

impl MedicationRequest {
    fn into_domain(self) -> Result<Medication, (StatusCode, String)> {
        let schedule = self
            .schedule
            .iter()
            .map(|time| time.parse::<ScheduleTime>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

        Ok(Medication {
            id: self.id,
            name: self.name,
            dosage: self.dosage,
            unit: self.unit,
            user_id: self.user_id,
            schedule,
        })
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleResponse {
    pub medication_id: String,
    pub cancelled: usize,
    pub scheduled: Vec<i32>,
    /// Why stale reminders could not be cleared, if they could not.
    pub cancel_error: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CancelResponse {
    pub medication_id: String,
    pub cancelled: usize,
}

#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PendingNotificationView {
    pub id: i32,
    pub title: String,
    pub body: String,
    /// `HH:MM` for daily reminders.
    pub daily_at: Option<String>,
    /// Set for snoozed, one-shot reminders.
    pub fire_at: Option<DateTime<Utc>>,
    pub medication_id: Option<String>,
    pub scheduled_time: Option<String>,
}

impl From<LocalNotification> for PendingNotificationView {
    fn from(notification: LocalNotification) -> Self {
        let (daily_at, fire_at) = match notification.trigger {
            Trigger::Daily { at, .. } => (Some(at.to_string()), None),
            Trigger::At { fire_at, .. } => (None, Some(fire_at)),
        };
        let payload = NotificationPayload::from_extra(&notification.extra);

        Self {
            id: notification.id.0,
            title: notification.title,
            body: notification.body,
            daily_at,
            fire_at,
            medication_id: NotificationPayload::medication_id_of(&notification.extra)
                .map(str::to_string),
            scheduled_time: payload.map(|p| p.scheduled_time.to_string()),
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ActionResponse {
    /// Listeners the action was handed to.
    pub dispatched: usize,
}

#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordDoseRequest {
    pub medication_id: String,
    pub medication_name: Option<String>,
    pub scheduled_time: String,
    /// `taken`, `skipped` or `missed`.
    #[schema(value_type = String)]
    pub status: DoseStatus,
}

#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DoseResponse {
    pub id: String,
    pub medication_id: String,
    pub status: String,
    pub scheduled_time: String,
    pub action_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ToastView {
    pub message: String,
    pub shown_at: DateTime<Utc>,
}

//=========================================================================================
// Error Mapping
//=========================================================================================

fn reminder_failure(context: &str, e: ReminderError) -> (StatusCode, String) {
    error!("{}: {:?}", context, e);
    let status = match &e {
        ReminderError::PermissionDenied(_) => StatusCode::FORBIDDEN,
        ReminderError::Platform(PortError::NotFound(_)) => StatusCode::NOT_FOUND,
        ReminderError::InvalidId(_) => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, format!("{}: {}", context, e))
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Check, and if the OS still allows it, request notification permission.
#[utoipa::path(
    post,
    path = "/permissions/request",
    responses(
        (status = 200, description = "Whether notifications may be posted", body = PermissionResponse)
    )
)]
pub async fn request_permissions_handler(
    State(state): State<Arc<AppState>>,
) -> Json<PermissionResponse> {
    let granted = state.permissions.request_permissions().await;
    Json(PermissionResponse { granted })
}

/// Replace a medication's reminders with one daily reminder per schedule time.
#[utoipa::path(
    put,
    path = "/medications/{id}/reminders",
    request_body = MedicationRequest,
    responses(
        (status = 200, description = "Reminders scheduled", body = ScheduleResponse),
        (status = 400, description = "Malformed schedule or mismatched id"),
        (status = 401, description = "Not signed in"),
        (status = 403, description = "Notification permission not granted"),
        (status = 500, description = "Platform failure")
    ),
    params(
        ("id" = String, Path, description = "The medication id.")
    )
)]
pub async fn schedule_reminders_handler(
    State(state): State<Arc<AppState>>,
    Path(medication_id): Path<String>,
    Json(req): Json<MedicationRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if req.id != medication_id {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("Body id '{}' does not match path id '{}'", req.id, medication_id),
        ));
    }
    let medication = req.into_domain()?;

    let report = state
        .reminders
        .schedule_medication_reminders(&medication)
        .await
        .map_err(|e| reminder_failure("Failed to schedule reminders", e))?;

    Ok(Json(ScheduleResponse {
        medication_id: report.medication_id,
        cancelled: report.cancelled,
        scheduled: report.scheduled.into_iter().map(|id| id.0).collect(),
        cancel_error: report.cancel_error,
    }))
}

/// Cancel every pending reminder of a medication.
#[utoipa::path(
    delete,
    path = "/medications/{id}/reminders",
    responses(
        (status = 200, description = "Reminders cancelled", body = CancelResponse),
        (status = 401, description = "Not signed in"),
        (status = 500, description = "Platform failure")
    ),
    params(
        ("id" = String, Path, description = "The medication id.")
    )
)]
pub async fn cancel_reminders_handler(
    State(state): State<Arc<AppState>>,
    Path(medication_id): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let report = state
        .reminders
        .cancel_medication_reminders(&medication_id)
        .await
        .map_err(|e| reminder_failure("Failed to cancel reminders", e))?;

    Ok(Json(CancelResponse {
        medication_id,
        cancelled: report.cancelled,
    }))
}

/// List the platform's pending notifications.
#[utoipa::path(
    get,
    path = "/notifications/pending",
    responses(
        (status = 200, description = "Pending notifications", body = [PendingNotificationView])
    )
)]
pub async fn list_pending_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let pending = state.notifications.get_pending().await.map_err(|e| {
        error!("Failed to read pending notifications: {:?}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;
    let views: Vec<PendingNotificationView> = pending.into_iter().map(Into::into).collect();
    Ok(Json(views))
}

/// Deliver a user action on a pending notification, as the device would.
#[utoipa::path(
    post,
    path = "/notifications/{id}/actions/{action_id}",
    responses(
        (status = 202, description = "Action handed to listeners", body = ActionResponse),
        (status = 404, description = "Unknown notification or action")
    ),
    params(
        ("id" = i32, Path, description = "The notification id."),
        ("action_id" = String, Path, description = "`TAKE`, `SNOOZE` or `tap`.")
    )
)]
pub async fn perform_action_handler(
    State(state): State<Arc<AppState>>,
    Path((id, action_id)): Path<(i32, String)>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let dispatched = state
        .notifications
        .perform_action(NotificationId(id), &action_id)
        .await
        .map_err(|e| match e {
            PortError::NotFound(msg) => {
                warn!("Rejected notification action: {}", msg);
                (StatusCode::NOT_FOUND, msg)
            }
            other => {
                error!("Failed to perform notification action: {:?}", other);
                (StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
            }
        })?;

    Ok((StatusCode::ACCEPTED, Json(ActionResponse { dispatched })))
}

/// Record a dose outcome the user entered by hand, typically a skipped or missed dose.
#[utoipa::path(
    post,
    path = "/doses",
    request_body = RecordDoseRequest,
    responses(
        (status = 201, description = "Dose recorded", body = DoseResponse),
        (status = 400, description = "Invalid time or missing medication"),
        (status = 422, description = "Unknown status"),
        (status = 401, description = "Not signed in"),
        (status = 500, description = "Store failure")
    )
)]
pub async fn record_dose_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(req): Json<RecordDoseRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let status = req.status;
    let scheduled_time = req
        .scheduled_time
        .parse::<ScheduleTime>()
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    if req.medication_id.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "medicationId is required".to_string()));
    }

    // A missed dose was never acted upon.
    let action_at = (status != DoseStatus::Missed).then(|| state.clock.now());

    let dose = state
        .doses
        .record(
            &user,
            DoseEntry {
                medication_id: req.medication_id,
                medication_name: req.medication_name,
                scheduled_time,
                status,
                action_at,
            },
        )
        .await
        .map_err(|e| reminder_failure("Failed to record dose", e))?;

    Ok((
        StatusCode::CREATED,
        Json(DoseResponse {
            id: dose.id.unwrap_or_default(),
            medication_id: dose.medication_id,
            status: dose.status.to_string(),
            scheduled_time: dose.scheduled_time.to_string(),
            action_at: dose.action_at,
        }),
    ))
}

/// Recent diagnostic messages, oldest first.
#[utoipa::path(
    get,
    path = "/diagnostics",
    responses(
        (status = 200, description = "Recent toasts", body = [ToastView])
    )
)]
pub async fn list_diagnostics_handler(State(state): State<Arc<AppState>>) -> Json<Vec<ToastView>> {
    let toasts = state
        .toasts
        .recent()
        .await
        .into_iter()
        .map(|toast| ToastView {
            message: toast.message,
            shown_at: toast.shown_at,
        })
        .collect();
    Json(toasts)
}
