//! services/api/src/web/auth.rs
//!
//! Endpoints through which the UI shell reports auth state changes from the
//! identity provider.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use medtrack_core::User;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::adapters::AuthState;
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Serialize, Deserialize, ToSchema)]
pub struct SignInRequest {
    pub uid: String,
    pub email: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthStateResponse {
    pub uid: Option<String>,
    pub email: Option<String>,
    pub is_auth_ready: bool,
    pub is_logged_in: bool,
}

impl From<AuthState> for AuthStateResponse {
    fn from(state: AuthState) -> Self {
        let is_logged_in = state.is_logged_in();
        let (uid, email) = match state.user {
            Some(user) => (Some(user.uid), user.email),
            None => (None, None),
        };
        Self {
            uid,
            email,
            is_auth_ready: state.is_auth_ready,
            is_logged_in,
        }
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/session - Report a signed-in user
#[utoipa::path(
    post,
    path = "/auth/session",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "User signed in", body = AuthStateResponse),
        (status = 400, description = "Missing uid")
    )
)]
pub async fn sign_in_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignInRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if req.uid.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "uid is required".to_string()));
    }

    state.auth.set_auth(Some(User {
        uid: req.uid,
        email: req.email,
    }));

    Ok(Json(AuthStateResponse::from(state.auth.snapshot())))
}

/// DELETE /auth/session - Report that the user signed out
#[utoipa::path(
    delete,
    path = "/auth/session",
    responses(
        (status = 200, description = "Signed out", body = AuthStateResponse)
    )
)]
pub async fn sign_out_handler(State(state): State<Arc<AppState>>) -> Json<AuthStateResponse> {
    state.auth.set_auth(None);
    Json(AuthStateResponse::from(state.auth.snapshot()))
}

/// GET /auth/session - Current auth state
#[utoipa::path(
    get,
    path = "/auth/session",
    responses(
        (status = 200, description = "Current auth state", body = AuthStateResponse)
    )
)]
pub async fn current_session_handler(State(state): State<Arc<AppState>>) -> Json<AuthStateResponse> {
    Json(AuthStateResponse::from(state.auth.snapshot()))
}
