//! services/api/src/web/middleware.rs
//!
//! Guard for routes that act on behalf of the signed-in user.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use medtrack_core::AuthContext;
use std::sync::Arc;
use tracing::warn;

use crate::web::state::AppState;

/// Middleware that reads the signed-in user from the auth store.
///
/// If present, inserts the `User` into request extensions for handlers to use.
/// Otherwise returns 401 Unauthorized.
pub async fn require_signed_in(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let user = state.auth.current_user().ok_or_else(|| {
        warn!("Rejected {} {}: no signed-in user", req.method(), req.uri().path());
        StatusCode::UNAUTHORIZED
    })?;

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}
