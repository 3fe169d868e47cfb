pub mod auth;
pub mod middleware;
pub mod rest;
pub mod state;

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

pub use middleware::require_signed_in;
pub use state::AppState;

/// Builds the API router. CORS and the Swagger UI are layered on by the binary.
pub fn router(app_state: Arc<AppState>) -> Router {
    // Routes open to a signed-out shell
    let public_routes = Router::new()
        .route(
            "/auth/session",
            post(auth::sign_in_handler)
                .delete(auth::sign_out_handler)
                .get(auth::current_session_handler),
        )
        .route("/permissions/request", post(rest::request_permissions_handler))
        .route("/notifications/pending", get(rest::list_pending_handler))
        .route(
            "/notifications/{id}/actions/{action_id}",
            post(rest::perform_action_handler),
        )
        .route("/diagnostics", get(rest::list_diagnostics_handler));

    // Routes acting for the signed-in user
    let protected_routes = Router::new()
        .route(
            "/medications/{id}/reminders",
            put(rest::schedule_reminders_handler).delete(rest::cancel_reminders_handler),
        )
        .route("/doses", post(rest::record_dose_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_signed_in,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(app_state)
}
