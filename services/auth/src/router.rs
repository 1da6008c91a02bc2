use axum::{
    Router,
    routing::{delete, get, patch, post},
};
use tower_http::trace::TraceLayer;

use latchkey_core::health::{healthz, readyz};
use latchkey_core::middleware::request_id_layer;

use crate::handlers::{
    auth::{login, register},
    email::verify_email,
    password::{change_password, request_password_reset, reset_password},
    token::{logout, refresh_token},
    user::get_me,
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Registration
        .route("/auth/register", post(register))
        // Token
        .route("/auth/token", post(login))
        .route("/auth/token", patch(refresh_token))
        .route("/auth/token", delete(logout))
        // Email verification
        .route("/auth/email/verification", post(verify_email))
        // Password
        .route("/auth/password/recovery", post(request_password_reset))
        .route("/auth/password/reset", post(reset_password))
        .route("/auth/password", patch(change_password))
        // Profile
        .route("/users/@me", get(get_me))
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
