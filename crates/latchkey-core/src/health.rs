use axum::http::StatusCode;

/// Handler for `GET /healthz` — liveness. Answers as long as the process
/// accepts connections.
pub async fn healthz() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

/// Handler for `GET /readyz` — readiness. Services with external
/// dependencies may mount a richer check of their own instead.
pub async fn readyz() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}
