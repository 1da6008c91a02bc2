use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use crate::error::AuthServiceError;
use crate::state::AppState;
use crate::usecase::email::VerifyEmailUseCase;

// ── POST /auth/email/verification ────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyEmailRequest {
    pub token: String,
}

pub async fn verify_email(
    State(state): State<AppState>,
    Json(body): Json<VerifyEmailRequest>,
) -> Result<StatusCode, AuthServiceError> {
    let usecase = VerifyEmailUseCase {
        store: state.user_store(),
        tokens: state.tokens.clone(),
    };
    usecase.execute(&body.token).await?;
    Ok(StatusCode::NO_CONTENT)
}
