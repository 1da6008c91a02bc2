use tracing::info;

use crate::domain::repository::TokenDelivery;
use crate::error::AuthServiceError;

/// Delivery channel that records issuance and drops the token. Mail
/// transport lives outside this service; the token value itself is never
/// logged.
#[derive(Clone)]
pub struct LogDelivery;

impl TokenDelivery for LogDelivery {
    async fn verification_issued(&self, email: &str, _token: &str) -> Result<(), AuthServiceError> {
        info!(email, "email verification token issued");
        Ok(())
    }

    async fn reset_issued(&self, email: &str, _token: &str) -> Result<(), AuthServiceError> {
        info!(email, "password reset token issued");
        Ok(())
    }
}
