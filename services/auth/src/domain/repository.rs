#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::types::{RefreshTokenRecord, StoredSecret, User};
use crate::error::AuthServiceError;

/// Typed single-document patch applied atomically by the store — the
/// set/unset/inc contract of the persistence layer. Each lifecycle step
/// mutates the user record with exactly one `apply` call; there is no
/// cross-step transaction (concurrent requests for the same user are an
/// accepted weak-consistency window, see `usecase::login`).
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub inc_failed_logins: Option<i32>,
    pub set_failed_logins: Option<i32>,
    pub set_lock_until: Option<DateTime<Utc>>,
    pub clear_lock_until: bool,
    pub set_last_login_at: Option<DateTime<Utc>>,
    pub set_refresh_tokens: Option<Vec<RefreshTokenRecord>>,
    pub set_password_hash: Option<String>,
    pub set_email_verified: Option<bool>,
    pub set_verification_secret: Option<StoredSecret>,
    pub clear_verification_secret: bool,
    pub set_reset_secret: Option<StoredSecret>,
    pub clear_reset_secret: bool,
    pub set_active: Option<bool>,
}

/// Store for user records. Uniqueness of `handle` and `email` is enforced
/// by the store itself; `create` surfaces violations as the field-specific
/// conflict errors.
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthServiceError>;

    async fn find_by_handle(&self, handle: &str) -> Result<Option<User>, AuthServiceError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthServiceError>;

    /// Look up by handle OR email — the login identifier.
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<User>, AuthServiceError>;

    /// Insert a new user. `HandleTaken`/`EmailTaken` on unique violation.
    async fn create(&self, user: &User) -> Result<(), AuthServiceError>;

    /// Apply one atomic patch. `UserNotFound` when no row matches.
    async fn apply(&self, id: Uuid, update: UserUpdate) -> Result<(), AuthServiceError>;
}

/// Out-of-band delivery channel for verification and reset tokens.
/// Actual transport (email or otherwise) is outside this service; the
/// production implementation records issuance and discards the token.
pub trait TokenDelivery: Send + Sync {
    async fn verification_issued(&self, email: &str, token: &str) -> Result<(), AuthServiceError>;

    async fn reset_issued(&self, email: &str, token: &str) -> Result<(), AuthServiceError>;
}
