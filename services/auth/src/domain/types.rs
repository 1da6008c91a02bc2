use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of stored refresh tokens per user (oldest evicted first).
pub const MAX_REFRESH_TOKENS: usize = 5;

/// Failed login attempts that trigger a lockout.
pub const MAX_FAILED_LOGINS: i32 = 5;

/// Lockout duration in seconds (2 hours).
pub const LOCKOUT_SECS: i64 = 7200;

/// User role, stored as an i16 wire value, serialized by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Moderator,
    Admin,
}

impl UserRole {
    pub fn as_i16(self) -> i16 {
        match self {
            Self::User => 0,
            Self::Moderator => 1,
            Self::Admin => 2,
        }
    }

    /// Unknown wire values fall back to the least-privileged role.
    pub fn from_i16(value: i16) -> Self {
        match value {
            1 => Self::Moderator,
            2 => Self::Admin,
            _ => Self::User,
        }
    }
}

impl Default for UserRole {
    fn default() -> Self {
        Self::User
    }
}

/// A refresh token tracked server-side for revocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshTokenRecord {
    pub token: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// A pending single-use secret (email verification or password reset):
/// the signed token string plus its absolute expiry. The stored expiry is
/// checked in addition to the token's own signature expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSecret {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl StoredSecret {
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// User account — the sole aggregate root. Never hard-deleted; the
/// `active` flag is the only removal path.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub handle: String,
    pub email: String,
    pub password_hash: String,
    pub display_name: String,
    pub role: UserRole,
    pub email_verified: bool,
    pub active: bool,
    pub failed_logins: i32,
    pub lock_until: Option<DateTime<Utc>>,
    pub refresh_tokens: Vec<RefreshTokenRecord>,
    pub verification_secret: Option<StoredSecret>,
    pub reset_secret: Option<StoredSecret>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Locked = lock_until set and still in the future.
    pub fn is_locked(&self) -> bool {
        matches!(self.lock_until, Some(until) if until > Utc::now())
    }

    /// Lock present but already elapsed.
    pub fn lock_expired(&self) -> bool {
        matches!(self.lock_until, Some(until) if until <= Utc::now())
    }

    /// Strip everything secret before the user crosses a boundary.
    pub fn sanitized(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            handle: self.handle.clone(),
            email: self.email.clone(),
            display_name: self.display_name.clone(),
            role: self.role,
            email_verified: self.email_verified,
            active: self.active,
            last_login_at: self.last_login_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Outward-facing view of a user: no hash, no token list, no secrets.
#[derive(Debug, Clone, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub handle: String,
    pub email: String,
    pub display_name: String,
    pub role: UserRole,
    pub email_verified: bool,
    pub active: bool,
    #[serde(serialize_with = "latchkey_core::serde::opt_to_rfc3339_ms")]
    pub last_login_at: Option<DateTime<Utc>>,
    #[serde(serialize_with = "latchkey_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "latchkey_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

/// Append a refresh token: evict the oldest beyond capacity, then prune
/// entries that have already expired (best-effort housekeeping).
pub fn push_refresh_token(tokens: &mut Vec<RefreshTokenRecord>, record: RefreshTokenRecord) {
    tokens.push(record);
    while tokens.len() > MAX_REFRESH_TOKENS {
        tokens.remove(0);
    }
    let now = Utc::now();
    tokens.retain(|t| t.expires_at > now);
}
