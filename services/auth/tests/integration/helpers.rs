use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};
use uuid::Uuid;

use latchkey_auth::domain::repository::{TokenDelivery, UserStore, UserUpdate};
use latchkey_auth::domain::types::{User, UserRole};
use latchkey_auth::error::AuthServiceError;
use latchkey_auth::token::{TokenIssuer, TokenSecrets};

// ── MockUserStore ────────────────────────────────────────────────────────────

/// In-memory store applying `UserUpdate` patches with the same semantics
/// as the database implementation. Clones share the underlying list so
/// tests can inspect state after a usecase runs.
#[derive(Clone)]
pub struct MockUserStore {
    pub users: Arc<Mutex<Vec<User>>>,
}

impl MockUserStore {
    pub fn new(users: Vec<User>) -> Self {
        Self {
            users: Arc::new(Mutex::new(users)),
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }

    pub fn get(&self, id: Uuid) -> Option<User> {
        self.users.lock().unwrap().iter().find(|u| u.id == id).cloned()
    }
}

impl UserStore for MockUserStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthServiceError> {
        Ok(self.get(id))
    }

    async fn find_by_handle(&self, handle: &str) -> Result<Option<User>, AuthServiceError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.handle == handle)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthServiceError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<User>, AuthServiceError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.handle == identifier || u.email == identifier)
            .cloned())
    }

    async fn create(&self, user: &User) -> Result<(), AuthServiceError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.handle == user.handle) {
            return Err(AuthServiceError::HandleTaken);
        }
        if users.iter().any(|u| u.email == user.email) {
            return Err(AuthServiceError::EmailTaken);
        }
        users.push(user.clone());
        Ok(())
    }

    async fn apply(&self, id: Uuid, update: UserUpdate) -> Result<(), AuthServiceError> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(AuthServiceError::UserNotFound)?;

        if let Some(n) = update.inc_failed_logins {
            user.failed_logins += n;
        }
        if let Some(n) = update.set_failed_logins {
            user.failed_logins = n;
        }
        if let Some(at) = update.set_lock_until {
            user.lock_until = Some(at);
        }
        if update.clear_lock_until {
            user.lock_until = None;
        }
        if let Some(at) = update.set_last_login_at {
            user.last_login_at = Some(at);
        }
        if let Some(records) = update.set_refresh_tokens {
            user.refresh_tokens = records;
        }
        if let Some(hash) = update.set_password_hash {
            user.password_hash = hash;
        }
        if let Some(verified) = update.set_email_verified {
            user.email_verified = verified;
        }
        if let Some(secret) = update.set_verification_secret {
            user.verification_secret = Some(secret);
        }
        if update.clear_verification_secret {
            user.verification_secret = None;
        }
        if let Some(secret) = update.set_reset_secret {
            user.reset_secret = Some(secret);
        }
        if update.clear_reset_secret {
            user.reset_secret = None;
        }
        if let Some(active) = update.set_active {
            user.active = active;
        }
        user.updated_at = Utc::now();
        Ok(())
    }
}

// ── CapturingDelivery ────────────────────────────────────────────────────────

/// Delivery channel that captures issued tokens for inspection.
#[derive(Clone, Default)]
pub struct CapturingDelivery {
    pub verification: Arc<Mutex<Vec<(String, String)>>>,
    pub reset: Arc<Mutex<Vec<(String, String)>>>,
}

impl TokenDelivery for CapturingDelivery {
    async fn verification_issued(&self, email: &str, token: &str) -> Result<(), AuthServiceError> {
        self.verification
            .lock()
            .unwrap()
            .push((email.to_owned(), token.to_owned()));
        Ok(())
    }

    async fn reset_issued(&self, email: &str, token: &str) -> Result<(), AuthServiceError> {
        self.reset
            .lock()
            .unwrap()
            .push((email.to_owned(), token.to_owned()));
        Ok(())
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

pub const TEST_PASSWORD: &str = "Correct-horse1";

pub fn test_issuer() -> TokenIssuer {
    TokenIssuer::new(TokenSecrets {
        access: "test-access-secret".into(),
        refresh: "test-refresh-secret".into(),
        email_verification: "test-verification-secret".into(),
        password_reset: "test-reset-secret".into(),
    })
}

/// bcrypt's minimum cost factor; the crate does not export this constant.
const MIN_BCRYPT_COST: u32 = 4;

/// A verified, active user whose password is `TEST_PASSWORD`.
/// Hashed at minimum cost to keep the suite fast.
pub fn test_user() -> User {
    let now = Utc::now();
    User {
        id: Uuid::now_v7(),
        handle: "ada".into(),
        email: "ada@example.com".into(),
        password_hash: bcrypt::hash(TEST_PASSWORD, MIN_BCRYPT_COST).unwrap(),
        display_name: "Ada Lovelace".into(),
        role: UserRole::User,
        email_verified: true,
        active: true,
        failed_logins: 0,
        lock_until: None,
        refresh_tokens: Vec::new(),
        verification_secret: None,
        reset_secret: None,
        last_login_at: None,
        created_at: now - Duration::days(1),
        updated_at: now - Duration::days(1),
    }
}
