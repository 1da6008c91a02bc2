pub mod email;
pub mod login;
pub mod password;
pub mod profile;
pub mod register;
pub mod token;

use anyhow::Context as _;

use crate::error::AuthServiceError;

/// Fixed bcrypt work factor (12 rounds).
pub const BCRYPT_COST: u32 = bcrypt::DEFAULT_COST;

/// Hash a plaintext password. The hash is the only form ever persisted.
pub fn hash_password(password: &str) -> Result<String, AuthServiceError> {
    let hash = bcrypt::hash(password, BCRYPT_COST).context("hash password")?;
    Ok(hash)
}

/// Compare a plaintext password against a stored hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthServiceError> {
    let ok = bcrypt::verify(password, hash).context("verify password")?;
    Ok(ok)
}
