//! Account password storage.
//!
//! Stored hashes are Argon2id PHC strings, so the algorithm parameters and
//! salt travel with the hash and older hashes keep verifying if the defaults
//! change.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

/// Hashing failed, or a stored hash could not be parsed.
#[derive(Debug, thiserror::Error)]
#[error("Password hash error: {0}")]
pub struct PasswordError(argon2::password_hash::Error);

/// Hash a new password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(PasswordError)
}

/// Check a login attempt against the stored hash.
///
/// A wrong password is `Ok(false)`; only an unreadable stored hash is an error.
pub fn password_matches(password: &str, stored: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(stored).map_err(PasswordError)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError(e)),
    }
}
