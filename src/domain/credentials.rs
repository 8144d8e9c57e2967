//! Password hashing and session token generation.
//!
//! - Argon2id password hashes stored as PHC strings
//! - Session tokens are 32 bytes from a ChaCha20 CSPRNG, hex encoded
//! - Plaintext passwords are held in `Zeroizing` buffers

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use thiserror::Error;
use zeroize::Zeroizing;

/// Length of a session token in bytes (before hex encoding).
pub const SESSION_TOKEN_BYTES: usize = 32;

/// Errors while hashing or checking a password.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Stored password hash is malformed")]
    InvalidHash,
}

/// A plaintext password, wiped from memory on drop.
pub type Password = Zeroizing<String>;

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    pub username: String,
    /// Argon2id PHC string
    pub password_hash: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

fn hasher() -> Result<Argon2<'static>, CredentialError> {
    let params = Params::new(19456, 2, 1, None)
        .map_err(|e| CredentialError::Hashing(format!("Invalid Argon2 params: {e}")))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hash a password with Argon2id and a random salt.
///
/// # Errors
/// Returns error if hashing fails.
pub fn hash_password(password: &str) -> Result<String, CredentialError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| CredentialError::Hashing(e.to_string()))?;
    Ok(hash.to_string())
}

/// Check a password against a stored PHC hash.
///
/// # Errors
/// Returns `CredentialError::InvalidHash` if the stored hash cannot be parsed.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, CredentialError> {
    let parsed = PasswordHash::new(stored).map_err(|_| CredentialError::InvalidHash)?;
    Ok(hasher()?
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Generate an unguessable session token.
#[must_use]
pub fn generate_session_token() -> String {
    use rand::{RngCore, SeedableRng};
    use rand_chacha::ChaCha20Rng;

    let mut rng = ChaCha20Rng::from_entropy();
    let mut bytes = [0u8; SESSION_TOKEN_BYTES];
    rng.fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
