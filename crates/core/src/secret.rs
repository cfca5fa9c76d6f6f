//! Refresh-secret generation, hashing, and verification.
//!
//! A refresh secret is 32 bytes from the OS CSPRNG, base64-encoded for
//! transport. Only an Argon2id hash of the secret is stored server-side, in
//! PHC string format so the algorithm parameters and salt travel with the
//! hash.

use argon2::password_hash::rand_core::{OsRng, RngCore};
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use crate::error::SecretError;

/// Raw entropy per refresh secret, before encoding.
const SECRET_BYTES: usize = 32;

/// Generate a new opaque refresh secret.
pub fn generate_secret() -> Result<String, SecretError> {
    let mut bytes = [0u8; SECRET_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| SecretError::Entropy(e.to_string()))?;
    Ok(BASE64.encode(bytes))
}

/// Hash a refresh secret for storage using Argon2id with a random salt.
///
/// Salted, so two hashes of the same secret differ while both verify.
pub fn hash_secret(secret: &str) -> Result<String, SecretError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map_err(|e| SecretError::Hash(e.to_string()))?;
    Ok(hash.to_string())
}

/// Verify a presented secret against a stored PHC-formatted hash.
///
/// A clean mismatch is `Ok(false)`; only a hash that cannot be parsed or
/// compared reports an error.
pub fn verify_secret(hash: &str, secret: &str) -> Result<bool, SecretError> {
    let parsed = PasswordHash::new(hash).map_err(|e| SecretError::CorruptHash(e.to_string()))?;
    match Argon2::default().verify_password(secret.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(SecretError::CorruptHash(e.to_string())),
    }
}
