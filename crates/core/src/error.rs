//! Error taxonomy for the authentication core.
//!
//! Each codec owns a small error enum; [`AuthError`] is the protocol-level
//! type composed from them, and is what the lifecycle operations and the
//! authorization guard return. The HTTP layer collapses the whole taxonomy
//! into a handful of opaque external responses; the fine-grained variants
//! exist for logs and tests, not for callers.

use thiserror::Error;

/// Failures in the refresh-secret codec (generation, hashing, verification).
#[derive(Debug, Error)]
pub enum SecretError {
    /// The OS entropy source could not produce random bytes.
    #[error("entropy source unavailable: {0}")]
    Entropy(String),

    /// Hashing a fresh secret failed.
    #[error("secret hashing failed: {0}")]
    Hash(String),

    /// A stored hash could not be parsed or used; storage is corrupted.
    #[error("stored refresh-token hash is unusable: {0}")]
    CorruptHash(String),
}

/// Failures in the signed-token codec.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Key material could not be parsed as an RSA PEM key.
    #[error("invalid RSA key material: {0}")]
    InvalidKey(String),

    /// Producing a signature failed.
    #[error("token signing failed: {0}")]
    Signing(String),

    /// The token header names an algorithm outside the RSA family.
    #[error("token signed with an unexpected algorithm")]
    AlgorithmMismatch,

    /// The token's expiry has passed. Only full verification reports this.
    #[error("token has expired")]
    Expired,

    /// Malformed token, bad signature, or missing claims.
    #[error("token is invalid")]
    Invalid,
}

/// Opaque session-store failure. Implementations fold their backend error
/// into the message; the protocol never inspects it.
#[derive(Debug, Error)]
#[error("session store failure: {0}")]
pub struct StoreError(pub String);

/// Protocol-level error returned by the session lifecycle operations and the
/// authorization guard.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Request input failed shape validation before reaching the protocol.
    #[error("bad request body")]
    BadRequest,

    /// A guarded request carried no `Authorization` header.
    #[error("authorization header is missing")]
    MissingAuth,

    /// The `Authorization` header is not of the form `Bearer <token>`.
    #[error("invalid authorization header format")]
    MalformedAuth,

    /// No session exists for the token's `sid` claim.
    #[error("session not found")]
    SessionNotFound,

    /// The presented refresh secret does not match the stored hash.
    #[error("invalid refresh token")]
    InvalidRefreshToken,

    /// The session's hard expiry has passed.
    #[error("session has expired")]
    SessionExpired,

    /// The presenting device's user agent differs from the bound one. The
    /// session has been revoked by the time this is returned.
    #[error("user agent mismatch")]
    DeviceMismatch,

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Secret(#[from] SecretError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
