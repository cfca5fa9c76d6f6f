//! RSA-signed access tokens.
//!
//! Access tokens are RS512 JWTs carrying a [`Claims`] payload: the subject,
//! the session the token was minted for, and an expiry. The refresh flow has
//! to read the session id out of an access token that may have legitimately
//! expired, so decoding comes in two flavors: [`verify_access_token`]
//! enforces expiry (used by the authorization guard) and
//! [`decode_access_token`] checks the signature but ignores expiry.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::TokenError;
use crate::types::SessionId;

/// Signature algorithm for freshly minted tokens.
const SIGNING_ALGORITHM: Algorithm = Algorithm::RS512;

/// Claims embedded in every access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject, the authenticated user's identifier.
    pub sub: String,
    /// The session this token was minted for.
    pub sid: SessionId,
    /// Expiration time (UTC Unix timestamp, seconds).
    pub exp: i64,
}

/// Process-lifetime RSA key pair backing all token operations.
///
/// Loaded once at startup and shared read-only behind an `Arc`; safe for
/// concurrent use.
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl std::fmt::Debug for TokenKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Key material must never leak through debug output.
        f.debug_struct("TokenKeys").finish_non_exhaustive()
    }
}

impl TokenKeys {
    /// Parse a PEM-encoded RSA key pair (PKCS#8 private, SPKI public).
    pub fn from_rsa_pem(private_pem: &[u8], public_pem: &[u8]) -> Result<Self, TokenError> {
        let encoding = EncodingKey::from_rsa_pem(private_pem)
            .map_err(|e| TokenError::InvalidKey(format!("private key: {e}")))?;
        let decoding = DecodingKey::from_rsa_pem(public_pem)
            .map_err(|e| TokenError::InvalidKey(format!("public key: {e}")))?;
        Ok(Self { encoding, decoding })
    }
}

/// Sign an access token binding `user_id` to `session_id`, expiring
/// `ttl_mins` minutes from now.
pub fn sign_access_token(
    keys: &TokenKeys,
    user_id: &str,
    session_id: SessionId,
    ttl_mins: i64,
) -> Result<String, TokenError> {
    let claims = Claims {
        sub: user_id.to_string(),
        sid: session_id,
        exp: chrono::Utc::now().timestamp() + ttl_mins * 60,
    };

    encode(&Header::new(SIGNING_ALGORITHM), &claims, &keys.encoding)
        .map_err(|e| TokenError::Signing(e.to_string()))
}

/// Fully verify an access token (signature and expiry) and return its claims.
pub fn verify_access_token(keys: &TokenKeys, token: &str) -> Result<Claims, TokenError> {
    decode_claims(keys, token, true)
}

/// Decode an access token, checking the signature but ignoring expiry.
///
/// The refresh flow uses this to recover the `sid` claim from an access
/// token that expired between issuance and refresh; the refresh secret, not
/// the access token's freshness, is the credential there.
pub fn decode_access_token(keys: &TokenKeys, token: &str) -> Result<Claims, TokenError> {
    decode_claims(keys, token, false)
}

fn decode_claims(keys: &TokenKeys, token: &str, validate_exp: bool) -> Result<Claims, TokenError> {
    let mut validation = Validation::new(SIGNING_ALGORITHM);
    // Every RSA variant verifies against the same public key. An HMAC or EC
    // header is an algorithm-confusion attempt and must not reach signature
    // verification.
    validation.algorithms = vec![Algorithm::RS256, Algorithm::RS384, Algorithm::RS512];
    validation.validate_exp = validate_exp;

    let data = decode::<Claims>(token, &keys.decoding, &validation).map_err(map_decode_error)?;
    Ok(data.claims)
}

fn map_decode_error(err: jsonwebtoken::errors::Error) -> TokenError {
    match err.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
            TokenError::AlgorithmMismatch
        }
        _ => TokenError::Invalid,
    }
}
