//! Session entity and the transient values that travel with it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{SessionId, Timestamp, UserId};

/// Device fingerprint captured from the transport layer at sign-in and
/// compared against on every refresh. Never read from request bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    /// Client IP as observed by the server, proxy headers included.
    pub ip: String,
    /// Raw `User-Agent` header value, empty if the client sent none.
    pub user_agent: String,
}

/// A server-side session binding a user, a device fingerprint, and the hash
/// of the currently valid refresh secret.
#[derive(Debug, Clone)]
pub struct Session {
    pub session_id: SessionId,
    pub user_id: UserId,
    /// IP bound at sign-in. A change on refresh raises an anomaly alert.
    pub ip: String,
    /// User agent bound at sign-in. A change on refresh revokes the session.
    pub user_agent: String,
    /// Argon2id hash of the active refresh secret. Exactly one secret
    /// verifies per session at any time; the plaintext is never stored.
    pub refresh_token_hash: String,
    /// Hard expiry. Refresh fails once passed; expired rows are detected
    /// lazily rather than reaped.
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Session {
    /// Build a fresh session for `user_id` bound to `client`, valid for
    /// `ttl_mins` minutes from now.
    pub fn new(
        user_id: impl Into<UserId>,
        client: &ClientInfo,
        refresh_token_hash: String,
        ttl_mins: i64,
    ) -> Self {
        let now = chrono::Utc::now();
        Self {
            session_id: Uuid::new_v4(),
            user_id: user_id.into(),
            ip: client.ip.clone(),
            user_agent: client.user_agent.clone(),
            refresh_token_hash,
            expires_at: now + chrono::Duration::minutes(ttl_mins),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the hard expiry has passed.
    pub fn is_expired(&self) -> bool {
        chrono::Utc::now() > self.expires_at
    }

    /// Replace the refresh secret hash and push the expiry out by `ttl_mins`.
    ///
    /// This is the rotation step: the session id stays stable while the
    /// previous secret stops verifying the moment the update is persisted.
    pub fn rotate(&mut self, refresh_token_hash: String, ttl_mins: i64) {
        let now = chrono::Utc::now();
        self.refresh_token_hash = refresh_token_hash;
        self.expires_at = now + chrono::Duration::minutes(ttl_mins);
        self.updated_at = now;
    }
}

/// An access/refresh token pair as returned to and later presented by
/// clients. Never persisted; the refresh secret survives server-side only as
/// a hash on the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}
