//! Session lifecycle protocol: sign-in, refresh with rotation, sign-out, and
//! the checks behind the authorization guard.
//!
//! Refresh is the interesting path. The presented access token is decoded
//! with its signature checked but expiry ignored, because access tokens
//! routinely expire before the session does; the refresh secret is the
//! actual credential. The session the token names must exist, the secret
//! must match the stored hash, the session must be inside its hard expiry,
//! and the device binding must hold. A changed user agent revokes the
//! session outright; a changed IP only raises an anomaly alert. On success
//! both tokens are replaced and the previous secret stops verifying; there
//! is no grace window for the old pair.

use std::sync::Arc;

use crate::error::{AuthError, TokenError};
use crate::notify::{AnomalyAlert, AnomalyNotifier};
use crate::secret::{generate_secret, hash_secret, verify_secret};
use crate::session::{ClientInfo, Session, TokenPair};
use crate::store::SessionStore;
use crate::token::{self, Claims, TokenKeys};
use crate::types::SessionId;

/// Token lifetimes, in minutes.
#[derive(Debug, Clone, Copy)]
pub struct TokenConfig {
    /// Access token lifetime.
    pub access_ttl_mins: i64,
    /// Refresh/session lifetime; also the rotation extension.
    pub refresh_ttl_mins: i64,
}

impl Default for TokenConfig {
    /// 15-minute access tokens, 7-day sessions.
    fn default() -> Self {
        Self {
            access_ttl_mins: 15,
            refresh_ttl_mins: 7 * 24 * 60,
        }
    }
}

/// Orchestrates the session lifecycle over a store, a notifier, and the
/// process-lifetime signing keys.
pub struct AuthService {
    store: Arc<dyn SessionStore>,
    notifier: Arc<dyn AnomalyNotifier>,
    keys: Arc<TokenKeys>,
    config: TokenConfig,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn SessionStore>,
        notifier: Arc<dyn AnomalyNotifier>,
        keys: Arc<TokenKeys>,
        config: TokenConfig,
    ) -> Self {
        Self {
            store,
            notifier,
            keys,
            config,
        }
    }

    /// Create a session for an externally authenticated user and mint its
    /// first token pair.
    ///
    /// Identity is taken on trust; authentication proper happened upstream.
    /// If access-token signing fails after the session row is written, the
    /// row is left behind: it expires on its own, and a retried sign-in
    /// creates an independent sibling session.
    pub async fn sign_in(&self, user_id: &str, client: &ClientInfo) -> Result<TokenPair, AuthError> {
        let secret = generate_secret()?;
        let hash = hash_secret(&secret)?;

        let session = Session::new(user_id, client, hash, self.config.refresh_ttl_mins);
        let session_id = self.store.create(&session).await?;

        let access_token =
            token::sign_access_token(&self.keys, user_id, session_id, self.config.access_ttl_mins)?;

        tracing::info!(user_id, %session_id, "session created");

        Ok(TokenPair {
            access_token,
            refresh_token: secret,
        })
    }

    /// Rotate a session's token pair.
    ///
    /// Checks run in a fixed order: signature, session existence, refresh
    /// secret, hard expiry, user-agent binding, IP binding. Only the
    /// user-agent check mutates state on failure; every earlier rejection
    /// leaves the session untouched.
    pub async fn refresh(
        &self,
        presented: &TokenPair,
        client: &ClientInfo,
    ) -> Result<TokenPair, AuthError> {
        let claims = token::decode_access_token(&self.keys, &presented.access_token)?;
        let sid = claims.sid;

        let mut session = self
            .store
            .get(sid)
            .await?
            .ok_or(AuthError::SessionNotFound)?;

        if !verify_secret(&session.refresh_token_hash, &presented.refresh_token)? {
            tracing::debug!(%sid, "refresh secret mismatch");
            return Err(AuthError::InvalidRefreshToken);
        }

        if session.is_expired() {
            tracing::debug!(%sid, "refresh on expired session");
            return Err(AuthError::SessionExpired);
        }

        if session.user_agent != client.user_agent {
            // Takeover signal: revoke first, then report. The delete is
            // best-effort; a store hiccup must not keep the session alive
            // error-free.
            if let Err(e) = self.store.delete(sid).await {
                tracing::warn!(%sid, error = %e, "failed to revoke session on user-agent mismatch");
            }
            tracing::warn!(%sid, "user agent changed, session revoked");
            return Err(AuthError::DeviceMismatch);
        }

        if session.ip != client.ip {
            // IP drift alone is common (mobile networks, NAT). Alert and
            // carry on.
            tracing::info!(%sid, new_ip = %client.ip, "refresh from a new ip");
            self.notifier.notify(AnomalyAlert {
                user_id: session.user_id.clone(),
                session_id: sid,
                user_ip: client.ip.clone(),
            });
        }

        let new_secret = generate_secret()?;
        let access_token = token::sign_access_token(
            &self.keys,
            &session.user_id,
            sid,
            self.config.access_ttl_mins,
        )?;

        session.rotate(hash_secret(&new_secret)?, self.config.refresh_ttl_mins);
        self.store.update(&session).await?;

        tracing::debug!(%sid, "session rotated");

        Ok(TokenPair {
            access_token,
            refresh_token: new_secret,
        })
    }

    /// Delete a session. Deleting one that is already gone still succeeds.
    pub async fn sign_out(&self, session_id: SessionId) -> Result<(), AuthError> {
        self.store.delete(session_id).await?;
        tracing::info!(%session_id, "session deleted");
        Ok(())
    }

    /// Whether a session currently exists. Fails closed: a store error reads
    /// as absent.
    pub async fn session_exists(&self, session_id: SessionId) -> bool {
        match self.store.get(session_id).await {
            Ok(found) => found.is_some(),
            Err(e) => {
                tracing::warn!(%session_id, error = %e, "session lookup failed, treating as absent");
                false
            }
        }
    }

    /// Guard-side check: fully verify an access token and confirm its
    /// session still exists.
    ///
    /// A missing session is reported as an invalid token; callers cannot
    /// distinguish revoked from forged.
    pub async fn authorize(&self, token: &str) -> Result<Claims, AuthError> {
        let claims = token::verify_access_token(&self.keys, token)?;

        if !self.session_exists(claims.sid).await {
            return Err(AuthError::Token(TokenError::Invalid));
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use assert_matches::assert_matches;
    use uuid::Uuid;

    use super::*;
    use crate::error::StoreError;
    use crate::test_support::test_keys;
    use crate::token::decode_access_token;

    // -----------------------------------------------------------------------
    // Test doubles
    // -----------------------------------------------------------------------

    /// Minimal in-memory store for protocol-level tests.
    #[derive(Default)]
    struct MemoryStore {
        sessions: Mutex<HashMap<SessionId, Session>>,
    }

    #[async_trait::async_trait]
    impl SessionStore for MemoryStore {
        async fn create(&self, session: &Session) -> Result<SessionId, StoreError> {
            let mut sessions = self.sessions.lock().unwrap();
            sessions.insert(session.session_id, session.clone());
            Ok(session.session_id)
        }

        async fn get(&self, session_id: SessionId) -> Result<Option<Session>, StoreError> {
            Ok(self.sessions.lock().unwrap().get(&session_id).cloned())
        }

        async fn update(&self, session: &Session) -> Result<(), StoreError> {
            let mut sessions = self.sessions.lock().unwrap();
            if let Some(existing) = sessions.get_mut(&session.session_id) {
                *existing = session.clone();
            }
            Ok(())
        }

        async fn delete(&self, session_id: SessionId) -> Result<(), StoreError> {
            self.sessions.lock().unwrap().remove(&session_id);
            Ok(())
        }
    }

    /// Store that fails every operation, for fail-closed tests.
    struct FailingStore;

    #[async_trait::async_trait]
    impl SessionStore for FailingStore {
        async fn create(&self, _session: &Session) -> Result<SessionId, StoreError> {
            Err(StoreError("backend down".to_string()))
        }

        async fn get(&self, _session_id: SessionId) -> Result<Option<Session>, StoreError> {
            Err(StoreError("backend down".to_string()))
        }

        async fn update(&self, _session: &Session) -> Result<(), StoreError> {
            Err(StoreError("backend down".to_string()))
        }

        async fn delete(&self, _session_id: SessionId) -> Result<(), StoreError> {
            Err(StoreError("backend down".to_string()))
        }
    }

    /// Notifier that records alerts instead of delivering them.
    #[derive(Default)]
    struct RecordingNotifier {
        alerts: Mutex<Vec<AnomalyAlert>>,
    }

    impl RecordingNotifier {
        fn recorded(&self) -> Vec<AnomalyAlert> {
            self.alerts.lock().unwrap().clone()
        }
    }

    impl AnomalyNotifier for RecordingNotifier {
        fn notify(&self, alert: AnomalyAlert) {
            self.alerts.lock().unwrap().push(alert);
        }
    }

    // -----------------------------------------------------------------------
    // Harness
    // -----------------------------------------------------------------------

    struct Harness {
        service: AuthService,
        store: Arc<MemoryStore>,
        notifier: Arc<RecordingNotifier>,
        keys: Arc<TokenKeys>,
    }

    fn harness() -> Harness {
        harness_with(TokenConfig::default())
    }

    fn harness_with(config: TokenConfig) -> Harness {
        let store = Arc::new(MemoryStore::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let keys = Arc::new(test_keys());
        let service = AuthService::new(store.clone(), notifier.clone(), keys.clone(), config);
        Harness {
            service,
            store,
            notifier,
            keys,
        }
    }

    fn device() -> ClientInfo {
        ClientInfo {
            ip: "203.0.113.7".to_string(),
            user_agent: "warden-test/1.0".to_string(),
        }
    }

    fn device_from(ip: &str) -> ClientInfo {
        ClientInfo {
            ip: ip.to_string(),
            user_agent: "warden-test/1.0".to_string(),
        }
    }

    fn other_device() -> ClientInfo {
        ClientInfo {
            ip: "203.0.113.7".to_string(),
            user_agent: "somebody-else/2.0".to_string(),
        }
    }

    fn sid_of(keys: &TokenKeys, pair: &TokenPair) -> SessionId {
        decode_access_token(keys, &pair.access_token).unwrap().sid
    }

    // -----------------------------------------------------------------------
    // Sign-in
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn test_sign_in_creates_session_and_mints_verifiable_tokens() {
        let h = harness();

        let pair = h.service.sign_in("user-1", &device()).await.unwrap();

        let claims = token::verify_access_token(&h.keys, &pair.access_token).unwrap();
        assert_eq!(claims.sub, "user-1");

        let session = h.store.get(claims.sid).await.unwrap().expect("session row");
        assert_eq!(session.user_id, "user-1");
        assert_eq!(session.ip, "203.0.113.7");
        assert_eq!(session.user_agent, "warden-test/1.0");
        assert!(!session.is_expired());

        // The stored value is a hash of the secret, not the secret itself.
        assert_ne!(session.refresh_token_hash, pair.refresh_token);
        assert!(crate::secret::verify_secret(&session.refresh_token_hash, &pair.refresh_token).unwrap());
    }

    #[tokio::test]
    async fn test_sign_in_creates_independent_sessions_per_call() {
        let h = harness();

        let first = h.service.sign_in("user-1", &device()).await.unwrap();
        let second = h.service.sign_in("user-1", &device()).await.unwrap();

        assert_ne!(sid_of(&h.keys, &first), sid_of(&h.keys, &second));
    }

    #[tokio::test]
    async fn test_sign_in_propagates_store_failure() {
        let notifier = Arc::new(RecordingNotifier::default());
        let service = AuthService::new(
            Arc::new(FailingStore),
            notifier,
            Arc::new(test_keys()),
            TokenConfig::default(),
        );

        let result = service.sign_in("user-1", &device()).await;
        assert_matches!(result, Err(AuthError::Store(_)));
    }

    // -----------------------------------------------------------------------
    // Refresh
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn test_refresh_rotates_secret_and_invalidates_previous_pair() {
        let h = harness();
        let old_pair = h.service.sign_in("user-1", &device()).await.unwrap();

        let new_pair = h.service.refresh(&old_pair, &device()).await.unwrap();
        assert_ne!(new_pair.refresh_token, old_pair.refresh_token);

        // Single valid secret per session: the old pair is dead.
        assert_matches!(
            h.service.refresh(&old_pair, &device()).await,
            Err(AuthError::InvalidRefreshToken)
        );

        // The session id survives rotation.
        assert_eq!(sid_of(&h.keys, &old_pair), sid_of(&h.keys, &new_pair));

        // And the new pair keeps working.
        h.service.refresh(&new_pair, &device()).await.unwrap();
    }

    #[tokio::test]
    async fn test_refresh_accepts_expired_access_token() {
        // Expired access tokens are the normal case for refresh; only the
        // signature matters there.
        let h = harness_with(TokenConfig {
            access_ttl_mins: -5,
            refresh_ttl_mins: 10080,
        });

        let pair = h.service.sign_in("user-1", &device()).await.unwrap();
        assert_matches!(
            token::verify_access_token(&h.keys, &pair.access_token),
            Err(TokenError::Expired)
        );

        h.service.refresh(&pair, &device()).await.unwrap();
    }

    #[tokio::test]
    async fn test_refresh_rejects_garbage_access_token() {
        let h = harness();
        let pair = TokenPair {
            access_token: "not-a-jwt".to_string(),
            refresh_token: "whatever".to_string(),
        };

        assert_matches!(
            h.service.refresh(&pair, &device()).await,
            Err(AuthError::Token(TokenError::Invalid))
        );
    }

    #[tokio::test]
    async fn test_refresh_unknown_session_is_not_found() {
        let h = harness();
        // Properly signed token naming a session that never existed.
        let access =
            token::sign_access_token(&h.keys, "user-1", Uuid::new_v4(), 15).unwrap();
        let pair = TokenPair {
            access_token: access,
            refresh_token: "whatever".to_string(),
        };

        assert_matches!(
            h.service.refresh(&pair, &device()).await,
            Err(AuthError::SessionNotFound)
        );
    }

    #[tokio::test]
    async fn test_refresh_with_wrong_secret_leaves_session_untouched() {
        let h = harness();
        let pair = h.service.sign_in("user-1", &device()).await.unwrap();
        let sid = sid_of(&h.keys, &pair);
        let before = h.store.get(sid).await.unwrap().unwrap();

        let forged = TokenPair {
            access_token: pair.access_token.clone(),
            refresh_token: "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=".to_string(),
        };
        assert_matches!(
            h.service.refresh(&forged, &device()).await,
            Err(AuthError::InvalidRefreshToken)
        );

        // No rotation, no revocation.
        let after = h.store.get(sid).await.unwrap().unwrap();
        assert_eq!(after.refresh_token_hash, before.refresh_token_hash);
        assert_eq!(after.expires_at, before.expires_at);

        // The genuine pair still works.
        h.service.refresh(&pair, &device()).await.unwrap();
    }

    #[tokio::test]
    async fn test_refresh_on_expired_session_fails_but_keeps_the_row() {
        let h = harness();
        let secret = generate_secret().unwrap();
        let hash = hash_secret(&secret).unwrap();
        let mut session = Session::new("user-9", &device(), hash, 10080);
        session.expires_at = chrono::Utc::now() - chrono::Duration::seconds(5);
        h.store.create(&session).await.unwrap();

        let access =
            token::sign_access_token(&h.keys, "user-9", session.session_id, 15).unwrap();
        let pair = TokenPair {
            access_token: access,
            refresh_token: secret,
        };

        assert_matches!(
            h.service.refresh(&pair, &device()).await,
            Err(AuthError::SessionExpired)
        );

        // Expiry is detected lazily; the row is not deleted.
        assert!(h.store.get(session.session_id).await.unwrap().is_some());
        assert_matches!(
            h.service.refresh(&pair, &device()).await,
            Err(AuthError::SessionExpired)
        );
    }

    #[tokio::test]
    async fn test_refresh_checks_secret_before_session_expiry() {
        let h = harness();
        let hash = hash_secret(&generate_secret().unwrap()).unwrap();
        let mut session = Session::new("user-9", &device(), hash, 10080);
        session.expires_at = chrono::Utc::now() - chrono::Duration::seconds(5);
        h.store.create(&session).await.unwrap();

        let access =
            token::sign_access_token(&h.keys, "user-9", session.session_id, 15).unwrap();
        let pair = TokenPair {
            access_token: access,
            refresh_token: "wrong-secret".to_string(),
        };

        // Wrong secret on an expired session reads as a bad secret, not as
        // an expired session.
        assert_matches!(
            h.service.refresh(&pair, &device()).await,
            Err(AuthError::InvalidRefreshToken)
        );
    }

    #[tokio::test]
    async fn test_refresh_user_agent_mismatch_revokes_session() {
        let h = harness();
        let pair = h.service.sign_in("user-1", &device()).await.unwrap();
        let sid = sid_of(&h.keys, &pair);

        assert_matches!(
            h.service.refresh(&pair, &other_device()).await,
            Err(AuthError::DeviceMismatch)
        );

        // The session is gone; even the genuine device is locked out.
        assert!(h.store.get(sid).await.unwrap().is_none());
        assert_matches!(
            h.service.refresh(&pair, &device()).await,
            Err(AuthError::SessionNotFound)
        );
    }

    #[tokio::test]
    async fn test_refresh_ip_change_alerts_but_succeeds() {
        let h = harness();
        let pair = h.service.sign_in("user-1", &device()).await.unwrap();
        let sid = sid_of(&h.keys, &pair);

        let roaming = device_from("198.51.100.9");
        h.service.refresh(&pair, &roaming).await.unwrap();

        let alerts = h.notifier.recorded();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].user_id, "user-1");
        assert_eq!(alerts[0].session_id, sid);
        assert_eq!(alerts[0].user_ip, "198.51.100.9");

        // The bound IP does not move; the next refresh from the new network
        // alerts again.
        let session = h.store.get(sid).await.unwrap().unwrap();
        assert_eq!(session.ip, "203.0.113.7");
    }

    #[tokio::test]
    async fn test_refresh_from_bound_device_stays_silent() {
        let h = harness();
        let pair = h.service.sign_in("user-1", &device()).await.unwrap();

        h.service.refresh(&pair, &device()).await.unwrap();

        assert!(h.notifier.recorded().is_empty());
    }

    // -----------------------------------------------------------------------
    // Sign-out and existence checks
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn test_sign_out_is_idempotent() {
        let h = harness();
        let pair = h.service.sign_in("user-1", &device()).await.unwrap();
        let sid = sid_of(&h.keys, &pair);

        h.service.sign_out(sid).await.unwrap();
        assert!(!h.service.session_exists(sid).await);

        // Second sign-out of the same session still succeeds.
        h.service.sign_out(sid).await.unwrap();
    }

    #[tokio::test]
    async fn test_session_exists_fails_closed_on_store_error() {
        let service = AuthService::new(
            Arc::new(FailingStore),
            Arc::new(RecordingNotifier::default()),
            Arc::new(test_keys()),
            TokenConfig::default(),
        );

        assert!(!service.session_exists(Uuid::new_v4()).await);
    }

    // -----------------------------------------------------------------------
    // Authorize
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn test_authorize_returns_claims_for_live_session() {
        let h = harness();
        let pair = h.service.sign_in("user-1", &device()).await.unwrap();

        let claims = h.service.authorize(&pair.access_token).await.unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.sid, sid_of(&h.keys, &pair));
    }

    #[tokio::test]
    async fn test_authorize_rejects_token_for_revoked_session() {
        let h = harness();
        let pair = h.service.sign_in("user-1", &device()).await.unwrap();
        h.service.sign_out(sid_of(&h.keys, &pair)).await.unwrap();

        // Revoked reads exactly like forged.
        assert_matches!(
            h.service.authorize(&pair.access_token).await,
            Err(AuthError::Token(TokenError::Invalid))
        );
    }

    #[tokio::test]
    async fn test_authorize_rejects_expired_access_token() {
        let h = harness_with(TokenConfig {
            access_ttl_mins: -5,
            refresh_ttl_mins: 10080,
        });
        let pair = h.service.sign_in("user-1", &device()).await.unwrap();

        assert_matches!(
            h.service.authorize(&pair.access_token).await,
            Err(AuthError::Token(TokenError::Expired))
        );
    }
}
