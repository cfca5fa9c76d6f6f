//! In-memory session store for integration tests and local development.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use warden_core::error::StoreError;
use warden_core::session::Session;
use warden_core::store::SessionStore;
use warden_core::types::SessionId;

/// HashMap-backed store with the same observable semantics as
/// [`PgSessionStore`](crate::PgSessionStore): updates and deletes of absent
/// sessions succeed silently.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<SessionId, Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live sessions held; test-facing.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, session: &Session) -> Result<SessionId, StoreError> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(session.session_id, session.clone());
        Ok(session.session_id)
    }

    async fn get(&self, session_id: SessionId) -> Result<Option<Session>, StoreError> {
        Ok(self.sessions.read().await.get(&session_id).cloned())
    }

    async fn update(&self, session: &Session) -> Result<(), StoreError> {
        let mut sessions = self.sessions.write().await;
        // Mirror the UPDATE ... WHERE semantics: touching an absent row is
        // a no-op, not an insert.
        if let Some(existing) = sessions.get_mut(&session.session_id) {
            *existing = session.clone();
        }
        Ok(())
    }

    async fn delete(&self, session_id: SessionId) -> Result<(), StoreError> {
        self.sessions.write().await.remove(&session_id);
        Ok(())
    }
}
