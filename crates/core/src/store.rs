//! Session persistence contract.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::session::Session;
use crate::types::SessionId;

/// CRUD contract the session lifecycle protocol requires from persistence.
///
/// Each call targets a single record and must apply atomically; the protocol
/// never spans sessions. Updating or deleting an absent session is success,
/// not an error: sign-out is idempotent, and a rotation that lost a race with
/// sign-out fails on its next secret check rather than here.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persist a new session, returning its id.
    async fn create(&self, session: &Session) -> Result<SessionId, StoreError>;

    /// Fetch a session by id; `None` when absent.
    async fn get(&self, session_id: SessionId) -> Result<Option<Session>, StoreError>;

    /// Replace the stored record for `session.session_id` with the given
    /// field values.
    async fn update(&self, session: &Session) -> Result<(), StoreError>;

    /// Remove a session.
    async fn delete(&self, session_id: SessionId) -> Result<(), StoreError>;
}
