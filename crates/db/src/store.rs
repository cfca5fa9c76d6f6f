//! Postgres implementation of the session store contract.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use warden_core::error::StoreError;
use warden_core::session::Session;
use warden_core::store::SessionStore;
use warden_core::types::{SessionId, Timestamp};

/// Column list shared across queries to avoid drift between them.
const COLUMNS: &str = "session_id, user_id, ip, user_agent, refresh_token_hash, \
                       expires_at, created_at, updated_at";

/// One row of the `sessions` table.
#[derive(Debug, FromRow)]
struct SessionRow {
    session_id: SessionId,
    user_id: String,
    ip: String,
    user_agent: String,
    refresh_token_hash: String,
    expires_at: Timestamp,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl From<SessionRow> for Session {
    fn from(row: SessionRow) -> Self {
        Session {
            session_id: row.session_id,
            user_id: row.user_id,
            ip: row.ip,
            user_agent: row.user_agent,
            refresh_token_hash: row.refresh_token_hash,
            expires_at: row.expires_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Session store over a Postgres `sessions` table.
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn create(&self, session: &Session) -> Result<SessionId, StoreError> {
        let query = format!(
            "INSERT INTO sessions (session_id, user_id, ip, user_agent, refresh_token_hash, \
              expires_at, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );

        let row = sqlx::query_as::<_, SessionRow>(&query)
            .bind(session.session_id)
            .bind(&session.user_id)
            .bind(&session.ip)
            .bind(&session.user_agent)
            .bind(&session.refresh_token_hash)
            .bind(session.expires_at)
            .bind(session.created_at)
            .bind(session.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(to_store_error)?;

        Ok(row.session_id)
    }

    async fn get(&self, session_id: SessionId) -> Result<Option<Session>, StoreError> {
        let query = format!("SELECT {COLUMNS} FROM sessions WHERE session_id = $1");

        let row = sqlx::query_as::<_, SessionRow>(&query)
            .bind(session_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(to_store_error)?;

        Ok(row.map(Session::from))
    }

    async fn update(&self, session: &Session) -> Result<(), StoreError> {
        // Zero rows affected means the session vanished under a concurrent
        // sign-out. Not an error here; the caller's next secret check fails.
        sqlx::query(
            "UPDATE sessions \
             SET refresh_token_hash = $2, expires_at = $3, updated_at = $4 \
             WHERE session_id = $1",
        )
        .bind(session.session_id)
        .bind(&session.refresh_token_hash)
        .bind(session.expires_at)
        .bind(session.updated_at)
        .execute(&self.pool)
        .await
        .map_err(to_store_error)?;

        Ok(())
    }

    async fn delete(&self, session_id: SessionId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM sessions WHERE session_id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(to_store_error)?;

        Ok(())
    }
}

fn to_store_error(err: sqlx::Error) -> StoreError {
    StoreError(err.to_string())
}
