//! Session persistence: Postgres-backed store, pool plumbing, migrations.
//!
//! [`PgSessionStore`] implements the core `SessionStore` contract over a
//! `sessions` table. [`MemorySessionStore`] offers the same observable
//! semantics in memory for integration tests and local development.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;

pub mod memory;
pub mod store;

pub use memory::MemorySessionStore;
pub use store::PgSessionStore;

/// Type alias for the PostgreSQL connection pool.
pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Connect with a bounded startup retry: `attempts` tries (at least one)
/// with a fixed `backoff` between them. Nothing in the request path retries;
/// this exists so the server survives a database that comes up a moment
/// later than it does.
pub async fn connect_with_retry(
    database_url: &str,
    attempts: u32,
    backoff: Duration,
) -> Result<DbPool, sqlx::Error> {
    let mut last_err = None;

    for attempt in 1..=attempts.max(1) {
        match create_pool(database_url).await {
            Ok(pool) => return Ok(pool),
            Err(e) => {
                tracing::warn!(attempt, max = attempts, error = %e, "database connection failed");
                last_err = Some(e);
                if attempt < attempts {
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }

    Err(last_err.expect("at least one connection attempt was made"))
}

/// Verify the database answers a trivial query.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply embedded migrations; creates the `sessions` table on first run.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
