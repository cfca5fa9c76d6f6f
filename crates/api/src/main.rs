//! Binary entrypoint for the session-auth API server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use warden_api::config::ServerConfig;
use warden_api::router::build_app_router;
use warden_api::state::AppState;
use warden_core::service::AuthService;
use warden_db::PgSessionStore;
use warden_notify::WebhookNotifier;

/// Database connection attempts before giving up at startup.
const DB_CONNECT_ATTEMPTS: u32 = 3;
/// Fixed delay between connection attempts.
const DB_CONNECT_BACKOFF: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() {
    // Load .env file if present (for local development).
    dotenvy::dotenv().ok();

    // Initialize tracing subscriber.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warden_api=debug,warden_core=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration.
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = config.port, "Loaded server configuration");

    // Signing keys are loaded once and shared read-only for the process
    // lifetime.
    let keys = Arc::new(config.load_token_keys());
    tracing::info!("JWT signing keys loaded");

    // Database pool, with a bounded retry for a database that is still
    // coming up.
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool =
        warden_db::connect_with_retry(&database_url, DB_CONNECT_ATTEMPTS, DB_CONNECT_BACKOFF)
            .await
            .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    warden_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    warden_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // Wire the session protocol: Postgres store, webhook notifier, keys.
    let store = Arc::new(PgSessionStore::new(pool));
    let notifier = Arc::new(WebhookNotifier::new(config.webhook_url.clone()));
    let auth = Arc::new(AuthService::new(store, notifier, keys, config.tokens));

    let state = AppState {
        auth,
        config: Arc::new(config.clone()),
    };
    let app = build_app_router(state, &config);

    // Start server.
    let addr = SocketAddr::new(
        config.host.parse().expect("HOST must be a valid IP address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    // connect_info exposes the peer address to the client-metadata
    // extractor when no proxy headers are present.
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        }
    }
}
