//! Shared application state.

use std::sync::Arc;

use warden_core::service::AuthService;

use crate::config::ServerConfig;

/// Shared state available to all handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything inside is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Session lifecycle protocol (store, notifier, signing keys).
    pub auth: Arc<AuthService>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}
