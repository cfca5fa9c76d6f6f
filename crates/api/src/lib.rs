//! HTTP surface of the session-auth service.
//!
//! Exposes configuration, state, error mapping, middleware, and routes as a
//! library so the binary entrypoint and the integration tests share the
//! exact same application.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod routes;
pub mod state;
