//! Transport-metadata extractor: client IP and user agent.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use warden_core::session::ClientInfo;

/// Fallback when neither a forwarding header nor a peer address is
/// available, e.g. requests driven straight through the router in tests.
const UNKNOWN_IP: &str = "unknown";

/// Client metadata captured from the transport layer, never from request
/// bodies. Wraps the core [`ClientInfo`] the session protocol consumes.
#[derive(Debug, Clone)]
pub struct ClientMeta(pub ClientInfo);

impl<S> FromRequestParts<S> for ClientMeta
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ip = client_ip(parts).unwrap_or_else(|| UNKNOWN_IP.to_string());

        let user_agent = parts
            .headers
            .get("user-agent")
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();

        Ok(ClientMeta(ClientInfo { ip, user_agent }))
    }
}

/// Resolve the client IP the way a proxy-fronted deployment expects: first
/// `X-Forwarded-For` entry, then `X-Real-IP`, then the peer address.
fn client_ip(parts: &Parts) -> Option<String> {
    if let Some(forwarded) = parts.headers.get("x-forwarded-for") {
        if let Ok(value) = forwarded.to_str() {
            if let Some(first) = value.split(',').next() {
                let first = first.trim();
                if !first.is_empty() {
                    return Some(first.to_string());
                }
            }
        }
    }

    if let Some(real_ip) = parts.headers.get("x-real-ip") {
        if let Ok(value) = real_ip.to_str() {
            let value = value.trim();
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }

    parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
}
