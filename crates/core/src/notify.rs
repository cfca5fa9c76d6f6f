//! Anomaly notification contract.

use serde::Serialize;

use crate::types::SessionId;

/// Alert raised when a refresh arrives from an IP other than the one bound
/// at sign-in. Field names are the webhook wire format.
#[derive(Debug, Clone, Serialize)]
pub struct AnomalyAlert {
    /// Owner of the affected session.
    pub user_id: String,
    /// The session the anomalous refresh targeted.
    pub session_id: SessionId,
    /// IP the refresh actually came from.
    pub user_ip: String,
}

/// Outbound channel for device-binding anomalies.
///
/// `notify` must not block and must not fail: implementations hand the alert
/// off (spawn, queue) and swallow delivery errors, because the refresh flow
/// continues regardless of the outcome.
pub trait AnomalyNotifier: Send + Sync {
    fn notify(&self, alert: AnomalyAlert);
}
