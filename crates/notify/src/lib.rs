//! Webhook delivery for device-binding anomaly alerts.
//!
//! [`WebhookNotifier`] implements the core `AnomalyNotifier` contract by
//! POSTing the alert as JSON to a configured URL. Delivery runs on a
//! background task so the refresh path never waits on the network; failures
//! are logged and dropped. The alert is advisory and is not retried.

use std::time::Duration;

use warden_core::notify::{AnomalyAlert, AnomalyNotifier};

/// HTTP request timeout for a single delivery attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Fire-and-forget webhook alert channel.
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    /// Create a notifier targeting `url`.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be constructed (TLS backend
    /// initialization failure), which is fatal at startup anyway.
    pub fn new(url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build webhook HTTP client");

        Self {
            client,
            url: url.into(),
        }
    }
}

impl AnomalyNotifier for WebhookNotifier {
    /// Spawn the delivery and return immediately.
    ///
    /// Must be called from within a tokio runtime; the server always is.
    fn notify(&self, alert: AnomalyAlert) {
        let client = self.client.clone();
        let url = self.url.clone();

        tokio::spawn(async move {
            match client.post(&url).json(&alert).send().await {
                Ok(response) if !response.status().is_success() => {
                    tracing::warn!(
                        url = %url,
                        status = response.status().as_u16(),
                        session_id = %alert.session_id,
                        "anomaly webhook rejected the alert"
                    );
                }
                Ok(_) => {
                    tracing::debug!(session_id = %alert.session_id, "anomaly alert delivered");
                }
                Err(e) => {
                    tracing::warn!(url = %url, error = %e, "anomaly webhook delivery failed");
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_alert() -> AnomalyAlert {
        AnomalyAlert {
            user_id: "user-1".to_string(),
            session_id: uuid::Uuid::new_v4(),
            user_ip: "198.51.100.9".to_string(),
        }
    }

    #[test]
    fn test_new_does_not_panic() {
        let _ = WebhookNotifier::new("http://localhost:9999/hooks/anomaly");
    }

    #[tokio::test]
    async fn test_notify_returns_without_waiting_for_delivery() {
        // Discard-port URL: the connection fails in the background while the
        // caller has long since moved on.
        let notifier = WebhookNotifier::new("http://127.0.0.1:9/hooks/anomaly");
        notifier.notify(sample_alert());
    }
}
