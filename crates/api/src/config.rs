//! Environment-driven server configuration.

use std::path::PathBuf;

use warden_core::service::TokenConfig;
use warden_core::token::TokenKeys;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// URL the anomaly webhook POSTs to.
    pub webhook_url: String,
    /// PEM file holding the RSA private signing key (PKCS#8).
    pub private_key_path: PathBuf,
    /// PEM file holding the RSA public verification key (SPKI).
    pub public_key_path: PathBuf,
    /// Access and refresh token lifetimes.
    pub tokens: TokenConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                        | Required | Default                 |
    /// |--------------------------------|----------|-------------------------|
    /// | `HOST`                         | no       | `0.0.0.0`               |
    /// | `PORT`                         | no       | `3000`                  |
    /// | `REQUEST_TIMEOUT_SECS`         | no       | `30`                    |
    /// | `WEBHOOK_URL`                  | **yes**  | --                      |
    /// | `JWT_PRIVATE_KEY_PATH`         | no       | `certs/jwt-private.pem` |
    /// | `JWT_PUBLIC_KEY_PATH`          | no       | `certs/jwt-public.pem`  |
    /// | `ACCESS_TOKEN_EXPIRE_MINUTES`  | no       | `15`                    |
    /// | `REFRESH_TOKEN_EXPIRE_MINUTES` | no       | `10080` (7 days)        |
    ///
    /// # Panics
    ///
    /// Panics if a required variable is missing or a numeric one fails to
    /// parse. Misconfiguration must stop the server at startup.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .expect("PORT must be a valid port number");

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a number");

        let webhook_url =
            std::env::var("WEBHOOK_URL").expect("WEBHOOK_URL must be set in the environment");

        let private_key_path: PathBuf = std::env::var("JWT_PRIVATE_KEY_PATH")
            .unwrap_or_else(|_| "certs/jwt-private.pem".to_string())
            .into();

        let public_key_path: PathBuf = std::env::var("JWT_PUBLIC_KEY_PATH")
            .unwrap_or_else(|_| "certs/jwt-public.pem".to_string())
            .into();

        let access_ttl_mins: i64 = std::env::var("ACCESS_TOKEN_EXPIRE_MINUTES")
            .unwrap_or_else(|_| "15".to_string())
            .parse()
            .expect("ACCESS_TOKEN_EXPIRE_MINUTES must be a number");

        let refresh_ttl_mins: i64 = std::env::var("REFRESH_TOKEN_EXPIRE_MINUTES")
            .unwrap_or_else(|_| "10080".to_string())
            .parse()
            .expect("REFRESH_TOKEN_EXPIRE_MINUTES must be a number");

        Self {
            host,
            port,
            request_timeout_secs,
            webhook_url,
            private_key_path,
            public_key_path,
            tokens: TokenConfig {
                access_ttl_mins,
                refresh_ttl_mins,
            },
        }
    }

    /// Read and parse the RSA key pair named by the configured paths.
    ///
    /// # Panics
    ///
    /// Panics if either file is unreadable or not a valid RSA PEM key; the
    /// server must not come up without working signing keys.
    pub fn load_token_keys(&self) -> TokenKeys {
        let private_pem = std::fs::read(&self.private_key_path).unwrap_or_else(|e| {
            panic!(
                "Failed to read private key {}: {e}",
                self.private_key_path.display()
            )
        });
        let public_pem = std::fs::read(&self.public_key_path).unwrap_or_else(|e| {
            panic!(
                "Failed to read public key {}: {e}",
                self.public_key_path.display()
            )
        });

        TokenKeys::from_rsa_pem(&private_pem, &public_pem)
            .expect("JWT key files must contain valid RSA PEM keys")
    }
}
