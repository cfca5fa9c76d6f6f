//! HTTP mapping for the core error taxonomy.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use warden_core::error::{AuthError, TokenError};

/// Application-level error type for HTTP handlers.
///
/// Wraps the core [`AuthError`] taxonomy and collapses it into the service's
/// few external responses. A rejected caller learns that authentication
/// failed, never which check failed; the fine-grained variant goes to the
/// logs instead.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Convenience alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

/// Shared 403 body for every token or session rejection.
const INCORRECT_TOKEN: &str = "Incorrect Token";

/// Shared 500 body; detail stays in the logs.
const INTERNAL_MESSAGE: &str = "An unexpected error occurred while processing the request";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let AppError::Auth(err) = self;

        let (status, message) = match &err {
            AuthError::BadRequest => (StatusCode::BAD_REQUEST, "Bad Request body"),

            // Header usage errors keep distinct messages; they reveal
            // nothing about any token or session.
            AuthError::MissingAuth => (StatusCode::FORBIDDEN, "Authorization header is missing"),
            AuthError::MalformedAuth => {
                (StatusCode::FORBIDDEN, "Invalid authorization header format")
            }

            // Every token or session rejection collapses to one message.
            AuthError::SessionNotFound
            | AuthError::InvalidRefreshToken
            | AuthError::SessionExpired
            | AuthError::DeviceMismatch
            | AuthError::Token(
                TokenError::Invalid | TokenError::Expired | TokenError::AlgorithmMismatch,
            ) => (StatusCode::FORBIDDEN, INCORRECT_TOKEN),

            // Server-side failures.
            AuthError::Token(TokenError::InvalidKey(_) | TokenError::Signing(_))
            | AuthError::Secret(_)
            | AuthError::Store(_) => {
                tracing::error!(error = %err, "internal error while handling request");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE)
            }
        };

        if status == StatusCode::FORBIDDEN {
            tracing::debug!(error = %err, "request rejected");
        }

        let body = json!({
            "code": status.as_u16(),
            "message": message,
        });

        (status, axum::Json(body)).into_response()
    }
}
