//! Tests for the `AppError` -> HTTP response mapping.
//!
//! The interesting property is collapse: externally there are only four
//! bodies (bad request, two header-usage messages, "Incorrect Token") plus
//! an opaque 500, regardless of which internal check failed.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;
use warden_api::error::AppError;
use warden_core::error::{AuthError, SecretError, StoreError, TokenError};

/// Render an error the way a handler would and return status plus JSON body.
async fn error_to_response(err: AuthError) -> (StatusCode, serde_json::Value) {
    let response = AppError::Auth(err).into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).expect("error body should be JSON");
    (status, body)
}

#[tokio::test]
async fn test_bad_request_maps_to_400() {
    let (status, body) = error_to_response(AuthError::BadRequest).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);
    assert_eq!(body["message"], "Bad Request body");
}

#[tokio::test]
async fn test_header_usage_errors_keep_distinct_messages() {
    let (status, body) = error_to_response(AuthError::MissingAuth).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Authorization header is missing");

    let (status, body) = error_to_response(AuthError::MalformedAuth).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Invalid authorization header format");
}

#[tokio::test]
async fn test_every_credential_rejection_collapses_to_incorrect_token() {
    let rejections = [
        AuthError::SessionNotFound,
        AuthError::InvalidRefreshToken,
        AuthError::SessionExpired,
        AuthError::DeviceMismatch,
        AuthError::Token(TokenError::Invalid),
        AuthError::Token(TokenError::Expired),
        AuthError::Token(TokenError::AlgorithmMismatch),
    ];

    for err in rejections {
        let label = format!("{err:?}");
        let (status, body) = error_to_response(err).await;

        assert_eq!(status, StatusCode::FORBIDDEN, "variant: {label}");
        assert_eq!(body["code"], 403, "variant: {label}");
        assert_eq!(body["message"], "Incorrect Token", "variant: {label}");
    }
}

#[tokio::test]
async fn test_internal_failures_map_to_an_opaque_500() {
    let failures = [
        AuthError::Store(StoreError("connection reset by peer".to_string())),
        AuthError::Secret(SecretError::Entropy("rng exhausted".to_string())),
        AuthError::Secret(SecretError::CorruptHash("bad phc string".to_string())),
        AuthError::Token(TokenError::Signing("key refused".to_string())),
        AuthError::Token(TokenError::InvalidKey("not pem".to_string())),
    ];

    for err in failures {
        let label = format!("{err:?}");
        let (status, body) = error_to_response(err).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "variant: {label}");
        assert_eq!(body["code"], 500, "variant: {label}");
        assert_eq!(
            body["message"],
            "An unexpected error occurred while processing the request",
            "variant: {label}"
        );
    }
}

#[tokio::test]
async fn test_internal_detail_never_leaks_into_the_body() {
    let (_, body) = error_to_response(AuthError::Store(StoreError(
        "password authentication failed for user postgres".to_string(),
    )))
    .await;

    let rendered = body.to_string();
    assert!(!rendered.contains("postgres"));
    assert!(!rendered.contains("password"));
}

#[tokio::test]
async fn test_code_field_always_mirrors_the_status() {
    let samples = [
        AuthError::BadRequest,
        AuthError::MissingAuth,
        AuthError::SessionExpired,
        AuthError::Store(StoreError("down".to_string())),
    ];

    for err in samples {
        let (status, body) = error_to_response(err).await;
        assert_eq!(body["code"], status.as_u16());
    }
}
