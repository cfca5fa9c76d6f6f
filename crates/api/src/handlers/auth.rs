//! Handlers for the `/auth` resource: sign-in, refresh, sign-out.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use warden_core::error::AuthError;
use warden_core::session::TokenPair;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::client_meta::ClientMeta;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Response body for `POST /auth/signout`.
#[derive(Debug, Serialize)]
pub struct SignOutResponse {
    pub message: &'static str,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /auth/signin/{id}
///
/// Create a session for an externally authenticated user id and return the
/// first token pair. The identity in the path is trusted; the device
/// fingerprint comes from transport metadata, never from the body.
pub async fn sign_in(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    ClientMeta(client): ClientMeta,
) -> AppResult<Json<TokenPair>> {
    let pair = state.auth.sign_in(&user_id, &client).await?;
    Ok(Json(pair))
}

/// POST /auth/refresh
///
/// Exchange a presented token pair for a freshly rotated one. The body is
/// the pair itself; both fields must be present and non-empty.
pub async fn refresh(
    State(state): State<AppState>,
    ClientMeta(client): ClientMeta,
    payload: Result<Json<TokenPair>, JsonRejection>,
) -> AppResult<Json<TokenPair>> {
    let Json(presented) = payload.map_err(|_| AppError::Auth(AuthError::BadRequest))?;

    if presented.access_token.is_empty() || presented.refresh_token.is_empty() {
        return Err(AppError::Auth(AuthError::BadRequest));
    }

    let pair = state.auth.refresh(&presented, &client).await?;
    Ok(Json(pair))
}

/// POST /auth/signout
///
/// Delete the authenticated session. Idempotent underneath: deleting an
/// already-removed session still reports success, though the guard will
/// have rejected such a request first.
pub async fn sign_out(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<SignOutResponse>> {
    state.auth.sign_out(user.session_id).await?;

    Ok(Json(SignOutResponse {
        message: "Sign out success",
    }))
}
