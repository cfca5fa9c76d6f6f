//! Bearer-token authorization guard.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use warden_core::error::AuthError;
use warden_core::types::SessionId;

use crate::error::AppError;
use crate::state::AppState;

/// Authenticated identity extracted from the `Authorization` header.
///
/// The extractor fully verifies the Bearer access token (signature and
/// expiry) and confirms the referenced session still exists, so a handler
/// taking an `AuthUser` parameter only ever runs for live sessions:
///
/// ```ignore
/// async fn me(user: AuthUser) -> Json<UserResponse> {
///     Json(UserResponse { user_id: user.user_id })
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The authenticated subject (`sub` claim).
    pub user_id: String,
    /// The session the token belongs to (`sid` claim).
    pub session_id: SessionId,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .ok_or(AppError::Auth(AuthError::MissingAuth))?;

        // Exactly two space-separated parts, the first being "Bearer". An
        // empty token passes the shape check and fails verification below.
        let parts_of_header: Vec<&str> = header.split(' ').collect();
        let token = match parts_of_header.as_slice() {
            ["Bearer", token] => *token,
            _ => return Err(AppError::Auth(AuthError::MalformedAuth)),
        };

        let claims = state.auth.authorize(token).await?;

        Ok(AuthUser {
            user_id: claims.sub,
            session_id: claims.sid,
        })
    }
}
