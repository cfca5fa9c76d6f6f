//! Handlers for the `/users` resource.

use axum::Json;
use serde::Serialize;

use crate::middleware::auth::AuthUser;

/// Response body for `GET /users/me`.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user_id: String,
}

/// GET /users/me
///
/// Return the authenticated subject. The guard has already verified the
/// token and the session; this handler only reflects the result.
pub async fn me(user: AuthUser) -> Json<UserResponse> {
    Json(UserResponse {
        user_id: user.user_id,
    })
}
