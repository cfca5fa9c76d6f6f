//! Routes for the `/auth` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST /signin/{id}  -> sign_in
/// POST /refresh      -> refresh
/// POST /signout      -> sign_out (requires auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signin/{id}", post(auth::sign_in))
        .route("/refresh", post(auth::refresh))
        .route("/signout", post(auth::sign_out))
}
