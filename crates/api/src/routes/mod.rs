//! Route definitions, grouped by resource.

pub mod auth;
pub mod health;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the API route tree.
///
/// ```text
/// POST /auth/signin/{id}  sign-in (public; identity pre-validated upstream)
/// POST /auth/refresh      refresh (public; the presented pair is the credential)
/// POST /auth/signout      sign-out (requires auth)
/// GET  /users/me          authenticated subject (requires auth)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
}
