pub mod auth;
pub mod event_codes;
pub mod health;
pub mod lookup;
pub mod prefixes;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                     login (public)
///
/// /admin/prefixes                 list, create (admin only)
/// /admin/prefixes/{id}            get, update, delete
///
/// /admin/event-codes              list, create (admin only)
/// /admin/event-codes/{id}         get, update, delete
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/admin/prefixes", prefixes::router())
        .nest("/admin/event-codes", event_codes::router())
}
