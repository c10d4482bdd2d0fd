//! Route definitions for the `/admin/prefixes` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::prefixes;
use crate::state::AppState;

/// Routes mounted at `/admin/prefixes`.
///
/// All routes require the `admin` role (enforced by handler extractors).
///
/// ```text
/// GET    /        -> list_prefixes
/// POST   /        -> create_prefix
/// GET    /{id}    -> get_prefix
/// PUT    /{id}    -> update_prefix
/// DELETE /{id}    -> delete_prefix
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(prefixes::list_prefixes).post(prefixes::create_prefix),
        )
        .route(
            "/{id}",
            get(prefixes::get_prefix)
                .put(prefixes::update_prefix)
                .delete(prefixes::delete_prefix),
        )
}
