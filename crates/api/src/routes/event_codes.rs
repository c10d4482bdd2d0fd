//! Route definitions for the `/admin/event-codes` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::event_codes;
use crate::state::AppState;

/// Routes mounted at `/admin/event-codes`.
///
/// All routes require the `admin` role (enforced by handler extractors).
///
/// ```text
/// GET    /        -> list_event_codes
/// POST   /        -> create_event_code
/// GET    /{id}    -> get_event_code
/// PUT    /{id}    -> update_event_code
/// DELETE /{id}    -> delete_event_code
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(event_codes::list_event_codes).post(event_codes::create_event_code),
        )
        .route(
            "/{id}",
            get(event_codes::get_event_code)
                .put(event_codes::update_event_code)
                .delete(event_codes::delete_event_code),
        )
}
