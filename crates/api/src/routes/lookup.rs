//! Route definitions for the public event code lookup.

use axum::routing::get;
use axum::Router;

use crate::handlers::lookup;
use crate::state::AppState;

/// Mounted at the root, NOT under `/api/v1`.
///
/// ```text
/// GET /event_code/{code}  -> get_event_code
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/event_code/{code}", get(lookup::get_event_code))
}
