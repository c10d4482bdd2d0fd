//! Shared response envelope types for admin API handlers.
//!
//! Admin responses use a `{ "data": ... }` envelope. The public event code
//! lookup returns its payload bare so existing clients can keep reading
//! `code`, `details`, `hint`, and `severity` at the top level.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
///
/// # Example
///
/// ```ignore
/// Ok(Json(DataResponse { data: items }))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
