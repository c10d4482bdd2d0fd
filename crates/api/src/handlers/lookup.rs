//! Public event code lookup.

use axum::extract::State;
use axum::Json;
use kyotsu_core::codes::{parse_event_code, resolve_message};
use kyotsu_core::error::CoreError;
use kyotsu_core::severity::Severity;
use kyotsu_db::repositories::{EventCodeRepo, PrefixRepo};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::extract::AppPath;
use crate::state::AppState;

/// Response body for `GET /event_code/{code}`.
#[derive(Debug, Serialize)]
pub struct EventCodeDetails {
    /// The code exactly as requested.
    pub code: String,
    /// User-facing message.
    pub details: String,
    pub hint: Option<String>,
    pub severity: Severity,
}

/// GET /event_code/{code}
///
/// Codes are matched case-insensitively. Responds 400 for malformed codes
/// and 404 when either the prefix path or the increment is unknown.
pub async fn get_event_code(
    State(state): State<AppState>,
    AppPath(code): AppPath<String>,
) -> AppResult<Json<EventCodeDetails>> {
    let parsed = parse_event_code(&code.to_ascii_uppercase())?;

    let prefix_id = PrefixRepo::find_id_by_path(&state.pool, &parsed.prefixes)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Prefix", parsed.prefix_path())))?;

    let event_code =
        EventCodeRepo::find_by_prefix_and_increment(&state.pool, prefix_id, parsed.increment)
            .await?
            .ok_or_else(|| AppError::Core(CoreError::not_found("EventCode", &code)))?;

    Ok(Json(EventCodeDetails {
        details: resolve_message(
            event_code.use_generic_message,
            event_code.custom_message.as_deref(),
        ),
        hint: event_code.hint,
        severity: event_code.severity,
        code,
    }))
}
