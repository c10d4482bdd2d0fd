//! Handlers for the `/admin/event-codes` resource.
//!
//! All handlers require the `admin` role via [`RequireAdmin`].

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use kyotsu_core::error::CoreError;
use kyotsu_core::types::CodeId;
use kyotsu_db::models::event_code::{
    CreateEventCode, EventCodeListParams, EventCodeView, UpdateEventCode,
};
use kyotsu_db::repositories::EventCodeRepo;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/admin/event-codes
///
/// Filterable by `prefix_id`, `severity`, and `include_deprecated`.
pub async fn list_event_codes(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    AppQuery(params): AppQuery<EventCodeListParams>,
) -> AppResult<Json<DataResponse<Vec<EventCodeView>>>> {
    let rows = EventCodeRepo::list(&state.pool, &params).await?;
    let data = rows.into_iter().map(EventCodeView::from).collect();
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/admin/event-codes
///
/// The increment is assigned by the database. An unknown `prefix_id`
/// yields 400.
pub async fn create_event_code(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppJson(input): AppJson<CreateEventCode>,
) -> AppResult<(StatusCode, Json<DataResponse<EventCodeView>>)> {
    let created = EventCodeRepo::create(&state.pool, &input).await?;
    let view = load_view(&state, created.id).await?;

    tracing::info!(
        event_code_id = %created.id,
        code = %view.code,
        admin = %admin.subject,
        "Event code created",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: view })))
}

/// GET /api/v1/admin/event-codes/{id}
pub async fn get_event_code(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    AppPath(id): AppPath<CodeId>,
) -> AppResult<Json<DataResponse<EventCodeView>>> {
    let view = load_view(&state, id).await?;
    Ok(Json(DataResponse { data: view }))
}

/// PUT /api/v1/admin/event-codes/{id}
///
/// Partial update. The prefix and increment cannot change.
pub async fn update_event_code(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppPath(id): AppPath<CodeId>,
    AppJson(input): AppJson<UpdateEventCode>,
) -> AppResult<Json<DataResponse<EventCodeView>>> {
    EventCodeRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("EventCode", id)))?;
    let view = load_view(&state, id).await?;

    tracing::info!(
        event_code_id = %id,
        code = %view.code,
        admin = %admin.subject,
        "Event code updated",
    );

    Ok(Json(DataResponse { data: view }))
}

/// DELETE /api/v1/admin/event-codes/{id}
pub async fn delete_event_code(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppPath(id): AppPath<CodeId>,
) -> AppResult<StatusCode> {
    let deleted = EventCodeRepo::delete(&state.pool, id).await?;
    if deleted {
        tracing::info!(event_code_id = %id, admin = %admin.subject, "Event code deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::not_found("EventCode", id)))
    }
}

async fn load_view(state: &AppState, id: CodeId) -> AppResult<EventCodeView> {
    EventCodeRepo::find_by_id(&state.pool, id)
        .await?
        .map(EventCodeView::from)
        .ok_or_else(|| AppError::Core(CoreError::not_found("EventCode", id)))
}
