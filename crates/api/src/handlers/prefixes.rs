//! Handlers for the `/admin/prefixes` resource.
//!
//! All handlers require the `admin` role via [`RequireAdmin`].

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use kyotsu_core::codes::normalize_prefix_segment;
use kyotsu_core::error::CoreError;
use kyotsu_core::types::DbId;
use kyotsu_db::models::prefix::{
    CreatePrefix, PrefixDetail, PrefixListParams, PrefixUpdate, PrefixWithPath, UpdatePrefix,
};
use kyotsu_db::repositories::PrefixRepo;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/admin/prefixes
///
/// List prefixes with their composed paths, ordered by path.
pub async fn list_prefixes(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    AppQuery(params): AppQuery<PrefixListParams>,
) -> AppResult<Json<DataResponse<Vec<PrefixWithPath>>>> {
    let prefixes = PrefixRepo::list(&state.pool, &params).await?;
    Ok(Json(DataResponse { data: prefixes }))
}

/// POST /api/v1/admin/prefixes
///
/// Create a prefix. The segment is normalized to upper case; a duplicate
/// composed path yields 409.
pub async fn create_prefix(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppJson(mut input): AppJson<CreatePrefix>,
) -> AppResult<(StatusCode, Json<DataResponse<PrefixWithPath>>)> {
    input.prefix = normalize_prefix_segment(&input.prefix)?;
    input.alias = require_alias(&input.alias)?;

    let created = PrefixRepo::create(&state.pool, &input).await?;
    let prefix = load_with_path(&state, created.id).await?;

    tracing::info!(
        prefix_id = prefix.prefix.id,
        path = %prefix.path,
        admin = %admin.subject,
        "Prefix created",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: prefix })))
}

/// GET /api/v1/admin/prefixes/{id}
///
/// A prefix with its composed path, direct children, and event code count.
pub async fn get_prefix(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<DataResponse<PrefixDetail>>> {
    let prefix = load_with_path(&state, id).await?;
    let child_prefixes = PrefixRepo::list_children(&state.pool, id).await?;
    let event_code_count = PrefixRepo::count_event_codes(&state.pool, id).await?;

    Ok(Json(DataResponse {
        data: PrefixDetail {
            prefix,
            child_prefixes,
            event_code_count,
        },
    }))
}

/// PUT /api/v1/admin/prefixes/{id}
///
/// Partial update. Re-parenting under the prefix itself or one of its
/// descendants is rejected with 400.
pub async fn update_prefix(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppPath(id): AppPath<DbId>,
    AppJson(mut input): AppJson<UpdatePrefix>,
) -> AppResult<Json<DataResponse<PrefixWithPath>>> {
    input.prefix = input.prefix.as_deref().map(normalize_prefix_segment).transpose()?;
    input.alias = input.alias.as_deref().map(require_alias).transpose()?;

    match PrefixRepo::update(&state.pool, id, &input).await? {
        PrefixUpdate::Updated(_) => {}
        PrefixUpdate::NotFound => {
            return Err(AppError::Core(CoreError::not_found("Prefix", id)));
        }
        PrefixUpdate::WouldCycle => {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Prefix {id} cannot be moved under itself or one of its descendants"
            ))));
        }
    }

    let prefix = load_with_path(&state, id).await?;

    tracing::info!(
        prefix_id = id,
        path = %prefix.path,
        admin = %admin.subject,
        "Prefix updated",
    );

    Ok(Json(DataResponse { data: prefix }))
}

/// DELETE /api/v1/admin/prefixes/{id}
///
/// Removes the prefix together with its descendants and their event codes.
pub async fn delete_prefix(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppPath(id): AppPath<DbId>,
) -> AppResult<StatusCode> {
    let deleted = PrefixRepo::delete(&state.pool, id).await?;
    if deleted {
        tracing::info!(prefix_id = id, admin = %admin.subject, "Prefix deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::not_found("Prefix", id)))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn load_with_path(state: &AppState, id: DbId) -> AppResult<PrefixWithPath> {
    PrefixRepo::find_with_path(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Prefix", id)))
}

fn require_alias(alias: &str) -> Result<String, CoreError> {
    let trimmed = alias.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Alias must not be empty".into()));
    }
    Ok(trimmed.to_string())
}
