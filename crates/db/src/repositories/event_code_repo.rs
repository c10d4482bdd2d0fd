//! Repository for the `event_codes` table.

use kyotsu_core::pagination::{clamp_limit, clamp_offset, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use kyotsu_core::types::{CodeId, DbId};
use sqlx::PgPool;

use super::PREFIX_PATHS_CTE;
use crate::models::event_code::{
    CreateEventCode, EventCode, EventCodeListParams, EventCodeWithPath, UpdateEventCode,
};

const COLUMNS: &str = "id, prefix_id, increment, custom_message, hint, severity, dev_note, \
     is_deprecated, use_generic_message, is_private, created_at, updated_at";

const E_COLUMNS: &str = "e.id, e.prefix_id, e.increment, e.custom_message, e.hint, e.severity, \
     e.dev_note, e.is_deprecated, e.use_generic_message, e.is_private, e.created_at, e.updated_at";

/// Provides CRUD operations for event codes.
pub struct EventCodeRepo;

impl EventCodeRepo {
    /// Insert a new event code. The database assigns `increment` as the
    /// next number within the prefix.
    pub async fn create(pool: &PgPool, input: &CreateEventCode) -> Result<EventCode, sqlx::Error> {
        let query = format!(
            "INSERT INTO event_codes
                (prefix_id, custom_message, hint, severity, dev_note, use_generic_message, is_private)
             VALUES ($1, $2, $3, $4, $5, COALESCE($6, FALSE), COALESCE($7, FALSE))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, EventCode>(&query)
            .bind(input.prefix_id)
            .bind(&input.custom_message)
            .bind(&input.hint)
            .bind(input.severity.as_str())
            .bind(&input.dev_note)
            .bind(input.use_generic_message)
            .bind(input.is_private)
            .fetch_one(pool)
            .await
    }

    /// Find an event code by id, joined with its prefix path.
    pub async fn find_by_id(
        pool: &PgPool,
        id: CodeId,
    ) -> Result<Option<EventCodeWithPath>, sqlx::Error> {
        let query = format!(
            "{PREFIX_PATHS_CTE}
             SELECT {E_COLUMNS}, pp.path AS prefix_path
             FROM event_codes e
             JOIN prefix_paths pp ON pp.id = e.prefix_id
             WHERE e.id = $1"
        );
        sqlx::query_as::<_, EventCodeWithPath>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the code numbered `increment` under a prefix.
    pub async fn find_by_prefix_and_increment(
        pool: &PgPool,
        prefix_id: DbId,
        increment: i32,
    ) -> Result<Option<EventCode>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM event_codes WHERE prefix_id = $1 AND increment = $2");
        sqlx::query_as::<_, EventCode>(&query)
            .bind(prefix_id)
            .bind(increment)
            .fetch_optional(pool)
            .await
    }

    /// List event codes grouped by prefix: ordered by composed prefix path
    /// (byte order), then by increment within each prefix.
    pub async fn list(
        pool: &PgPool,
        params: &EventCodeListParams,
    ) -> Result<Vec<EventCodeWithPath>, sqlx::Error> {
        let limit = clamp_limit(params.limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT);
        let offset = clamp_offset(params.offset);
        let query = format!(
            "{PREFIX_PATHS_CTE}
             SELECT {E_COLUMNS}, pp.path AS prefix_path
             FROM event_codes e
             JOIN prefix_paths pp ON pp.id = e.prefix_id
             WHERE ($1::BIGINT IS NULL OR e.prefix_id = $1)
               AND ($2::TEXT IS NULL OR e.severity = $2)
               AND ($3 OR NOT e.is_deprecated)
             ORDER BY pp.path COLLATE \"C\", e.increment
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, EventCodeWithPath>(&query)
            .bind(params.prefix_id)
            .bind(params.severity.map(|s| s.as_str()))
            .bind(params.include_deprecated)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Update an event code. Only fields present in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: CodeId,
        input: &UpdateEventCode,
    ) -> Result<Option<EventCode>, sqlx::Error> {
        let query = format!(
            "UPDATE event_codes SET
                custom_message = CASE WHEN $2 THEN $3 ELSE custom_message END,
                hint = CASE WHEN $4 THEN $5 ELSE hint END,
                severity = COALESCE($6, severity),
                dev_note = CASE WHEN $7 THEN $8 ELSE dev_note END,
                is_deprecated = COALESCE($9, is_deprecated),
                use_generic_message = COALESCE($10, use_generic_message),
                is_private = COALESCE($11, is_private)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, EventCode>(&query)
            .bind(id)
            .bind(input.custom_message.is_some())
            .bind(input.custom_message.clone().flatten())
            .bind(input.hint.is_some())
            .bind(input.hint.clone().flatten())
            .bind(input.severity.map(|s| s.as_str()))
            .bind(input.dev_note.is_some())
            .bind(input.dev_note.clone().flatten())
            .bind(input.is_deprecated)
            .bind(input.use_generic_message)
            .bind(input.is_private)
            .fetch_optional(pool)
            .await
    }

    /// Delete an event code. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: CodeId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM event_codes WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
