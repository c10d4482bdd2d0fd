//! Repository for the `prefixes` table.

use kyotsu_core::codes::join_path;
use kyotsu_core::pagination::{clamp_limit, clamp_offset, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use kyotsu_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use super::PREFIX_PATHS_CTE;
use crate::models::prefix::{
    CreatePrefix, Prefix, PrefixListParams, PrefixUpdate, PrefixWithPath, UpdatePrefix,
};

/// Advisory lock `(class, object)` serialising re-parents across the whole
/// tree. The two-key form never collides with the single-key per-prefix
/// locks taken by the event code increment trigger.
const TREE_LOCK: (i32, i32) = (0x4b59_5453, 1);

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, prefix, alias, description, parent_prefix_id, created_at, updated_at";

/// Same columns, qualified for joins against `prefixes p`.
const P_COLUMNS: &str =
    "p.id, p.prefix, p.alias, p.description, p.parent_prefix_id, p.created_at, p.updated_at";

/// Provides CRUD and tree operations for prefixes.
pub struct PrefixRepo;

impl PrefixRepo {
    /// Insert a new prefix, returning the created row.
    ///
    /// The segment must already be normalized (upper-case ASCII letters);
    /// the table's CHECK constraint rejects anything else.
    pub async fn create(pool: &PgPool, input: &CreatePrefix) -> Result<Prefix, sqlx::Error> {
        let query = format!(
            "INSERT INTO prefixes (prefix, alias, description, parent_prefix_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Prefix>(&query)
            .bind(&input.prefix)
            .bind(&input.alias)
            .bind(&input.description)
            .bind(input.parent_prefix_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Prefix>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM prefixes WHERE id = $1");
        sqlx::query_as::<_, Prefix>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a prefix by id together with its composed path.
    pub async fn find_with_path(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<PrefixWithPath>, sqlx::Error> {
        let query = format!(
            "{PREFIX_PATHS_CTE}
             SELECT {P_COLUMNS}, pp.path
             FROM prefixes p
             JOIN prefix_paths pp ON pp.id = p.id
             WHERE p.id = $1"
        );
        sqlx::query_as::<_, PrefixWithPath>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List prefixes with their composed paths, ordered by path.
    pub async fn list(
        pool: &PgPool,
        params: &PrefixListParams,
    ) -> Result<Vec<PrefixWithPath>, sqlx::Error> {
        let limit = clamp_limit(params.limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT);
        let offset = clamp_offset(params.offset);
        let query = format!(
            "{PREFIX_PATHS_CTE}
             SELECT {P_COLUMNS}, pp.path
             FROM prefixes p
             JOIN prefix_paths pp ON pp.id = p.id
             WHERE ($1::BIGINT IS NULL OR p.parent_prefix_id = $1)
               AND ($1::BIGINT IS NOT NULL OR NOT $2 OR p.parent_prefix_id IS NULL)
             ORDER BY pp.path COLLATE \"C\"
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, PrefixWithPath>(&query)
            .bind(params.parent_prefix_id)
            .bind(params.roots_only)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Direct children of a prefix, ordered by segment.
    pub async fn list_children(pool: &PgPool, id: DbId) -> Result<Vec<Prefix>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM prefixes WHERE parent_prefix_id = $1 ORDER BY prefix"
        );
        sqlx::query_as::<_, Prefix>(&query)
            .bind(id)
            .fetch_all(pool)
            .await
    }

    /// Update a prefix. Only fields present in `input` are applied.
    ///
    /// Re-parenting takes the tree lock and re-checks the ancestor chain
    /// inside the same transaction, so two concurrent moves can never close
    /// a loop between them.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdatePrefix,
    ) -> Result<PrefixUpdate, sqlx::Error> {
        let mut tx = pool.begin().await?;

        if let Some(Some(new_parent)) = input.parent_prefix_id {
            sqlx::query("SELECT pg_advisory_xact_lock($1, $2)")
                .bind(TREE_LOCK.0)
                .bind(TREE_LOCK.1)
                .execute(&mut *tx)
                .await?;
            if Self::would_create_cycle(&mut *tx, id, new_parent).await? {
                return Ok(PrefixUpdate::WouldCycle);
            }
        }

        let query = format!(
            "UPDATE prefixes SET
                prefix = COALESCE($2, prefix),
                alias = COALESCE($3, alias),
                description = CASE WHEN $4 THEN $5 ELSE description END,
                parent_prefix_id = CASE WHEN $6 THEN $7 ELSE parent_prefix_id END
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Prefix>(&query)
            .bind(id)
            .bind(&input.prefix)
            .bind(&input.alias)
            .bind(input.description.is_some())
            .bind(input.description.clone().flatten())
            .bind(input.parent_prefix_id.is_some())
            .bind(input.parent_prefix_id.flatten())
            .fetch_optional(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(updated.map_or(PrefixUpdate::NotFound, PrefixUpdate::Updated))
    }

    /// Delete a prefix. Descendant prefixes and their event codes cascade.
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM prefixes WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Whether making `new_parent_id` the parent of `id` would put `id` on
    /// its own ancestor chain.
    pub async fn would_create_cycle<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        new_parent_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "WITH RECURSIVE ancestors (id, parent_prefix_id) AS (
                SELECT id, parent_prefix_id FROM prefixes WHERE id = $2
                UNION
                SELECT p.id, p.parent_prefix_id
                FROM prefixes p
                JOIN ancestors a ON p.id = a.parent_prefix_id
            )
            SELECT EXISTS (SELECT 1 FROM ancestors WHERE id = $1)",
        )
        .bind(id)
        .bind(new_parent_id)
        .fetch_one(executor)
        .await
    }

    /// Resolve a composed path (given as segments) to a prefix id.
    pub async fn find_id_by_path<S: AsRef<str>>(
        pool: &PgPool,
        segments: &[S],
    ) -> Result<Option<DbId>, sqlx::Error> {
        let query = format!(
            "{PREFIX_PATHS_CTE}
             SELECT id FROM prefix_paths WHERE path = $1 ORDER BY id LIMIT 1"
        );
        sqlx::query_scalar::<_, DbId>(&query)
            .bind(join_path(segments))
            .fetch_optional(pool)
            .await
    }

    /// Composed path of a single prefix, walking up to its root.
    pub async fn composed_path(pool: &PgPool, id: DbId) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar::<_, Option<String>>(
            "WITH RECURSIVE chain (id, prefix, parent_prefix_id, depth) AS (
                SELECT id, prefix, parent_prefix_id, 0 FROM prefixes WHERE id = $1
                UNION ALL
                SELECT p.id, p.prefix, p.parent_prefix_id, c.depth + 1
                FROM prefixes p
                JOIN chain c ON p.id = c.parent_prefix_id
            )
            SELECT string_agg(prefix, '.' ORDER BY depth DESC) FROM chain",
        )
        .bind(id)
        .fetch_one(pool)
        .await
    }

    /// Number of event codes directly under a prefix.
    pub async fn count_event_codes(pool: &PgPool, id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM event_codes WHERE prefix_id = $1")
            .bind(id)
            .fetch_one(pool)
            .await
    }
}
