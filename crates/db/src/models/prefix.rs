//! Prefix tree models and DTOs.

use kyotsu_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `prefixes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Prefix {
    pub id: DbId,
    /// Single upper-case segment, e.g. `LOGIN`.
    pub prefix: String,
    pub alias: String,
    pub description: Option<String>,
    pub parent_prefix_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A prefix together with its composed path from the root, e.g. `AUTH.LOGIN`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PrefixWithPath {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub prefix: Prefix,
    pub path: String,
}

/// Detail view returned by the admin API.
#[derive(Debug, Clone, Serialize)]
pub struct PrefixDetail {
    #[serde(flatten)]
    pub prefix: PrefixWithPath,
    pub child_prefixes: Vec<Prefix>,
    pub event_code_count: i64,
}

/// DTO for creating a prefix.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePrefix {
    pub prefix: String,
    pub alias: String,
    pub description: Option<String>,
    /// `None` creates a root prefix.
    pub parent_prefix_id: Option<DbId>,
}

/// DTO for updating a prefix. Absent fields are left untouched; nullable
/// fields may be cleared by sending `null`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePrefix {
    pub prefix: Option<String>,
    pub alias: Option<String>,
    #[serde(default, deserialize_with = "super::double_option")]
    pub description: Option<Option<String>>,
    /// `Some(None)` detaches the prefix and makes it a root.
    #[serde(default, deserialize_with = "super::double_option")]
    pub parent_prefix_id: Option<Option<DbId>>,
}

/// Outcome of [`PrefixRepo::update`](crate::repositories::PrefixRepo::update).
#[derive(Debug, Clone)]
pub enum PrefixUpdate {
    Updated(Prefix),
    NotFound,
    /// The requested parent is the prefix itself or one of its descendants.
    WouldCycle,
}

/// Query parameters for `GET /api/v1/admin/prefixes`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PrefixListParams {
    /// Only list direct children of this prefix.
    pub parent_prefix_id: Option<DbId>,
    /// Only list root prefixes. Ignored when `parent_prefix_id` is set.
    #[serde(default)]
    pub roots_only: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_distinguishes_null_from_absent() {
        let absent: UpdatePrefix = serde_json::from_str(r#"{"alias": "Auth"}"#).unwrap();
        assert_eq!(absent.parent_prefix_id, None);
        assert_eq!(absent.description, None);

        let cleared: UpdatePrefix =
            serde_json::from_str(r#"{"parent_prefix_id": null, "description": null}"#).unwrap();
        assert_eq!(cleared.parent_prefix_id, Some(None));
        assert_eq!(cleared.description, Some(None));

        let moved: UpdatePrefix = serde_json::from_str(r#"{"parent_prefix_id": 7}"#).unwrap();
        assert_eq!(moved.parent_prefix_id, Some(Some(7)));
    }
}
