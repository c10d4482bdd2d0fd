//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod event_code_repo;
pub mod prefix_repo;

pub use event_code_repo::EventCodeRepo;
pub use prefix_repo::PrefixRepo;

/// Recursive CTE exposing `prefix_paths (id, path)` for every prefix
/// reachable from a root, where `path` is the dot-joined segment chain.
pub(crate) const PREFIX_PATHS_CTE: &str = "WITH RECURSIVE prefix_paths (id, path) AS (
        SELECT id, prefix
        FROM prefixes
        WHERE parent_prefix_id IS NULL
        UNION ALL
        SELECT p.id, pp.path || '.' || p.prefix
        FROM prefixes p
        JOIN prefix_paths pp ON p.parent_prefix_id = pp.id
    )";
