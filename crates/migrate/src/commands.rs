//! Commands that talk to the database.

use std::collections::BTreeMap;
use std::path::Path;

use kyotsu_core::config::{ConfigError, EnvReader};
use kyotsu_core::types::Timestamp;
use kyotsu_db::{DatabaseConfig, DbPool};
use sqlx::migrate::Migrator;

use crate::error::MigrateToolError;

/// Connection URL used instead of the service configuration in CI.
pub const CI_URL_VAR: &str = "POSTGRES_MIGRATION_URL";

/// Pool size for the tool; migrations run on a single connection.
const TOOL_MAX_CONNECTIONS: u32 = 2;

/// Where to connect: `POSTGRES_MIGRATION_URL` in CI mode, otherwise the
/// same settings the API server reads.
pub fn resolve_database(ci_mode: bool, env: &EnvReader) -> Result<DatabaseConfig, ConfigError> {
    let mut config = if ci_mode {
        let url = env.required(CI_URL_VAR)?;
        DatabaseConfig::from_url(CI_URL_VAR, &url)?
    } else {
        DatabaseConfig::from_reader(env)?
    };
    config.max_connections = TOOL_MAX_CONNECTIONS;
    Ok(config)
}

/// Load the migration scripts from disk.
pub async fn load_migrator(script_location: &Path) -> Result<Migrator, MigrateToolError> {
    Ok(Migrator::new(script_location).await?)
}

/// One row of `status` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    pub version: i64,
    pub description: String,
    pub applied_at: Option<Timestamp>,
}

impl MigrationStatus {
    pub fn is_applied(&self) -> bool {
        self.applied_at.is_some()
    }
}

/// Successfully applied versions with their install time. Empty when the
/// bookkeeping table has not been created yet.
pub async fn applied_versions(pool: &DbPool) -> Result<BTreeMap<i64, Timestamp>, MigrateToolError> {
    let exists: bool =
        sqlx::query_scalar("SELECT to_regclass('_sqlx_migrations') IS NOT NULL")
            .fetch_one(pool)
            .await?;
    if !exists {
        return Ok(BTreeMap::new());
    }

    let rows: Vec<(i64, Timestamp)> = sqlx::query_as(
        "SELECT version, installed_on FROM _sqlx_migrations WHERE success ORDER BY version",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().collect())
}

/// Every known migration, applied or pending, in version order.
pub async fn status(
    pool: &DbPool,
    migrator: &Migrator,
) -> Result<Vec<MigrationStatus>, MigrateToolError> {
    let applied = applied_versions(pool).await?;
    Ok(migrator
        .iter()
        .filter(|m| !m.migration_type.is_down_migration())
        .map(|m| MigrationStatus {
            version: m.version,
            description: m.description.to_string(),
            applied_at: applied.get(&m.version).copied(),
        })
        .collect())
}

/// Apply every pending migration. Returns the versions that were applied.
pub async fn upgrade(pool: &DbPool, migrator: &Migrator) -> Result<Vec<i64>, MigrateToolError> {
    let pending: Vec<i64> = status(pool, migrator)
        .await?
        .into_iter()
        .filter(|s| !s.is_applied())
        .map(|s| s.version)
        .collect();

    if pending.is_empty() {
        tracing::info!("Database is up to date");
        return Ok(pending);
    }

    migrator.run(pool).await?;
    for version in &pending {
        tracing::info!(version, "Applied migration");
    }
    Ok(pending)
}

/// Revert migrations newer than `target`. Without a target, only the most
/// recent migration is reverted. `0` reverts everything.
///
/// Returns the reverted versions, newest first.
pub async fn downgrade(
    pool: &DbPool,
    migrator: &Migrator,
    target: Option<i64>,
) -> Result<Vec<i64>, MigrateToolError> {
    let applied: Vec<i64> = applied_versions(pool).await?.into_keys().collect();
    let Some(&latest) = applied.last() else {
        tracing::info!("No applied migrations to revert");
        return Ok(Vec::new());
    };

    let target = match target {
        Some(0) => 0,
        Some(version) if applied.contains(&version) => version,
        Some(version) => return Err(MigrateToolError::UnknownVersion(version)),
        None => applied.iter().rev().nth(1).copied().unwrap_or(0),
    };

    let reverted: Vec<i64> = applied.iter().rev().copied().filter(|v| *v > target).collect();
    if reverted.is_empty() {
        tracing::info!(target_version = target, latest, "Already at target version");
        return Ok(reverted);
    }

    migrator.undo(pool, target).await?;
    for version in &reverted {
        tracing::info!(version, "Reverted migration");
    }
    Ok(reverted)
}
