use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

pub mod config;
pub mod models;
pub mod repositories;

pub use config::DatabaseConfig;

pub type DbPool = sqlx::PgPool;

/// Migrations embedded at compile time from `db/migrations`.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../db/migrations");

/// Create a connection pool from resolved database configuration.
pub async fn create_pool(config: &DatabaseConfig) -> Result<DbPool, sqlx::Error> {
    tracing::info!(
        target_db = %config.display_target(),
        max_connections = config.max_connections,
        "Opening connection pool",
    );
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(config.connect_options.clone())
        .await
}

/// Round-trip a trivial query to verify the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply all pending embedded migrations.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    let known = MIGRATOR.iter().filter(|m| !m.migration_type.is_down_migration()).count();
    tracing::info!(known, "Applying embedded migrations");
    MIGRATOR.run(pool).await
}
