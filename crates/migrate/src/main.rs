use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use kyotsu_core::config::EnvReader;
use kyotsu_db::DbPool;
use kyotsu_migrate::settings::MigrateSettings;
use kyotsu_migrate::{commands, revision};
use sqlx::migrate::Migrator;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is not set.
const DEFAULT_LOG_FILTER: &str = "warn,sqlx=warn,kyotsu_migrate=info,kyotsu_db=info";

#[derive(Parser)]
#[command(name = "kyotsu-migrate", version)]
#[command(about = "Apply, revert, inspect, and generate Kyotsu schema migrations")]
struct Cli {
    /// Path to the migration settings file
    #[arg(short, long, default_value = "migrate.toml", global = true)]
    config: PathBuf,

    /// Connect using POSTGRES_MIGRATION_URL instead of the service settings
    #[arg(long, global = true)]
    ci_mode: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply all pending migrations
    Upgrade,
    /// Revert applied migrations
    Downgrade {
        /// Version to revert to (default: the previously applied one; 0 reverts all)
        #[arg(long)]
        target: Option<i64>,
    },
    /// List applied and pending migrations
    Status,
    /// Generate a new up/down migration pair
    Revision {
        /// Short description used for the file name
        #[arg(short, long)]
        message: String,

        /// Skip post-write hooks
        #[arg(long)]
        no_hooks: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let settings = MigrateSettings::load(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;

    match cli.command {
        Command::Revision { message, no_hooks } => {
            let at = revision::now_in(settings.timezone);
            let generated = revision::generate(&settings, &message, at, !no_hooks)?;
            println!("{}", generated.up_path.display());
            println!("{}", generated.down_path.display());
        }
        Command::Upgrade => {
            let (pool, migrator) = connect(&settings, cli.ci_mode).await?;
            let applied = commands::upgrade(&pool, &migrator).await?;
            println!("Applied {} migration(s)", applied.len());
            pool.close().await;
        }
        Command::Downgrade { target } => {
            let (pool, migrator) = connect(&settings, cli.ci_mode).await?;
            let reverted = commands::downgrade(&pool, &migrator, target).await?;
            println!("Reverted {} migration(s)", reverted.len());
            pool.close().await;
        }
        Command::Status => {
            let (pool, migrator) = connect(&settings, cli.ci_mode).await?;
            for entry in commands::status(&pool, &migrator).await? {
                let state = match entry.applied_at {
                    Some(at) => format!("applied {}", at.format("%Y-%m-%d %H:%M:%S")),
                    None => "pending".to_string(),
                };
                println!("{:>14}  {:<40}  {state}", entry.version, entry.description);
            }
            pool.close().await;
        }
    }

    Ok(())
}

async fn connect(settings: &MigrateSettings, ci_mode: bool) -> anyhow::Result<(DbPool, Migrator)> {
    let db_config = commands::resolve_database(ci_mode, &EnvReader::process())
        .context("Invalid database configuration")?;
    let pool = kyotsu_db::create_pool(&db_config)
        .await
        .with_context(|| format!("Failed to connect to {}", db_config.display_target()))?;
    tracing::info!(target_db = %db_config.display_target(), "Connected");

    let migrator = commands::load_migrator(&settings.script_location)
        .await
        .with_context(|| format!("Failed to read {}", settings.script_location.display()))?;
    Ok((pool, migrator))
}

/// Single stderr writer, `LEVEL target message` lines with `%H:%M:%S`
/// timestamps. `RUST_LOG` overrides [`DEFAULT_LOG_FILTER`].
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_timer(ChronoUtc::new("%H:%M:%S".to_string()))
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .init();
}
