//! Database connection settings.

use std::str::FromStr;

use kyotsu_core::config::{ConfigError, EnvReader};
use sqlx::postgres::PgConnectOptions;

/// Default PostgreSQL port when `POSTGRES__PORT` is not set.
pub const DEFAULT_PORT: u16 = 5432;

/// Default pool size when `DB_MAX_CONNECTIONS` is not set.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 20;

/// Resolved PostgreSQL connection settings.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub connect_options: PgConnectOptions,
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// Load from the process environment.
    ///
    /// | Env Var               | Required                     | Default |
    /// |-----------------------|------------------------------|---------|
    /// | `DATABASE_URL`        | no (overrides the parts)     | --      |
    /// | `POSTGRES__HOST`      | unless `DATABASE_URL` is set | --      |
    /// | `POSTGRES__PORT`      | no                           | `5432`  |
    /// | `POSTGRES__USERNAME`  | unless `DATABASE_URL` is set | --      |
    /// | `POSTGRES__PASSWORD`  | unless `DATABASE_URL` is set | --      |
    /// | `POSTGRES__DATABASE`  | unless `DATABASE_URL` is set | --      |
    /// | `DB_MAX_CONNECTIONS`  | no                           | `20`    |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_reader(&EnvReader::process())
    }

    pub fn from_reader(env: &EnvReader) -> Result<Self, ConfigError> {
        let connect_options = match env.optional("DATABASE_URL") {
            Some(url) => parse_url("DATABASE_URL", &url)?,
            None => PgConnectOptions::new_without_pgpass()
                .host(&env.required("POSTGRES__HOST")?)
                .port(env.parse_or("POSTGRES__PORT", DEFAULT_PORT)?)
                .username(&env.required("POSTGRES__USERNAME")?)
                .password(&env.required("POSTGRES__PASSWORD")?)
                .database(&env.required("POSTGRES__DATABASE")?),
        };

        let max_connections = env.parse_or("DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?;

        Ok(Self {
            connect_options,
            max_connections,
        })
    }

    /// Build from an explicit connection URL, e.g. one handed to the
    /// migration tool in CI.
    pub fn from_url(key: &str, url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            connect_options: parse_url(key, url)?,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        })
    }

    /// `host:port/database`, safe to log.
    pub fn display_target(&self) -> String {
        format!(
            "{}:{}/{}",
            self.connect_options.get_host(),
            self.connect_options.get_port(),
            self.connect_options.get_database().unwrap_or_default()
        )
    }
}

fn parse_url(key: &str, url: &str) -> Result<PgConnectOptions, ConfigError> {
    PgConnectOptions::from_str(url).map_err(|e| ConfigError::Invalid {
        key: key.to_string(),
        reason: e.to_string(),
    })
}
