use std::fmt;

use axum::http::HeaderValue;
use kyotsu_core::config::{ConfigError, EnvReader};
use validator::ValidateEmail;

use crate::auth::jwt::JwtConfig;
use crate::auth::password::hash_password;

/// Server configuration loaded from environment variables.
///
/// All fields except the secrets have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`; the container sets `80`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<HeaderValue>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Apply embedded migrations on startup (default: `true`).
    pub run_migrations: bool,
    /// JWT token configuration.
    pub jwt: JwtConfig,
    /// The single administrative account.
    pub superuser: SuperuserConfig,
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `RUN_MIGRATIONS`       | `true`                     |
    ///
    /// See [`JwtConfig`] and [`SuperuserConfig`] for the remaining keys.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_reader(&EnvReader::process())
    }

    pub fn from_reader(env: &EnvReader) -> Result<Self, ConfigError> {
        let cors_origins = env
            .list_or("CORS_ORIGINS", "http://localhost:5173")
            .into_iter()
            .map(|origin| {
                origin.parse::<HeaderValue>().map_err(|e| ConfigError::Invalid {
                    key: "CORS_ORIGINS".into(),
                    reason: format!("'{origin}': {e}"),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            host: env.optional("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: env.parse_or("PORT", 3000)?,
            cors_origins,
            request_timeout_secs: env.parse_or("REQUEST_TIMEOUT_SECS", 30)?,
            run_migrations: env.parse_or("RUN_MIGRATIONS", true)?,
            jwt: JwtConfig::from_reader(env)?,
            superuser: SuperuserConfig::from_reader(env)?,
        })
    }
}

/// Credentials of the administrative account.
///
/// The plaintext password is hashed with Argon2id on load and dropped.
#[derive(Clone)]
pub struct SuperuserConfig {
    pub email: String,
    pub password_hash: String,
}

impl SuperuserConfig {
    /// | Env Var               | Required |
    /// |-----------------------|----------|
    /// | `SUPERUSER__EMAIL`    | **yes**  |
    /// | `SUPERUSER__PASSWORD` | **yes**  |
    pub fn from_reader(env: &EnvReader) -> Result<Self, ConfigError> {
        let email = env.required("SUPERUSER__EMAIL")?;
        if !email.validate_email() {
            return Err(ConfigError::Invalid {
                key: "SUPERUSER__EMAIL".into(),
                reason: format!("'{email}' is not a valid email address"),
            });
        }

        let password = env.required("SUPERUSER__PASSWORD")?;
        let password_hash = hash_password(&password).map_err(|e| ConfigError::Invalid {
            key: "SUPERUSER__PASSWORD".into(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            email,
            password_hash,
        })
    }

    /// Whether `email` names this account (case-insensitive).
    pub fn matches_email(&self, email: &str) -> bool {
        self.email.eq_ignore_ascii_case(email.trim())
    }
}

impl fmt::Debug for SuperuserConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuperuserConfig")
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn base_pairs() -> Vec<(&'static str, &'static str)> {
        vec![
            ("JWT_SECRET", "secret"),
            ("SUPERUSER__EMAIL", "root@example.com"),
            ("SUPERUSER__PASSWORD", "hunter22"),
        ]
    }

    #[test]
    fn defaults_apply() {
        let config = ServerConfig::from_reader(&EnvReader::from_pairs(base_pairs())).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.request_timeout_secs, 30);
        assert!(config.run_migrations);
        assert_eq!(config.cors_origins, vec!["http://localhost:5173"]);
        assert!(config.superuser.password_hash.starts_with("$argon2id$"));
    }

    #[test]
    fn container_port_override() {
        let mut pairs = base_pairs();
        pairs.push(("PORT", "80"));
        pairs.push(("RUN_MIGRATIONS", "false"));
        let config = ServerConfig::from_reader(&EnvReader::from_pairs(pairs)).unwrap();
        assert_eq!(config.port, 80);
        assert!(!config.run_migrations);
    }

    #[test]
    fn rejects_invalid_superuser_email() {
        let env = EnvReader::from_pairs([
            ("JWT_SECRET", "secret"),
            ("SUPERUSER__EMAIL", "not-an-email"),
            ("SUPERUSER__PASSWORD", "hunter22"),
        ]);
        assert_matches!(
            ServerConfig::from_reader(&env),
            Err(ConfigError::Invalid { key, .. }) if key == "SUPERUSER__EMAIL"
        );
    }

    #[test]
    fn email_match_ignores_case() {
        let config = ServerConfig::from_reader(&EnvReader::from_pairs(base_pairs())).unwrap();
        assert!(config.superuser.matches_email("ROOT@example.com "));
        assert!(!config.superuser.matches_email("other@example.com"));
    }

    #[test]
    fn debug_output_hides_hash() {
        let config = ServerConfig::from_reader(&EnvReader::from_pairs(base_pairs())).unwrap();
        let debug = format!("{:?}", config.superuser);
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("argon2"));
    }
}
