use std::path::PathBuf;

use kyotsu_core::config::ConfigError;

/// Errors raised by the migration tool.
#[derive(Debug, thiserror::Error)]
pub enum MigrateToolError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid settings file {path}: {source}")]
    Settings {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid setting `{key}`: {reason}")]
    InvalidSetting { key: &'static str, reason: String },

    #[error("Invalid file_template: {0}")]
    InvalidTemplate(String),

    #[error("Revision file already exists: {0}")]
    RevisionExists(PathBuf),

    #[error("A migration with version {0} already exists")]
    DuplicateVersion(i64),

    #[error("Post-write hook `{name}` could not be started: {source}")]
    HookSpawn {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Post-write hook `{name}` failed with {status}")]
    HookFailed { name: String, status: String },

    #[error("Version {0} is not an applied migration")]
    UnknownVersion(i64),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

impl MigrateToolError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MigrateToolError::Io {
            path: path.into(),
            source,
        }
    }
}
