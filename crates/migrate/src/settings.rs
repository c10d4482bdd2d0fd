//! `migrate.toml` settings.
//!
//! ```toml
//! script_location = "db/migrations"
//! file_template = "{year}{month}{day}{hour}{minute}{second}_{slug}"
//! timezone = "UTC"
//! truncate_slug_length = 40
//!
//! [[post_write_hooks]]
//! name = "pg_format"
//! command = "pg_format"
//! args = ["--inplace", "{file}"]
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::MigrateToolError;

pub const DEFAULT_SCRIPT_LOCATION: &str = "db/migrations";
pub const DEFAULT_FILE_TEMPLATE: &str = "{year}{month}{day}{hour}{minute}{second}_{slug}";
pub const DEFAULT_TRUNCATE_SLUG_LENGTH: usize = 40;

/// Clock used to stamp new revisions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum Timezone {
    #[default]
    #[serde(rename = "UTC", alias = "utc")]
    Utc,
    #[serde(rename = "local", alias = "LOCAL")]
    Local,
}

/// A command run against every freshly generated migration file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PostWriteHook {
    pub name: String,
    pub command: String,
    /// `{file}` is replaced with the generated file's path.
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MigrateSettings {
    /// Directory holding `<version>_<slug>.up.sql` / `.down.sql` pairs.
    /// Relative paths are resolved against the settings file's directory.
    pub script_location: PathBuf,
    pub file_template: String,
    pub timezone: Timezone,
    pub truncate_slug_length: usize,
    pub post_write_hooks: Vec<PostWriteHook>,
}

impl Default for MigrateSettings {
    fn default() -> Self {
        Self {
            script_location: PathBuf::from(DEFAULT_SCRIPT_LOCATION),
            file_template: DEFAULT_FILE_TEMPLATE.to_string(),
            timezone: Timezone::Utc,
            truncate_slug_length: DEFAULT_TRUNCATE_SLUG_LENGTH,
            post_write_hooks: Vec::new(),
        }
    }
}

impl MigrateSettings {
    /// Read and validate a settings file.
    pub fn load(path: &Path) -> Result<Self, MigrateToolError> {
        let raw = std::fs::read_to_string(path).map_err(|e| MigrateToolError::io(path, e))?;
        let mut settings = Self::parse(&raw).map_err(|source| match source {
            ParseError::Toml(source) => MigrateToolError::Settings {
                path: path.to_path_buf(),
                source,
            },
            ParseError::Invalid(err) => err,
        })?;

        if settings.script_location.is_relative() {
            if let Some(base) = path.parent() {
                settings.script_location = base.join(&settings.script_location);
            }
        }

        tracing::debug!(
            path = %path.display(),
            script_location = %settings.script_location.display(),
            hooks = settings.post_write_hooks.len(),
            "Loaded migration settings",
        );
        Ok(settings)
    }

    /// Parse settings from TOML text without resolving paths.
    fn parse(raw: &str) -> Result<Self, ParseError> {
        let settings: Self = toml::from_str(raw).map_err(ParseError::Toml)?;
        settings.validate().map_err(ParseError::Invalid)?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), MigrateToolError> {
        if self.truncate_slug_length == 0 {
            return Err(MigrateToolError::InvalidSetting {
                key: "truncate_slug_length",
                reason: "must be at least 1".into(),
            });
        }
        if !self.file_template.contains("{slug}") {
            return Err(MigrateToolError::InvalidSetting {
                key: "file_template",
                reason: "must contain the {slug} token".into(),
            });
        }
        if let Some(hook) = self.post_write_hooks.iter().find(|h| h.command.trim().is_empty()) {
            return Err(MigrateToolError::InvalidSetting {
                key: "post_write_hooks",
                reason: format!("hook `{}` has an empty command", hook.name),
            });
        }
        Ok(())
    }
}

#[derive(Debug)]
enum ParseError {
    Toml(toml::de::Error),
    Invalid(MigrateToolError),
}
