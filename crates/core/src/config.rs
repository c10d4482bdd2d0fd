//! Typed access to environment-style configuration.
//!
//! Every `from_env` constructor in the workspace goes through [`EnvReader`],
//! which can also be built from fixed pairs so configuration parsing is
//! testable without touching the process environment.

use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(String),

    #[error("{key} is invalid: {reason}")]
    Invalid { key: String, reason: String },
}

type Lookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Reads configuration values by key.
pub struct EnvReader {
    lookup: Lookup,
}

impl EnvReader {
    /// Reader backed by the process environment.
    pub fn process() -> Self {
        Self {
            lookup: Box::new(|key| std::env::var(key).ok()),
        }
    }

    /// Reader backed by a fixed set of pairs.
    pub fn from_pairs<K: Into<String>, V: Into<String>>(
        pairs: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        let map: HashMap<String, String> = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            lookup: Box::new(move |key| map.get(key).cloned()),
        }
    }

    /// Value of `key`, treating an empty or whitespace-only value as unset.
    pub fn optional(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    pub fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::Missing(key.to_string()))
    }

    pub fn parse_optional<T>(&self, key: &str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.optional(key)
            .map(|raw| {
                raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
                    key: key.to_string(),
                    reason: e.to_string(),
                })
            })
            .transpose()
    }

    pub fn parse_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        Ok(self.parse_optional(key)?.unwrap_or(default))
    }

    /// Comma-separated list, with blanks dropped.
    pub fn list_or(&self, key: &str, default: &str) -> Vec<String> {
        self.optional(key)
            .unwrap_or_else(|| default.to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn blank_values_count_as_unset() {
        let env = EnvReader::from_pairs([("HOST", "  ")]);
        assert_eq!(env.optional("HOST"), None);
        assert_matches!(env.required("HOST"), Err(ConfigError::Missing(k)) if k == "HOST");
    }

    #[test]
    fn parse_or_falls_back_to_default() {
        let env = EnvReader::from_pairs([("PORT", "8080")]);
        assert_eq!(env.parse_or("PORT", 3000u16).unwrap(), 8080);
        assert_eq!(env.parse_or("OTHER_PORT", 3000u16).unwrap(), 3000);
    }

    #[test]
    fn parse_reports_the_offending_key() {
        let env = EnvReader::from_pairs([("PORT", "eighty")]);
        assert_matches!(
            env.parse_or("PORT", 3000u16),
            Err(ConfigError::Invalid { key, .. }) if key == "PORT"
        );
    }

    #[test]
    fn list_splits_on_commas() {
        let env = EnvReader::from_pairs([("CORS_ORIGINS", "http://a, ,http://b")]);
        assert_eq!(env.list_or("CORS_ORIGINS", ""), vec!["http://a", "http://b"]);
        assert_eq!(env.list_or("MISSING", "http://c"), vec!["http://c"]);
    }
}
