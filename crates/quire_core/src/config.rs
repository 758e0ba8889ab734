//! Runtime configuration read from `QUIRE_*` environment variables.
//!
//! Variables:
//! - `QUIRE_DB_PATH` (default: `<tmp>/quire.sqlite3`)
//! - `QUIRE_MIGRATE_DB` (default: true)
//! - `QUIRE_LOG_LEVEL` (default: [`default_log_level`])
//! - `QUIRE_LOG_DIR` (default: `<tmp>/quire-logs`)
//!
//! Booleans accept "true", "1", "yes", "on" and their negatives, case-insensitive.

use crate::logging::default_log_level;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DB_PATH_VAR: &str = "QUIRE_DB_PATH";
pub const MIGRATE_DB_VAR: &str = "QUIRE_MIGRATE_DB";
pub const LOG_LEVEL_VAR: &str = "QUIRE_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "QUIRE_LOG_DIR";

#[derive(Debug)]
pub enum ConfigError {
    InvalidValue {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue {
                key,
                value,
                expected,
            } => write!(f, "invalid value `{value}` for {key}; expected {expected}"),
        }
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmsConfig {
    pub db_path: PathBuf,
    /// Apply pending migrations on open. When off, an outdated schema is an error.
    pub migrate_db: bool,
    pub log_level: String,
    pub log_dir: PathBuf,
}

impl Default for CmsConfig {
    fn default() -> Self {
        let tmp = std::env::temp_dir();
        Self {
            db_path: tmp.join("quire.sqlite3"),
            migrate_db: true,
            log_level: default_log_level().to_string(),
            log_dir: tmp.join("quire-logs"),
        }
    }
}

impl CmsConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };
        let defaults = Self::default();

        let migrate_db = match value(MIGRATE_DB_VAR) {
            Some(raw) => parse_bool(MIGRATE_DB_VAR, &raw)?,
            None => defaults.migrate_db,
        };

        Ok(Self {
            db_path: value(DB_PATH_VAR)
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            migrate_db,
            log_level: value(LOG_LEVEL_VAR).unwrap_or(defaults.log_level),
            log_dir: value(LOG_DIR_VAR)
                .map(PathBuf::from)
                .unwrap_or(defaults.log_dir),
        })
    }
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: raw.to_string(),
            expected: "a boolean",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::{CmsConfig, ConfigError, DB_PATH_VAR, LOG_LEVEL_VAR, MIGRATE_DB_VAR};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = CmsConfig::from_lookup(|_| None).expect("config");
        assert_eq!(config, CmsConfig::default());
        assert!(config.migrate_db);
    }

    #[test]
    fn values_override_defaults() {
        let config = CmsConfig::from_lookup(lookup_from(&[
            (DB_PATH_VAR, "/srv/quire/content.sqlite3"),
            (MIGRATE_DB_VAR, "OFF"),
            (LOG_LEVEL_VAR, "warn"),
        ]))
        .expect("config");
        assert_eq!(config.db_path, PathBuf::from("/srv/quire/content.sqlite3"));
        assert!(!config.migrate_db);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn blank_value_counts_as_unset() {
        let config =
            CmsConfig::from_lookup(lookup_from(&[(DB_PATH_VAR, "  ")])).expect("config");
        assert_eq!(config.db_path, CmsConfig::default().db_path);
    }

    #[test]
    fn malformed_boolean_is_rejected() {
        let err = CmsConfig::from_lookup(lookup_from(&[(MIGRATE_DB_VAR, "sometimes")]))
            .expect_err("bad bool");
        let ConfigError::InvalidValue { key, .. } = err;
        assert_eq!(key, MIGRATE_DB_VAR);
    }
}
