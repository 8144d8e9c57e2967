//! Environment configuration.
//!
//! | Variable | Default |
//! |---|---|
//! | `ASTHMACARE_DB_PATH` | `asthmacare.db` (`:memory:` for an in-memory store) |
//! | `ASTHMACARE_MODEL_PATH` | `models/trained_model.json` |
//! | `ASTHMACARE_MODEL_SHA256` | unset (no digest pin) |
//! | `ASTHMACARE_SESSION_TTL_SECS` | `86400` |
//! | `ASTHMACARE_ADMIN_USER` | `admin` |
//! | `ASTHMACARE_LOG_MODE` | `auto` (`file` or `stderr`) |
//! | `ASTHMACARE_LOG_FILE` | `asthmacare.log` |

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_DB_PATH: &str = "asthmacare.db";
pub const DEFAULT_MODEL_PATH: &str = "models/trained_model.json";
pub const DEFAULT_SESSION_TTL_SECS: u64 = 24 * 60 * 60;
pub const DEFAULT_ADMIN_USER: &str = "admin";
pub const DEFAULT_LOG_FILE: &str = "asthmacare.log";

/// Path value selecting an in-memory database.
pub const IN_MEMORY_DB: &str = ":memory:";

/// Where log output goes. stdout always carries api responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMode {
    /// File when stdin is a terminal, stderr otherwise
    Auto,
    File,
    Stderr,
}

impl LogMode {
    fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "file" => Self::File,
            "stderr" => Self::Stderr,
            _ => Self::Auto,
        }
    }
}

/// Runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: String,
    pub model_path: PathBuf,
    /// Expected SHA-256 hex digest of the model artifact
    pub model_sha256: Option<String>,
    pub session_ttl: Duration,
    pub admin_user: String,
    pub log_mode: LogMode,
    pub log_file: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: DEFAULT_DB_PATH.to_string(),
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            model_sha256: None,
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
            admin_user: DEFAULT_ADMIN_USER.to_string(),
            log_mode: LogMode::Auto,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

impl AppConfig {
    /// Read settings from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let session_ttl = match get("ASTHMACARE_SESSION_TTL_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) => Duration::from_secs(secs),
                Err(_) => {
                    tracing::warn!(
                        "Ignoring invalid ASTHMACARE_SESSION_TTL_SECS={:?}; using {}",
                        raw,
                        DEFAULT_SESSION_TTL_SECS
                    );
                    defaults.session_ttl
                }
            },
            None => defaults.session_ttl,
        };

        Self {
            db_path: get("ASTHMACARE_DB_PATH").unwrap_or(defaults.db_path),
            model_path: get("ASTHMACARE_MODEL_PATH").map_or(defaults.model_path, PathBuf::from),
            model_sha256: get("ASTHMACARE_MODEL_SHA256").map(|v| v.to_ascii_lowercase()),
            session_ttl,
            admin_user: get("ASTHMACARE_ADMIN_USER").unwrap_or(defaults.admin_user),
            log_mode: get("ASTHMACARE_LOG_MODE").map_or(LogMode::Auto, |v| LogMode::parse(&v)),
            log_file: get("ASTHMACARE_LOG_FILE").map_or(defaults.log_file, PathBuf::from),
        }
    }

    /// Whether the store should live in memory only.
    #[must_use]
    pub fn in_memory_db(&self) -> bool {
        self.db_path == IN_MEMORY_DB
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.session_ttl, Duration::from_secs(86400));
        assert!(!config.in_memory_db());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("ASTHMACARE_DB_PATH", ":memory:"),
            ("ASTHMACARE_MODEL_PATH", "/srv/model.json"),
            ("ASTHMACARE_MODEL_SHA256", "ABCDEF"),
            ("ASTHMACARE_SESSION_TTL_SECS", "60"),
            ("ASTHMACARE_ADMIN_USER", "root"),
            ("ASTHMACARE_LOG_MODE", "STDERR"),
        ]);

        assert!(config.in_memory_db());
        assert_eq!(config.model_path, PathBuf::from("/srv/model.json"));
        assert_eq!(config.model_sha256.as_deref(), Some("abcdef"));
        assert_eq!(config.session_ttl, Duration::from_secs(60));
        assert_eq!(config.admin_user, "root");
        assert_eq!(config.log_mode, LogMode::Stderr);
    }

    #[test]
    fn test_invalid_and_empty_values_fall_back() {
        let config = config_from(&[
            ("ASTHMACARE_SESSION_TTL_SECS", "soon"),
            ("ASTHMACARE_ADMIN_USER", "  "),
            ("ASTHMACARE_LOG_MODE", "syslog"),
        ]);

        assert_eq!(config.session_ttl, Duration::from_secs(DEFAULT_SESSION_TTL_SECS));
        assert_eq!(config.admin_user, DEFAULT_ADMIN_USER);
        assert_eq!(config.log_mode, LogMode::Auto);
    }
}
