//! Explicit runtime configuration values.
//!
//! # Responsibility
//! - Describe where the SQLite store lives and how long a connection may
//!   wait on a locked database.
//! - Describe where and how verbosely core logs are written.
//!
//! # Invariants
//! - Configuration is a plain value handed to `Database::open` or
//!   `init_logging`; core never reads process-wide globals on its own.
//! - `from_env` falls back to defaults for unset variables and rejects
//!   set-but-unparseable ones.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DB_PATH_ENV: &str = "CRUDLAB_DB_PATH";
pub const DB_TIMEOUT_ENV: &str = "CRUDLAB_DB_TIMEOUT_SECS";
pub const LOG_LEVEL_ENV: &str = "CRUDLAB_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "CRUDLAB_LOG_DIR";

const DEFAULT_DB_PATH: &str = "data/learning_project.db";
const DEFAULT_BUSY_TIMEOUT_SECS: u64 = 10;

/// Longest busy timeout SQLite accepts (`i32::MAX` milliseconds).
pub const MAX_BUSY_TIMEOUT: Duration = Duration::from_millis(i32::MAX as u64);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for environment variable `{0}`")]
    InvalidValue(String),
}

/// Store location and connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    /// SQLite database file.
    pub path: PathBuf,
    /// How long a statement waits on a locked database before failing.
    pub busy_timeout: Duration,
}

impl DbConfig {
    /// Creates a config for `path` with the default busy timeout.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout: Duration::from_secs(DEFAULT_BUSY_TIMEOUT_SECS),
        }
    }

    /// Values above [`MAX_BUSY_TIMEOUT`] are clamped to it.
    pub fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout.min(MAX_BUSY_TIMEOUT);
        self
    }

    /// Loads `CRUDLAB_DB_PATH` and `CRUDLAB_DB_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let path = env::var(DB_PATH_ENV).unwrap_or_else(|_| DEFAULT_DB_PATH.to_string());
        let busy_timeout = match env::var(DB_TIMEOUT_ENV) {
            Ok(value) => value
                .trim()
                .parse::<u64>()
                .ok()
                .map(Duration::from_secs)
                .filter(|timeout| *timeout <= MAX_BUSY_TIMEOUT)
                .ok_or_else(|| ConfigError::InvalidValue(DB_TIMEOUT_ENV.to_string()))?,
            Err(_) => Duration::from_secs(DEFAULT_BUSY_TIMEOUT_SECS),
        };

        Ok(Self::new(path).with_busy_timeout(busy_timeout))
    }

    pub fn path(&self) -> &Path {
        self.path.as_path()
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DB_PATH)
    }
}

/// Logging level and target directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub level: String,
    /// `None` means `./logs`.
    pub log_dir: Option<PathBuf>,
}

impl LogConfig {
    /// Loads `CRUDLAB_LOG_LEVEL` and `CRUDLAB_LOG_DIR`.
    pub fn from_env() -> Self {
        Self {
            level: env::var(LOG_LEVEL_ENV)
                .unwrap_or_else(|_| crate::logging::default_log_level().to_string()),
            log_dir: env::var(LOG_DIR_ENV).ok().map(PathBuf::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Tests that touch process environment variables hold this lock.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn clear_env() {
        for key in [DB_PATH_ENV, DB_TIMEOUT_ENV, LOG_LEVEL_ENV, LOG_DIR_ENV] {
            env::remove_var(key);
        }
    }

    #[test]
    fn new_config_uses_default_timeout() {
        let config = DbConfig::new("/tmp/x.db");
        assert_eq!(config.busy_timeout, Duration::from_secs(10));
        assert_eq!(config.path().to_str(), Some("/tmp/x.db"));
    }

    #[test]
    fn busy_timeout_can_be_overridden() {
        let config = DbConfig::new("a.db").with_busy_timeout(Duration::from_millis(250));
        assert_eq!(config.busy_timeout, Duration::from_millis(250));
    }

    #[test]
    fn oversized_busy_timeout_is_clamped() {
        let config = DbConfig::new("a.db").with_busy_timeout(Duration::from_secs(3_000_000));
        assert_eq!(config.busy_timeout, MAX_BUSY_TIMEOUT);
    }

    #[test]
    fn from_env_uses_defaults_when_unset() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        clear_env();

        let db = DbConfig::from_env().unwrap();
        assert_eq!(db, DbConfig::default());
        assert_eq!(db.path(), Path::new("data/learning_project.db"));
        assert_eq!(db.busy_timeout, Duration::from_secs(10));

        let log = LogConfig::from_env();
        assert_eq!(log.level, crate::logging::default_log_level());
        assert_eq!(log.log_dir, None);
    }

    #[test]
    fn from_env_reads_set_values() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        clear_env();
        env::set_var(DB_PATH_ENV, "/tmp/crudlab-env.db");
        env::set_var(DB_TIMEOUT_ENV, " 3 ");
        env::set_var(LOG_LEVEL_ENV, "warn");
        env::set_var(LOG_DIR_ENV, "/tmp/crudlab-logs");

        let db = DbConfig::from_env();
        let log = LogConfig::from_env();
        clear_env();

        let db = db.unwrap();
        assert_eq!(db.path(), Path::new("/tmp/crudlab-env.db"));
        assert_eq!(db.busy_timeout, Duration::from_secs(3));
        assert_eq!(log.level, "warn");
        assert_eq!(log.log_dir, Some(PathBuf::from("/tmp/crudlab-logs")));
    }

    #[test]
    fn from_env_rejects_bad_timeouts() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        clear_env();

        for value in ["ten", "-1", "3000000"] {
            env::set_var(DB_TIMEOUT_ENV, value);
            let result = DbConfig::from_env();
            assert_eq!(
                result,
                Err(ConfigError::InvalidValue(DB_TIMEOUT_ENV.to_string())),
                "timeout {value:?} should be rejected"
            );
        }
        clear_env();
    }
}
