//! Configuration for the quota ledger and its CLI

use crate::error::{QuotaError, Result};
use crate::quota::tables::{validate_prefix, DEFAULT_TABLE_PREFIX};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Prefix for environment overrides, e.g. `SIEVE_QUOTA__STORAGE__DATABASE_URL`
pub const ENV_PREFIX: &str = "SIEVE_QUOTA";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_seconds: u64,
    /// How long SQLite waits on a locked database before failing
    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_ms: u64,
    /// Upper bound for a single statement; unbounded when absent
    #[serde(default)]
    pub statement_timeout_ms: Option<u64>,
    #[serde(default = "default_table_prefix")]
    pub table_prefix: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    /// `pretty` or `json`
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_database_url() -> String {
    "sqlite://sieve-quota.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_acquire_timeout() -> u64 {
    5
}

fn default_busy_timeout() -> u64 {
    5000
}

fn default_table_prefix() -> String {
    DEFAULT_TABLE_PREFIX.to_string()
}

fn default_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "pretty".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            max_connections: default_max_connections(),
            acquire_timeout_seconds: default_acquire_timeout(),
            busy_timeout_ms: default_busy_timeout(),
            statement_timeout_ms: None,
            table_prefix: default_table_prefix(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: default_format(),
        }
    }
}

impl StorageConfig {
    pub fn statement_timeout(&self) -> Option<Duration> {
        self.statement_timeout_ms.map(Duration::from_millis)
    }
}

impl Config {
    /// Parse a single TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| QuotaError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| QuotaError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Layer defaults, an optional TOML file and `SIEVE_QUOTA__*` environment variables
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = ::config::Config::builder();

        if let Some(path) = path {
            builder = builder
                .add_source(::config::File::from(path).format(::config::FileFormat::Toml));
        }

        let config: Config = builder
            .add_source(::config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| QuotaError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.storage.database_url.trim().is_empty() {
            return Err(QuotaError::Config("database_url is empty".to_string()));
        }

        if self.storage.max_connections == 0 {
            return Err(QuotaError::Config(
                "max_connections must be at least 1".to_string(),
            ));
        }

        validate_prefix(&self.storage.table_prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.storage.table_prefix, "sieve_");
        assert_eq!(config.storage.statement_timeout(), None);
        assert_eq!(config.logging.format, "pretty");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_config() {
        let toml = r#"
[storage]
database_url = "sqlite::memory:"
statement_timeout_ms = 250
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.storage.database_url, "sqlite::memory:");
        assert_eq!(
            config.storage.statement_timeout(),
            Some(Duration::from_millis(250))
        );
        assert_eq!(config.storage.max_connections, 5);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_invalid_prefix_rejected() {
        let mut config = Config::default();
        config.storage.table_prefix = "sieve; DROP TABLE x; --".to_string();
        assert!(matches!(config.validate(), Err(QuotaError::Config(_))));
    }

    #[test]
    fn test_zero_connections_rejected() {
        let mut config = Config::default();
        config.storage.max_connections = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[storage]\ntable_prefix = \"mail_\"\n\n[logging]\nformat = \"json\""
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.storage.table_prefix, "mail_");
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_from_missing_file() {
        let result = Config::from_file("/nonexistent/sieve-quota.toml");
        assert!(matches!(result, Err(QuotaError::Config(_))));
    }
}
