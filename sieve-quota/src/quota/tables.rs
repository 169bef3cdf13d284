//! Table and column layout shared by the SQLite ledgers

use crate::error::{QuotaError, Result};

pub const DEFAULT_TABLE_PREFIX: &str = "sieve_";

/// Key of the single cluster-wide quota row
pub const CLUSTER_QUOTA_NAME: &str = "default";

pub const NAME: &str = "name";
pub const VALUE: &str = "value";
pub const USER_NAME: &str = "user_name";
pub const QUOTA: &str = "quota";
pub const SPACE_USED: &str = "space_used";

/// Resolved table names for one deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaTables {
    pub cluster_quota: String,
    pub user_quota: String,
    pub space: String,
}

impl QuotaTables {
    pub fn with_prefix(prefix: &str) -> Result<Self> {
        validate_prefix(prefix)?;

        Ok(Self {
            cluster_quota: format!("{prefix}cluster_quota"),
            user_quota: format!("{prefix}quota"),
            space: format!("{prefix}space"),
        })
    }

    /// Idempotent DDL for all three tables
    pub fn create_statements(&self) -> [String; 3] {
        [
            format!(
                "CREATE TABLE IF NOT EXISTS {} ({NAME} TEXT PRIMARY KEY, {VALUE} INTEGER NOT NULL)",
                self.cluster_quota
            ),
            format!(
                "CREATE TABLE IF NOT EXISTS {} ({USER_NAME} TEXT PRIMARY KEY, {QUOTA} INTEGER NOT NULL)",
                self.user_quota
            ),
            format!(
                // SQLite turns an overflowing integer sum into REAL; refuse it instead
                "CREATE TABLE IF NOT EXISTS {} ({USER_NAME} TEXT PRIMARY KEY, \
                 {SPACE_USED} INTEGER NOT NULL CHECK (typeof({SPACE_USED}) = 'integer'))",
                self.space
            ),
        ]
    }
}

impl Default for QuotaTables {
    fn default() -> Self {
        Self {
            cluster_quota: format!("{DEFAULT_TABLE_PREFIX}cluster_quota"),
            user_quota: format!("{DEFAULT_TABLE_PREFIX}quota"),
            space: format!("{DEFAULT_TABLE_PREFIX}space"),
        }
    }
}

/// Table names are spliced into SQL text, so only identifier characters pass
pub fn validate_prefix(prefix: &str) -> Result<()> {
    if prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err(QuotaError::Config(format!(
            "Invalid table prefix '{}': only [A-Za-z0-9_] allowed",
            prefix
        )))
    }
}
