//! SQLite-backed quota ledger

use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::info;

use super::{ClusterQuotaLedger, QuotaTables, SieveQuotaStore, SpaceUsageLedger, UserQuotaLedger};
use crate::config::StorageConfig;
use crate::error::Result;
use crate::store::{self, AsyncExecutor};

/// The three SQLite ledgers behind one handle
///
/// Statement texts are built once here; afterwards the ledger holds only
/// immutable strings and a pool handle, so it can be shared freely.
#[derive(Debug, Clone)]
pub struct QuotaLedger {
    executor: AsyncExecutor,
    tables: QuotaTables,
    cluster: ClusterQuotaLedger,
    users: UserQuotaLedger,
    space: SpaceUsageLedger,
}

impl QuotaLedger {
    pub fn new(executor: AsyncExecutor, tables: QuotaTables) -> Self {
        Self {
            cluster: ClusterQuotaLedger::new(executor.clone(), &tables),
            users: UserQuotaLedger::new(executor.clone(), &tables),
            space: SpaceUsageLedger::new(executor.clone(), &tables),
            executor,
            tables,
        }
    }

    /// Ledger over an existing pool with the default table names
    pub fn with_pool(pool: SqlitePool) -> Self {
        Self::new(AsyncExecutor::new(pool), QuotaTables::default())
    }

    /// Connect using `config` and build the ledger
    pub async fn from_config(config: &StorageConfig) -> Result<Self> {
        let tables = QuotaTables::with_prefix(&config.table_prefix)?;
        let pool = store::connect(config).await?;
        let executor = AsyncExecutor::new(pool).with_statement_timeout(config.statement_timeout());

        Ok(Self::new(executor, tables))
    }

    /// Create the ledger tables if they do not exist yet
    pub async fn init_db(&self) -> Result<()> {
        for ddl in self.tables.create_statements() {
            sqlx::query(&ddl).execute(self.executor.pool()).await?;
        }

        info!(
            cluster_quota = %self.tables.cluster_quota,
            user_quota = %self.tables.user_quota,
            space = %self.tables.space,
            "Quota tables ready"
        );
        Ok(())
    }

    pub fn cluster(&self) -> &ClusterQuotaLedger {
        &self.cluster
    }

    pub fn users(&self) -> &UserQuotaLedger {
        &self.users
    }

    pub fn space(&self) -> &SpaceUsageLedger {
        &self.space
    }

    pub async fn close(&self) {
        self.executor.pool().close().await;
    }
}

#[async_trait]
impl SieveQuotaStore for QuotaLedger {
    async fn get_quota(&self) -> Result<Option<i64>> {
        self.cluster.get_quota().await
    }

    async fn set_quota(&self, quota: i64) -> Result<()> {
        self.cluster.set_quota(quota).await
    }

    async fn remove_quota(&self) -> Result<bool> {
        self.cluster.remove_quota().await
    }

    async fn get_user_quota(&self, user: &str) -> Result<Option<i64>> {
        self.users.get_quota(user).await
    }

    async fn set_user_quota(&self, user: &str, quota: i64) -> Result<()> {
        self.users.set_quota(user, quota).await
    }

    async fn remove_user_quota(&self, user: &str) -> Result<bool> {
        self.users.remove_quota(user).await
    }

    async fn space_used_by(&self, user: &str) -> Result<i64> {
        self.space.space_used_by(user).await
    }

    async fn update_space_used(&self, user: &str, delta: i64) -> Result<()> {
        self.space.update_space_used(user, delta).await
    }
}
