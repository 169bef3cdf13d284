//! Sieve quota ledger
//!
//! Three independent ledgers share one store:
//! - cluster default quota (a single optional value)
//! - per-user quota overrides
//! - per-user space used counters
//!
//! The ledger only stores and reports numbers. Falling back from a user
//! override to the cluster default, and refusing scripts that do not fit,
//! belong to the caller.

pub mod cluster;
pub mod ledger;
pub mod memory;
pub mod report;
pub mod space;
pub mod tables;
pub mod user;

pub use cluster::ClusterQuotaLedger;
pub use ledger::QuotaLedger;
pub use memory::MemoryQuotaLedger;
pub use report::QuotaReport;
pub use space::SpaceUsageLedger;
pub use tables::QuotaTables;
pub use user::UserQuotaLedger;

use crate::error::Result;
use async_trait::async_trait;

/// Quota bookkeeping consulted by script management
///
/// Absence is never an error: unset quotas read as `None`, unknown users use
/// zero bytes. `Err` is reserved for backend failures.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SieveQuotaStore: Send + Sync {
    /// Cluster default quota
    async fn get_quota(&self) -> Result<Option<i64>>;

    async fn set_quota(&self, quota: i64) -> Result<()>;

    /// `true` if a cluster quota existed and was removed
    async fn remove_quota(&self) -> Result<bool>;

    /// Override for one user
    async fn get_user_quota(&self, user: &str) -> Result<Option<i64>>;

    async fn set_user_quota(&self, user: &str, quota: i64) -> Result<()>;

    /// `true` if `user` had an override and it was removed
    async fn remove_user_quota(&self, user: &str) -> Result<bool>;

    async fn space_used_by(&self, user: &str) -> Result<i64>;

    /// Apply a signed adjustment to the space used by `user`
    async fn update_space_used(&self, user: &str, delta: i64) -> Result<()>;
}

#[cfg(test)]
pub(crate) async fn test_executor() -> (crate::store::AsyncExecutor, QuotaTables) {
    let pool = crate::store::memory_pool().await;
    let tables = QuotaTables::default();

    for ddl in tables.create_statements() {
        sqlx::query(&ddl).execute(&pool).await.unwrap();
    }

    (crate::store::AsyncExecutor::new(pool), tables)
}
