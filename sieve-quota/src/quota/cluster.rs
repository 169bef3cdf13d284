//! Cluster-wide default quota, stored as a single sentinel row

use sqlx::Row;
use tracing::debug;

use super::tables::{QuotaTables, CLUSTER_QUOTA_NAME, NAME, VALUE};
use crate::error::Result;
use crate::store::AsyncExecutor;

#[derive(Debug, Clone)]
pub struct ClusterQuotaLedger {
    executor: AsyncExecutor,
    select_statement: String,
    upsert_statement: String,
    delete_statement: String,
}

impl ClusterQuotaLedger {
    pub fn new(executor: AsyncExecutor, tables: &QuotaTables) -> Self {
        let table = &tables.cluster_quota;

        Self {
            executor,
            select_statement: format!("SELECT {VALUE} FROM {table} WHERE {NAME} = ?"),
            upsert_statement: format!(
                "INSERT INTO {table} ({NAME}, {VALUE}) VALUES (?, ?) \
                 ON CONFLICT({NAME}) DO UPDATE SET {VALUE} = excluded.{VALUE}"
            ),
            delete_statement: format!("DELETE FROM {table} WHERE {NAME} = ?"),
        }
    }

    /// Cluster default, or `None` when none is configured
    pub async fn get_quota(&self) -> Result<Option<i64>> {
        debug!("Reading cluster quota");

        let row = self
            .executor
            .execute_single_row(sqlx::query(&self.select_statement).bind(CLUSTER_QUOTA_NAME))
            .await?;

        Ok(row.map(|row| row.try_get::<i64, _>(VALUE)).transpose()?)
    }

    pub async fn set_quota(&self, quota: i64) -> Result<()> {
        debug!(quota, "Setting cluster quota");

        self.executor
            .execute_void(
                sqlx::query(&self.upsert_statement)
                    .bind(CLUSTER_QUOTA_NAME)
                    .bind(quota),
            )
            .await
    }

    /// Returns `true` only if a cluster quota existed and this call removed it
    pub async fn remove_quota(&self) -> Result<bool> {
        let removed = self
            .executor
            .execute_return_applied(sqlx::query(&self.delete_statement).bind(CLUSTER_QUOTA_NAME))
            .await?;

        debug!(removed, "Removed cluster quota");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quota::test_executor;

    async fn setup() -> ClusterQuotaLedger {
        let (executor, tables) = test_executor().await;
        ClusterQuotaLedger::new(executor, &tables)
    }

    #[tokio::test]
    async fn test_unset_quota_is_none() {
        let ledger = setup().await;
        assert_eq!(ledger.get_quota().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_and_overwrite() {
        let ledger = setup().await;

        ledger.set_quota(10_000).await.unwrap();
        assert_eq!(ledger.get_quota().await.unwrap(), Some(10_000));

        ledger.set_quota(-1).await.unwrap();
        assert_eq!(ledger.get_quota().await.unwrap(), Some(-1));
    }

    #[tokio::test]
    async fn test_repeated_reads_agree() {
        let ledger = setup().await;
        ledger.set_quota(42).await.unwrap();

        let first = ledger.get_quota().await.unwrap();
        let second = ledger.get_quota().await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_remove_reports_applied() {
        let ledger = setup().await;

        assert!(!ledger.remove_quota().await.unwrap());

        ledger.set_quota(500).await.unwrap();
        assert!(ledger.remove_quota().await.unwrap());
        assert_eq!(ledger.get_quota().await.unwrap(), None);

        assert!(!ledger.remove_quota().await.unwrap());
    }

    #[tokio::test]
    async fn test_extreme_values_round_trip() {
        let ledger = setup().await;

        for value in [i64::MIN, 0, i64::MAX] {
            ledger.set_quota(value).await.unwrap();
            assert_eq!(ledger.get_quota().await.unwrap(), Some(value));
        }
    }
}
