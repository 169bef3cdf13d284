use serde::{Deserialize, Serialize};

use super::SieveQuotaStore;
use crate::error::Result;

/// Raw quota figures for one user, read together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotaReport {
    pub user: String,
    /// Cluster default, if configured
    pub cluster_quota: Option<i64>,
    /// Per-user override, if any
    pub user_quota: Option<i64>,
    /// Bytes currently used by the user's scripts
    pub space_used: i64,
}

impl QuotaReport {
    /// Issue the three reads concurrently. Any backend failure fails the report.
    pub async fn load<S>(store: &S, user: &str) -> Result<Self>
    where
        S: SieveQuotaStore + ?Sized,
    {
        let (cluster_quota, user_quota, space_used) = tokio::try_join!(
            store.get_quota(),
            store.get_user_quota(user),
            store.space_used_by(user)
        )?;

        Ok(Self {
            user: user.to_string(),
            cluster_quota,
            user_quota,
            space_used,
        })
    }

    /// User override if set, otherwise the cluster default
    pub fn effective_quota(&self) -> Option<i64> {
        self.user_quota.or(self.cluster_quota)
    }

    /// Space left under the effective quota (negative once over)
    pub fn remaining(&self) -> Option<i64> {
        self.effective_quota()
            .map(|quota| quota.saturating_sub(self.space_used))
    }

    /// Get storage usage percentage
    pub fn usage_percent(&self) -> Option<f64> {
        self.effective_quota().map(|quota| {
            if quota <= 0 {
                0.0
            } else {
                (self.space_used as f64 / quota as f64) * 100.0
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QuotaError;
    use crate::quota::{MemoryQuotaLedger, MockSieveQuotaStore};
    use std::time::Duration;

    fn report(cluster_quota: Option<i64>, user_quota: Option<i64>, space_used: i64) -> QuotaReport {
        QuotaReport {
            user: "test@example.com".to_string(),
            cluster_quota,
            user_quota,
            space_used,
        }
    }

    #[test]
    fn test_effective_quota_prefers_override() {
        assert_eq!(report(Some(10_000), Some(5_000), 0).effective_quota(), Some(5_000));
        assert_eq!(report(Some(10_000), None, 0).effective_quota(), Some(10_000));
        assert_eq!(report(None, None, 0).effective_quota(), None);
    }

    #[test]
    fn test_remaining() {
        assert_eq!(report(None, Some(1000), 400).remaining(), Some(600));
        assert_eq!(report(None, Some(1000), 1100).remaining(), Some(-100));
        assert_eq!(report(None, None, 1100).remaining(), None);
    }

    #[test]
    fn test_usage_percent() {
        assert_eq!(report(Some(1000), None, 250).usage_percent(), Some(25.0));
        assert_eq!(report(Some(0), None, 250).usage_percent(), Some(0.0));
        assert_eq!(report(None, None, 250).usage_percent(), None);
    }

    #[tokio::test]
    async fn test_load_from_memory_ledger() {
        let ledger = MemoryQuotaLedger::new();
        ledger.set_quota(10_000).await.unwrap();
        ledger.update_space_used("test@example.com", 1200).await.unwrap();

        let report = QuotaReport::load(&ledger, "test@example.com").await.unwrap();

        assert_eq!(report.cluster_quota, Some(10_000));
        assert_eq!(report.user_quota, None);
        assert_eq!(report.space_used, 1200);
        assert_eq!(report.remaining(), Some(8_800));
    }

    #[tokio::test]
    async fn test_load_queries_requested_user() {
        let mut store = MockSieveQuotaStore::new();
        store.expect_get_quota().times(1).returning(|| Ok(None));
        store
            .expect_get_user_quota()
            .withf(|user: &str| user == "alice@example.com")
            .times(1)
            .returning(|_| Ok(Some(5_000)));
        store
            .expect_space_used_by()
            .withf(|user: &str| user == "alice@example.com")
            .times(1)
            .returning(|_| Ok(42));

        let report = QuotaReport::load(&store, "alice@example.com").await.unwrap();
        assert_eq!(report.user_quota, Some(5_000));
        assert_eq!(report.space_used, 42);
    }

    #[tokio::test]
    async fn test_load_propagates_backend_failure() {
        let mut store = MockSieveQuotaStore::new();
        store.expect_get_quota().returning(|| Ok(Some(10)));
        store.expect_get_user_quota().returning(|_| Ok(None));
        store
            .expect_space_used_by()
            .returning(|_| Err(QuotaError::Timeout(Duration::from_secs(1))));

        let result = QuotaReport::load(&store, "alice@example.com").await;
        assert!(matches!(result, Err(QuotaError::Timeout(_))));
    }

    #[test]
    fn test_serializes_to_json() {
        let json = serde_json::to_value(report(Some(10), None, 3)).unwrap();
        assert_eq!(json["cluster_quota"], 10);
        assert!(json["user_quota"].is_null());
        assert_eq!(json["space_used"], 3);
    }
}
