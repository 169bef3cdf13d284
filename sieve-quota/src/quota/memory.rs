use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::SieveQuotaStore;
use crate::error::{QuotaError, Result};

/// In-process quota ledger
///
/// Every mutation runs under a single write-lock acquisition, so a removal
/// and its applied flag, or an increment and the value it builds on, can
/// never interleave with another writer.
#[derive(Debug, Clone, Default)]
pub struct MemoryQuotaLedger {
    cluster_quota: Arc<RwLock<Option<i64>>>,
    user_quotas: Arc<RwLock<HashMap<String, i64>>>,
    space_used: Arc<RwLock<HashMap<String, i64>>>,
}

impl MemoryQuotaLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of users with a quota override
    pub async fn user_quota_count(&self) -> usize {
        self.user_quotas.read().await.len()
    }

    /// Number of users with a space counter
    pub async fn space_entry_count(&self) -> usize {
        self.space_used.read().await.len()
    }
}

#[async_trait]
impl SieveQuotaStore for MemoryQuotaLedger {
    async fn get_quota(&self) -> Result<Option<i64>> {
        Ok(*self.cluster_quota.read().await)
    }

    async fn set_quota(&self, quota: i64) -> Result<()> {
        *self.cluster_quota.write().await = Some(quota);
        Ok(())
    }

    async fn remove_quota(&self) -> Result<bool> {
        Ok(self.cluster_quota.write().await.take().is_some())
    }

    async fn get_user_quota(&self, user: &str) -> Result<Option<i64>> {
        Ok(self.user_quotas.read().await.get(user).copied())
    }

    async fn set_user_quota(&self, user: &str, quota: i64) -> Result<()> {
        self.user_quotas
            .write()
            .await
            .insert(user.to_string(), quota);
        Ok(())
    }

    async fn remove_user_quota(&self, user: &str) -> Result<bool> {
        Ok(self.user_quotas.write().await.remove(user).is_some())
    }

    async fn space_used_by(&self, user: &str) -> Result<i64> {
        Ok(self
            .space_used
            .read()
            .await
            .get(user)
            .copied()
            .unwrap_or(0))
    }

    async fn update_space_used(&self, user: &str, delta: i64) -> Result<()> {
        let mut space_used = self.space_used.write().await;
        let current = space_used.get(user).copied().unwrap_or(0);
        let updated = current
            .checked_add(delta)
            .ok_or_else(|| QuotaError::SpaceOverflow {
                user: user.to_string(),
                delta,
            })?;
        space_used.insert(user.to_string(), updated);
        Ok(())
    }
}
