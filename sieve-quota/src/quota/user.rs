//! Per-user quota overrides

use sqlx::Row;
use tracing::debug;

use super::tables::{QuotaTables, QUOTA, USER_NAME};
use crate::error::Result;
use crate::store::AsyncExecutor;

#[derive(Debug, Clone)]
pub struct UserQuotaLedger {
    executor: AsyncExecutor,
    select_statement: String,
    upsert_statement: String,
    delete_statement: String,
}

impl UserQuotaLedger {
    pub fn new(executor: AsyncExecutor, tables: &QuotaTables) -> Self {
        let table = &tables.user_quota;

        Self {
            executor,
            select_statement: format!("SELECT {QUOTA} FROM {table} WHERE {USER_NAME} = ?"),
            upsert_statement: format!(
                "INSERT INTO {table} ({USER_NAME}, {QUOTA}) VALUES (?, ?) \
                 ON CONFLICT({USER_NAME}) DO UPDATE SET {QUOTA} = excluded.{QUOTA}"
            ),
            delete_statement: format!("DELETE FROM {table} WHERE {USER_NAME} = ?"),
        }
    }

    /// Override for `user`. `None` means the cluster default applies.
    pub async fn get_quota(&self, user: &str) -> Result<Option<i64>> {
        debug!(user, "Reading user quota");

        let row = self
            .executor
            .execute_single_row(sqlx::query(&self.select_statement).bind(user))
            .await?;

        Ok(row.map(|row| row.try_get::<i64, _>(QUOTA)).transpose()?)
    }

    pub async fn set_quota(&self, user: &str, quota: i64) -> Result<()> {
        debug!(user, quota, "Setting user quota");

        self.executor
            .execute_void(sqlx::query(&self.upsert_statement).bind(user).bind(quota))
            .await
    }

    /// Returns `true` only if `user` had an override and this call removed it
    pub async fn remove_quota(&self, user: &str) -> Result<bool> {
        let removed = self
            .executor
            .execute_return_applied(sqlx::query(&self.delete_statement).bind(user))
            .await?;

        debug!(user, removed, "Removed user quota");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quota::test_executor;

    async fn setup() -> UserQuotaLedger {
        let (executor, tables) = test_executor().await;
        UserQuotaLedger::new(executor, &tables)
    }

    #[tokio::test]
    async fn test_unknown_user_is_none() {
        let ledger = setup().await;
        assert_eq!(ledger.get_quota("nobody@example.com").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_quota_scoped_to_user() {
        let ledger = setup().await;

        ledger.set_quota("alice@example.com", 1000).await.unwrap();

        assert_eq!(
            ledger.get_quota("alice@example.com").await.unwrap(),
            Some(1000)
        );
        assert_eq!(ledger.get_quota("bob@example.com").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_overwrite() {
        let ledger = setup().await;

        ledger.set_quota("alice@example.com", 1000).await.unwrap();
        ledger.set_quota("alice@example.com", 0).await.unwrap();

        assert_eq!(ledger.get_quota("alice@example.com").await.unwrap(), Some(0));
    }

    #[tokio::test]
    async fn test_remove_only_touches_one_user() {
        let ledger = setup().await;
        ledger.set_quota("alice@example.com", 1000).await.unwrap();
        ledger.set_quota("bob@example.com", 2000).await.unwrap();

        assert!(ledger.remove_quota("alice@example.com").await.unwrap());
        assert!(!ledger.remove_quota("alice@example.com").await.unwrap());

        assert_eq!(ledger.get_quota("alice@example.com").await.unwrap(), None);
        assert_eq!(
            ledger.get_quota("bob@example.com").await.unwrap(),
            Some(2000)
        );
    }

    #[tokio::test]
    async fn test_remove_unknown_user() {
        let ledger = setup().await;
        assert!(!ledger.remove_quota("ghost@example.com").await.unwrap());
    }
}
