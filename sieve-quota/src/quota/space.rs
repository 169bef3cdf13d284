//! Per-user space usage counters
//!
//! Usage only ever moves by a signed delta. There is no
//! removal: an absent row and a zero counter read the same.

use sqlx::Row;
use tracing::debug;

use super::tables::{QuotaTables, SPACE_USED, USER_NAME};
use crate::error::Result;
use crate::store::AsyncExecutor;

#[derive(Debug, Clone)]
pub struct SpaceUsageLedger {
    executor: AsyncExecutor,
    select_statement: String,
    increment_statement: String,
}

impl SpaceUsageLedger {
    pub fn new(executor: AsyncExecutor, tables: &QuotaTables) -> Self {
        let table = &tables.space;

        Self {
            executor,
            select_statement: format!("SELECT {SPACE_USED} FROM {table} WHERE {USER_NAME} = ?"),
            // Single statement: the store applies the addition atomically per key
            increment_statement: format!(
                "INSERT INTO {table} ({USER_NAME}, {SPACE_USED}) VALUES (?, ?) \
                 ON CONFLICT({USER_NAME}) DO UPDATE SET {SPACE_USED} = {SPACE_USED} + excluded.{SPACE_USED}"
            ),
        }
    }

    /// Bytes used by `user`; zero when nothing was ever recorded
    pub async fn space_used_by(&self, user: &str) -> Result<i64> {
        let row = self
            .executor
            .execute_single_row(sqlx::query(&self.select_statement).bind(user))
            .await?;

        let used = row
            .map(|row| row.try_get::<i64, _>(SPACE_USED))
            .transpose()?
            .unwrap_or(0);

        debug!(user, used, "Read space used");
        Ok(used)
    }

    /// Add `delta` (negative to release space) to the counter of `user`
    pub async fn update_space_used(&self, user: &str, delta: i64) -> Result<()> {
        debug!(user, delta, "Updating space used");

        self.executor
            .execute_void(sqlx::query(&self.increment_statement).bind(user).bind(delta))
            .await
    }
}
