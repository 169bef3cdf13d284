//! Asynchronous statement execution
//!
//! Three primitives cover every ledger operation:
//! - [`AsyncExecutor::execute_single_row`]: lookup returning zero or one row
//! - [`AsyncExecutor::execute_void`]: write with no payload
//! - [`AsyncExecutor::execute_return_applied`]: conditional write reporting
//!   whether any row was touched
//!
//! Nothing here retries. A failed or timed-out statement surfaces as `Err`.
//!
//! The statement timeout covers reads end to end. For writes it only covers
//! waiting for a pooled connection: once a write reaches SQLite it runs to
//! completion on the driver's worker, so abandoning it would not undo it.
//! Lock waits inside a write are bounded by the connection's busy timeout,
//! after which SQLite fails the statement without applying it.

use crate::error::{QuotaError, Result};
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqlitePool, SqliteQueryResult, SqliteRow};
use sqlx::Sqlite;
use std::future::Future;
use std::time::Duration;

/// Bound statement ready for execution
pub type Statement<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

#[derive(Debug, Clone)]
pub struct AsyncExecutor {
    pool: SqlitePool,
    statement_timeout: Option<Duration>,
}

impl AsyncExecutor {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            statement_timeout: None,
        }
    }

    /// Fail reads, and waits for a connection, that take longer than `timeout`
    pub fn with_statement_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.statement_timeout = timeout;
        self
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn execute_single_row(&self, statement: Statement<'_>) -> Result<Option<SqliteRow>> {
        self.bounded(statement.fetch_optional(&self.pool)).await
    }

    pub async fn execute_void(&self, statement: Statement<'_>) -> Result<()> {
        self.write(statement).await?;
        Ok(())
    }

    pub async fn execute_return_applied(&self, statement: Statement<'_>) -> Result<bool> {
        let result = self.write(statement).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn write(&self, statement: Statement<'_>) -> Result<SqliteQueryResult> {
        let mut conn = self.bounded(self.pool.acquire()).await?;
        Ok(statement.execute(&mut *conn).await?)
    }

    async fn bounded<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, sqlx::Error>>,
    {
        match self.statement_timeout {
            Some(limit) => tokio::time::timeout(limit, fut)
                .await
                .map_err(|_| QuotaError::Timeout(limit))?
                .map_err(QuotaError::from),
            None => fut.await.map_err(QuotaError::from),
        }
    }
}
