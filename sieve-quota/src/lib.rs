//! sieve-quota: Sieve script quota ledger
//!
//! Bookkeeping for the storage quotas that govern Sieve filtering scripts:
//! an optional cluster-wide default, optional per-user overrides, and a
//! running count of the bytes each user's scripts occupy.
//!
//! Script management consults these numbers before accepting a script and
//! adjusts the usage counter after storing or deleting one. Enforcement is
//! the caller's job; this crate only records and reports.
//!
//! # Example
//!
//! ```no_run
//! use sieve_quota::{Config, QuotaLedger, SieveQuotaStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let ledger = QuotaLedger::from_config(&config.storage).await?;
//!     ledger.init_db().await?;
//!
//!     ledger.set_quota(10_000).await?;
//!     ledger.set_user_quota("alice@example.com", 5_000).await?;
//!     ledger.update_space_used("alice@example.com", 1_200).await?;
//!
//!     assert_eq!(ledger.space_used_by("alice@example.com").await?, 1_200);
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration management
//! - [`error`]: Error types and handling
//! - [`logging`]: Tracing subscriber setup
//! - [`quota`]: The cluster, user and space usage ledgers
//! - [`store`]: SQLite pool and statement execution

pub mod config;
pub mod error;
pub mod logging;
pub mod quota;
pub mod store;

// Re-export commonly used types
pub use config::Config;
pub use error::{QuotaError, Result};
pub use quota::{MemoryQuotaLedger, QuotaLedger, QuotaReport, SieveQuotaStore};
