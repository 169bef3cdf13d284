//! CLI tool for administering Sieve quotas
//!
//! # Usage
//!
//! ```bash
//! # Cluster default
//! sieve-quota cluster set 100000
//! sieve-quota cluster get
//!
//! # Per-user override
//! sieve-quota user set alice@example.com 50000
//! sieve-quota user remove alice@example.com
//!
//! # Space used (negative deltas release space)
//! sieve-quota space update alice@example.com -1200
//!
//! # Everything known about one user
//! sieve-quota show alice@example.com --json
//! ```

use clap::{Parser, Subcommand};
use sieve_quota::{logging, Config, QuotaLedger, QuotaReport, SieveQuotaStore};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "sieve-quota")]
#[command(about = "Manage Sieve script quotas", long_about = None)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Database URL, overrides the configuration (e.g., sqlite://sieve-quota.db)
    #[arg(short, long)]
    db: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the quota tables
    Init,
    /// Cluster-wide default quota
    Cluster {
        #[command(subcommand)]
        action: ClusterAction,
    },
    /// Per-user quota override
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Per-user space used
    Space {
        #[command(subcommand)]
        action: SpaceAction,
    },
    /// Show quotas and usage for a user
    Show {
        user: String,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ClusterAction {
    Get,
    Set {
        #[arg(allow_negative_numbers = true)]
        quota: i64,
    },
    Remove,
}

#[derive(Subcommand)]
enum UserAction {
    Get {
        user: String,
    },
    Set {
        user: String,
        #[arg(allow_negative_numbers = true)]
        quota: i64,
    },
    Remove {
        user: String,
    },
}

#[derive(Subcommand)]
enum SpaceAction {
    Get {
        user: String,
    },
    Update {
        user: String,
        /// Bytes to add (negative to subtract)
        #[arg(allow_negative_numbers = true)]
        delta: i64,
    },
}

fn describe(quota: Option<i64>) -> String {
    quota
        .map(|quota| quota.to_string())
        .unwrap_or_else(|| "not set".to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(db) = cli.db {
        config.storage.database_url = db;
    }
    logging::init(&config.logging)?;

    let ledger = QuotaLedger::from_config(&config.storage).await?;
    ledger.init_db().await?;

    let mut exit_code = 0;

    match cli.command {
        Commands::Init => {
            println!("✓ Quota tables ready");
        }
        Commands::Cluster { action } => match action {
            ClusterAction::Get => {
                println!("Cluster quota: {}", describe(ledger.get_quota().await?));
            }
            ClusterAction::Set { quota } => {
                ledger.set_quota(quota).await?;
                info!(quota, "Cluster quota set");
                println!("✓ Cluster quota set to {}", quota);
            }
            ClusterAction::Remove => {
                if ledger.remove_quota().await? {
                    println!("✓ Cluster quota removed");
                } else {
                    eprintln!("Error: no cluster quota is set");
                    exit_code = 1;
                }
            }
        },
        Commands::User { action } => match action {
            UserAction::Get { user } => {
                println!(
                    "Quota for {}: {}",
                    user,
                    describe(ledger.get_user_quota(&user).await?)
                );
            }
            UserAction::Set { user, quota } => {
                ledger.set_user_quota(&user, quota).await?;
                info!(user = %user, quota, "User quota set");
                println!("✓ Quota for {} set to {}", user, quota);
            }
            UserAction::Remove { user } => {
                if ledger.remove_user_quota(&user).await? {
                    println!("✓ Quota for {} removed", user);
                } else {
                    eprintln!("Error: {} has no quota override", user);
                    exit_code = 1;
                }
            }
        },
        Commands::Space { action } => match action {
            SpaceAction::Get { user } => {
                println!("Space used by {}: {}", user, ledger.space_used_by(&user).await?);
            }
            SpaceAction::Update { user, delta } => {
                ledger.update_space_used(&user, delta).await?;
                info!(user = %user, delta, "Space used updated");
                println!(
                    "✓ Space used by {} is now {}",
                    user,
                    ledger.space_used_by(&user).await?
                );
            }
        },
        Commands::Show { user, json } => {
            let report = QuotaReport::load(&ledger, &user).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("User:           {}", report.user);
                println!("Cluster quota:  {}", describe(report.cluster_quota));
                println!("User quota:     {}", describe(report.user_quota));
                println!("Effective:      {}", describe(report.effective_quota()));
                println!("Space used:     {}", report.space_used);
                if let Some(remaining) = report.remaining() {
                    println!("Remaining:      {}", remaining);
                }
            }
        }
    }

    ledger.close().await;

    if exit_code != 0 {
        std::process::exit(exit_code);
    }

    Ok(())
}
