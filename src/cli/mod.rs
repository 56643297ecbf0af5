pub mod accounts;
pub mod buckets;
pub mod init;
pub mod prompt;
pub mod session;
pub mod status;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "bucketeer",
    about = "Sort bank transactions into spending buckets with substring rules."
)]
pub struct Cli {
    /// Data directory holding statements/ and storage/ (overrides saved settings)
    #[arg(long = "data-dir", global = true)]
    pub data_dir: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Save settings and create the statements and storage directories.
    Init,
    /// Import statements, refine bucket rules interactively, and total balances.
    Run,
    /// Show how the current rules classify the imported transactions.
    Status,
    /// Manage buckets.
    Buckets {
        #[command(subcommand)]
        command: BucketsCommands,
    },
    /// Manage account names.
    Accounts {
        #[command(subcommand)]
        command: AccountsCommands,
    },
}

#[derive(Subcommand)]
pub enum BucketsCommands {
    /// Define new buckets interactively.
    Add,
    /// List all buckets and their rules.
    List,
}

#[derive(Subcommand)]
pub enum AccountsCommands {
    /// List named accounts.
    List,
}
