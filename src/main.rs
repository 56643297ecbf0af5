mod accounts;
mod aggregator;
mod buckets;
mod cli;
mod editor;
mod error;
mod fmt;
mod importer;
mod matcher;
mod models;
mod settings;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{AccountsCommands, BucketsCommands, Cli, Commands};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("bucketeer=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let settings = settings::resolve(cli.data_dir.as_deref());

    let result = match cli.command.unwrap_or(Commands::Run) {
        Commands::Init => cli::init::run(cli.data_dir.as_deref()),
        Commands::Run => cli::session::run(&settings),
        Commands::Status => cli::status::run(&settings),
        Commands::Buckets { command } => match command {
            BucketsCommands::Add => cli::buckets::add(&settings),
            BucketsCommands::List => cli::buckets::list(&settings),
        },
        Commands::Accounts { command } => match command {
            AccountsCommands::List => cli::accounts::list(&settings),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
