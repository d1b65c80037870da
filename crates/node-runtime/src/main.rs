//! # SQLChain Node
//!
//! ```text
//! node-runtime [--config <file.json>] <init|status>
//! ```
//!
//! Exit status is 0 on success, 2 when the stored chain is corrupted and 1
//! for any other failure.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use node_runtime::container::NodeConfig;
use node_runtime::NodeRuntime;
use sc_02_sqlchain::ChainError;

/// SQLChain node runtime
#[derive(Parser, Debug)]
#[command(name = "node-runtime")]
#[command(about = "Create or inspect a signed SQL chain")]
struct Cli {
    /// JSON configuration file (SC_* environment variables override it)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Mine a node identity, sign genesis and create the chain
    Init,
    /// Load the chain and report its checkpoint
    Status,
}

fn init_logging(config: &NodeConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .try_init();
}

fn run(cli: Cli) -> Result<()> {
    let config = NodeConfig::load(cli.config.as_deref())?;
    init_logging(&config);
    info!("Data Dir: {}", config.storage.data_dir.display());

    let runtime = NodeRuntime::new(config);
    let report = match cli.command {
        Command::Init => runtime.init()?,
        Command::Status => runtime.status()?,
    };
    println!("{report}");
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            eprintln!("error: {err:#}");
            match err.downcast_ref::<ChainError>() {
                Some(ChainError::ChainCorrupted { .. }) => ExitCode::from(2),
                _ => ExitCode::FAILURE,
            }
        }
    }
}
