use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use calmpulse_core::storage::{self, AppConfig};
use calmpulse_core::{
    BurnoutClient, Database, KeyValueStore, MemoryStore, TrackerService, TrackingEngine,
};

mod commands;
mod notifier;
mod shell;

#[derive(Parser)]
#[command(name = "calmpulse", version, about = "Calm Pulse screen-time tracker")]
struct Cli {
    /// Directory holding config.toml and the database
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Config file (defaults to <data-dir>/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override the burnout prediction endpoint
    #[arg(long)]
    endpoint: Option<String>,
    /// Keep all state in memory; nothing is written to disk
    #[arg(long)]
    memory: bool,
    /// Log at debug level regardless of the configured filter
    #[arg(short, long)]
    verbose: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let Cli {
        data_dir,
        config: config_file,
        endpoint,
        memory,
        verbose,
        command,
    } = cli;

    if let Some(Commands::Config { action }) = command {
        let path = match config_file {
            Some(path) => path,
            None => AppConfig::path_in(&resolve_data_dir(data_dir)?),
        };
        return commands::config::run(action, &path);
    }

    // In-memory mode never touches the filesystem.
    let (mut config, store) = if memory {
        let config = match &config_file {
            Some(path) => AppConfig::load_from(path)?,
            None => AppConfig::default(),
        };
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        (config, store)
    } else {
        let dir = resolve_data_dir(data_dir)?;
        let path = config_file.unwrap_or_else(|| AppConfig::path_in(&dir));
        let config = AppConfig::load_from(&path)?;
        let db_path = dir.join(&config.database_file);
        let store: Arc<dyn KeyValueStore> = Arc::new(Database::open(&db_path)?);
        (config, store)
    };
    if let Some(endpoint) = endpoint {
        config.advisory_endpoint = endpoint;
    }

    init_tracing(&config, verbose);
    info!(memory, endpoint = %config.advisory_endpoint, "starting calmpulse");

    let engine = TrackingEngine::open(store, Arc::new(notifier::TerminalNotifier));
    let handle = TrackerService::spawn(engine, config.tick_interval());

    let advisory = BurnoutClient::new(&config.advisory_endpoint, config.advisory_timeout());
    if let Err(e) = &advisory {
        warn!(error = %e, "burnout checks unavailable");
    }

    let mut events = handle.subscribe();
    tokio::spawn(async move {
        use tokio::sync::broadcast::error::RecvError;
        loop {
            match events.recv().await {
                Ok(event) => debug!(event = event.name(), "tracker event"),
                Err(RecvError::Lagged(skipped)) => debug!(skipped, "event watcher lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    shell::Shell::new(handle, advisory).run().await?;
    Ok(())
}

fn resolve_data_dir(dir: Option<PathBuf>) -> Result<PathBuf, Box<dyn std::error::Error>> {
    match dir {
        Some(dir) => {
            std::fs::create_dir_all(&dir)?;
            Ok(dir)
        }
        None => Ok(storage::data_dir()?),
    }
}

/// Logs go to stderr so they never interleave with command output parsing.
fn init_tracing(config: &AppConfig, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("CALMPULSE_LOG")
            .unwrap_or_else(|_| EnvFilter::new(&config.log_filter))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
