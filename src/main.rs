use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::oneshot;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

use ipheno::config::Settings;
use ipheno::console::{console_loop, display};
use ipheno::inventory::{IndexStore, InventoryBuilder, ProcessProber};
use ipheno::server::{ApiServer, AppState};

/// Model inventory for the sweet-potato phenotyping tool
#[derive(Parser)]
#[command(name = "ipheno", version, about)]
struct Cli {
    /// Directory holding default.toml and an optional local.toml
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Rebuild the model index once and print it
    Scan,
    /// Check every model executable and print the result as JSON
    Validate,
    /// Print the stored model index
    Show,
    /// Remove the stored model index
    Clean,
    /// Build the index and answer requests until interrupted
    Serve,
    /// Serve in the background and open the interactive console
    Run,
}

/// Main entry point
///
/// Loads settings, sets up logging and dispatches the chosen subcommand.
/// `serve` and `run` build the index at startup and remove it on shutdown
/// when `models.remove_index_on_exit` is set. `validate` exits with a failure
/// code when any executable is invalid.
#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let settings = match &cli.config_dir {
        Some(dir) => Settings::from_dir(dir),
        None => Settings::new(),
    }
    .context("Failed to load configuration")?;

    // Keep the guard alive so buffered log lines are flushed on exit
    let _guard = init_logging(&settings)?;

    info!("ipheno starting up...");
    let models_dir = settings.models.directory.clone();
    info!("Models directory: {}", models_dir.display());
    info!("Index file: {}", settings.index_path().display());

    let inventory = settings.inventory();
    let prober = Arc::new(ProcessProber::new(inventory.introspection_flag.clone()));
    let builder = InventoryBuilder::new(inventory, prober, IndexStore::new(settings.index_path()));

    match cli.command {
        Command::Scan => {
            let spinner = ProgressBar::new_spinner();
            spinner.set_style(ProgressStyle::default_spinner().template("{spinner} {wide_msg}")?);
            spinner.enable_steady_tick(Duration::from_millis(120));
            spinner.set_message(format!("Probing model executables in {}...", models_dir.display()));

            let summary = builder.scan(&models_dir).await;
            spinner.finish_and_clear();

            display::display_scan_summary(&summary?);
            display::display_index_table(&builder.store().load()?);
        }
        Command::Validate => {
            let result = builder.validate_executables(&models_dir).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            if !result.is_good() {
                // Returning lets the log guard flush before the process ends
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Show => {
            let index = builder.store().load()?;
            display::display_index_table(&index);
        }
        Command::Clean => {
            if builder.store().remove()? {
                println!("Removed {}", builder.store().path().display());
            } else {
                println!("No index at {}", builder.store().path().display());
            }
        }
        Command::Serve => serve(&settings, builder, false).await?,
        Command::Run => serve(&settings, builder, true).await?,
    }

    Ok(ExitCode::SUCCESS)
}

/// Sets up the daily rolling log file.
fn init_logging(settings: &Settings) -> anyhow::Result<WorkerGuard> {
    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("ipheno")
        .build(&settings.logging.directory)
        .context("Failed to create log file appender")?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.logging.level.to_lowercase()));

    let subscriber = tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_line_number(true)
        .with_file(true)
        .with_thread_ids(true)
        .with_target(false)
        .with_env_filter(filter);

    if settings.logging.json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    info!("Logging initialized in {}", settings.logging.directory.display());
    Ok(guard)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutdown signal received");
}

async fn serve(settings: &Settings, builder: InventoryBuilder, interactive: bool) -> anyhow::Result<()> {
    let state = AppState {
        builder,
        models_dir: settings.models.directory.clone(),
        known_operations: settings.models.known_operations.clone(),
    };
    let server = Arc::new(ApiServer::new(state, settings.server.host.clone(), settings.server.port));
    server.initialize().await;

    let result = if interactive {
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let background = Arc::clone(&server);
        let handle = tokio::spawn(async move {
            let stop = async move {
                let _ = stop_rx.await;
            };
            if let Err(e) = background.start(stop).await {
                error!("Server error: {}", e);
                eprintln!("Server error: {}", e);
            }
        });

        // Give the server a moment to start
        tokio::time::sleep(Duration::from_millis(100)).await;

        let result = console_loop(settings).await.map_err(|e| anyhow!(e));
        let _ = stop_tx.send(());
        let _ = handle.await;
        result
    } else {
        println!("Serving on {}", settings.server_url());
        server.start(shutdown_signal()).await.map_err(|e| anyhow!(e))
    };

    // The index was written by initialize(), so it goes even when serving failed
    if settings.models.remove_index_on_exit {
        server.cleanup();
    }
    result
}
