//! sv - server supervisor CLI
//!
//! Launches the server artifact, reports its startup progress and keeps it
//! supervised until interrupted.
//!
//! # Examples
//!
//! ```bash
//! # Find the artifact in storage and run it
//! sv run
//!
//! # Run a specific artifact, printing events as JSON lines
//! sv run ./WebSocket-Server-0.0.1-SNAPSHOT.jar --json
//!
//! # Show where the artifact would be picked up from
//! sv locate
//! ```

mod cli;
mod commands;
mod logging;
mod shutdown_signal;

#[cfg(test)]
mod tests;

use crate::{
    cli::Cli,
    commands::Commands,
    logging::{current_log_path, setup_logging},
};

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use sv_config::{Config, ConfigErrorResult};
use sv_core::{
    ChannelListener, ServerEvent, ServerStatus, ServerSupervisor, StorageContext,
    find_artifact_path,
};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Optional .env with SV_* overrides
    let _ = dotenvy::dotenv();

    let config_dir = match cli.config_dir {
        Some(dir) => dir,
        None => match Config::config_dir() {
            Ok(dir) => dir,
            Err(e) => {
                eprintln!("Error: {e}");
                return ExitCode::FAILURE;
            }
        },
    };

    let config = match load_config(&config_dir) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration from {}: {e}", config_dir.display());
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = setup_logging(&config.logging, &config_dir) {
        eprintln!("Error initializing logging: {e}");
        return ExitCode::FAILURE;
    }

    info!("sv v{}", env!("CARGO_PKG_VERSION"));
    config.log_summary();

    match cli.command {
        Commands::Locate => locate(&config),
        Commands::Run { artifact, json } => run(&config, artifact, json).await,
        Commands::Config => print_config(&config, &config_dir),
    }
}

fn load_config(config_dir: &Path) -> ConfigErrorResult<Config> {
    let config = Config::load_from(config_dir)?;
    config.validate()?;
    Ok(config)
}

/// Artifact path from the configured storage directories.
pub(crate) fn locate_artifact(config: &Config) -> Option<PathBuf> {
    let Some(context) = StorageContext::from_config(&config.artifact) else {
        warn!("No storage directories available on this platform");
        return None;
    };

    find_artifact_path(&context, &config.artifact.file_name)
}

fn locate(config: &Config) -> ExitCode {
    match locate_artifact(config) {
        Some(path) => {
            println!("{}", path.display());
            ExitCode::SUCCESS
        }
        None => {
            eprintln!("Server artifact '{}' not found", config.artifact.file_name);
            ExitCode::FAILURE
        }
    }
}

fn print_config(config: &Config, config_dir: &Path) -> ExitCode {
    match config.to_toml() {
        Ok(toml) => {
            println!("# config dir: {}", config_dir.display());
            if let Some(log_path) = current_log_path(&config.logging, config_dir) {
                println!("# log file: {}", log_path.display());
            }
            println!("{toml}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error rendering configuration: {e}");
            ExitCode::FAILURE
        }
    }
}

/// One output line for an event.
pub(crate) fn render_event(event: &ServerEvent, json: bool) -> String {
    if json {
        return match serde_json::to_string(event) {
            Ok(line) => line,
            Err(e) => {
                warn!("Failed to serialize event: {e}");
                format!("{event:?}")
            }
        };
    }

    match event {
        ServerEvent::Progress(line) => line.clone(),
        ServerEvent::Started => String::from("Server started"),
        ServerEvent::Error(message) => format!("Server failed: {message}"),
    }
}

/// Start the server and supervise it until a signal arrives, startup fails,
/// or the server exits on its own.
async fn run(config: &Config, artifact: Option<PathBuf>, json: bool) -> ExitCode {
    let Some(artifact) = artifact.or_else(|| locate_artifact(config)) else {
        eprintln!("Server artifact '{}' not found", config.artifact.file_name);
        return ExitCode::FAILURE;
    };

    let mut shutdown = shutdown_signal::listen();
    let (listener, mut events) = ChannelListener::new();
    let supervisor = ServerSupervisor::from_config(config, Arc::new(listener));
    let mut status = supervisor.subscribe();
    let mut started = false;

    info!("Starting server from {}", artifact.display());
    supervisor.start_server(&artifact);

    let exit_code = loop {
        tokio::select! {
            Some(event) = events.recv() => {
                println!("{}", render_event(&event, json));

                match event {
                    ServerEvent::Started => started = true,
                    ServerEvent::Error(message) => {
                        error!("Server failed to start: {message}");
                        break ExitCode::FAILURE;
                    }
                    ServerEvent::Progress(_) => {}
                }
            }
            changed = status.changed() => {
                if changed.is_err() {
                    break ExitCode::FAILURE;
                }

                // Failures during startup arrive as an error event instead
                let failure = match &*status.borrow_and_update() {
                    ServerStatus::Failed { reason } if started => Some(reason.clone()),
                    _ => None,
                };
                if let Some(reason) = failure {
                    error!("Server stopped unexpectedly: {reason}");
                    break ExitCode::FAILURE;
                }
            }
            Some(_) = shutdown.recv() => {
                info!("Shutdown requested");
                break ExitCode::SUCCESS;
            }
        }
    };

    supervisor.stop_server().await;
    exit_code
}
