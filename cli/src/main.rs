//! `torrent-handler`: watch a folder, add dropped torrents to Transmission,
//! move them into a processed folder.

mod logging;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use torrent_handler_ingest::{HandlerConfig, IngestPipeline};
use torrent_handler_transmission::{TorrentSubmitter, TransmissionClient};
use torrent_handler_watcher::DirectoryWatcher;
use tracing::{error, info, warn};

#[derive(Debug, Parser)]
#[command(
    name = "torrent-handler",
    version,
    about = "Watch a folder for .torrent files and add them to Transmission"
)]
struct Cli {
    /// Load environment variables from this file instead of `./.env`.
    #[arg(long, value_name = "PATH")]
    env_file: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = load_env_file(cli.env_file.as_deref()) {
        eprintln!("Error: {e:#}");
        return ExitCode::FAILURE;
    }

    let config = HandlerConfig::from_env();
    let _log_guard = logging::init(config.as_ref().ok().map(|c| c.log_file.as_path()));

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to start async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Load `.env`-style variables. Existing variables win.
fn load_env_file(path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => dotenvy::from_path(path)
            .with_context(|| format!("failed to load env file {}", path.display())),
        None => match dotenvy::dotenv() {
            Ok(_) => Ok(()),
            Err(e) if e.not_found() => Ok(()),
            Err(e) => Err(e).context("failed to load .env"),
        },
    }
}

async fn run(config: HandlerConfig) -> Result<()> {
    let submitter: Option<Arc<dyn TorrentSubmitter>> =
        match TransmissionClient::connect(config.submission.clone()).await {
            Ok(client) => {
                info!("Successfully connected to Transmission");
                Some(Arc::new(client))
            }
            Err(e) => {
                error!(
                    "Failed to connect to Transmission at {}: {e}",
                    config.submission.endpoint()
                );
                None
            }
        };

    let pipeline = Arc::new(IngestPipeline::new(&config, submitter)?);
    let watcher = DirectoryWatcher::watch(&config.watch_dir)
        .with_context(|| format!("cannot watch {}", config.watch_dir.display()))?;

    let cancel = CancellationToken::new();
    let mut task = tokio::spawn({
        let pipeline = pipeline.clone();
        let cancel = cancel.clone();
        async move { pipeline.run(watcher, cancel).await }
    });

    tokio::select! {
        signal = shutdown_signal() => {
            signal?;
            info!("Shutdown requested");
            cancel.cancel();
            (&mut task).await.context("pipeline task failed")?;
        }
        finished = &mut task => {
            finished.context("pipeline task failed")?;
            warn!("Pipeline stopped on its own");
        }
    }

    Ok(())
}

#[cfg(unix)]
async fn shutdown_signal() -> Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate = signal(SignalKind::terminate()).context("cannot listen for SIGTERM")?;
    tokio::select! {
        res = tokio::signal::ctrl_c() => res.context("cannot listen for ctrl-c"),
        _ = terminate.recv() => Ok(()),
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() -> Result<()> {
    tokio::signal::ctrl_c()
        .await
        .context("cannot listen for ctrl-c")
}
