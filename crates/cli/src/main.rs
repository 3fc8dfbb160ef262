mod cli;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use playprep_core::{load_config, validate_config, FfmpegTools, NormalizeOptions, TreeWalker};

use cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(cli).await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    if !cli.root.is_dir() {
        bail!("{} is not a directory", cli.root.display());
    }

    match &cli.config {
        Some(path) => info!("Loading configuration from {:?}", path),
        None => info!("No config file given, using defaults and environment"),
    }
    let config = load_config(cli.config.as_deref()).context("Failed to load config")?;
    validate_config(&config).context("Configuration validation failed")?;

    let tools = FfmpegTools::new(config.converter.clone());
    tools
        .validate()
        .await
        .context("ffmpeg/ffprobe are not usable")?;
    info!(
        "Using {:?} and {:?}",
        config.converter.ffmpeg_path, config.converter.ffprobe_path
    );

    let walker = TreeWalker::new(config.policy, tools.clone(), tools).with_options(
        NormalizeOptions {
            dry_run: cli.dry_run,
        },
    );

    tokio::spawn(cancel_on_signal(walker.cancellation_flag()));

    let report = walker.run(&cli.root).await;
    if report.failed > 0 || report.traversal_failures > 0 {
        warn!(
            "{} file(s) failed and {} director(ies) could not be read",
            report.failed, report.traversal_failures
        );
    }

    Ok(())
}

/// Set `cancelled` on Ctrl+C or SIGTERM. The file in progress is finished first.
async fn cancel_on_signal(cancelled: Arc<AtomicBool>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    warn!("Shutdown requested, stopping after the current file");
    cancelled.store(true, Ordering::SeqCst);
}
