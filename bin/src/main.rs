//! frazil CLI - BitMEX tick downloader and bar archiver.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use frazil_archive::ensure_layout;
use frazil_fetch::{ClientConfig, DownloadClient};
use frazil_pipeline::{Coordinator, PipelineConfig};
use frazil_types::{DateRange, parse_compact_date};

#[derive(Parser)]
#[command(name = "frazil")]
#[command(about = "Download BitMEX tick data and archive OHLCV bars", long_about = None)]
#[command(version)]
struct Cli {
    /// Start date (YYYYMMDD)
    start: String,

    /// End date (YYYYMMDD). Defaults to yesterday (UTC).
    end: Option<String>,

    /// Root of the output archive tree
    #[arg(short, long, default_value = "data")]
    output_dir: PathBuf,

    /// Instrument symbol to keep; all other rows are discarded
    #[arg(long, default_value = "XBTUSD")]
    symbol: String,

    /// Base URL of the remote data bucket
    #[arg(long, default_value = frazil_fetch::url::BASE_URL)]
    base_url: String,

    /// Maximum concurrent (date, type) pipelines
    #[arg(long, default_value = "4")]
    concurrency: usize,

    /// Per-request timeout in seconds (covers the whole body stream)
    #[arg(long, default_value = "600")]
    timeout_secs: u64,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let start = parse_compact_date(&cli.start)
        .with_context(|| format!("Invalid start date: {}", cli.start))?;
    let end = match &cli.end {
        Some(s) => parse_compact_date(s).with_context(|| format!("Invalid end date: {s}"))?,
        None => chrono::Utc::now()
            .date_naive()
            .pred_opt()
            .context("Cannot determine yesterday")?,
    };
    let range = DateRange::new(start, end)?;

    let config = PipelineConfig::new(&cli.output_dir)
        .with_symbol(&cli.symbol)
        .with_base_url(&cli.base_url);

    // The only process-fatal error: without the output tree nothing can run
    ensure_layout(&config.output_root, &config.instrument)
        .context("Failed to create output directories")?;

    let client = DownloadClient::new(ClientConfig {
        timeout: Duration::from_secs(cli.timeout_secs),
        ..Default::default()
    })
    .context("Failed to create HTTP client")?;

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    info!(%range, symbol = %config.symbol, "starting run");
    let coordinator = Coordinator::new(client, config, cli.concurrency, cancel);
    let report = coordinator.run(range).await;

    info!(%report, "run complete");
    for failure in &report.failures {
        warn!(
            date = %failure.date,
            event_type = %failure.event_type,
            error = %failure.error,
            "needs retry"
        );
    }

    // Per-pipeline failures are operator information, not a process error
    Ok(())
}

/// Cancels the shared token on the first interrupt so every in-flight
/// pipeline cleans up its partial archives before the process exits.
fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling in-flight pipelines");
            cancel.cancel();
        }
    });
}

fn init_tracing(verbose: u8, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let default = if quiet {
        "error"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
