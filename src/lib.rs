pub mod config;
pub mod copier;
pub mod engine;
pub mod error;
pub mod logging;
pub mod merges;
pub mod model;
pub mod planner;
pub mod progress;
pub mod styles;
pub mod utils;
pub mod validation;
pub mod worker;

pub use config::{CliArgs, SplitConfig};
pub use engine::{CollectingSink, EventSink, ScanReport, SplitEngine};
pub use error::{ErrorCode, SplitError, SplitOutcome};
pub use logging::{LoggingConfig, init_logging};
pub use model::{
    CopyMethod, NoDataPolicy, ProgressUpdate, SplitEvent, SplitParams, SplitResult, SplitStatus,
    SplitSummary,
};
pub use worker::{SplitHandle, SplitJob};

use anyhow::{Context, Result};
use chrono::Utc;
use progress::ProgressBar;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use utils::{path_to_forward_slashes, to_rfc3339};

/// Runs one split end to end: settings, worker, progress loop, summary.
///
/// Ctrl-C cancels at the next chunk boundary; the returned summary then has
/// status `cancelled` and lists the files written before it.
pub async fn run_split(config: SplitConfig) -> Result<SplitSummary> {
    if !config.json {
        println!("{}\n", progress::render_settings(&config));
    }

    tracing::info!(
        input = %config.input.display(),
        output_dir = %config.output_dir.display(),
        chunk_size = config.chunk_size,
        header_rows = config.header_rows,
        copy_method = %config.copy_method,
        no_data_policy = %config.no_data_policy,
        "starting split",
    );

    let started_at = Utc::now();
    let clock = Instant::now();

    let handle = SplitJob::spawn(config.split_params(), config.event_capacity);
    let interrupt = spawn_interrupt_listener(handle.cancel_token());

    let mut bar = ProgressBar::default();
    let show_progress = !config.json;
    let result = handle
        .drive(config.poll_interval(), |update| {
            if show_progress {
                bar.update(update);
            }
        })
        .await;
    bar.finish();
    interrupt.abort();

    Ok(SplitSummary {
        status: result.status,
        message: result.message,
        files_created: result.files_created,
        output_dir: path_to_forward_slashes(&config.output_dir),
        output_files: result
            .output_files
            .iter()
            .map(|path| path_to_forward_slashes(path))
            .collect(),
        started_at: to_rfc3339(started_at),
        finished_at: to_rfc3339(Utc::now()),
        elapsed_ms: clock.elapsed().as_millis() as u64,
    })
}

/// Loads and plans the split without writing anything.
pub async fn run_dry(config: SplitConfig) -> Result<ScanReport> {
    let engine = SplitEngine::new(config.split_params());
    let report = tokio::task::spawn_blocking(move || engine.prescan())
        .await
        .context("dry-run worker panicked")??;
    Ok(report)
}

fn spawn_interrupt_listener(cancel: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => match signal {
                Ok(()) => {
                    tracing::warn!("interrupt received; cancelling after the current chunk");
                    cancel.cancel();
                }
                Err(error) => tracing::warn!(%error, "failed to install Ctrl+C handler"),
            },
            _ = cancel.cancelled() => {}
        }
    })
}
