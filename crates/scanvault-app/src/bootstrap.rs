//! Boot sequence: settings, logging, collaborators, one archive run.

use std::future::Future;
use std::io;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Span, info, info_span, warn};
use uuid::Uuid;

use scanvault_config::{ArchiverConfig, build_config};
use scanvault_core::{
    ArchivePipeline, ArchiveTask, BackoffPolicy, Coordinator, ReportSource, RunSummary,
    ScanListing, WorkEnumerator,
};
use scanvault_qualys::QualysClient;
use scanvault_storage::{Destination, open_store};
use scanvault_telemetry::{LogFormat, LoggingConfig, build_sha, init_logging};

use crate::cli::Cli;
use crate::error::{AppError, AppResult};

/// Exit status used when a second interrupt cuts the run short.
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Entry point for the `scanvault` binary.
///
/// Parses the command line, installs logging, arms Ctrl-C cancellation and runs
/// one archive pass. A second Ctrl-C exits immediately.
///
/// # Errors
///
/// Returns an error if configuration is invalid, a collaborator cannot be built,
/// or the run aborts.
pub async fn run_app() -> AppResult<RunSummary> {
    let cli = Cli::parse();
    let logging = LoggingConfig {
        level: cli.log_level(),
        format: cli.log_format.unwrap_or_else(LogFormat::infer),
        ..LoggingConfig::default()
    };
    init_logging(&logging).map_err(|err| AppError::telemetry("telemetry.init", err))?;

    let cancel = CancellationToken::new();
    spawn_interrupt_watch(cancel.clone());
    run_archive(&cli, cancel).await
}

/// Run one archive pass with settings taken from `cli`.
///
/// `cancel` stops dispatch of further scans; scans already in flight settle.
///
/// # Errors
///
/// Configuration errors are reported before any network call. Listing failures
/// and worker panics abort the run; per-scan failures are part of the summary.
pub async fn run_archive(cli: &Cli, cancel: CancellationToken) -> AppResult<RunSummary> {
    let config = build_config(cli.raw_settings()).map_err(AppError::config)?;
    let destination = Destination::parse(&config.destination).map_err(AppError::destination)?;
    let date = cli.date.unwrap_or_else(default_run_date);

    let span = run_span(Uuid::new_v4());
    async move {
        info!(
            %date,
            base_url = %config.base_url,
            scan_type = %config.scan_type,
            destination = %destination,
            pool_size = config.pool_size,
            "archive run starting"
        );
        let pipeline = build_pipeline(&config, &destination, cancel).await?;
        pipeline.run(date).await.map_err(AppError::run)
    }
    .instrument(span)
    .await
}

async fn build_pipeline(
    config: &ArchiverConfig,
    destination: &Destination,
    cancel: CancellationToken,
) -> AppResult<ArchivePipeline> {
    let client = Arc::new(QualysClient::from_config(config).map_err(AppError::client)?);
    let store = open_store(destination, config.request_timeout)
        .await
        .map_err(|err| AppError::storage("storage.open", err))?;

    let task = ArchiveTask::new(
        Arc::clone(&client) as Arc<dyn ReportSource>,
        store,
        BackoffPolicy::from(&config.retry),
    )
    .with_key_prefix(config.key_prefix.as_deref());
    let coordinator = Coordinator::new(task, config.pool_size).with_cancellation(cancel);
    let enumerator = WorkEnumerator::new(client as Arc<dyn ScanListing>, config.limit_results);
    Ok(ArchivePipeline::new(enumerator, coordinator))
}

fn run_span(run_id: Uuid) -> Span {
    info_span!("scanvault", %run_id, build_sha = build_sha())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InterruptOutcome {
    /// A second interrupt arrived while in-flight scans were settling.
    Forced,
    /// The signal listener stopped delivering interrupts.
    Closed,
}

/// First interrupt cancels `cancel`; a second one asks for an immediate exit.
async fn watch_interrupts<F, Fut>(
    mut next_interrupt: F,
    cancel: CancellationToken,
) -> InterruptOutcome
where
    F: FnMut() -> Fut,
    Fut: Future<Output = io::Result<()>>,
{
    if next_interrupt().await.is_err() {
        return InterruptOutcome::Closed;
    }
    warn!("interrupt received; finishing in-flight scans, interrupt again to exit now");
    cancel.cancel();

    if next_interrupt().await.is_err() {
        return InterruptOutcome::Closed;
    }
    warn!("second interrupt received; exiting without waiting for in-flight scans");
    InterruptOutcome::Forced
}

fn spawn_interrupt_watch(cancel: CancellationToken) {
    tokio::spawn(async move {
        if watch_interrupts(tokio::signal::ctrl_c, cancel).await == InterruptOutcome::Forced {
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
    });
}

/// Today's date in local time, the default run date.
#[must_use]
pub fn default_run_date() -> NaiveDate {
    Local::now().date_naive()
}
