mod args;
mod prompt;

use anyhow::Result;
use clap::Parser;
use std::future::Future;
use thiserror::Error;
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use forced_stereo_core::{
    load_config, validate_config, ConfigError, MkvToolnixToolkit, Pipeline, PipelineEvent,
    PipelineFailure,
};

use args::Args;
use prompt::StdinPrompt;

/// Buffer size for the pipeline event channel
const EVENT_BUFFER_SIZE: usize = 64;

/// Exit status for errors the operator can fix by changing the invocation.
const EXIT_USAGE: i32 = 2;

/// Exit status after a shutdown signal (128 + SIGINT).
const EXIT_INTERRUPTED: i32 = 130;

/// The run was abandoned on a shutdown signal.
#[derive(Debug, Error)]
#[error("interrupted by shutdown signal")]
struct Interrupted;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Logs go to stderr; stdout carries the prompt and the summary.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(args).await {
        error!("Fatal error: {}", e);
        std::process::exit(exit_code(&e));
    }
}

async fn run(args: Args) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    args.apply(&mut config);
    validate_config(&config)?;

    debug!(?config, "Configuration loaded");

    let toolkit = MkvToolnixToolkit::new(config.tools.clone());
    let pipeline = Pipeline::new(toolkit, config.run.clone());

    let (tx, rx) = mpsc::channel(EVENT_BUFFER_SIZE);
    let logger = tokio::spawn(log_events(rx));

    let outcome = until_shutdown(
        pipeline.run(&args.input, &StdinPrompt, Some(tx)),
        shutdown_signal(),
    )
    .await;
    if let Err(e) = logger.await {
        warn!(error = %e, "Event logger task failed");
    }
    let report = outcome??;

    info!(
        selection = %report.selection,
        duration_ms = report.duration().num_milliseconds(),
        "Done"
    );

    println!("{}", report.output.display());
    println!("Verify with: mkvinfo {}", report.output.display());
    Ok(())
}

/// Drives `task` unless `shutdown` completes first, in which case `task` is
/// dropped before returning. Dropping the run removes its workspace and kills
/// any tool still running.
async fn until_shutdown<F, S>(task: F, shutdown: S) -> Result<F::Output, Interrupted>
where
    F: Future,
    S: Future<Output = ()>,
{
    tokio::select! {
        output = task => Ok(output),
        _ = shutdown => {
            warn!("Shutdown signal received, abandoning run");
            Err(Interrupted)
        }
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    if let Err(e) = wait_for_signal().await {
        warn!(error = %e, "Failed to install signal handlers");
        std::future::pending::<()>().await;
    }
}

#[cfg(unix)]
async fn wait_for_signal() -> std::io::Result<()> {
    let mut terminate = signal::unix::signal(signal::unix::SignalKind::terminate())?;
    tokio::select! {
        result = signal::ctrl_c() => result,
        _ = terminate.recv() => Ok(()),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> std::io::Result<()> {
    signal::ctrl_c().await
}

async fn log_events(mut rx: mpsc::Receiver<PipelineEvent>) {
    while let Some(event) = rx.recv().await {
        match event {
            PipelineEvent::StateChanged { from, to } => {
                debug!(from = from.as_str(), to = to.as_str(), "State changed");
            }
            PipelineEvent::TransformProgress(snapshot) => {
                info!(
                    completed = snapshot.completed,
                    total = snapshot.total,
                    eta_secs = snapshot.eta.map(|d| d.as_secs()),
                    "Transform progress: {:.0}%",
                    snapshot.percent()
                );
            }
            PipelineEvent::Finished { state, .. } => {
                debug!(state = state.as_str(), "Run finished");
            }
        }
    }
}

fn exit_code(err: &anyhow::Error) -> i32 {
    if err.is::<Interrupted>() {
        return EXIT_INTERRUPTED;
    }
    if let Some(failure) = err.downcast_ref::<PipelineFailure>() {
        if failure.error.is_input_error() {
            return EXIT_USAGE;
        }
    }
    if let Some(ConfigError::ValidationError(_)) = err.downcast_ref::<ConfigError>() {
        return EXIT_USAGE;
    }
    1
}
