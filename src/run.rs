//! Application execution logic.
//!
//! This module contains the main async loop that starts the watcher,
//! logs every network change and stops on shutdown.

use std::future::Future;

use thiserror::Error;
use tokio::signal;
use tokio_stream::{Stream, StreamExt};

use netchange::config::ValidatedConfig;
use netchange::{BackendFailure, WatchError, Watcher};

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

/// Error type for runtime execution failures.
#[derive(Debug, Error)]
pub enum RunError {
    /// The watcher could not be started.
    #[error("Failed to start watcher: {0}")]
    Start(#[source] WatchError),

    /// The backend failed after starting.
    #[error("Watcher backend failed: {0}")]
    Backend(#[source] BackendFailure),

    /// Unexpected stream termination.
    #[error("Change stream terminated unexpectedly")]
    StreamTerminated,
}

/// Executes the main application loop.
///
/// This function:
/// 1. Starts the platform watcher as an async stream
/// 2. Logs every change until Ctrl+C (or SIGTERM), or until `max_events`
/// 3. Stops the watcher, releasing the native subscription
///
/// # Errors
///
/// Returns an error if:
/// - The native subscription cannot be created
/// - The backend reports a fatal failure
/// - The change stream terminates unexpectedly
///
/// # Coverage Note
///
/// This function is excluded from coverage because it requires:
/// - Platform-specific network APIs
/// - Real async runtime with signal handling
#[cfg(not(tarpaulin_include))]
pub async fn execute(config: ValidatedConfig) -> Result<(), RunError> {
    let mut watcher = Watcher::new(config.watcher);
    let stream = watcher.start_stream().map_err(RunError::Start)?;

    tracing::info!("Watching for network changes (Ctrl+C to stop)");
    let result = run_loop(stream, shutdown_signal(), config.max_events).await;

    watcher.stop();

    let count = result?;
    tracing::info!("Observed {count} network change(s)");
    Ok(())
}

/// Consumes the change stream until shutdown, the event limit, or a failure.
///
/// Returns the number of changes observed.
async fn run_loop<St, Sd>(
    mut stream: St,
    shutdown: Sd,
    max_events: Option<u64>,
) -> Result<u64, RunError>
where
    St: Stream<Item = Result<(), BackendFailure>> + Unpin,
    Sd: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut count: u64 = 0;

    loop {
        tokio::select! {
            biased;

            () = &mut shutdown => {
                tracing::info!("Shutdown signal received");
                return Ok(count);
            }

            item = stream.next() => match item {
                Some(Ok(())) => {
                    count += 1;
                    tracing::info!(count, "Network change detected");

                    if max_events.is_some_and(|max| count >= max) {
                        tracing::info!("Reached event limit of {count}");
                        return Ok(count);
                    }
                }
                Some(Err(failure)) => return Err(RunError::Backend(failure)),
                None => return Err(RunError::StreamTerminated),
            }
        }
    }
}

/// Resolves on Ctrl+C, or SIGTERM on Unix.
///
/// Excluded from coverage - requires OS signals.
#[cfg(not(tarpaulin_include))]
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal as unix_signal};

        match unix_signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    () = ctrl_c() => {}
                    _ = terminate.recv() => {}
                }
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {e}");
                ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    ctrl_c().await;
}

/// Resolves on Ctrl+C; never resolves if the handler cannot be installed.
#[cfg(not(tarpaulin_include))]
async fn ctrl_c() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {e}");
        std::future::pending::<()>().await;
    }
}
