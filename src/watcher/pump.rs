//! Receive loop of the routing-socket backend.
//!
//! The loop is written against [`DatagramSource`] so the framing, retry and
//! shutdown rules run the same way over a live netlink socket and over a
//! scripted source in tests.

use std::io;
use std::sync::Arc;

use super::netlink::{self, Messages};
use super::{BackendFailure, EventSink, WatcherConfig};

/// `ENOBUFS`: the kernel dropped notifications because the socket receive
/// queue overflowed.
#[cfg(target_os = "linux")]
const ENOBUFS: i32 = libc::ENOBUFS;

/// Linux value, for exercising the loop in tests on other platforms.
#[cfg(not(target_os = "linux"))]
const ENOBUFS: i32 = 105;

/// Result of waiting for the next datagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// A datagram of this many bytes was written into the buffer.
    Datagram(usize),
    /// Shutdown was requested.
    Shutdown,
}

/// Blocking source of raw netlink datagrams.
pub trait DatagramSource {
    /// Blocks until a datagram arrives or shutdown is requested.
    ///
    /// # Errors
    ///
    /// Returns the OS error of the failed wait or receive call.
    fn next_datagram(&mut self, buf: &mut [u8]) -> io::Result<Readiness>;
}

/// How the receive loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpExit {
    /// Shutdown was requested.
    Shutdown,
    /// A fatal failure was reported to the sink.
    Failed,
}

/// Receive loop settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PumpConfig {
    /// Size of the receive buffer
    pub buffer_size: usize,
    /// Consecutive hard errors tolerated before giving up
    pub retry_limit: u32,
}

impl From<&WatcherConfig> for PumpConfig {
    fn from(config: &WatcherConfig) -> Self {
        Self {
            buffer_size: config.buffer_size(),
            retry_limit: config.receive_retry_limit(),
        }
    }
}

/// Runs the receive loop until shutdown or a fatal failure.
///
/// Every well-formed change message raises one event on `sink`.
/// Interrupted, would-block and overrun errors are retried without limit;
/// any other error is retried `retry_limit` times in a row, after which the
/// failure is reported once and the loop exits.
pub fn run<D: DatagramSource>(source: &mut D, sink: &EventSink, config: PumpConfig) -> PumpExit {
    let mut buf = vec![0u8; config.buffer_size];
    let mut consecutive_errors: u32 = 0;

    loop {
        match source.next_datagram(&mut buf) {
            Ok(Readiness::Shutdown) => {
                tracing::debug!("Receive loop shutting down");
                return PumpExit::Shutdown;
            }
            Ok(Readiness::Datagram(0)) => {
                sink.fail(&BackendFailure::ChannelClosed);
                return PumpExit::Failed;
            }
            Ok(Readiness::Datagram(len)) => {
                consecutive_errors = 0;
                dispatch(&buf[..len.min(buf.len())], sink);
            }
            Err(error) if is_transient(&error) => {
                if error.raw_os_error() == Some(ENOBUFS) {
                    tracing::warn!("Netlink receive queue overflowed; notifications were lost");
                }
            }
            Err(error) => {
                consecutive_errors += 1;
                if consecutive_errors > config.retry_limit {
                    tracing::error!(
                        attempts = consecutive_errors,
                        "Netlink receive failed permanently: {error}"
                    );
                    sink.fail(&BackendFailure::Receive {
                        attempts: consecutive_errors,
                        source: Arc::new(error),
                    });
                    return PumpExit::Failed;
                }
                tracing::warn!(
                    attempt = consecutive_errors,
                    "Netlink receive failed, retrying: {error}"
                );
            }
        }
    }
}

/// Raises one change per qualifying message of a datagram.
///
/// Returns the number of changes raised.
pub fn dispatch(datagram: &[u8], sink: &EventSink) -> usize {
    let mut messages = Messages::new(datagram);
    let mut raised = 0;

    for header in messages.by_ref() {
        if netlink::is_change(header.kind) {
            tracing::debug!(kind = header.kind, "Netlink change notification");
            sink.change();
            raised += 1;
        }
    }

    if messages.trailing() > 0 {
        tracing::debug!(
            bytes = messages.trailing(),
            "Dropped malformed netlink fragment"
        );
    }

    raised
}

fn is_transient(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock
    ) || error.raw_os_error() == Some(ENOBUFS)
}

#[cfg(test)]
#[path = "pump_tests.rs"]
mod tests;
