//! Caller-side notification contract and the sink backends deliver into.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::BackendFailure;

/// Logic supplied by the owner of a [`Watcher`](super::Watcher).
///
/// `on_change` is invoked once per qualifying native notification, from the
/// watcher's background thread. It carries no payload: callers re-inspect
/// whatever state they care about.
///
/// Any `Fn() + Send + Sync + 'static` closure is a handler that logs
/// failures through `tracing`.
///
/// # Example
///
/// ```no_run
/// use netchange::{Watcher, WatcherConfig};
///
/// # fn example() -> Result<(), netchange::WatchError> {
/// let mut watcher = Watcher::new(WatcherConfig::default());
/// watcher.start(|| println!("network changed"))?;
/// // ...
/// watcher.stop();
/// # Ok(())
/// # }
/// ```
pub trait ChangeHandler: Send + Sync + 'static {
    /// Called once for every detected network change.
    fn on_change(&self);

    /// Called at most once when the backend stops because of a fatal error.
    ///
    /// No `on_change` calls follow a failure on the same subscription.
    fn on_failure(&self, failure: &BackendFailure) {
        tracing::error!("Network change watcher failed: {failure}");
    }
}

impl<F> ChangeHandler for F
where
    F: Fn() + Send + Sync + 'static,
{
    fn on_change(&self) {
        self();
    }
}

/// Delivery endpoint handed to an [`EventSource`](super::EventSource).
///
/// Cheap to clone; every clone forwards to the same handler. The failure
/// notification is latched so it reaches the handler at most once.
#[derive(Clone)]
pub struct EventSink {
    inner: Arc<SinkInner>,
}

struct SinkInner {
    handler: Box<dyn ChangeHandler>,
    failed: AtomicBool,
}

impl EventSink {
    /// Wraps a handler.
    #[must_use]
    pub fn new<H: ChangeHandler>(handler: H) -> Self {
        Self {
            inner: Arc::new(SinkInner {
                handler: Box::new(handler),
                failed: AtomicBool::new(false),
            }),
        }
    }

    /// Forwards one change event to the handler.
    pub fn change(&self) {
        if self.has_failed() {
            return;
        }
        self.inner.handler.on_change();
    }

    /// Reports a fatal backend failure. Only the first call reaches the handler.
    pub fn fail(&self, failure: &BackendFailure) {
        if self.inner.failed.swap(true, Ordering::AcqRel) {
            tracing::debug!("Suppressing repeated backend failure: {failure}");
            return;
        }
        self.inner.handler.on_failure(failure);
    }

    /// Returns true once a failure has been reported.
    #[must_use]
    pub fn has_failed(&self) -> bool {
        self.inner.failed.load(Ordering::Acquire)
    }
}

impl fmt::Debug for EventSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSink")
            .field("failed", &self.has_failed())
            .finish_non_exhaustive()
    }
}
