//! The platform-neutral watcher façade.

use std::fmt;

use super::platform::PlatformSource;
use super::stream::ChangeStream;
use super::{ChangeHandler, EventSink, EventSource, WatchError, WatcherConfig};

/// Network change watcher.
///
/// Owns at most one native subscription at a time and forwards every change
/// it reports to the handler passed to [`start`](Watcher::start), in the
/// order the OS produced them. Nothing is queued, filtered or coalesced.
///
/// # Type Parameters
///
/// * `S` - The [`EventSource`] backend (defaults to [`PlatformSource`])
///
/// # Synchronization
///
/// `start` and `stop` take `&mut self`; share a watcher across threads
/// behind a lock if needed.
///
/// # Example
///
/// ```no_run
/// use netchange::{Watcher, WatcherConfig};
///
/// # fn example() -> Result<(), netchange::WatchError> {
/// let mut watcher = Watcher::new(WatcherConfig::default());
/// watcher.start(|| println!("network changed"))?;
///
/// // ... later
/// watcher.stop();
/// # Ok(())
/// # }
/// ```
pub struct Watcher<S: EventSource = PlatformSource> {
    source: S,
    subscription: Option<S::Subscription>,
}

impl Watcher<PlatformSource> {
    /// Creates a watcher backed by the native source of this platform.
    #[must_use]
    pub fn new(config: WatcherConfig) -> Self {
        Self::with_source(PlatformSource::new(config))
    }
}

impl Default for Watcher<PlatformSource> {
    fn default() -> Self {
        Self::new(WatcherConfig::default())
    }
}

impl<S: EventSource> Watcher<S> {
    /// Creates a watcher backed by a custom source.
    #[must_use]
    pub const fn with_source(source: S) -> Self {
        Self {
            source,
            subscription: None,
        }
    }

    /// Starts watching and delivers every change to `handler`.
    ///
    /// Returns once the background context is running.
    ///
    /// # Errors
    ///
    /// - [`WatchError::AlreadyStarted`] if a subscription is active; the
    ///   active subscription is left untouched
    /// - [`WatchError::BackendUnavailable`] on platforms without a backend
    /// - [`WatchError::Startup`] if the native subscription cannot be created
    pub fn start<H: ChangeHandler>(&mut self, handler: H) -> Result<(), WatchError> {
        if self.subscription.is_some() {
            return Err(WatchError::AlreadyStarted);
        }

        let subscription = self.source.subscribe(EventSink::new(handler))?;
        self.subscription = Some(subscription);
        tracing::info!("Network change watcher started");
        Ok(())
    }

    /// Starts watching and returns the changes as an async stream.
    ///
    /// # Errors
    ///
    /// Same as [`start`](Watcher::start).
    pub fn start_stream(&mut self) -> Result<ChangeStream, WatchError> {
        let (handler, stream) = ChangeStream::channel();
        self.start(handler)?;
        Ok(stream)
    }

    /// Releases the native subscription and its background thread.
    ///
    /// Does nothing if not started. A notification already in flight may
    /// still reach the handler shortly after this returns.
    pub fn stop(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            drop(subscription);
            tracing::info!("Network change watcher stopped");
        }
    }

    /// Returns true while a subscription is held.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.subscription.is_some()
    }
}

impl<S: EventSource> Drop for Watcher<S> {
    fn drop(&mut self) {
        self.stop();
    }
}

impl<S: EventSource + fmt::Debug> fmt::Debug for Watcher<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Watcher")
            .field("source", &self.source)
            .field("running", &self.is_running())
            .finish()
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
