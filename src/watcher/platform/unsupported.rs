//! Fallback source for platforms without a native backend.

use std::convert::Infallible;

use crate::watcher::{EventSink, EventSource, WatchError, WatcherConfig};

/// [`EventSource`] that always fails with [`WatchError::BackendUnavailable`].
///
/// Makes no native calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedSource {
    platform: &'static str,
}

impl UnsupportedSource {
    /// Creates a source for the current platform. The configuration is unused.
    #[must_use]
    pub fn new(_config: WatcherConfig) -> Self {
        Self::for_platform(std::env::consts::OS)
    }

    /// Creates a source reporting `platform` as unsupported.
    #[must_use]
    pub const fn for_platform(platform: &'static str) -> Self {
        Self { platform }
    }
}

impl EventSource for UnsupportedSource {
    type Subscription = Infallible;

    fn subscribe(&self, _sink: EventSink) -> Result<Self::Subscription, WatchError> {
        Err(WatchError::BackendUnavailable {
            platform: self.platform,
        })
    }
}
