//! Tuning parameters for a [`Watcher`](super::Watcher).

/// Default receive buffer size for one netlink datagram (8 KiB).
pub const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Smallest usable receive buffer: one netlink message header.
pub const MIN_BUFFER_SIZE: usize = 16;

/// Default number of consecutive non-transient receive errors tolerated.
pub const DEFAULT_RECEIVE_RETRY_LIMIT: u32 = 3;

/// Default name of the background thread.
pub const DEFAULT_THREAD_NAME: &str = "netchange-watcher";

/// Backend configuration shared by all platforms.
///
/// Fields that have no meaning on a platform are ignored there:
/// the Windows backend always watches every address family and never
/// reads from a buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatcherConfig {
    buffer_size: usize,
    receive_retry_limit: u32,
    ipv6: bool,
    thread_name: String,
}

impl WatcherConfig {
    /// Sets the receive buffer size, raised to [`MIN_BUFFER_SIZE`] if smaller.
    #[must_use]
    pub fn with_buffer_size(mut self, bytes: usize) -> Self {
        self.buffer_size = bytes.max(MIN_BUFFER_SIZE);
        self
    }

    /// Sets how many consecutive hard receive errors are retried before
    /// the backend gives up.
    #[must_use]
    pub const fn with_receive_retry_limit(mut self, limit: u32) -> Self {
        self.receive_retry_limit = limit;
        self
    }

    /// Also subscribes to IPv6 address notifications (Linux).
    #[must_use]
    pub const fn with_ipv6(mut self, enabled: bool) -> Self {
        self.ipv6 = enabled;
        self
    }

    /// Names the background thread.
    #[must_use]
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// Returns the receive buffer size in bytes.
    #[must_use]
    pub const fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Returns the consecutive receive error budget.
    #[must_use]
    pub const fn receive_retry_limit(&self) -> u32 {
        self.receive_retry_limit
    }

    /// Returns whether IPv6 address notifications are requested.
    #[must_use]
    pub const fn ipv6(&self) -> bool {
        self.ipv6
    }

    /// Returns the background thread name.
    #[must_use]
    pub fn thread_name(&self) -> &str {
        &self.thread_name
    }
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            receive_retry_limit: DEFAULT_RECEIVE_RETRY_LIMIT,
            ipv6: false,
            thread_name: DEFAULT_THREAD_NAME.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_constants() {
        let config = WatcherConfig::default();

        assert_eq!(config.buffer_size(), 8192);
        assert_eq!(config.receive_retry_limit(), 3);
        assert!(!config.ipv6());
        assert_eq!(config.thread_name(), "netchange-watcher");
    }

    #[test]
    fn buffer_size_is_clamped_to_header_length() {
        let config = WatcherConfig::default().with_buffer_size(3);
        assert_eq!(config.buffer_size(), MIN_BUFFER_SIZE);
    }

    #[test]
    fn builders_set_fields() {
        let config = WatcherConfig::default()
            .with_buffer_size(4096)
            .with_receive_retry_limit(0)
            .with_ipv6(true)
            .with_thread_name("probe");

        assert_eq!(config.buffer_size(), 4096);
        assert_eq!(config.receive_retry_limit(), 0);
        assert!(config.ipv6());
        assert_eq!(config.thread_name(), "probe");
    }
}
