//! Error types for the watcher layer.

use std::io;
use std::sync::Arc;

use thiserror::Error;

/// Error type for native subscription setup.
///
/// Every native call made while starting a backend is checked, and a
/// failure is reported through one of these variants before `start()`
/// returns.
#[derive(Debug, Error)]
pub enum StartupError {
    /// Creating the netlink routing socket failed.
    #[error("Failed to create netlink socket: {0}")]
    Socket(#[source] io::Error),

    /// Binding the netlink socket to its multicast groups failed.
    #[error("Failed to bind netlink socket to groups {groups:#x}: {source}")]
    Bind {
        /// Multicast group mask requested in the bind
        groups: u32,
        /// Underlying OS error
        #[source]
        source: io::Error,
    },

    /// Creating the shutdown wake channel failed.
    #[error("Failed to create wake channel: {0}")]
    WakeChannel(#[source] io::Error),

    /// Spawning the background thread failed.
    #[error("Failed to spawn watcher thread: {0}")]
    ThreadSpawn(#[source] io::Error),

    /// `NotifyIpInterfaceChange` returned a non-success code.
    #[error("NotifyIpInterfaceChange failed with code {code}")]
    Registration {
        /// Native Win32 error code
        code: u32,
    },
}

/// Error type for [`Watcher`](super::Watcher) lifecycle operations.
#[derive(Debug, Error)]
pub enum WatchError {
    /// The current platform has no native backend.
    #[error("No network change backend is available on '{platform}'")]
    BackendUnavailable {
        /// Name of the platform (as in `std::env::consts::OS`)
        platform: &'static str,
    },

    /// `start()` was called while a subscription is already active.
    #[error("Watcher is already started")]
    AlreadyStarted,

    /// The native subscription could not be created.
    #[error("Failed to start network change subscription: {0}")]
    Startup(#[from] StartupError),
}

/// Fatal runtime failure reported once after a successful start.
///
/// Delivered through [`ChangeHandler::on_failure`](super::ChangeHandler::on_failure),
/// never mixed with change notifications.
#[derive(Debug, Clone, Error)]
pub enum BackendFailure {
    /// The native receive call kept failing.
    #[error("Receive failed after {attempts} consecutive attempt(s): {source}")]
    Receive {
        /// Number of consecutive failed receive calls
        attempts: u32,
        /// Last OS error observed
        #[source]
        source: Arc<io::Error>,
    },

    /// The native notification channel closed without a shutdown request.
    #[error("Notification channel closed unexpectedly")]
    ChannelClosed,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    mod startup_error {
        use super::*;

        #[test]
        fn bind_displays_group_mask() {
            let error = StartupError::Bind {
                groups: 0x11,
                source: io::Error::from(io::ErrorKind::PermissionDenied),
            };

            assert!(error.to_string().contains("0x11"));
        }

        #[test]
        fn registration_displays_native_code() {
            let error = StartupError::Registration { code: 87 };
            assert_eq!(
                error.to_string(),
                "NotifyIpInterfaceChange failed with code 87"
            );
        }

        #[test]
        fn socket_preserves_source() {
            let error = StartupError::Socket(io::Error::other("no netlink"));
            let source = error.source();

            assert!(source.is_some());
            assert!(source.unwrap().to_string().contains("no netlink"));
        }
    }

    mod watch_error {
        use super::*;

        #[test]
        fn already_started_displays_message() {
            assert_eq!(
                WatchError::AlreadyStarted.to_string(),
                "Watcher is already started"
            );
        }

        #[test]
        fn backend_unavailable_names_platform() {
            let error = WatchError::BackendUnavailable { platform: "haiku" };
            assert!(error.to_string().contains("haiku"));
        }

        #[test]
        fn from_startup_error_conversion() {
            let error: WatchError = StartupError::Registration { code: 5 }.into();

            assert!(matches!(
                error,
                WatchError::Startup(StartupError::Registration { code: 5 })
            ));
            assert!(error.source().is_some());
        }
    }

    mod backend_failure {
        use super::*;

        #[test]
        fn receive_displays_attempts_and_source() {
            let failure = BackendFailure::Receive {
                attempts: 4,
                source: Arc::new(io::Error::other("socket gone")),
            };

            let message = failure.to_string();
            assert!(message.contains('4'));
            assert!(message.contains("socket gone"));
        }

        #[test]
        fn clone_shares_source() {
            let failure = BackendFailure::Receive {
                attempts: 1,
                source: Arc::new(io::Error::other("boom")),
            };
            let cloned = failure.clone();

            assert_eq!(failure.to_string(), cloned.to_string());
        }

        #[test]
        fn channel_closed_displays_message() {
            assert_eq!(
                BackendFailure::ChannelClosed.to_string(),
                "Notification channel closed unexpectedly"
            );
        }
    }
}
