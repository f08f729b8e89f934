//! Platform-specific network change sources.
//!
//! This module provides conditional compilation for the native
//! implementations of the [`EventSource`](super::EventSource) trait.
//!
//! # Platform Support
//!
//! - **Linux**: `NETLINK_ROUTE` socket subscribed to link and address groups.
//! - **Windows**: `NotifyIpInterfaceChange` via the `windows` crate.
//! - **Other**: [`UnsupportedSource`], which fails with `BackendUnavailable`.

#[cfg(target_os = "linux")]
mod linux;

#[cfg(windows)]
mod windows;

mod unsupported;

#[cfg(target_os = "linux")]
pub use linux::{NetlinkSource, NetlinkSubscription};

#[cfg(windows)]
pub use windows::{WindowsSource, WindowsSubscription};

pub use unsupported::UnsupportedSource;

// Re-export the native source as PlatformSource for convenience
#[cfg(target_os = "linux")]
pub use linux::NetlinkSource as PlatformSource;

#[cfg(windows)]
pub use windows::WindowsSource as PlatformSource;

#[cfg(not(any(target_os = "linux", windows)))]
pub use unsupported::UnsupportedSource as PlatformSource;
