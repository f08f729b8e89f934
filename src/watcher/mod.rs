//! Watcher layer for detecting network changes.
//!
//! This module provides types and functions for:
//! - The platform-neutral façade ([`Watcher`])
//! - The caller notification contract ([`ChangeHandler`], [`EventSink`])
//! - Native backends behind one trait ([`EventSource`], [`platform`])
//! - Error handling ([`WatchError`], [`StartupError`], [`BackendFailure`])
//! - Async consumption ([`ChangeStream`])

mod config;
mod error;
mod handler;
mod lifecycle;
pub mod platform;
mod source;
mod stream;

#[cfg(any(target_os = "linux", test))]
pub mod netlink;
#[cfg(any(target_os = "linux", test))]
mod pump;

#[cfg(test)]
mod test_fixtures;

pub use config::{
    DEFAULT_BUFFER_SIZE, DEFAULT_RECEIVE_RETRY_LIMIT, DEFAULT_THREAD_NAME, MIN_BUFFER_SIZE,
    WatcherConfig,
};
pub use error::{BackendFailure, StartupError, WatchError};
pub use handler::{ChangeHandler, EventSink};
pub use lifecycle::Watcher;
pub use source::EventSource;
pub use stream::ChangeStream;
