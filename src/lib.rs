//! netchange: Network Change Watcher
//!
//! A library for detecting when network interfaces or IP addresses change
//! and notifying the owning process once per change, without polling.

pub mod config;
pub mod watcher;

pub use watcher::{
    BackendFailure, ChangeHandler, ChangeStream, EventSink, EventSource, StartupError, WatchError,
    Watcher, WatcherConfig,
};
