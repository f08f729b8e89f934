//! Default values for configuration options.
//!
//! Centralized constants to avoid magic numbers scattered across the codebase.

use crate::watcher;

/// Default receive buffer size in bytes.
pub const BUFFER_SIZE: usize = watcher::DEFAULT_BUFFER_SIZE;

/// Smallest accepted receive buffer size in bytes.
pub const MIN_BUFFER_SIZE: usize = watcher::MIN_BUFFER_SIZE;

/// Largest accepted receive buffer size in bytes (1 MiB).
pub const MAX_BUFFER_SIZE: usize = 1024 * 1024;

/// Default number of consecutive receive errors tolerated.
pub const RECEIVE_RETRY_LIMIT: u32 = watcher::DEFAULT_RECEIVE_RETRY_LIMIT;
