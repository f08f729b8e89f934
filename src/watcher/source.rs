//! Event source trait for platform notification backends.
//!
//! This module provides the [`EventSource`] trait that abstracts the native
//! mechanisms reporting interface and address changes.

use super::{EventSink, WatchError};

/// Trait for platform-specific network change notification backends.
///
/// Implementations own exactly one native subscription per successful
/// [`subscribe`](EventSource::subscribe) call and deliver every qualifying
/// native event to the sink as one change, in native order.
///
/// # Subscription Lifetime
///
/// The returned subscription is the only handle on the native resource.
/// Dropping it releases the resource (closes the socket or unregisters the
/// callback) and releases the background thread.
///
/// # Errors
///
/// Native setup failures must be reported from `subscribe` itself; a
/// backend never reports success for a subscription that is not live.
/// Failures after a successful subscribe go through
/// [`EventSink::fail`] exactly once.
pub trait EventSource {
    /// RAII handle on the live native subscription.
    type Subscription: Send;

    /// Creates the native subscription and starts delivering into `sink`.
    ///
    /// Returns once the background context is running.
    ///
    /// # Errors
    ///
    /// See trait-level documentation.
    fn subscribe(&self, sink: EventSink) -> Result<Self::Subscription, WatchError>;
}
