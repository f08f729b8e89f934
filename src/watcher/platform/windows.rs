//! Windows network change source using `NotifyIpInterfaceChange`.

use std::sync::mpsc;
use std::thread::{self, JoinHandle};

use windows::Win32::Foundation::{HANDLE, NO_ERROR};
use windows::Win32::NetworkManagement::IpHelper::{
    CancelMibChangeNotify2, MIB_IPINTERFACE_ROW, MIB_NOTIFICATION_TYPE, NotifyIpInterfaceChange,
};
use windows::Win32::Networking::WinSock::AF_UNSPEC;

use crate::watcher::{EventSink, EventSource, StartupError, WatchError, WatcherConfig};

/// [`EventSource`] backed by the IP Helper interface change notification.
///
/// The registration covers every address family and does not fire an
/// initial notification. Windows invokes the callback on its own thread
/// pool; each invocation is forwarded over a channel to a dedicated
/// dispatcher thread, which raises one change per invocation in arrival
/// order. The dispatcher blocks on that channel between notifications and
/// exits on the shutdown message sent when the subscription is dropped.
///
/// # Example
///
/// ```no_run
/// use netchange::watcher::platform::WindowsSource;
/// use netchange::{EventSink, EventSource, WatcherConfig};
///
/// # fn example() -> Result<(), netchange::WatchError> {
/// let source = WindowsSource::new(WatcherConfig::default());
/// let subscription = source.subscribe(EventSink::new(|| println!("interface changed")))?;
/// // ...
/// drop(subscription); // unregisters the notification
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct WindowsSource {
    config: WatcherConfig,
}

impl WindowsSource {
    /// Creates a source with the given configuration.
    #[must_use]
    pub const fn new(config: WatcherConfig) -> Self {
        Self { config }
    }
}

impl EventSource for WindowsSource {
    type Subscription = WindowsSubscription;

    fn subscribe(&self, sink: EventSink) -> Result<Self::Subscription, WatchError> {
        // Channel from the Windows thread pool to the dispatcher
        let (sender, receiver) = mpsc::channel::<Dispatch>();
        let shutdown = sender.clone();

        let dispatcher = thread::Builder::new()
            .name(self.config.thread_name().to_string())
            .spawn(move || dispatch(&receiver, &sink))
            .map_err(StartupError::ThreadSpawn)?;

        match register_notification(sender) {
            Ok(handle) => Ok(WindowsSubscription {
                handle: Some(handle),
                shutdown,
                dispatcher: Some(dispatcher),
            }),
            Err(e) => {
                let _ = shutdown.send(Dispatch::Shutdown);
                if dispatcher.join().is_err() {
                    tracing::error!("Interface change dispatcher panicked");
                }
                Err(e.into())
            }
        }
    }
}

/// Message from the callback, or from the subscription, to the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dispatch {
    /// One interface change callback fired.
    Change,
    /// The subscription is being dropped.
    Shutdown,
}

/// Raises one change per forwarded callback until shutdown or the channel
/// closes.
fn dispatch(receiver: &mpsc::Receiver<Dispatch>, sink: &EventSink) {
    while let Ok(Dispatch::Change) = receiver.recv() {
        sink.change();
    }
    tracing::debug!("Interface change dispatcher exited");
}

/// Live interface change registration.
///
/// Dropping it unregisters the notification, sends the dispatcher its
/// shutdown message and joins that thread unless the drop happens on the
/// dispatcher itself. The shutdown message is sent even when unregistering
/// fails and the callback context stays leaked.
pub struct WindowsSubscription {
    handle: Option<NotificationHandle>,
    shutdown: mpsc::Sender<Dispatch>,
    dispatcher: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for WindowsSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowsSubscription")
            .field("has_handle", &self.handle.is_some())
            .field("has_dispatcher", &self.dispatcher.is_some())
            .finish()
    }
}

impl Drop for WindowsSubscription {
    fn drop(&mut self) {
        drop(self.handle.take());
        // Dispatcher may have exited already; it only reads until Shutdown.
        let _ = self.shutdown.send(Dispatch::Shutdown);

        let Some(dispatcher) = self.dispatcher.take() else {
            return;
        };

        // Stopped from inside the handler: the dispatcher exits once it returns.
        if dispatcher.thread().id() == thread::current().id() {
            return;
        }

        if dispatcher.join().is_err() {
            tracing::error!("Interface change dispatcher panicked");
        }
    }
}

/// RAII wrapper for the notification handle.
///
/// Cancels the registration when dropped, then reclaims the leaked
/// `CallbackContext` and its channel sender.
struct NotificationHandle {
    handle: HANDLE,
    context_ptr: *mut CallbackContext,
}

impl Drop for NotificationHandle {
    fn drop(&mut self) {
        // SAFETY: We own this handle, returned by NotifyIpInterfaceChange,
        // and cancel it exactly once.
        let result = unsafe { CancelMibChangeNotify2(self.handle) };
        if result != NO_ERROR {
            tracing::warn!(
                code = result.0,
                "CancelMibChangeNotify2 failed; leaking callback context"
            );
            return;
        }

        // SAFETY: After a successful CancelMibChangeNotify2, Windows will not
        // invoke the callback again, so the context can be reclaimed.
        drop(unsafe { Box::from_raw(self.context_ptr) });
    }
}

// SAFETY: CancelMibChangeNotify2 may be called from any thread, and the
// context pointer is only dereferenced by the callback and by Drop.
unsafe impl Send for NotificationHandle {}

/// Context passed to the Windows callback.
struct CallbackContext {
    sender: mpsc::Sender<Dispatch>,
}

/// Registers for IP interface change notifications on all address families.
///
/// The callback context is leaked for the lifetime of the registration and
/// reclaimed by [`NotificationHandle`]'s `Drop`.
#[cfg(not(tarpaulin_include))]
fn register_notification(
    sender: mpsc::Sender<Dispatch>,
) -> Result<NotificationHandle, StartupError> {
    let context_ptr = Box::into_raw(Box::new(CallbackContext { sender }));
    let void_ptr = context_ptr.cast::<std::ffi::c_void>();

    let mut handle = HANDLE::default();

    // SAFETY: Callback and context stay valid until CancelMibChangeNotify2.
    // InitialNotification = false: no callback on registration.
    let result = unsafe {
        NotifyIpInterfaceChange(
            AF_UNSPEC,
            Some(ip_interface_change_callback),
            Some(void_ptr),
            false,
            &raw mut handle,
        )
    };

    if result != NO_ERROR {
        // SAFETY: Registration failed, so Windows never saw the context.
        drop(unsafe { Box::from_raw(context_ptr) });
        return Err(StartupError::Registration { code: result.0 });
    }

    tracing::debug!("Registered for IP interface change notifications");

    Ok(NotificationHandle {
        handle,
        context_ptr,
    })
}

/// Callback invoked by Windows on its thread pool for every interface
/// change, whatever the row or notification type.
///
/// # Safety
///
/// - `caller_context` must be null or point to a live `CallbackContext`
/// - `row` is not read
#[cfg(not(tarpaulin_include))]
unsafe extern "system" fn ip_interface_change_callback(
    caller_context: *const std::ffi::c_void,
    _row: *const MIB_IPINTERFACE_ROW,
    _notification_type: MIB_NOTIFICATION_TYPE,
) {
    if caller_context.is_null() {
        return;
    }

    // SAFETY: caller_context was set in register_notification and stays
    // valid until the registration is cancelled.
    let context = unsafe { &*(caller_context.cast::<CallbackContext>()) };

    // The dispatcher may already be gone during shutdown.
    let _ = context.sender.send(Dispatch::Change);
}

#[cfg(test)]
#[path = "windows_tests.rs"]
mod tests;
