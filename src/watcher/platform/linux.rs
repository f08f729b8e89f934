//! Linux network change source using a `NETLINK_ROUTE` socket.

use std::io;
use std::mem;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::watcher::netlink;
use crate::watcher::pump::{self, DatagramSource, PumpConfig, Readiness};
use crate::watcher::{EventSink, EventSource, StartupError, WatchError, WatcherConfig};

/// [`EventSource`] subscribed to kernel link and address notifications.
///
/// Each subscription owns a netlink socket bound to the link and IPv4
/// address multicast groups (and IPv6 when configured), plus a background
/// thread that blocks in `poll(2)` until a datagram arrives or the
/// subscription is dropped.
///
/// The socket binds with port id 0 so the kernel assigns a unique one;
/// several watchers can coexist in one process.
#[derive(Debug, Clone, Default)]
pub struct NetlinkSource {
    config: WatcherConfig,
}

impl NetlinkSource {
    /// Creates a source with the given configuration.
    #[must_use]
    pub const fn new(config: WatcherConfig) -> Self {
        Self { config }
    }
}

impl EventSource for NetlinkSource {
    type Subscription = NetlinkSubscription;

    fn subscribe(&self, sink: EventSink) -> Result<Self::Subscription, WatchError> {
        let groups = netlink::multicast_groups(self.config.ipv6());
        let socket = open_socket(groups)?;
        let wake = Arc::new(WakeFd::new().map_err(StartupError::WakeChannel)?);

        let mut datagrams = SocketDatagrams {
            socket,
            wake: Arc::clone(&wake),
        };
        let pump_config = PumpConfig::from(&self.config);

        let worker = thread::Builder::new()
            .name(self.config.thread_name().to_string())
            .spawn(move || {
                let exit = pump::run(&mut datagrams, &sink, pump_config);
                tracing::debug!(?exit, "Netlink receive loop exited");
                // The socket closes here, when `datagrams` drops.
            })
            .map_err(StartupError::ThreadSpawn)?;

        tracing::debug!("Netlink socket bound to groups {groups:#x}");

        Ok(NetlinkSubscription {
            wake,
            worker: Some(worker),
        })
    }
}

/// Live netlink subscription.
///
/// Dropping it wakes the receive thread, which closes the socket on exit,
/// and joins that thread unless the drop happens on the thread itself.
pub struct NetlinkSubscription {
    wake: Arc<WakeFd>,
    worker: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for NetlinkSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetlinkSubscription")
            .field("wake_fd", &self.wake.as_raw_fd())
            .field("has_worker", &self.worker.is_some())
            .finish()
    }
}

impl Drop for NetlinkSubscription {
    fn drop(&mut self) {
        if let Err(e) = self.wake.signal() {
            tracing::warn!("Failed to wake netlink receive thread: {e}");
        }

        let Some(worker) = self.worker.take() else {
            return;
        };

        // Stopped from inside the handler: the loop exits once it returns.
        if worker.thread().id() == thread::current().id() {
            return;
        }

        if worker.join().is_err() {
            tracing::error!("Netlink receive thread panicked");
        }
    }
}

/// Creates the routing socket and binds it to `groups`.
#[cfg(not(tarpaulin_include))]
fn open_socket(groups: u32) -> Result<OwnedFd, StartupError> {
    // SAFETY: socket(2) with constant arguments; the result is checked below.
    let fd = unsafe {
        libc::socket(
            libc::AF_NETLINK,
            libc::SOCK_RAW | libc::SOCK_CLOEXEC,
            libc::NETLINK_ROUTE,
        )
    };
    if fd < 0 {
        return Err(StartupError::Socket(io::Error::last_os_error()));
    }

    // SAFETY: fd was just returned by socket(2) and is owned by nobody else.
    let socket = unsafe { OwnedFd::from_raw_fd(fd) };

    // SAFETY: sockaddr_nl is plain data; all-zero is a valid value.
    let mut addr: libc::sockaddr_nl = unsafe { mem::zeroed() };
    #[allow(clippy::cast_possible_truncation)] // AF_NETLINK is 16
    let family = libc::AF_NETLINK as libc::sa_family_t;
    addr.nl_family = family;
    addr.nl_pid = 0;
    addr.nl_groups = groups;

    #[allow(clippy::cast_possible_truncation)] // sockaddr_nl is 12 bytes
    let addr_len = mem::size_of::<libc::sockaddr_nl>() as libc::socklen_t;

    // SAFETY: addr is a valid sockaddr_nl and addr_len is its exact size.
    let rc = unsafe {
        libc::bind(
            socket.as_raw_fd(),
            (&raw const addr).cast::<libc::sockaddr>(),
            addr_len,
        )
    };
    if rc < 0 {
        return Err(StartupError::Bind {
            groups,
            source: io::Error::last_os_error(),
        });
    }

    Ok(socket)
}

/// `eventfd` used to release the receive thread from `poll(2)`.
#[derive(Debug)]
struct WakeFd(OwnedFd);

impl WakeFd {
    fn new() -> io::Result<Self> {
        // SAFETY: eventfd(2) with constant arguments; the result is checked below.
        let fd = unsafe { libc::eventfd(0, libc::EFD_CLOEXEC | libc::EFD_NONBLOCK) };
        if fd < 0 {
            return Err(io::Error::last_os_error());
        }
        // SAFETY: fd was just returned by eventfd(2) and is owned by nobody else.
        Ok(Self(unsafe { OwnedFd::from_raw_fd(fd) }))
    }

    fn signal(&self) -> io::Result<()> {
        let one: u64 = 1;
        // SAFETY: writes exactly the 8 bytes of `one`, as eventfd requires.
        let rc = unsafe {
            libc::write(
                self.0.as_raw_fd(),
                (&raw const one).cast::<libc::c_void>(),
                mem::size_of::<u64>(),
            )
        };
        if rc < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

impl AsRawFd for WakeFd {
    fn as_raw_fd(&self) -> RawFd {
        self.0.as_raw_fd()
    }
}

/// Datagram source over the bound socket and the wake fd.
struct SocketDatagrams {
    socket: OwnedFd,
    wake: Arc<WakeFd>,
}

impl DatagramSource for SocketDatagrams {
    #[cfg(not(tarpaulin_include))]
    fn next_datagram(&mut self, buf: &mut [u8]) -> io::Result<Readiness> {
        let mut fds = [
            libc::pollfd {
                fd: self.socket.as_raw_fd(),
                events: libc::POLLIN,
                revents: 0,
            },
            libc::pollfd {
                fd: self.wake.as_raw_fd(),
                events: libc::POLLIN,
                revents: 0,
            },
        ];

        // SAFETY: fds is a valid array of two pollfd for the whole call.
        let rc = unsafe { libc::poll(fds.as_mut_ptr(), 2, -1) };
        if rc < 0 {
            return Err(io::Error::last_os_error());
        }

        if fds[1].revents != 0 {
            return Ok(Readiness::Shutdown);
        }

        if fds[0].revents & libc::POLLNVAL != 0 {
            return Err(io::Error::from_raw_os_error(libc::EBADF));
        }

        // SAFETY: buf is valid for writes of buf.len() bytes.
        let n = unsafe {
            libc::recv(
                self.socket.as_raw_fd(),
                buf.as_mut_ptr().cast::<libc::c_void>(),
                buf.len(),
                libc::MSG_DONTWAIT,
            )
        };
        if n < 0 {
            return Err(io::Error::last_os_error());
        }

        #[allow(clippy::cast_sign_loss)] // checked non-negative above
        Ok(Readiness::Datagram(n as usize))
    }
}

#[cfg(test)]
#[path = "linux_tests.rs"]
mod tests;
