//! Netlink message framing for the routing-socket backend.
//!
//! A datagram read from a `NETLINK_ROUTE` socket holds one or more messages
//! packed back to back. Each message starts with a 16-byte header in native
//! byte order whose first field is the length of the message including the
//! header; the next message begins at that length rounded up to 4 bytes.
//!
//! Parsing stops at the first fragment that is not structurally well formed.
//! The rest of the datagram is dropped, never reported as an error.

/// Size of `struct nlmsghdr`.
pub const HEADER_LEN: usize = 16;

/// Alignment of consecutive messages (`NLMSG_ALIGNTO`).
const ALIGN_TO: usize = 4;

/// A new link appeared or an existing link changed state.
pub const RTM_NEWLINK: u16 = 16;
/// A link was removed.
pub const RTM_DELLINK: u16 = 17;
/// An address was added to an interface.
pub const RTM_NEWADDR: u16 = 20;
/// An address was removed from an interface.
pub const RTM_DELADDR: u16 = 21;

/// Multicast group for link state notifications.
pub const RTMGRP_LINK: u32 = 0x1;
/// Multicast group for IPv4 address notifications.
pub const RTMGRP_IPV4_IFADDR: u32 = 0x10;
/// Multicast group for IPv6 address notifications.
pub const RTMGRP_IPV6_IFADDR: u32 = 0x100;

/// Returns the multicast group mask the backend binds to.
#[must_use]
pub const fn multicast_groups(ipv6: bool) -> u32 {
    let groups = RTMGRP_LINK | RTMGRP_IPV4_IFADDR;
    if ipv6 {
        groups | RTMGRP_IPV6_IFADDR
    } else {
        groups
    }
}

/// Returns true for message types that count as a network change.
#[must_use]
pub const fn is_change(kind: u16) -> bool {
    matches!(kind, RTM_NEWLINK | RTM_DELLINK | RTM_NEWADDR | RTM_DELADDR)
}

/// Decoded `nlmsghdr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader {
    /// Length of the message including this header
    pub len: u32,
    /// Message type (`RTM_*`, `NLMSG_*`)
    pub kind: u16,
    /// Message flags
    pub flags: u16,
    /// Sequence number
    pub seq: u32,
    /// Sending port id
    pub pid: u32,
}

/// Iterator over the well-formed messages of one datagram.
#[derive(Debug, Clone)]
pub struct Messages<'a> {
    remaining: &'a [u8],
}

impl<'a> Messages<'a> {
    /// Starts iterating over a received datagram.
    #[must_use]
    pub const fn new(datagram: &'a [u8]) -> Self {
        Self {
            remaining: datagram,
        }
    }

    /// Number of bytes not consumed as well-formed messages.
    ///
    /// Non-zero after iteration ends means a malformed or truncated
    /// fragment was dropped.
    #[must_use]
    pub const fn trailing(&self) -> usize {
        self.remaining.len()
    }
}

impl Iterator for Messages<'_> {
    type Item = MessageHeader;

    fn next(&mut self) -> Option<Self::Item> {
        let header = parse_header(self.remaining)?;

        // Fits in usize on every platform the backend runs on.
        let len = header.len as usize;
        if len < HEADER_LEN || len > self.remaining.len() {
            return None;
        }

        let advance = align(len).min(self.remaining.len());
        self.remaining = &self.remaining[advance..];
        Some(header)
    }
}

const fn align(len: usize) -> usize {
    (len + ALIGN_TO - 1) & !(ALIGN_TO - 1)
}

fn parse_header(buf: &[u8]) -> Option<MessageHeader> {
    if buf.len() < HEADER_LEN {
        return None;
    }

    Some(MessageHeader {
        len: read_u32(buf, 0),
        kind: read_u16(buf, 4),
        flags: read_u16(buf, 6),
        seq: read_u32(buf, 8),
        pid: read_u32(buf, 12),
    })
}

const fn read_u16(buf: &[u8], at: usize) -> u16 {
    u16::from_ne_bytes([buf[at], buf[at + 1]])
}

const fn read_u32(buf: &[u8], at: usize) -> u32 {
    u32::from_ne_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}

#[cfg(test)]
#[path = "netlink_tests.rs"]
mod tests;
