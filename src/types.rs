//! Record types decoded from the native table blobs.
//!
//! All records are immutable values built once per fetch; they derive
//! `Serialize` so callers can push them straight over an IPC or JSON
//! boundary.

use std::fmt;
use std::net::{Ipv4Addr, SocketAddr};

use serde::Serialize;

use crate::error::TableError;
use crate::ffi;

/// Address family selector for the TCP/UDP table queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AddressFamily {
    Ipv4,
    Ipv6,
}

impl AddressFamily {
    /// The native `ulAf` value (`AF_INET` / `AF_INET6`).
    #[cfg_attr(not(windows), allow(dead_code))]
    pub(crate) fn af(self) -> u32 {
        match self {
            AddressFamily::Ipv4 => ffi::AF_INET,
            AddressFamily::Ipv6 => ffi::AF_INET6,
        }
    }
}

/// Which slice of the TCP table to ask for.
///
/// The native table class is a 3x3 grid: each record variant (basic,
/// owner-PID, owner-module) comes in listener / connections / all flavors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TcpScope {
    /// Listening sockets only.
    Listeners,
    /// Established and in-progress connections only.
    Connections,
    /// Everything.
    All,
}

impl TcpScope {
    /// Offset of this scope within a table-class trio.
    pub(crate) fn class_offset(self) -> u32 {
        match self {
            TcpScope::Listeners => 0,
            TcpScope::Connections => 1,
            TcpScope::All => 2,
        }
    }
}

/// Transport protocol tag used by the port-map snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Protocol {
    Tcp,
    Udp,
}

/// The 12 MIB TCP connection states.
///
/// Decoded from the row's `dwState` dword (1-based); values outside the
/// defined range are a decode error, not a catch-all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TcpState {
    Closed,
    Listen,
    SynSent,
    SynReceived,
    Established,
    FinWait1,
    FinWait2,
    CloseWait,
    Closing,
    LastAck,
    TimeWait,
    DeleteTcb,
}

impl TcpState {
    pub(crate) fn from_dword(value: u32) -> Result<Self, TableError> {
        Ok(match value {
            1 => TcpState::Closed,
            2 => TcpState::Listen,
            3 => TcpState::SynSent,
            4 => TcpState::SynReceived,
            5 => TcpState::Established,
            6 => TcpState::FinWait1,
            7 => TcpState::FinWait2,
            8 => TcpState::CloseWait,
            9 => TcpState::Closing,
            10 => TcpState::LastAck,
            11 => TcpState::TimeWait,
            12 => TcpState::DeleteTcb,
            other => return Err(TableError::BadState(other)),
        })
    }

    /// The netstat-style name for this state.
    pub fn as_str(&self) -> &'static str {
        match self {
            TcpState::Closed => "CLOSED",
            TcpState::Listen => "LISTEN",
            TcpState::SynSent => "SYN_SENT",
            TcpState::SynReceived => "SYN_RCVD",
            TcpState::Established => "ESTABLISHED",
            TcpState::FinWait1 => "FIN_WAIT_1",
            TcpState::FinWait2 => "FIN_WAIT_2",
            TcpState::CloseWait => "CLOSE_WAIT",
            TcpState::Closing => "CLOSING",
            TcpState::LastAck => "LAST_ACK",
            TcpState::TimeWait => "TIME_WAIT",
            TcpState::DeleteTcb => "DELETE_TCB",
        }
    }
}

impl fmt::Display for TcpState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A TCP connection from the basic table class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TcpRow {
    pub local: SocketAddr,
    pub remote: SocketAddr,
    pub state: TcpState,
}

/// A TCP connection with its owning process (owner-PID class).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TcpOwnerRow {
    pub local: SocketAddr,
    pub remote: SocketAddr,
    pub state: TcpState,
    pub pid: u32,
}

/// A TCP connection with owner module details (owner-module class).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TcpModuleRow {
    pub local: SocketAddr,
    pub remote: SocketAddr,
    pub state: TcpState,
    pub pid: u32,
    /// Socket creation time in FILETIME units (100ns ticks since 1601-01-01).
    pub create_timestamp: i64,
    /// Opaque owning-module blob; consumed by other IP Helper lookups.
    pub owning_module: [u64; 16],
}

/// A UDP listener from the basic table class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UdpRow {
    pub local: SocketAddr,
}

/// A UDP listener with its owning process (owner-PID class).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UdpOwnerRow {
    pub local: SocketAddr,
    pub pid: u32,
}

/// A UDP listener with owner module details (owner-module class).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UdpModuleRow {
    pub local: SocketAddr,
    pub pid: u32,
    /// Socket creation time in FILETIME units (100ns ticks since 1601-01-01).
    pub create_timestamp: i64,
    /// Set when the socket was bound to a specific port rather than port 0.
    pub specific_port_bind: bool,
    /// Opaque owning-module blob; consumed by other IP Helper lookups.
    pub owning_module: [u64; 16],
}

/// How an ARP cache entry was learned.
///
/// Decoded from the row's `dwType`; 1 is the MIB's own catch-all, so
/// unknown values land there rather than failing the whole table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ArpEntryKind {
    Other,
    Invalid,
    Dynamic,
    Static,
}

impl ArpEntryKind {
    pub(crate) fn from_dword(value: u32) -> Self {
        match value {
            2 => ArpEntryKind::Invalid,
            3 => ArpEntryKind::Dynamic,
            4 => ArpEntryKind::Static,
            _ => ArpEntryKind::Other,
        }
    }
}

/// One ARP / IP-net table entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArpEntry {
    /// Interface the entry lives on.
    pub if_index: u32,
    /// Physical address, trimmed to the length the OS reported (at most 8).
    pub phys_addr: Vec<u8>,
    pub addr: Ipv4Addr,
    pub kind: ArpEntryKind,
}

impl ArpEntry {
    /// Colon-separated hex rendering of the physical address, e.g.
    /// `aa:bb:cc:dd:ee:ff`. Empty for entries with no physical address.
    pub fn phys_addr_string(&self) -> String {
        self.phys_addr
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect::<Vec<_>>()
            .join(":")
    }
}
