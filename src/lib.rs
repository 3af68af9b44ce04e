//! Typed access to the Windows IP Helper connection tables.
//!
//! Wraps `GetExtendedTcpTable`, `GetExtendedUdpTable`, and `GetIpNetTable`
//! from `iphlpapi.dll` and decodes the table blobs they return into plain
//! records: TCP connections (basic, owner-PID, and owner-module variants for
//! IPv4 and IPv6), UDP listeners (same three variants), and ARP cache
//! entries.
//!
//! The native protocol is the same for every table: the first 4 bytes of the
//! blob hold an entry count, followed by fixed-stride rows. [`TableReader`]
//! owns a reusable scratch buffer and drives the "buffer too small, grow and
//! retry" dance; the `layout` module knows the strides and field offsets.
//! Decoding is pure byte-slice work, so it compiles and is tested on every
//! platform; the live calls are Windows-only and return
//! [`TableError::Unsupported`] elsewhere.
//!
//! ```no_run
//! use netquery::{AddressFamily, TableReader, TcpScope};
//!
//! let reader = TableReader::new();
//! for row in reader.tcp_owner_rows(AddressFamily::Ipv4, TcpScope::All, true)? {
//!     println!("{} -> {} [{}] pid {}", row.local, row.remote, row.state, row.pid);
//! }
//! # Ok::<(), netquery::TableError>(())
//! ```

mod config;
mod error;
#[cfg_attr(not(windows), allow(dead_code))]
mod ffi;
mod layout;
pub mod portmap;
mod reader;
mod types;

pub use error::TableError;
pub use reader::TableReader;
pub use types::{
    AddressFamily, ArpEntry, ArpEntryKind, Protocol, TcpModuleRow, TcpOwnerRow, TcpRow, TcpScope,
    TcpState, UdpModuleRow, UdpOwnerRow, UdpRow,
};
