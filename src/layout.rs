//! Strides, offsets, and row decoders for the native table blobs.
//!
//! Every IP Helper table shares one shape: a 4-byte native-endian entry
//! count, then `count` rows at a fixed stride. The count prefix is padded up
//! to the row alignment — owner-module rows contain an 8-aligned
//! `LARGE_INTEGER`, so their rows start at offset 8 instead of 4.
//!
//! Ports arrive as a dword whose low 16 bits hold the port in network byte
//! order; IPv4 addresses are network-order dwords; IPv6 addresses are 16 raw
//! bytes. Decoders here work on plain byte slices and carry no `unsafe`, so
//! they run (and are tested) on any host.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, SocketAddrV4, SocketAddrV6};

use crate::error::TableError;
use crate::types::{
    ArpEntry, ArpEntryKind, TcpModuleRow, TcpOwnerRow, TcpRow, TcpState, UdpModuleRow,
    UdpOwnerRow, UdpRow,
};

/// Size of the `dwNumEntries` prefix on every table blob.
const COUNT_PREFIX_BYTES: usize = 4;

/// Shape of one native table variant.
pub(crate) struct TableLayout {
    /// Bytes per row.
    pub stride: usize,
    /// Offset of the first row: the count prefix padded to the row alignment.
    pub entries_offset: usize,
}

pub(crate) const TCP4_BASIC: TableLayout = TableLayout { stride: 20, entries_offset: 4 };
pub(crate) const TCP4_OWNER_PID: TableLayout = TableLayout { stride: 24, entries_offset: 4 };
pub(crate) const TCP4_OWNER_MODULE: TableLayout = TableLayout { stride: 160, entries_offset: 8 };
pub(crate) const TCP6_BASIC: TableLayout = TableLayout { stride: 52, entries_offset: 4 };
pub(crate) const TCP6_OWNER_PID: TableLayout = TableLayout { stride: 56, entries_offset: 4 };
pub(crate) const TCP6_OWNER_MODULE: TableLayout = TableLayout { stride: 192, entries_offset: 8 };
pub(crate) const UDP4_BASIC: TableLayout = TableLayout { stride: 8, entries_offset: 4 };
pub(crate) const UDP4_OWNER_PID: TableLayout = TableLayout { stride: 12, entries_offset: 4 };
pub(crate) const UDP4_OWNER_MODULE: TableLayout = TableLayout { stride: 160, entries_offset: 8 };
pub(crate) const UDP6_BASIC: TableLayout = TableLayout { stride: 24, entries_offset: 4 };
pub(crate) const UDP6_OWNER_PID: TableLayout = TableLayout { stride: 28, entries_offset: 4 };
pub(crate) const UDP6_OWNER_MODULE: TableLayout = TableLayout { stride: 176, entries_offset: 8 };
#[cfg_attr(not(windows), allow(dead_code))]
pub(crate) const ARP: TableLayout = TableLayout { stride: 24, entries_offset: 4 };

/// Walk a count-prefixed blob and decode every row.
///
/// A blob shorter than its count promises is a `Truncated` error, never a
/// partial result; a zero count yields an empty vec.
pub(crate) fn parse_table<T>(
    buf: &[u8],
    layout: &TableLayout,
    decode: impl Fn(&[u8]) -> Result<T, TableError>,
) -> Result<Vec<T>, TableError> {
    if buf.len() < COUNT_PREFIX_BYTES {
        return Err(TableError::Truncated(format!(
            "blob is {} bytes, need at least {COUNT_PREFIX_BYTES} for the entry count",
            buf.len()
        )));
    }
    let count = u32::from_ne_bytes(buf[..COUNT_PREFIX_BYTES].try_into().unwrap()) as usize;

    let need = count
        .checked_mul(layout.stride)
        .and_then(|n| n.checked_add(layout.entries_offset))
        .ok_or_else(|| TableError::Truncated(format!("entry count {count} overflows")))?;
    if need > buf.len() {
        return Err(TableError::Truncated(format!(
            "count {count} needs {need} bytes but blob is {}",
            buf.len()
        )));
    }

    let mut rows = Vec::with_capacity(count);
    for i in 0..count {
        let off = layout.entries_offset + i * layout.stride;
        rows.push(decode(&buf[off..off + layout.stride])?);
    }
    Ok(rows)
}

// ---- field readers -------------------------------------------------------

fn read_u32(row: &[u8], off: usize) -> u32 {
    u32::from_ne_bytes(row[off..off + 4].try_into().unwrap())
}

fn read_i64(row: &[u8], off: usize) -> i64 {
    i64::from_ne_bytes(row[off..off + 8].try_into().unwrap())
}

/// Port dword: low 16 bits hold the port in network byte order.
fn read_port(row: &[u8], off: usize) -> u16 {
    u16::from_be(read_u32(row, off) as u16)
}

/// IPv4 address dword, stored in network byte order (memory order is the
/// octet order).
fn read_addr4(row: &[u8], off: usize) -> Ipv4Addr {
    let octets: [u8; 4] = row[off..off + 4].try_into().unwrap();
    Ipv4Addr::from(octets)
}

fn read_addr6(row: &[u8], off: usize) -> Ipv6Addr {
    let octets: [u8; 16] = row[off..off + 16].try_into().unwrap();
    Ipv6Addr::from(octets)
}

fn read_modules(row: &[u8], off: usize) -> [u64; 16] {
    let mut modules = [0u64; 16];
    for (i, slot) in modules.iter_mut().enumerate() {
        let at = off + i * 8;
        *slot = u64::from_ne_bytes(row[at..at + 8].try_into().unwrap());
    }
    modules
}

fn sock4(row: &[u8], addr_off: usize, port_off: usize) -> SocketAddr {
    SocketAddr::V4(SocketAddrV4::new(
        read_addr4(row, addr_off),
        read_port(row, port_off),
    ))
}

fn sock6(row: &[u8], addr_off: usize, scope_off: usize, port_off: usize) -> SocketAddr {
    SocketAddr::V6(SocketAddrV6::new(
        read_addr6(row, addr_off),
        read_port(row, port_off),
        0,
        read_u32(row, scope_off),
    ))
}

// ---- TCP rows ------------------------------------------------------------

// MIB_TCPROW_LH: state, local addr/port, remote addr/port.
pub(crate) fn decode_tcp4_basic(row: &[u8]) -> Result<TcpRow, TableError> {
    Ok(TcpRow {
        local: sock4(row, 4, 8),
        remote: sock4(row, 12, 16),
        state: TcpState::from_dword(read_u32(row, 0))?,
    })
}

// MIB_TCPROW_OWNER_PID: basic fields plus dwOwningPid.
pub(crate) fn decode_tcp4_owner(row: &[u8]) -> Result<TcpOwnerRow, TableError> {
    Ok(TcpOwnerRow {
        local: sock4(row, 4, 8),
        remote: sock4(row, 12, 16),
        state: TcpState::from_dword(read_u32(row, 0))?,
        pid: read_u32(row, 20),
    })
}

// MIB_TCPROW_OWNER_MODULE: owner-PID fields, then the 8-aligned
// liCreateTimestamp at 24 and OwningModuleInfo[16] at 32.
pub(crate) fn decode_tcp4_module(row: &[u8]) -> Result<TcpModuleRow, TableError> {
    Ok(TcpModuleRow {
        local: sock4(row, 4, 8),
        remote: sock4(row, 12, 16),
        state: TcpState::from_dword(read_u32(row, 0))?,
        pid: read_u32(row, 20),
        create_timestamp: read_i64(row, 24),
        owning_module: read_modules(row, 32),
    })
}

// MIB_TCP6ROW: state first, then local addr/scope/port, remote
// addr/scope/port. Note the field order differs from the owner variants.
pub(crate) fn decode_tcp6_basic(row: &[u8]) -> Result<TcpRow, TableError> {
    Ok(TcpRow {
        local: sock6(row, 4, 20, 24),
        remote: sock6(row, 28, 44, 48),
        state: TcpState::from_dword(read_u32(row, 0))?,
    })
}

// MIB_TCP6ROW_OWNER_PID: local addr/scope/port, remote addr/scope/port,
// then state and pid at the tail.
pub(crate) fn decode_tcp6_owner(row: &[u8]) -> Result<TcpOwnerRow, TableError> {
    Ok(TcpOwnerRow {
        local: sock6(row, 0, 16, 20),
        remote: sock6(row, 24, 40, 44),
        state: TcpState::from_dword(read_u32(row, 48))?,
        pid: read_u32(row, 52),
    })
}

// MIB_TCP6ROW_OWNER_MODULE: owner-PID fields, timestamp at 56, modules at 64.
pub(crate) fn decode_tcp6_module(row: &[u8]) -> Result<TcpModuleRow, TableError> {
    Ok(TcpModuleRow {
        local: sock6(row, 0, 16, 20),
        remote: sock6(row, 24, 40, 44),
        state: TcpState::from_dword(read_u32(row, 48))?,
        pid: read_u32(row, 52),
        create_timestamp: read_i64(row, 56),
        owning_module: read_modules(row, 64),
    })
}

// ---- UDP rows ------------------------------------------------------------

// MIB_UDPROW: local addr and port only.
pub(crate) fn decode_udp4_basic(row: &[u8]) -> Result<UdpRow, TableError> {
    Ok(UdpRow {
        local: sock4(row, 0, 4),
    })
}

// MIB_UDPROW_OWNER_PID.
pub(crate) fn decode_udp4_owner(row: &[u8]) -> Result<UdpOwnerRow, TableError> {
    Ok(UdpOwnerRow {
        local: sock4(row, 0, 4),
        pid: read_u32(row, 8),
    })
}

// MIB_UDPROW_OWNER_MODULE: pid at 8, padding to the 8-aligned timestamp at
// 16, flags dword at 24 (bit 0 = SpecificPortBind), modules at 32.
pub(crate) fn decode_udp4_module(row: &[u8]) -> Result<UdpModuleRow, TableError> {
    Ok(UdpModuleRow {
        local: sock4(row, 0, 4),
        pid: read_u32(row, 8),
        create_timestamp: read_i64(row, 16),
        specific_port_bind: read_u32(row, 24) & 1 != 0,
        owning_module: read_modules(row, 32),
    })
}

// MIB_UDP6ROW: local addr, scope, port.
pub(crate) fn decode_udp6_basic(row: &[u8]) -> Result<UdpRow, TableError> {
    Ok(UdpRow {
        local: sock6(row, 0, 16, 20),
    })
}

// MIB_UDP6ROW_OWNER_PID.
pub(crate) fn decode_udp6_owner(row: &[u8]) -> Result<UdpOwnerRow, TableError> {
    Ok(UdpOwnerRow {
        local: sock6(row, 0, 16, 20),
        pid: read_u32(row, 24),
    })
}

// MIB_UDP6ROW_OWNER_MODULE: pid at 24, padding to the timestamp at 32,
// flags at 40, modules at 48.
pub(crate) fn decode_udp6_module(row: &[u8]) -> Result<UdpModuleRow, TableError> {
    Ok(UdpModuleRow {
        local: sock6(row, 0, 16, 20),
        pid: read_u32(row, 24),
        create_timestamp: read_i64(row, 32),
        specific_port_bind: read_u32(row, 40) & 1 != 0,
        owning_module: read_modules(row, 48),
    })
}

// ---- ARP rows ------------------------------------------------------------

// MIB_IPNETROW: dwIndex, dwPhysAddrLen, bPhysAddr[8], dwAddr, dwType.
#[cfg_attr(not(windows), allow(dead_code))]
pub(crate) fn decode_arp(row: &[u8]) -> Result<ArpEntry, TableError> {
    let phys_len = (read_u32(row, 4) as usize).min(8);
    Ok(ArpEntry {
        if_index: read_u32(row, 0),
        phys_addr: row[8..8 + phys_len].to_vec(),
        addr: read_addr4(row, 16),
        kind: ArpEntryKind::from_dword(read_u32(row, 20)),
    })
}
