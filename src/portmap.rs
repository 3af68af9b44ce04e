//! Port → owning-PID snapshots built from the owner tables.
//!
//! Convenience layer for callers that only want "which process owns this
//! port" without touching the full records. The map is a `DashMap` so it can
//! be shared with concurrent readers while a refresh task rebuilds it.

use std::collections::HashMap;

use dashmap::DashMap;
use sysinfo::{Pid, System};

use crate::error::TableError;
use crate::reader::TableReader;
use crate::types::{AddressFamily, Protocol, TcpOwnerRow, TcpScope, UdpOwnerRow};

/// Build a `(protocol, local port) -> PID` map from decoded owner rows.
///
/// Rows with port 0 or PID 0 (system-owned or unbound) are skipped.
pub fn build_port_map(
    tcp: &[TcpOwnerRow],
    udp: &[UdpOwnerRow],
) -> DashMap<(Protocol, u16), u32> {
    let map = DashMap::new();
    for row in tcp {
        let port = row.local.port();
        if port > 0 && row.pid > 0 {
            map.insert((Protocol::Tcp, port), row.pid);
        }
    }
    for row in udp {
        let port = row.local.port();
        if port > 0 && row.pid > 0 {
            map.insert((Protocol::Udp, port), row.pid);
        }
    }
    map
}

/// Fetch all four owner tables (TCP/UDP x IPv4/IPv6) and build the port map.
pub fn snapshot(reader: &TableReader) -> Result<DashMap<(Protocol, u16), u32>, TableError> {
    let mut tcp = reader.tcp_owner_rows(AddressFamily::Ipv4, TcpScope::All, false)?;
    tcp.extend(reader.tcp_owner_rows(AddressFamily::Ipv6, TcpScope::All, false)?);
    let mut udp = reader.udp_owner_rows(AddressFamily::Ipv4, false)?;
    udp.extend(reader.udp_owner_rows(AddressFamily::Ipv6, false)?);
    Ok(build_port_map(&tcp, &udp))
}

/// Resolve process names for a set of PIDs.
///
/// PIDs that no longer exist are simply absent from the result; owner rows
/// can outlive their process between the fetch and the lookup.
pub fn process_names(pids: impl IntoIterator<Item = u32>) -> HashMap<u32, String> {
    let sys = System::new_all();
    pids.into_iter()
        .filter_map(|pid| {
            sys.process(Pid::from_u32(pid))
                .map(|p| (pid, p.name().to_str().unwrap_or("unknown").to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TcpState;

    fn tcp_row(port: u16, pid: u32) -> TcpOwnerRow {
        TcpOwnerRow {
            local: format!("127.0.0.1:{port}").parse().unwrap(),
            remote: "0.0.0.0:0".parse().unwrap(),
            state: TcpState::Listen,
            pid,
        }
    }

    fn udp_row(port: u16, pid: u32) -> UdpOwnerRow {
        UdpOwnerRow {
            local: format!("0.0.0.0:{port}").parse().unwrap(),
            pid,
        }
    }

    #[test]
    fn test_port_map_keys_by_protocol_and_port() {
        let map = build_port_map(
            &[tcp_row(8080, 100), tcp_row(443, 200)],
            &[udp_row(53, 300)],
        );
        assert_eq!(map.get(&(Protocol::Tcp, 8080)).map(|e| *e), Some(100));
        assert_eq!(map.get(&(Protocol::Tcp, 443)).map(|e| *e), Some(200));
        assert_eq!(map.get(&(Protocol::Udp, 53)).map(|e| *e), Some(300));
        assert!(map.get(&(Protocol::Udp, 8080)).is_none());
    }

    #[test]
    fn test_port_map_skips_zero_port_and_zero_pid() {
        let map = build_port_map(&[tcp_row(0, 100), tcp_row(80, 0)], &[udp_row(0, 0)]);
        assert!(map.is_empty());
    }

    #[test]
    fn test_same_port_on_both_protocols_keeps_both() {
        let map = build_port_map(&[tcp_row(5353, 11)], &[udp_row(5353, 22)]);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&(Protocol::Tcp, 5353)).map(|e| *e), Some(11));
        assert_eq!(map.get(&(Protocol::Udp, 5353)).map(|e| *e), Some(22));
    }

    #[test]
    fn test_process_names_drops_nonexistent_pids() {
        // PID 0 may resolve to a kernel pseudo-process on some platforms,
        // so probe with a PID far past any real process table.
        let names = process_names([u32::MAX - 1]);
        assert!(names.is_empty());
    }

    #[test]
    fn test_process_names_resolves_this_process() {
        let me = std::process::id();
        let names = process_names([me]);
        let name = names.get(&me).expect("own PID should resolve");
        assert!(!name.is_empty());
    }
}
