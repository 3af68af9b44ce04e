//! Raw IP Helper surface: status/class constants and the `iphlpapi` externs.
//!
//! The constants are plain numbers and compile everywhere (the decode layer
//! and tests use them); only the extern block links against `iphlpapi.dll`
//! and is gated to Windows.

pub const AF_INET: u32 = 2;
pub const AF_INET6: u32 = 23;

pub const NO_ERROR: u32 = 0;
pub const ERROR_INSUFFICIENT_BUFFER: u32 = 122;
/// Returned by `GetIpNetTable` when the ARP cache is empty.
pub const ERROR_NO_DATA: u32 = 232;

// TCP_TABLE_CLASS: basic 0..=2, owner-PID 3..=5, owner-module 6..=8,
// each trio ordered listener / connections / all.
pub const TCP_TABLE_BASIC_LISTENER: u32 = 0;
pub const TCP_TABLE_OWNER_PID_LISTENER: u32 = 3;
pub const TCP_TABLE_OWNER_MODULE_LISTENER: u32 = 6;

// UDP_TABLE_CLASS.
pub const UDP_TABLE_BASIC: u32 = 0;
pub const UDP_TABLE_OWNER_PID: u32 = 1;
pub const UDP_TABLE_OWNER_MODULE: u32 = 2;

#[cfg(windows)]
#[link(name = "iphlpapi")]
extern "system" {
    pub fn GetExtendedTcpTable(
        pTcpTable: *mut u8,
        pdwSize: *mut u32,
        bOrder: i32,
        ulAf: u32,
        TableClass: u32,
        Reserved: u32,
    ) -> u32;

    pub fn GetExtendedUdpTable(
        pUdpTable: *mut u8,
        pdwSize: *mut u32,
        bOrder: i32,
        ulAf: u32,
        TableClass: u32,
        Reserved: u32,
    ) -> u32;

    pub fn GetIpNetTable(pIpNetTable: *mut u8, pdwSize: *mut u32, bOrder: i32) -> u32;
}
