//! Reusable-buffer fetch of the native tables.
//!
//! One `TableReader` owns one scratch buffer behind a mutex: a single native
//! call/decode is in flight per instance, and a buffer grown for a large
//! table is kept for later calls. The fetch protocol is the IP Helper
//! standard — call with the current buffer, grow to the reported size on
//! `ERROR_INSUFFICIENT_BUFFER`, retry a bounded number of times because the
//! table can keep growing between calls.

use std::sync::Mutex;

use crate::config;
use crate::error::TableError;
use crate::ffi;
use crate::layout::{self, TableLayout};
use crate::types::{
    AddressFamily, ArpEntry, TcpModuleRow, TcpOwnerRow, TcpRow, TcpScope, UdpModuleRow,
    UdpOwnerRow, UdpRow,
};

/// Fetches and decodes IP Helper tables through one reusable buffer.
pub struct TableReader {
    scratch: Mutex<Vec<u8>>,
}

impl TableReader {
    /// Reader with the default initial buffer.
    pub fn new() -> Self {
        Self::with_capacity(config::INITIAL_BUFFER_BYTES)
    }

    /// Reader with a caller-chosen initial buffer size (bytes). The buffer
    /// still grows on demand; this only tunes the starting point.
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            scratch: Mutex::new(vec![0u8; bytes.max(4)]),
        }
    }

    /// TCP connections, basic class (no owning process).
    ///
    /// Note: some Windows versions reject the basic class for IPv6; that
    /// surfaces as [`TableError::Os`] with the native status untouched.
    pub fn tcp_rows(
        &self,
        family: AddressFamily,
        scope: TcpScope,
        sorted: bool,
    ) -> Result<Vec<TcpRow>, TableError> {
        let class = ffi::TCP_TABLE_BASIC_LISTENER + scope.class_offset();
        match family {
            AddressFamily::Ipv4 => {
                self.fetch_tcp(family, class, sorted, &layout::TCP4_BASIC, layout::decode_tcp4_basic)
            }
            AddressFamily::Ipv6 => {
                self.fetch_tcp(family, class, sorted, &layout::TCP6_BASIC, layout::decode_tcp6_basic)
            }
        }
    }

    /// TCP connections with owning PIDs (owner-PID class).
    pub fn tcp_owner_rows(
        &self,
        family: AddressFamily,
        scope: TcpScope,
        sorted: bool,
    ) -> Result<Vec<TcpOwnerRow>, TableError> {
        let class = ffi::TCP_TABLE_OWNER_PID_LISTENER + scope.class_offset();
        match family {
            AddressFamily::Ipv4 => {
                self.fetch_tcp(family, class, sorted, &layout::TCP4_OWNER_PID, layout::decode_tcp4_owner)
            }
            AddressFamily::Ipv6 => {
                self.fetch_tcp(family, class, sorted, &layout::TCP6_OWNER_PID, layout::decode_tcp6_owner)
            }
        }
    }

    /// TCP connections with creation timestamps and owning-module blobs
    /// (owner-module class).
    pub fn tcp_module_rows(
        &self,
        family: AddressFamily,
        scope: TcpScope,
        sorted: bool,
    ) -> Result<Vec<TcpModuleRow>, TableError> {
        let class = ffi::TCP_TABLE_OWNER_MODULE_LISTENER + scope.class_offset();
        match family {
            AddressFamily::Ipv4 => {
                self.fetch_tcp(family, class, sorted, &layout::TCP4_OWNER_MODULE, layout::decode_tcp4_module)
            }
            AddressFamily::Ipv6 => {
                self.fetch_tcp(family, class, sorted, &layout::TCP6_OWNER_MODULE, layout::decode_tcp6_module)
            }
        }
    }

    /// UDP listeners, basic class.
    pub fn udp_rows(&self, family: AddressFamily, sorted: bool) -> Result<Vec<UdpRow>, TableError> {
        match family {
            AddressFamily::Ipv4 => {
                self.fetch_udp(family, ffi::UDP_TABLE_BASIC, sorted, &layout::UDP4_BASIC, layout::decode_udp4_basic)
            }
            AddressFamily::Ipv6 => {
                self.fetch_udp(family, ffi::UDP_TABLE_BASIC, sorted, &layout::UDP6_BASIC, layout::decode_udp6_basic)
            }
        }
    }

    /// UDP listeners with owning PIDs.
    pub fn udp_owner_rows(
        &self,
        family: AddressFamily,
        sorted: bool,
    ) -> Result<Vec<UdpOwnerRow>, TableError> {
        match family {
            AddressFamily::Ipv4 => {
                self.fetch_udp(family, ffi::UDP_TABLE_OWNER_PID, sorted, &layout::UDP4_OWNER_PID, layout::decode_udp4_owner)
            }
            AddressFamily::Ipv6 => {
                self.fetch_udp(family, ffi::UDP_TABLE_OWNER_PID, sorted, &layout::UDP6_OWNER_PID, layout::decode_udp6_owner)
            }
        }
    }

    /// UDP listeners with creation timestamps, bind flags, and owning-module
    /// blobs.
    pub fn udp_module_rows(
        &self,
        family: AddressFamily,
        sorted: bool,
    ) -> Result<Vec<UdpModuleRow>, TableError> {
        match family {
            AddressFamily::Ipv4 => {
                self.fetch_udp(family, ffi::UDP_TABLE_OWNER_MODULE, sorted, &layout::UDP4_OWNER_MODULE, layout::decode_udp4_module)
            }
            AddressFamily::Ipv6 => {
                self.fetch_udp(family, ffi::UDP_TABLE_OWNER_MODULE, sorted, &layout::UDP6_OWNER_MODULE, layout::decode_udp6_module)
            }
        }
    }

    /// ARP / IP-net table entries. An empty ARP cache is an empty vec, not
    /// an error.
    pub fn arp_entries(&self, sorted: bool) -> Result<Vec<ArpEntry>, TableError> {
        match self.fetch_arp(sorted) {
            Err(TableError::Os {
                status: ffi::ERROR_NO_DATA,
                ..
            }) => Ok(Vec::new()),
            other => other,
        }
    }

    // ---- live dispatch (Windows) ----------------------------------------

    #[cfg(windows)]
    fn fetch_tcp<T>(
        &self,
        family: AddressFamily,
        class: u32,
        sorted: bool,
        layout: &TableLayout,
        decode: impl Fn(&[u8]) -> Result<T, TableError>,
    ) -> Result<Vec<T>, TableError> {
        self.fetch(
            "GetExtendedTcpTable",
            |ptr, size| unsafe {
                ffi::GetExtendedTcpTable(ptr, size, i32::from(sorted), family.af(), class, 0)
            },
            layout,
            decode,
        )
    }

    #[cfg(windows)]
    fn fetch_udp<T>(
        &self,
        family: AddressFamily,
        class: u32,
        sorted: bool,
        layout: &TableLayout,
        decode: impl Fn(&[u8]) -> Result<T, TableError>,
    ) -> Result<Vec<T>, TableError> {
        self.fetch(
            "GetExtendedUdpTable",
            |ptr, size| unsafe {
                ffi::GetExtendedUdpTable(ptr, size, i32::from(sorted), family.af(), class, 0)
            },
            layout,
            decode,
        )
    }

    #[cfg(windows)]
    fn fetch_arp(&self, sorted: bool) -> Result<Vec<ArpEntry>, TableError> {
        self.fetch(
            "GetIpNetTable",
            |ptr, size| unsafe { ffi::GetIpNetTable(ptr, size, i32::from(sorted)) },
            &layout::ARP,
            layout::decode_arp,
        )
    }

    // ---- shared fetch protocol (all targets) ----------------------------

    /// The shared fetch protocol: call into the scratch buffer, grow and
    /// retry on the resize signal, decode on success.
    ///
    /// The native call arrives as a closure, so this compiles on every
    /// target; only the closure builders above touch the FFI.
    #[cfg_attr(not(windows), allow(dead_code))]
    fn fetch<T>(
        &self,
        call_name: &'static str,
        call: impl Fn(*mut u8, *mut u32) -> u32,
        layout: &TableLayout,
        decode: impl Fn(&[u8]) -> Result<T, TableError>,
    ) -> Result<Vec<T>, TableError> {
        let mut buf = self.scratch.lock().unwrap();
        let mut last_reported = buf.len();

        for _ in 0..config::MAX_FETCH_ATTEMPTS {
            let mut size = buf.len() as u32;
            let status = call(buf.as_mut_ptr(), &mut size);
            match status {
                ffi::NO_ERROR => {
                    let used = (size as usize).min(buf.len());
                    return layout::parse_table(&buf[..used], layout, decode);
                }
                ffi::ERROR_INSUFFICIENT_BUFFER => {
                    let reported = size as usize;
                    let needed = reported + config::GROWTH_SLACK_BYTES;
                    if needed > config::MAX_BUFFER_BYTES {
                        return Err(TableError::BufferExceeded {
                            needed,
                            limit: config::MAX_BUFFER_BYTES,
                        });
                    }
                    tracing::debug!(
                        "{call_name}: growing table buffer {} -> {needed} bytes",
                        buf.len()
                    );
                    last_reported = reported;
                    buf.resize(needed, 0);
                }
                other => {
                    tracing::warn!("{call_name} failed with status {other}");
                    return Err(TableError::Os {
                        call: call_name,
                        status: other,
                    });
                }
            }
        }

        // The table outgrew the buffer on every attempt.
        Err(TableError::RetriesExhausted {
            attempts: config::MAX_FETCH_ATTEMPTS,
            needed: last_reported,
        })
    }

    // ---- non-Windows stubs ----------------------------------------------

    #[cfg(not(windows))]
    fn fetch_tcp<T>(
        &self,
        _family: AddressFamily,
        _class: u32,
        _sorted: bool,
        _layout: &TableLayout,
        _decode: impl Fn(&[u8]) -> Result<T, TableError>,
    ) -> Result<Vec<T>, TableError> {
        Err(TableError::Unsupported("GetExtendedTcpTable"))
    }

    #[cfg(not(windows))]
    fn fetch_udp<T>(
        &self,
        _family: AddressFamily,
        _class: u32,
        _sorted: bool,
        _layout: &TableLayout,
        _decode: impl Fn(&[u8]) -> Result<T, TableError>,
    ) -> Result<Vec<T>, TableError> {
        Err(TableError::Unsupported("GetExtendedUdpTable"))
    }

    #[cfg(not(windows))]
    fn fetch_arp(&self, _sorted: bool) -> Result<Vec<ArpEntry>, TableError> {
        Err(TableError::Unsupported("GetIpNetTable"))
    }
}

impl Default for TableReader {
    fn default() -> Self {
        Self::new()
    }
}
