//! Unified error type for table queries.
//!
//! `TableError` is returned by every live query on [`crate::TableReader`] and
//! by the decode layer. It serializes as `{ "kind": "...", "message": "..." }`
//! so callers embedding the records in an IPC or JSON surface can distinguish
//! error categories programmatically.

use serde::ser::SerializeStruct;

/// Error produced by a table fetch or decode.
///
/// The native call has exactly two failure shapes: the resize signal
/// (handled internally by growing the buffer) and any other non-zero status,
/// surfaced opaquely as [`TableError::Os`]. Everything else here is our own
/// guard rails around buffer growth and blob decoding.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// The native call failed with a status other than the resize signal.
    #[error("{call} failed with status {status}")]
    Os { call: &'static str, status: u32 },

    /// The reported table size would push the buffer past its ceiling.
    #[error("table needs {needed} bytes but the buffer is capped at {limit}")]
    BufferExceeded { needed: usize, limit: usize },

    /// The table kept outgrowing the buffer across every allowed attempt.
    #[error("table still did not fit after {attempts} attempts (native last asked for {needed} bytes)")]
    RetriesExhausted { attempts: usize, needed: usize },

    /// The blob ended before the rows its entry count promised.
    #[error("table blob truncated: {0}")]
    Truncated(String),

    /// A TCP row carried a state value outside the 12 defined MIB states.
    #[error("unrecognized TCP state value {0}")]
    BadState(u32),

    /// The query only exists on Windows.
    #[error("{0} is only available on Windows")]
    Unsupported(&'static str),
}

impl TableError {
    /// Returns the error kind as a string matching the variant name.
    pub fn kind(&self) -> &'static str {
        match self {
            TableError::Os { .. } => "Os",
            TableError::BufferExceeded { .. } => "BufferExceeded",
            TableError::RetriesExhausted { .. } => "RetriesExhausted",
            TableError::Truncated(_) => "Truncated",
            TableError::BadState(_) => "BadState",
            TableError::Unsupported(_) => "Unsupported",
        }
    }
}

/// Custom Serialize: produces `{ "kind": "Variant", "message": "..." }`.
impl serde::Serialize for TableError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut s = serializer.serialize_struct("TableError", 2)?;
        s.serialize_field("kind", self.kind())?;
        s.serialize_field("message", &self.to_string())?;
        s.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_returns_correct_variant_name() {
        assert_eq!(
            TableError::Os {
                call: "GetIpNetTable",
                status: 5
            }
            .kind(),
            "Os"
        );
        assert_eq!(
            TableError::BufferExceeded {
                needed: 1,
                limit: 0
            }
            .kind(),
            "BufferExceeded"
        );
        assert_eq!(
            TableError::RetriesExhausted {
                attempts: 4,
                needed: 64
            }
            .kind(),
            "RetriesExhausted"
        );
        assert_eq!(TableError::Truncated("short".into()).kind(), "Truncated");
        assert_eq!(TableError::BadState(99).kind(), "BadState");
        assert_eq!(TableError::Unsupported("tcp_rows").kind(), "Unsupported");
    }

    #[test]
    fn test_error_display_names_the_failed_call() {
        let err = TableError::Os {
            call: "GetExtendedTcpTable",
            status: 87,
        };
        assert_eq!(
            err.to_string(),
            "GetExtendedTcpTable failed with status 87"
        );
    }

    #[test]
    fn test_error_serializes_as_kind_and_message() {
        let err = TableError::BadState(42);
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "BadState");
        assert_eq!(json["message"], "unrecognized TCP state value 42");
    }

    #[test]
    fn test_all_variants_serialize_with_two_fields() {
        let variants: Vec<TableError> = vec![
            TableError::Os {
                call: "GetExtendedUdpTable",
                status: 1,
            },
            TableError::BufferExceeded {
                needed: 128,
                limit: 64,
            },
            TableError::RetriesExhausted {
                attempts: 4,
                needed: 128,
            },
            TableError::Truncated("t".into()),
            TableError::BadState(0),
            TableError::Unsupported("arp_entries"),
        ];
        for err in variants {
            let json = serde_json::to_value(&err).unwrap();
            let obj = json.as_object().unwrap();
            assert_eq!(obj.len(), 2, "Expected exactly 2 fields for {err:?}");
            assert!(obj.contains_key("kind"));
            assert!(obj.contains_key("message"));
        }
    }
}
