//! Centralized tuning constants for table fetches.
//!
//! All buffer-lifecycle knobs are collected here so they can be found and
//! adjusted in a single place rather than scattered across modules.

/// Initial size of a reader's scratch buffer (bytes).
///
/// Large enough that a typical desktop's TCP table fits on the first call,
/// so most fetches never take the resize path.
pub const INITIAL_BUFFER_BYTES: usize = 16 * 1024;

/// Headroom added on top of the size the OS reports when growing the buffer.
/// Tables can gain rows between the size report and the retry; the slack
/// absorbs small growth without another round trip.
pub const GROWTH_SLACK_BYTES: usize = 1024;

/// Maximum native-call attempts per fetch before giving up with
/// `BufferExceeded`. Each failed attempt means the table outgrew the buffer
/// again in the window between two calls.
pub const MAX_FETCH_ATTEMPTS: usize = 4;

/// Ceiling on scratch-buffer growth (bytes). A runaway size report becomes
/// an error instead of an unbounded allocation.
pub const MAX_BUFFER_BYTES: usize = 64 * 1024 * 1024;
