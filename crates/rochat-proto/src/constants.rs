//! Constants governing client behavior.
//!
//! Limits and timing values shared across the workspace. Anything that a
//! server operator or test harness needs to agree on lives here rather than
//! scattered through the crates that enforce it.

use std::time::Duration;

/// Maximum accepted message length in characters.
pub const MAX_MESSAGE_LENGTH: usize = 1000;

/// Minimum accepted message length in characters.
pub const MIN_MESSAGE_LENGTH: usize = 1;

/// Per-channel history cap. Oldest messages are evicted first.
pub const MAX_HISTORY_SIZE: usize = 100;

/// Default server port.
pub const DEFAULT_PORT: u16 = 8443;

/// Maximum number of reconnect attempts before giving up.
pub const RECONNECT_ATTEMPTS: u32 = 5;

/// Linear backoff unit: the Nth reconnect attempt waits `N * this`.
pub const RECONNECT_DELAY: Duration = Duration::from_millis(3000);

/// Time allowed for a single connect attempt to complete.
pub const CONNECTION_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Outbound messages queued while disconnected are capped at this count.
/// Exceeding it surfaces a typed rejection, never a silent drop.
pub const MAX_PENDING_MESSAGES: usize = 256;

/// Reputation scores below this are treated as malicious.
pub const MALICIOUS_LINK_THRESHOLD: f32 = 0.8;

/// Declared upper bound on shared image size in megabytes.
///
/// Not yet enforced by image validation, which is magic-bytes only.
pub const MAX_IMAGE_SIZE_MB: usize = 10;

/// Declared upper bound on shared image width/height in pixels.
///
/// Not yet enforced by image validation, which is magic-bytes only.
pub const MAX_IMAGE_DIMENSION: u32 = 4096;
