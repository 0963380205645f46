//! Connection and network configuration.

use std::time::Duration;

use rochat_proto::constants;

/// Tuning for the reconnect state machine.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Maximum reconnect attempts before giving up.
    pub reconnect_attempts: u32,

    /// Linear backoff unit: attempt N waits `N * reconnect_delay`.
    pub reconnect_delay: Duration,

    /// Time allowed for a single connect attempt before it is treated as
    /// failed.
    pub connect_timeout: Duration,

    /// Cap on messages held while not connected.
    pub max_pending: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            reconnect_attempts: constants::RECONNECT_ATTEMPTS,
            reconnect_delay: constants::RECONNECT_DELAY,
            connect_timeout: constants::CONNECTION_TIMEOUT,
            max_pending: constants::MAX_PENDING_MESSAGES,
        }
    }
}

/// Where and how to reach the server.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Server hostname or address.
    pub address: String,

    /// Server port.
    pub port: u16,

    /// Connect over TLS. The transport collaborator interprets this; the
    /// state machine does not care.
    pub use_tls: bool,

    /// Reconnect tuning.
    pub connection: ConnectionConfig,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            address: "localhost".to_string(),
            port: constants::DEFAULT_PORT,
            use_tls: true,
            connection: ConnectionConfig::default(),
        }
    }
}
