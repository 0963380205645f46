//! Connection manager events and actions.

use std::time::Duration;

use rochat_proto::ChatMessage;

/// Inputs the driver feeds into the connection state machine.
///
/// Two sources: caller intents (connect, disconnect, send) and transport
/// lifecycle callbacks. The driver also ticks periodically so the machine
/// can fire its reconnect deadline and connect timeout.
#[derive(Debug, Clone)]
pub enum ConnectionEvent {
    /// Caller wants a connection to the given server.
    ConnectRequested {
        /// Server hostname or address.
        address: String,
        /// Server port.
        port: u16,
    },

    /// Caller wants the connection closed. Cancels any pending reconnect.
    DisconnectRequested,

    /// Caller wants a message delivered. Queued when not connected.
    SendRequested(ChatMessage),

    /// Transport established a connection.
    TransportConnected,

    /// Transport lost its connection.
    TransportDisconnected,

    /// Transport reported a lifecycle-level failure (e.g. the dial itself
    /// failed).
    TransportError {
        /// Human-readable failure description.
        message: String,
    },

    /// A text frame arrived from the transport.
    FrameReceived(String),

    /// Periodic tick for deadline processing.
    Tick,
}

/// Actions the state machine produces for the driver to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionAction {
    /// Open a transport connection to the given endpoint.
    Dial {
        /// Server hostname or address.
        address: String,
        /// Server port.
        port: u16,
    },

    /// Close the transport connection.
    CloseTransport,

    /// Put an encoded frame on the wire.
    Transmit(String),

    /// Hand a decoded, moderated message to the UI collaborator.
    Deliver(ChatMessage),

    /// Publish a lifecycle or diagnostic event to the UI collaborator.
    Notify(ChatEvent),

    /// Log a diagnostic message.
    Log {
        /// Log message.
        message: String,
    },
}

/// Events published to the UI collaborator.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    /// Connection established; queued messages have been flushed.
    Connected,

    /// Connection lost or closed.
    Disconnected,

    /// A reconnect attempt is scheduled.
    Reconnecting {
        /// Attempt number, starting at 1.
        attempt: u32,
        /// Delay before the attempt fires.
        delay: Duration,
    },

    /// Reconnect attempts are exhausted; a new explicit connect request is
    /// required.
    Failed {
        /// Attempts that were made.
        attempts: u32,
    },

    /// A chat message arrived, already filtered by moderation.
    MessageReceived(ChatMessage),

    /// Server-side verdict for a URL.
    LinkValidation {
        /// The URL that was checked.
        url: String,
        /// Whether the server judged it malicious.
        is_malicious: bool,
    },

    /// A transport or protocol error worth surfacing.
    Error {
        /// Human-readable description.
        message: String,
    },

    /// An outbound message was rejected instead of queued.
    SendRejected {
        /// Why the message was rejected.
        reason: String,
    },
}
