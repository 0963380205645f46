//! Application input events.
//!
//! Inputs that drive the [`crate::App`] state machine: connection lifecycle
//! notifications from the client driver, plus periodic ticks from the host.
//! [`From<ChatEvent>`] lets a host loop forward the driver's event stream
//! without translation code of its own.

use std::time::Duration;

use rochat_client::ChatEvent;
use rochat_proto::ChatMessage;

/// Events processed by the App state machine.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Periodic tick.
    Tick,

    /// Connection attempt started.
    Connecting,

    /// Connected to the server.
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

    /// Reconnect attempts exhausted.
    ConnectionFailed {
        /// Attempts that were made.
        attempts: u32,
    },

    /// Message received (already moderated by the connection manager).
    MessageReceived(ChatMessage),

    /// Server-side verdict for a URL.
    LinkValidation {
        /// The URL that was checked.
        url: String,
        /// Whether the server judged it malicious.
        is_malicious: bool,
    },

    /// An outbound message was rejected by the connection manager.
    SendRejected {
        /// Why the message was rejected.
        reason: String,
    },

    /// Error occurred.
    Error {
        /// Error description.
        message: String,
    },
}

impl From<ChatEvent> for AppEvent {
    fn from(event: ChatEvent) -> Self {
        match event {
            ChatEvent::Connected => Self::Connected,
            ChatEvent::Disconnected => Self::Disconnected,
            ChatEvent::Reconnecting { attempt, delay } => Self::Reconnecting { attempt, delay },
            ChatEvent::Failed { attempts } => Self::ConnectionFailed { attempts },
            ChatEvent::MessageReceived(message) => Self::MessageReceived(message),
            ChatEvent::LinkValidation { url, is_malicious } => {
                Self::LinkValidation { url, is_malicious }
            },
            ChatEvent::Error { message } => Self::Error { message },
            ChatEvent::SendRejected { reason } => Self::SendRejected { reason },
        }
    }
}
