//! Connection management for RoChat
//!
//! Maintains a persistent session to a chat server: detects loss, recovers
//! with bounded linear backoff, and preserves delivery order of messages
//! submitted while offline. Outgoing and incoming content passes through the
//! moderation engine before it reaches the wire or the user.
//!
//! The crate follows a Sans-IO split:
//!
//! - [`ConnectionManager`]: pure state machine. Consumes
//!   [`ConnectionEvent`]s plus the current time and produces
//!   [`ConnectionAction`]s; owns the connection state and the outbound queue
//!   as one unit, so a single owner serializes every mutation.
//! - [`Transport`]: the external collaborator providing
//!   connect/send/receive/close. Real framing (TLS, WebSocket) lives behind
//!   this trait; an in-memory implementation ships for tests and simulation.
//! - [`spawn`]: tokio driver task that owns both, turning transport events
//!   into state machine inputs and executing the resulting actions.
//!   Callers hold a fire-and-forget [`ClientHandle`] and observe progress
//!   through a stream of [`ChatEvent`]s.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod config;
mod connection;
mod driver;
mod error;
mod event;
mod queue;
mod transport;

pub use config::{ConnectionConfig, NetworkConfig};
pub use connection::{ConnectionManager, ConnectionState};
pub use driver::{ClientHandle, spawn};
pub use error::ClientError;
pub use event::{ChatEvent, ConnectionAction, ConnectionEvent};
pub use queue::{OutboundQueue, QueueFull};
pub use transport::{MemoryPeer, MemoryTransport, Transport, TransportError, TransportEvent};
