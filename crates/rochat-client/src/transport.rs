//! Transport abstraction.
//!
//! The connection manager never touches sockets; it talks to a [`Transport`]
//! collaborator exposing connect/send/receive/close. Production
//! implementations wrap whatever framing the deployment uses (TLS
//! WebSockets, QUIC); this crate ships [`MemoryTransport`], a channel-backed
//! implementation for tests and deterministic simulation.

use std::future::Future;

use thiserror::Error;
use tokio::sync::mpsc;

/// Transport-level failures.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Dial could not be initiated.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Sending a frame failed.
    #[error("stream error: {0}")]
    Stream(String),
}

/// Lifecycle and data events a transport reports.
///
/// These are discrete lifecycle notifications: the state machine transitions
/// on `Opened`/`Closed`, treats `Error` as a dial failure only while
/// connecting, and decodes `Frame` contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Connection established.
    Opened,

    /// Connection lost or closed by the peer.
    Closed,

    /// A text frame arrived.
    Frame(String),

    /// Lifecycle-level failure (e.g. dial refused).
    Error(String),
}

/// External transport collaborator.
///
/// `recv` must pend while there is nothing to report and return `None` only
/// when the transport is gone for good; the driver exits its loop on `None`.
/// `connect` initiates a dial and returns once it is underway — the outcome
/// arrives later as an `Opened`, `Closed`, or `Error` event.
pub trait Transport: Send + 'static {
    /// Implementation-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Start connecting to the given endpoint.
    fn connect(
        &mut self,
        address: &str,
        port: u16,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Send a text frame.
    fn send(&mut self, frame: String) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Next transport event. Pends while idle; `None` means the transport
    /// is permanently gone.
    fn recv(&mut self) -> impl Future<Output = Option<TransportEvent>> + Send;

    /// Tear down the current connection, cancelling an in-flight dial.
    fn close(&mut self) -> impl Future<Output = ()> + Send;
}

/// Channel-backed transport for tests and simulation.
///
/// The paired [`MemoryPeer`] plays the far side: it observes dials and sent
/// frames and injects lifecycle events, so a test script can stand in for a
/// server or a flaky network.
#[derive(Debug)]
pub struct MemoryTransport {
    events: mpsc::UnboundedReceiver<TransportEvent>,
    frames: mpsc::UnboundedSender<String>,
    dials: mpsc::UnboundedSender<(String, u16)>,
}

impl MemoryTransport {
    /// Create a transport and its controlling peer.
    pub fn pair() -> (Self, MemoryPeer) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (frame_tx, frame_rx) = mpsc::unbounded_channel();
        let (dial_tx, dial_rx) = mpsc::unbounded_channel();

        let transport = Self { events: event_rx, frames: frame_tx, dials: dial_tx };
        let peer = MemoryPeer { events: event_tx, frames: frame_rx, dials: dial_rx };
        (transport, peer)
    }
}

impl Transport for MemoryTransport {
    type Error = TransportError;

    async fn connect(&mut self, address: &str, port: u16) -> Result<(), TransportError> {
        self.dials
            .send((address.to_string(), port))
            .map_err(|_| TransportError::Connection("peer gone".to_string()))
    }

    async fn send(&mut self, frame: String) -> Result<(), TransportError> {
        self.frames.send(frame).map_err(|_| TransportError::Stream("peer gone".to_string()))
    }

    async fn recv(&mut self) -> Option<TransportEvent> {
        self.events.recv().await
    }

    async fn close(&mut self) {
        // Nothing to tear down; the peer decides when Closed is observed.
    }
}

/// Far side of a [`MemoryTransport`].
#[derive(Debug)]
pub struct MemoryPeer {
    events: mpsc::UnboundedSender<TransportEvent>,
    frames: mpsc::UnboundedReceiver<String>,
    dials: mpsc::UnboundedReceiver<(String, u16)>,
}

impl MemoryPeer {
    /// Report the connection as established.
    pub fn open(&self) {
        let _ = self.events.send(TransportEvent::Opened);
    }

    /// Report the connection as lost.
    pub fn close_link(&self) {
        let _ = self.events.send(TransportEvent::Closed);
    }

    /// Report a lifecycle-level failure.
    pub fn error(&self, message: impl Into<String>) {
        let _ = self.events.send(TransportEvent::Error(message.into()));
    }

    /// Deliver an inbound text frame to the client.
    pub fn deliver(&self, frame: impl Into<String>) {
        let _ = self.events.send(TransportEvent::Frame(frame.into()));
    }

    /// Next dial the client initiated.
    pub async fn next_dial(&mut self) -> Option<(String, u16)> {
        self.dials.recv().await
    }

    /// Next frame the client transmitted.
    pub async fn next_frame(&mut self) -> Option<String> {
        self.frames.recv().await
    }

    /// Dial already recorded, if any, without waiting.
    pub fn try_next_dial(&mut self) -> Option<(String, u16)> {
        self.dials.try_recv().ok()
    }
}
