//! Tokio driver for the connection manager.
//!
//! One spawned task owns the [`ConnectionManager`] and the [`Transport`]
//! together, which is what serializes state transitions and queue mutations:
//! caller intents arrive over a command channel, transport callbacks over
//! the transport's event stream, and both are funneled through the same
//! `handle` call. No caller operation blocks — `connect_to_server`,
//! `send_message`, and `disconnect` enqueue a command and return; outcomes
//! arrive asynchronously as [`ChatEvent`]s.

use std::collections::VecDeque;

use rochat_moderation::ModerationEngine;
use rochat_proto::ChatMessage;
use tokio::{sync::mpsc, time::Instant};
use tracing::{debug, warn};

use crate::{
    config::ConnectionConfig,
    connection::ConnectionManager,
    event::{ChatEvent, ConnectionAction, ConnectionEvent},
    transport::{Transport, TransportEvent},
};

/// How often the driver ticks the state machine for deadline processing.
const TICK_INTERVAL: std::time::Duration = std::time::Duration::from_millis(100);

/// Caller intents, translated 1:1 into state machine events.
#[derive(Debug)]
enum Command {
    Connect { address: String, port: u16 },
    Disconnect,
    Send(ChatMessage),
}

/// Fire-and-forget handle to a running connection task.
///
/// Cheap to clone. When every handle is dropped the task drains its command
/// queue and exits.
#[derive(Debug, Clone)]
pub struct ClientHandle {
    commands: mpsc::UnboundedSender<Command>,
}

impl ClientHandle {
    /// Request a connection to the given server. Progress arrives as
    /// [`ChatEvent`]s.
    pub fn connect_to_server(&self, address: impl Into<String>, port: u16) {
        self.command(Command::Connect { address: address.into(), port });
    }

    /// Request an orderly disconnect, cancelling any pending reconnect.
    pub fn disconnect(&self) {
        self.command(Command::Disconnect);
    }

    /// Submit a message for delivery. Queued while not connected; never
    /// silently dropped.
    pub fn send_message(&self, message: ChatMessage) {
        self.command(Command::Send(message));
    }

    fn command(&self, command: Command) {
        if self.commands.send(command).is_err() {
            debug!("connection task is gone, command ignored");
        }
    }
}

/// Spawn a connection task over the given transport.
///
/// Returns the caller handle and the stream of events published to the UI
/// collaborator. Must be called within a tokio runtime.
pub fn spawn<T: Transport>(
    transport: T,
    moderation: ModerationEngine,
    config: ConnectionConfig,
) -> (ClientHandle, mpsc::UnboundedReceiver<ChatEvent>) {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    tokio::spawn(run(transport, moderation, config, command_rx, event_tx));

    (ClientHandle { commands: command_tx }, event_rx)
}

/// Event loop: translate inputs, run the state machine, execute actions.
async fn run<T: Transport>(
    mut transport: T,
    moderation: ModerationEngine,
    config: ConnectionConfig,
    mut commands: mpsc::UnboundedReceiver<Command>,
    events: mpsc::UnboundedSender<ChatEvent>,
) {
    let mut manager: ConnectionManager<Instant> = ConnectionManager::new(config, moderation);
    let mut ticker = tokio::time::interval(TICK_INTERVAL);

    // Events produced while executing actions (e.g. a dial that fails on
    // the spot) are processed before anything new is polled.
    let mut inbox: VecDeque<ConnectionEvent> = VecDeque::new();

    loop {
        let event = if let Some(event) = inbox.pop_front() {
            event
        } else {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Connect { address, port }) => {
                        ConnectionEvent::ConnectRequested { address, port }
                    },
                    Some(Command::Disconnect) => ConnectionEvent::DisconnectRequested,
                    Some(Command::Send(message)) => ConnectionEvent::SendRequested(message),
                    None => break, // every handle dropped
                },
                transport_event = transport.recv() => match transport_event {
                    Some(TransportEvent::Opened) => ConnectionEvent::TransportConnected,
                    Some(TransportEvent::Closed) => ConnectionEvent::TransportDisconnected,
                    Some(TransportEvent::Frame(text)) => ConnectionEvent::FrameReceived(text),
                    Some(TransportEvent::Error(message)) => {
                        ConnectionEvent::TransportError { message }
                    },
                    None => break, // transport permanently gone
                },
                _ = ticker.tick() => ConnectionEvent::Tick,
            }
        };

        let actions = match manager.handle(event, Instant::now()) {
            Ok(actions) => actions,
            Err(e) => {
                let _ = events.send(ChatEvent::Error { message: e.to_string() });
                continue;
            },
        };

        for action in actions {
            match action {
                ConnectionAction::Dial { address, port } => {
                    if let Err(e) = transport.connect(&address, port).await {
                        inbox.push_back(ConnectionEvent::TransportError {
                            message: e.to_string(),
                        });
                    }
                },
                ConnectionAction::CloseTransport => transport.close().await,
                ConnectionAction::Transmit(frame) => {
                    if let Err(e) = transport.send(frame).await {
                        // Loss is detected through the transport's own
                        // lifecycle events, not the send result.
                        warn!(error = %e, "frame send failed");
                    }
                },
                ConnectionAction::Deliver(message) => {
                    let _ = events.send(ChatEvent::MessageReceived(message));
                },
                ConnectionAction::Notify(event) => {
                    let _ = events.send(event);
                },
                ConnectionAction::Log { message } => debug!("{message}"),
            }
        }
    }

    debug!("connection task stopped");
}
