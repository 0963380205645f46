//! Connection lifecycle state machine.
//!
//! Owns the transport session state, the outbound queue, and the
//! reconnect-with-backoff policy. Uses the action pattern: methods take the
//! current time as input and return actions for the driver to execute,
//! keeping the state machine pure (no I/O) and testable with virtual time.
//!
//! # State Machine
//!
//! ```text
//!                 connect                   transport connected
//! ┌──────────────┐ ──────> ┌────────────┐ ────────────────────> ┌───────────┐
//! │ Disconnected │         │ Connecting │                       │ Connected │
//! └──────────────┘         └────────────┘ <──┐                  └───────────┘
//!        ^                   │    │  │       │ deadline               │
//!        │          error    │    │  └───────┼────────┐   disconnected│
//!        │ explicit          │    │ disconnected /    │               │
//!        │ disconnect        v    v connect timeout   │               v
//!        │ (any state)  ┌────────┐          ┌──────────────┐ <────────┘
//!        └───────────── │ Failed │ <─────── │ Reconnecting │   (attempts left)
//!                       └────────┘ exhausted└──────────────┘
//! ```
//!
//! Attempt N waits `N * reconnect_delay` (linear backoff). Once attempts are
//! exhausted the machine parks in `Failed` until an explicit new connect
//! request; nothing fires on its own.
//!
//! Moderation runs inside the machine, synchronously, in both directions:
//! outbound content is link-stripped before it is transmitted or queued,
//! inbound content before it is delivered.

use std::{
    ops::{Add, Sub},
    time::{Duration, Instant},
};

use rochat_moderation::ModerationEngine;
use rochat_proto::{ChatMessage, WireFrame};

use crate::{
    config::ConnectionConfig,
    error::ClientError,
    event::{ChatEvent, ConnectionAction, ConnectionEvent},
    queue::OutboundQueue,
};

/// Connection state. Transitions happen only inside
/// [`ConnectionManager::handle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No connection and none wanted.
    Disconnected,
    /// Dial in progress.
    Connecting,
    /// Session established.
    Connected,
    /// Waiting out a backoff delay before redialing.
    Reconnecting,
    /// Reconnect attempts exhausted or dial failed; waiting for an explicit
    /// connect request.
    Failed,
}

/// Remembered dial target for reconnects.
#[derive(Debug, Clone)]
struct Endpoint {
    address: String,
    port: u16,
}

/// Connection manager state machine.
///
/// Generic over the instant type `I` to support both real time and virtual
/// time in tests. The outbound queue and the connection state live in one
/// structure mutated only through [`handle`](Self::handle), so whoever owns
/// the manager serializes every transition and queue mutation as one atomic
/// unit.
#[derive(Debug)]
pub struct ConnectionManager<I = Instant>
where
    I: Copy + Ord + Add<Duration, Output = I> + Sub<Output = Duration>,
{
    state: ConnectionState,
    config: ConnectionConfig,
    moderation: ModerationEngine,
    endpoint: Option<Endpoint>,
    queue: OutboundQueue,
    /// Reconnect counter in `[0, reconnect_attempts]`; reset on successful
    /// connect.
    attempts: u32,
    /// Deadline for the next redial while `Reconnecting`.
    retry_at: Option<I>,
    /// When the in-flight dial started, for the connect timeout.
    dial_started: Option<I>,
}

impl<I> ConnectionManager<I>
where
    I: Copy + Ord + Add<Duration, Output = I> + Sub<Output = Duration>,
{
    /// Create a manager in [`ConnectionState::Disconnected`].
    pub fn new(config: ConnectionConfig, moderation: ModerationEngine) -> Self {
        let queue = OutboundQueue::new(config.max_pending);
        Self {
            state: ConnectionState::Disconnected,
            config,
            moderation,
            endpoint: None,
            queue,
            attempts: 0,
            retry_at: None,
            dial_started: None,
        }
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Messages waiting for the next `Connected` transition.
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Reconnect attempts made since the last successful connect.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// The moderation engine this manager consults.
    pub fn moderation(&self) -> &ModerationEngine {
        &self.moderation
    }

    /// Process an event at time `now` and return resulting actions.
    pub fn handle(
        &mut self,
        event: ConnectionEvent,
        now: I,
    ) -> Result<Vec<ConnectionAction>, ClientError> {
        match event {
            ConnectionEvent::ConnectRequested { address, port } => {
                self.handle_connect(address, port, now)
            },
            ConnectionEvent::DisconnectRequested => Ok(self.handle_disconnect()),
            ConnectionEvent::SendRequested(message) => Ok(self.handle_send(message)),
            ConnectionEvent::TransportConnected => Ok(self.handle_transport_connected()),
            ConnectionEvent::TransportDisconnected => {
                Ok(self.handle_transport_disconnected(now))
            },
            ConnectionEvent::TransportError { message } => {
                Ok(self.handle_transport_error(message))
            },
            ConnectionEvent::FrameReceived(text) => Ok(self.handle_frame(&text)),
            ConnectionEvent::Tick => Ok(self.handle_tick(now)),
        }
    }

    fn handle_connect(
        &mut self,
        address: String,
        port: u16,
        now: I,
    ) -> Result<Vec<ConnectionAction>, ClientError> {
        match self.state {
            ConnectionState::Disconnected | ConnectionState::Failed => {
                self.endpoint = Some(Endpoint { address: address.clone(), port });
                self.attempts = 0;
                self.retry_at = None;
                self.dial_started = Some(now);
                self.state = ConnectionState::Connecting;

                Ok(vec![
                    ConnectionAction::Log { message: format!("connecting to {address}:{port}") },
                    ConnectionAction::Dial { address, port },
                ])
            },
            state => Err(ClientError::InvalidState { state, operation: "connect" }),
        }
    }

    fn handle_disconnect(&mut self) -> Vec<ConnectionAction> {
        let was_idle = self.state == ConnectionState::Disconnected;

        self.state = ConnectionState::Disconnected;
        self.retry_at = None;
        self.dial_started = None;
        self.attempts = 0;

        if was_idle {
            vec![]
        } else {
            // Queued messages are kept; they flush on the next connect.
            vec![
                ConnectionAction::CloseTransport,
                ConnectionAction::Notify(ChatEvent::Disconnected),
            ]
        }
    }

    fn handle_send(&mut self, mut message: ChatMessage) -> Vec<ConnectionAction> {
        // Outbound link stripping happens before the message can reach the
        // wire or the queue.
        let filtered = self.moderation.filter_content(&message.content);
        let links = self.moderation.extract_links(&filtered);
        message.set_content(filtered, links);

        if self.state == ConnectionState::Connected {
            self.transmit(&message)
        } else {
            match self.queue.push(message) {
                Ok(()) => vec![ConnectionAction::Log {
                    message: format!(
                        "not connected, message queued ({} pending)",
                        self.queue.len()
                    ),
                }],
                Err(e) => vec![ConnectionAction::Notify(ChatEvent::SendRejected {
                    reason: e.to_string(),
                })],
            }
        }
    }

    fn transmit(&self, message: &ChatMessage) -> Vec<ConnectionAction> {
        match WireFrame::from_message(message).encode() {
            Ok(text) => vec![ConnectionAction::Transmit(text)],
            Err(e) => vec![ConnectionAction::Notify(ChatEvent::Error {
                message: format!("failed to encode outbound message: {e}"),
            })],
        }
    }

    fn handle_transport_connected(&mut self) -> Vec<ConnectionAction> {
        if self.state != ConnectionState::Connecting {
            return vec![ConnectionAction::Log {
                message: format!("ignoring transport connect in state {:?}", self.state),
            }];
        }

        self.state = ConnectionState::Connected;
        self.attempts = 0;
        self.retry_at = None;
        self.dial_started = None;

        let mut actions = vec![ConnectionAction::Notify(ChatEvent::Connected)];

        // Flush deferred messages strictly in enqueue order.
        for message in self.queue.drain() {
            actions.extend(self.transmit(&message));
        }

        actions
    }

    fn handle_transport_disconnected(&mut self, now: I) -> Vec<ConnectionAction> {
        match self.state {
            ConnectionState::Connected | ConnectionState::Connecting => {
                let mut actions = vec![ConnectionAction::Notify(ChatEvent::Disconnected)];
                actions.extend(self.schedule_retry(now));
                actions
            },
            state => vec![ConnectionAction::Log {
                message: format!("ignoring transport disconnect in state {state:?}"),
            }],
        }
    }

    /// Book a reconnect attempt, or give up when the budget is spent.
    fn schedule_retry(&mut self, now: I) -> Vec<ConnectionAction> {
        self.dial_started = None;

        if self.attempts < self.config.reconnect_attempts {
            self.attempts += 1;
            let delay = self.config.reconnect_delay * self.attempts;
            self.retry_at = Some(now + delay);
            self.state = ConnectionState::Reconnecting;

            vec![
                ConnectionAction::Log {
                    message: format!(
                        "reconnecting in {}ms (attempt {})",
                        delay.as_millis(),
                        self.attempts
                    ),
                },
                ConnectionAction::Notify(ChatEvent::Reconnecting {
                    attempt: self.attempts,
                    delay,
                }),
            ]
        } else {
            self.retry_at = None;
            self.state = ConnectionState::Failed;

            vec![
                ConnectionAction::Log { message: "max reconnect attempts reached".to_string() },
                ConnectionAction::Notify(ChatEvent::Failed { attempts: self.attempts }),
            ]
        }
    }

    fn handle_transport_error(&mut self, message: String) -> Vec<ConnectionAction> {
        if self.state == ConnectionState::Connecting {
            // A failed dial is a lifecycle event, not a stray error code.
            self.state = ConnectionState::Failed;
            self.retry_at = None;
            self.dial_started = None;

            vec![
                ConnectionAction::Notify(ChatEvent::Error { message }),
                ConnectionAction::Notify(ChatEvent::Failed { attempts: self.attempts }),
            ]
        } else {
            // Surfaced only; connected/disconnected events drive transitions.
            vec![ConnectionAction::Notify(ChatEvent::Error { message })]
        }
    }

    fn handle_frame(&mut self, text: &str) -> Vec<ConnectionAction> {
        match WireFrame::decode(text) {
            Ok(WireFrame::Message { id, sender, content, server_id, timestamp }) => {
                let mut message = ChatMessage::received(id, sender, content, server_id, timestamp);

                let filtered = self.moderation.filter_content(&message.content);
                let links = self.moderation.extract_links(&filtered);
                message.set_content(filtered, links);

                vec![ConnectionAction::Deliver(message)]
            },
            Ok(WireFrame::LinkValidation { url, is_malicious }) => {
                vec![ConnectionAction::Notify(ChatEvent::LinkValidation { url, is_malicious })]
            },
            Err(e) => vec![ConnectionAction::Log {
                message: format!("dropping inbound frame: {e}"),
            }],
        }
    }

    fn handle_tick(&mut self, now: I) -> Vec<ConnectionAction> {
        match self.state {
            ConnectionState::Reconnecting => {
                let due = self.retry_at.is_some_and(|at| now >= at);
                if !due {
                    return vec![];
                }
                self.retry_at = None;

                let Some(endpoint) = self.endpoint.clone() else {
                    // Unreachable in practice: Reconnecting requires a prior
                    // connect, which recorded the endpoint.
                    self.state = ConnectionState::Failed;
                    return vec![ConnectionAction::Log {
                        message: "no endpoint recorded for reconnect".to_string(),
                    }];
                };

                self.state = ConnectionState::Connecting;
                self.dial_started = Some(now);

                vec![
                    ConnectionAction::Log {
                        message: format!("reconnect attempt {} firing", self.attempts),
                    },
                    ConnectionAction::Dial { address: endpoint.address, port: endpoint.port },
                ]
            },
            ConnectionState::Connecting => {
                let timed_out = self
                    .dial_started
                    .is_some_and(|started| now - started > self.config.connect_timeout);
                if !timed_out {
                    return vec![];
                }

                let mut actions = vec![
                    ConnectionAction::Log { message: "connect attempt timed out".to_string() },
                    ConnectionAction::CloseTransport,
                ];
                actions.extend(self.schedule_retry(now));
                actions
            },
            _ => vec![],
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn manager() -> ConnectionManager {
        ConnectionManager::new(ConnectionConfig::default(), ModerationEngine::default())
    }

    fn connect(m: &mut ConnectionManager, now: Instant) {
        m.handle(
            ConnectionEvent::ConnectRequested { address: "chat.example".to_string(), port: 8443 },
            now,
        )
        .unwrap();
        m.handle(ConnectionEvent::TransportConnected, now).unwrap();
        assert_eq!(m.state(), ConnectionState::Connected);
    }

    fn msg(content: &str) -> ChatMessage {
        ChatMessage::new("alice", content, "general")
    }

    #[test]
    fn connect_dials_and_reaches_connected() {
        let mut m = manager();
        let t0 = Instant::now();

        let actions = m
            .handle(
                ConnectionEvent::ConnectRequested {
                    address: "chat.example".to_string(),
                    port: 8443,
                },
                t0,
            )
            .unwrap();
        assert_eq!(m.state(), ConnectionState::Connecting);
        assert!(actions.iter().any(|a| matches!(
            a,
            ConnectionAction::Dial { address, port: 8443 } if address == "chat.example"
        )));

        let actions = m.handle(ConnectionEvent::TransportConnected, t0).unwrap();
        assert_eq!(m.state(), ConnectionState::Connected);
        assert!(actions.contains(&ConnectionAction::Notify(ChatEvent::Connected)));
    }

    #[test]
    fn connect_while_connected_is_invalid() {
        let mut m = manager();
        let t0 = Instant::now();
        connect(&mut m, t0);

        let result = m.handle(
            ConnectionEvent::ConnectRequested { address: "other".to_string(), port: 1 },
            t0,
        );
        assert!(matches!(result, Err(ClientError::InvalidState { .. })));
    }

    #[test]
    fn send_while_connected_transmits_immediately() {
        let mut m = manager();
        let t0 = Instant::now();
        connect(&mut m, t0);

        let actions = m.handle(ConnectionEvent::SendRequested(msg("hello")), t0).unwrap();
        assert_eq!(actions.len(), 1);
        match &actions[0] {
            ConnectionAction::Transmit(text) => {
                assert!(text.contains("\"content\":\"hello\""));
            },
            other => panic!("expected Transmit, got {other:?}"),
        }
        assert_eq!(m.queued(), 0);
    }

    #[test]
    fn send_while_disconnected_queues_in_order() {
        let mut m = manager();
        let t0 = Instant::now();

        for n in 0..3 {
            m.handle(ConnectionEvent::SendRequested(msg(&format!("m{n}"))), t0).unwrap();
        }
        assert_eq!(m.queued(), 3);

        // Reaching Connected flushes strictly FIFO.
        m.handle(
            ConnectionEvent::ConnectRequested { address: "chat.example".to_string(), port: 8443 },
            t0,
        )
        .unwrap();
        let actions = m.handle(ConnectionEvent::TransportConnected, t0).unwrap();

        let frames: Vec<&String> = actions
            .iter()
            .filter_map(|a| match a {
                ConnectionAction::Transmit(text) => Some(text),
                _ => None,
            })
            .collect();
        assert_eq!(frames.len(), 3);
        for (n, frame) in frames.iter().enumerate() {
            assert!(frame.contains(&format!("m{n}")), "frame {n} out of order: {frame}");
        }
        assert_eq!(m.queued(), 0);
    }

    #[test]
    fn queue_overflow_is_rejected_not_dropped() {
        let config = ConnectionConfig { max_pending: 2, ..ConnectionConfig::default() };
        let mut m: ConnectionManager =
            ConnectionManager::new(config, ModerationEngine::default());
        let t0 = Instant::now();

        m.handle(ConnectionEvent::SendRequested(msg("a")), t0).unwrap();
        m.handle(ConnectionEvent::SendRequested(msg("b")), t0).unwrap();
        let actions = m.handle(ConnectionEvent::SendRequested(msg("c")), t0).unwrap();

        assert!(actions.iter().any(|a| matches!(
            a,
            ConnectionAction::Notify(ChatEvent::SendRejected { .. })
        )));
        assert_eq!(m.queued(), 2);
    }

    #[test]
    fn outbound_content_is_link_stripped() {
        let mut m = manager();
        let t0 = Instant::now();
        connect(&mut m, t0);

        let actions = m
            .handle(ConnectionEvent::SendRequested(msg("go http://malicious.com/x now")), t0)
            .unwrap();
        match &actions[0] {
            ConnectionAction::Transmit(text) => {
                assert!(!text.contains("malicious.com"));
                assert!(text.contains("[REMOVED - MALICIOUS LINK]"));
            },
            other => panic!("expected Transmit, got {other:?}"),
        }
    }

    #[test]
    fn inbound_message_is_filtered_and_delivered() {
        let mut m = manager();
        let t0 = Instant::now();
        connect(&mut m, t0);

        let frame = r#"{"type":"message","id":"1","sender":"bob","content":"see http://malicious.com/p","serverId":"general","timestamp":"2024-05-01T10:00:00Z"}"#;
        let actions =
            m.handle(ConnectionEvent::FrameReceived(frame.to_string()), t0).unwrap();

        assert_eq!(actions.len(), 1);
        match &actions[0] {
            ConnectionAction::Deliver(message) => {
                assert_eq!(message.sender, "bob");
                assert_eq!(message.channel_id, "general");
                assert_eq!(message.content, "see [REMOVED - MALICIOUS LINK]");
                assert!(!message.contains_link);
            },
            other => panic!("expected Deliver, got {other:?}"),
        }
    }

    #[test]
    fn inbound_link_validation_is_surfaced() {
        let mut m = manager();
        let t0 = Instant::now();
        connect(&mut m, t0);

        let frame = r#"{"type":"linkValidation","url":"http://x.example","isMalicious":true}"#;
        let actions =
            m.handle(ConnectionEvent::FrameReceived(frame.to_string()), t0).unwrap();

        assert_eq!(
            actions,
            vec![ConnectionAction::Notify(ChatEvent::LinkValidation {
                url: "http://x.example".to_string(),
                is_malicious: true,
            })]
        );
    }

    #[test]
    fn malformed_inbound_frames_are_dropped_with_a_log() {
        let mut m = manager();
        let t0 = Instant::now();
        connect(&mut m, t0);

        for bad in ["not json", "{}", r#"{"type":"presence"}"#] {
            let actions =
                m.handle(ConnectionEvent::FrameReceived(bad.to_string()), t0).unwrap();
            assert_eq!(actions.len(), 1);
            assert!(matches!(actions[0], ConnectionAction::Log { .. }), "input: {bad}");
            assert_eq!(m.state(), ConnectionState::Connected);
        }
    }

    #[test]
    fn disconnect_cancels_pending_reconnect() {
        let mut m = manager();
        let t0 = Instant::now();
        connect(&mut m, t0);

        m.handle(ConnectionEvent::TransportDisconnected, t0).unwrap();
        assert_eq!(m.state(), ConnectionState::Reconnecting);

        let actions = m.handle(ConnectionEvent::DisconnectRequested, t0).unwrap();
        assert_eq!(m.state(), ConnectionState::Disconnected);
        assert!(actions.contains(&ConnectionAction::CloseTransport));

        // The previously booked retry must never fire.
        let later = t0 + Duration::from_secs(120);
        assert!(m.handle(ConnectionEvent::Tick, later).unwrap().is_empty());
        assert_eq!(m.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn dial_error_fails_the_connection() {
        let mut m = manager();
        let t0 = Instant::now();

        m.handle(
            ConnectionEvent::ConnectRequested { address: "chat.example".to_string(), port: 8443 },
            t0,
        )
        .unwrap();

        let actions = m
            .handle(
                ConnectionEvent::TransportError { message: "connection refused".to_string() },
                t0,
            )
            .unwrap();
        assert_eq!(m.state(), ConnectionState::Failed);
        assert!(actions.iter().any(|a| matches!(
            a,
            ConnectionAction::Notify(ChatEvent::Failed { .. })
        )));

        // Failed accepts a fresh explicit connect.
        m.handle(
            ConnectionEvent::ConnectRequested { address: "chat.example".to_string(), port: 8443 },
            t0,
        )
        .unwrap();
        assert_eq!(m.state(), ConnectionState::Connecting);
    }

    #[test]
    fn transport_error_while_connected_does_not_change_state() {
        let mut m = manager();
        let t0 = Instant::now();
        connect(&mut m, t0);

        let actions = m
            .handle(ConnectionEvent::TransportError { message: "tls hiccup".to_string() }, t0)
            .unwrap();
        assert_eq!(m.state(), ConnectionState::Connected);
        assert_eq!(actions, vec![ConnectionAction::Notify(ChatEvent::Error {
            message: "tls hiccup".to_string(),
        })]);
    }

    #[test]
    fn connect_timeout_counts_as_failed_attempt() {
        let mut m = manager();
        let t0 = Instant::now();

        m.handle(
            ConnectionEvent::ConnectRequested { address: "chat.example".to_string(), port: 8443 },
            t0,
        )
        .unwrap();

        // Before the timeout nothing happens.
        let just_before = t0 + Duration::from_millis(29_999);
        assert!(m.handle(ConnectionEvent::Tick, just_before).unwrap().is_empty());

        let after = t0 + Duration::from_millis(30_001);
        let actions = m.handle(ConnectionEvent::Tick, after).unwrap();
        assert_eq!(m.state(), ConnectionState::Reconnecting);
        assert!(actions.contains(&ConnectionAction::CloseTransport));
        assert!(actions.iter().any(|a| matches!(
            a,
            ConnectionAction::Notify(ChatEvent::Reconnecting { attempt: 1, .. })
        )));
    }
}
