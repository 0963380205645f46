//! Observable application state types.
//!
//! The view-model side of the world: what a frontend needs to render,
//! nothing more. The connection manager's own state machine stays private
//! to it; [`ConnectionState`] here is the projection the UI sees.

use std::collections::VecDeque;

use rochat_proto::ChatMessage;

/// Connection lifecycle as seen by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not connected.
    Disconnected,
    /// Connection in progress.
    Connecting,
    /// Session established.
    Connected,
    /// Waiting out a backoff delay.
    Reconnecting {
        /// Attempt number, starting at 1.
        attempt: u32,
    },
    /// Reconnect attempts exhausted.
    Failed,
}

/// Per-channel state: bounded message history plus an unread marker.
#[derive(Debug, Clone)]
pub struct ChannelState {
    /// Channel identifier.
    pub channel_id: String,

    /// Message history, oldest first.
    pub messages: VecDeque<ChatMessage>,

    /// Channel has messages the user has not looked at.
    pub unread: bool,
}

impl ChannelState {
    /// Create empty channel state.
    pub fn new(channel_id: impl Into<String>) -> Self {
        Self { channel_id: channel_id.into(), messages: VecDeque::new(), unread: false }
    }

    /// Append a message, evicting the oldest once `max_history` is reached.
    pub fn push(&mut self, message: ChatMessage, max_history: usize) {
        while self.messages.len() >= max_history.max(1) {
            self.messages.pop_front();
        }
        self.messages.push_back(message);
    }
}
