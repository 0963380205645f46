//! Application state machine.
//!
//! Pure state machine between the client driver and a frontend: consumes
//! [`AppEvent`] inputs, produces [`AppAction`] instructions, and keeps the
//! renderable state — channel histories, connection view, transient status.
//!
//! User input is validated here, before it enters the pipeline: an empty or
//! oversized message never produces a `Send` action, so there is no partial
//! send to clean up.

use std::collections::HashMap;

use rochat_client::NetworkConfig;
use rochat_proto::ChatMessage;

use crate::{AppAction, AppEvent, ChannelState, ChatConfig, ConnectionState};

/// Application state machine.
///
/// No I/O dependencies; fully testable without a runtime.
#[derive(Debug)]
pub struct App {
    network: NetworkConfig,
    config: ChatConfig,
    connection: ConnectionState,
    /// Plain channel map; rendering is a read-only projection over it.
    channels: HashMap<String, ChannelState>,
    active_channel: Option<String>,
    status_message: Option<String>,
}

impl App {
    /// Create an App that will connect per the given network config.
    pub fn new(network: NetworkConfig) -> Self {
        Self::with_config(network, ChatConfig::default())
    }

    /// Create an App with explicit chat limits.
    pub fn with_config(network: NetworkConfig, config: ChatConfig) -> Self {
        Self {
            network,
            config,
            connection: ConnectionState::Disconnected,
            channels: HashMap::new(),
            active_channel: None,
            status_message: None,
        }
    }

    /// Initiate a connection to the configured server.
    pub fn connect(&mut self) -> Vec<AppAction> {
        self.connection = ConnectionState::Connecting;
        vec![
            AppAction::Connect {
                address: self.network.address.clone(),
                port: self.network.port,
            },
            AppAction::Render,
        ]
    }

    /// Disconnect from the server.
    pub fn disconnect(&self) -> Vec<AppAction> {
        vec![AppAction::Disconnect, AppAction::Render]
    }

    /// Quit the application.
    pub fn quit(&self) -> Vec<AppAction> {
        vec![AppAction::Quit]
    }

    /// Validate and submit a message the user typed.
    ///
    /// Length limits are enforced here, at the boundary. Accepted messages
    /// are echoed into local history immediately; the server does not relay
    /// our own messages back.
    pub fn submit_message(
        &mut self,
        channel_id: &str,
        sender: &str,
        text: &str,
    ) -> Vec<AppAction> {
        let length = text.chars().count();

        if length < self.config.min_message_length {
            self.status_message = Some("cannot send an empty message".to_string());
            return vec![AppAction::Render];
        }
        if length > self.config.max_message_length {
            self.status_message = Some(format!(
                "message too long: {length} chars (limit {})",
                self.config.max_message_length
            ));
            return vec![AppAction::Render];
        }

        let message = ChatMessage::new(sender, text, channel_id);
        self.record(message.clone());

        vec![AppAction::Send(message), AppAction::Render]
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: AppEvent) -> Vec<AppAction> {
        match event {
            AppEvent::Tick => vec![],
            AppEvent::Connecting => {
                self.connection = ConnectionState::Connecting;
                vec![AppAction::Render]
            },
            AppEvent::Connected => {
                self.connection = ConnectionState::Connected;
                self.status_message = Some("connected".to_string());
                vec![AppAction::Render]
            },
            AppEvent::Disconnected => {
                self.connection = ConnectionState::Disconnected;
                vec![AppAction::Render]
            },
            AppEvent::Reconnecting { attempt, delay } => {
                self.connection = ConnectionState::Reconnecting { attempt };
                self.status_message =
                    Some(format!("reconnecting in {}s (attempt {attempt})", delay.as_secs()));
                vec![AppAction::Render]
            },
            AppEvent::ConnectionFailed { attempts } => {
                self.connection = ConnectionState::Failed;
                self.status_message =
                    Some(format!("connection failed after {attempts} attempts"));
                vec![AppAction::Render]
            },
            AppEvent::MessageReceived(message) => {
                self.record(message);
                vec![AppAction::Render]
            },
            AppEvent::LinkValidation { url, is_malicious } => {
                if is_malicious {
                    self.status_message = Some(format!("server flagged link: {url}"));
                }
                vec![AppAction::Render]
            },
            AppEvent::SendRejected { reason } => {
                self.status_message = Some(format!("message not sent: {reason}"));
                vec![AppAction::Render]
            },
            AppEvent::Error { message } => {
                self.status_message = Some(format!("error: {message}"));
                vec![AppAction::Render]
            },
        }
    }

    /// Mark a channel active and clear its unread flag.
    pub fn set_active_channel(&mut self, channel_id: &str) {
        if let Some(channel) = self.channels.get_mut(channel_id) {
            channel.unread = false;
            self.active_channel = Some(channel_id.to_string());
        }
    }

    /// Currently selected channel. `None` before any channel has messages.
    pub fn active_channel(&self) -> Option<&str> {
        self.active_channel.as_deref()
    }

    /// All known channels.
    pub fn channels(&self) -> &HashMap<String, ChannelState> {
        &self.channels
    }

    /// State of one channel, if known.
    pub fn channel(&self, channel_id: &str) -> Option<&ChannelState> {
        self.channels.get(channel_id)
    }

    /// Connection lifecycle as the UI should present it.
    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    /// Transient status line. `None` if nothing to show.
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    fn record(&mut self, message: ChatMessage) {
        let channel_id = message.channel_id.clone();
        let channel = self
            .channels
            .entry(channel_id.clone())
            .or_insert_with(|| ChannelState::new(channel_id.clone()));
        channel.push(message, self.config.max_history);

        match &self.active_channel {
            Some(active) if *active == channel_id => {},
            Some(_) => channel.unread = true,
            None => self.active_channel = Some(channel_id),
        }
    }
}
