//! JSON text-frame wire codec.
//!
//! Every frame is a single JSON object tagged by a `type` field. Outbound
//! traffic only ever produces `"message"` frames; inbound traffic is either
//! a relayed `"message"` or a `"linkValidation"` verdict. Unknown `type`
//! values decode to [`ProtocolError::UnknownKind`] so the caller can drop
//! them without treating the connection as broken.
//!
//! # Invariants
//!
//! - Round trip: encoding a frame and decoding the result yields an equal
//!   value.
//! - Field names on the wire are camelCase (`serverId`, `isMalicious`);
//!   timestamps are ISO-8601 strings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ChatMessage, ProtocolError};

/// A decoded wire frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WireFrame {
    /// A chat message, client-to-server or relayed back.
    #[serde(rename = "message", rename_all = "camelCase")]
    Message {
        /// Message ID. Client-assigned on outbound frames; the server may
        /// substitute its own on relay.
        #[serde(default)]
        id: String,
        /// Sender identity.
        sender: String,
        /// Message text.
        content: String,
        /// Originating channel.
        server_id: String,
        /// Creation time, ISO-8601.
        timestamp: DateTime<Utc>,
    },

    /// Server verdict for a URL the client surfaced.
    #[serde(rename = "linkValidation", rename_all = "camelCase")]
    LinkValidation {
        /// The URL that was checked.
        url: String,
        /// Whether the server judged it malicious.
        is_malicious: bool,
    },
}

impl WireFrame {
    /// Build an outbound `"message"` frame from a [`ChatMessage`].
    pub fn from_message(msg: &ChatMessage) -> Self {
        Self::Message {
            id: msg.id.clone(),
            sender: msg.sender.clone(),
            content: msg.content.clone(),
            server_id: msg.channel_id.clone(),
            timestamp: msg.timestamp,
        }
    }

    /// Serialize to the JSON text put on the wire.
    pub fn encode(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a text frame received from the transport.
    ///
    /// # Errors
    ///
    /// - [`ProtocolError::Malformed`] if the text is not JSON or a known
    ///   `type` carries the wrong fields
    /// - [`ProtocolError::MissingKind`] if there is no `type` field
    /// - [`ProtocolError::UnknownKind`] for a `type` this client does not
    ///   understand (ignored by contract)
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        let value: serde_json::Value = serde_json::from_str(text)?;

        let kind = value
            .get("type")
            .and_then(serde_json::Value::as_str)
            .ok_or(ProtocolError::MissingKind)?
            .to_owned();

        match kind.as_str() {
            "message" | "linkValidation" => Ok(serde_json::from_value(value)?),
            other => Err(ProtocolError::UnknownKind(other.to_string())),
        }
    }
}
