//! Chat message domain type.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A single chat message.
///
/// Constructed either by the sending side (`new`) or from a decoded inbound
/// frame (`received`). Immutable once built, with one exception: content
/// filtering may rewrite `content` in place to redact unsafe substrings,
/// updating the link metadata alongside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Message ID. Assigned client-side as a UUID v4; a server echo may
    /// carry its own ID instead.
    pub id: String,

    /// Sender identity.
    pub sender: String,

    /// Message text.
    pub content: String,

    /// Creation time (sender clock) or decode time metadata.
    pub timestamp: DateTime<Utc>,

    /// Channel the message originated in (`serverId` on the wire).
    pub channel_id: String,

    /// Message carries image data.
    pub contains_image: bool,

    /// Message text contains at least one HTTP(S) link.
    pub contains_link: bool,

    /// Links found in `content`, in order of appearance, duplicates kept.
    pub link_urls: Vec<String>,

    /// Base64-encoded image payload, if any.
    pub image_data: Option<String>,
}

impl ChatMessage {
    /// Create an outbound message with a fresh ID and the current time.
    pub fn new(
        sender: impl Into<String>,
        content: impl Into<String>,
        channel_id: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            sender: sender.into(),
            content: content.into(),
            timestamp: Utc::now(),
            channel_id: channel_id.into(),
            contains_image: false,
            contains_link: false,
            link_urls: Vec::new(),
            image_data: None,
        }
    }

    /// Build a message from decoded inbound frame fields.
    ///
    /// Link metadata starts empty; the connection manager fills it in after
    /// moderation has inspected the content.
    pub fn received(
        id: String,
        sender: String,
        content: String,
        channel_id: String,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            sender,
            content,
            timestamp,
            channel_id,
            contains_image: false,
            contains_link: false,
            link_urls: Vec::new(),
            image_data: None,
        }
    }

    /// Replace the message text and its derived link metadata.
    ///
    /// This is the single sanctioned mutation: content filtering swaps in
    /// redacted text together with the links that survived it.
    pub fn set_content(&mut self, content: String, link_urls: Vec<String>) {
        self.content = content;
        self.contains_link = !link_urls.is_empty();
        self.link_urls = link_urls;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_message_assigns_unique_ids() {
        let a = ChatMessage::new("alice", "hi", "general");
        let b = ChatMessage::new("alice", "hi", "general");
        assert_ne!(a.id, b.id);
        assert!(Uuid::parse_str(&a.id).is_ok());
    }

    #[test]
    fn set_content_updates_link_metadata() {
        let mut msg = ChatMessage::new("alice", "see http://a.com", "general");
        msg.set_content("see http://a.com".to_string(), vec!["http://a.com".to_string()]);
        assert!(msg.contains_link);
        assert_eq!(msg.link_urls, vec!["http://a.com"]);

        msg.set_content("redacted".to_string(), Vec::new());
        assert!(!msg.contains_link);
        assert!(msg.link_urls.is_empty());
    }
}
