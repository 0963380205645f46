//! Chat behavior configuration.

use rochat_proto::constants;

/// Limits the application enforces at the input boundary.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Longest accepted message, in characters.
    pub max_message_length: usize,

    /// Shortest accepted message, in characters.
    pub min_message_length: usize,

    /// Messages kept per channel before the oldest is evicted.
    pub max_history: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_message_length: constants::MAX_MESSAGE_LENGTH,
            min_message_length: constants::MIN_MESSAGE_LENGTH,
            max_history: constants::MAX_HISTORY_SIZE,
        }
    }
}
