//! Outbound message queue.

use std::collections::VecDeque;

use rochat_proto::ChatMessage;
use thiserror::Error;

/// Queue capacity was reached; the message was not enqueued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("outbound queue full")]
pub struct QueueFull;

/// FIFO queue of messages awaiting transmission.
///
/// Bounded: exceeding capacity is reported to the caller rather than
/// evicting, so deferral stays lossless and loss stays explicit.
#[derive(Debug)]
pub struct OutboundQueue {
    items: VecDeque<ChatMessage>,
    capacity: usize,
}

impl OutboundQueue {
    /// Create a queue holding at most `capacity` messages.
    pub fn new(capacity: usize) -> Self {
        Self { items: VecDeque::new(), capacity }
    }

    /// Append a message.
    pub fn push(&mut self, message: ChatMessage) -> Result<(), QueueFull> {
        if self.items.len() >= self.capacity {
            return Err(QueueFull);
        }
        self.items.push_back(message);
        Ok(())
    }

    /// Remove and return all queued messages in enqueue order.
    pub fn drain(&mut self) -> Vec<ChatMessage> {
        self.items.drain(..).collect()
    }

    /// Number of queued messages.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Queue holds nothing.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
