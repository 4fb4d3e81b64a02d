//! Per-invocation effects log.
//!
//! A registry handler never calls another registry directly. It records
//! outbound [`Message`]s in an [`Outbox`], which the fabric delivers in
//! enqueue order after the handler returns, or discards if the operation
//! aborts.

use sharereg_types::Address;

use crate::entrypoint::{Entrypoint, Message};

/// Ordered list of messages emitted by one invocation.
#[derive(Debug, Default)]
pub struct Outbox {
    messages: Vec<Message>,
}

impl Outbox {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    /// Enqueue a call to `entrypoint` on `target`.
    pub fn send(&mut self, target: Address, entrypoint: Entrypoint) {
        self.messages.push(Message::new(target, entrypoint));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Peek at the enqueued messages.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Consume the outbox, yielding messages in enqueue order.
    #[must_use]
    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }
}
