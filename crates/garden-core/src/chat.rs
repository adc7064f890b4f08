//! Newest-first message buffer backing the garden chat log

use crate::{Message, MessageId, Plant};
use std::collections::VecDeque;

/// Display buffer of chat messages, newest first
///
/// The garden never interprets message content; it only keeps the order
/// the store reported and prepends whatever is pushed afterwards.
#[derive(Debug, Clone, Default)]
pub struct ChatLog {
    messages: VecDeque<Message>,
    capacity: Option<usize>,
}

impl ChatLog {
    /// Create an unbounded log
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a log that keeps at most `capacity` messages
    pub fn with_capacity(capacity: Option<usize>) -> Self {
        Self {
            messages: VecDeque::new(),
            capacity,
        }
    }

    /// Replace the contents with a newest-first batch from the store
    pub fn replace(&mut self, messages: impl IntoIterator<Item = Message>) {
        self.messages = messages.into_iter().collect();
        self.truncate();
    }

    /// Prepend a newly pushed message
    ///
    /// A message whose id is already in the buffer is ignored, so an insert
    /// that raced the initial load shows up once. Returns whether the
    /// message was added.
    pub fn push(&mut self, message: Message) -> bool {
        if self.contains(&message.id) {
            return false;
        }
        self.messages.push_front(message);
        self.truncate();
        true
    }

    pub fn contains(&self, id: &MessageId) -> bool {
        self.messages.iter().any(|m| &m.id == id)
    }

    fn truncate(&mut self) {
        if let Some(capacity) = self.capacity {
            self.messages.truncate(capacity);
        }
    }

    /// Messages, newest first
    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    pub fn newest(&self) -> Option<&Message> {
        self.messages.front()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Header line for a chat entry
///
/// Human messages name the plant's owner; everything else is attributed to
/// the plant itself along with its rarity.
pub fn author_label(message: &Message, plant: Option<&Plant>) -> String {
    if message.kind.is_user() {
        let owner = plant.map(Plant::owner_or_unknown).unwrap_or("Unknown");
        return format!("Human ({owner})");
    }

    match plant {
        Some(plant) => format!("{} {}", plant.species, plant.rarity),
        None => "Unknown plant".to_string(),
    }
}
