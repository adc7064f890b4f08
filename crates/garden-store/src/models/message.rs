//! Message models for database storage.

use chrono::DateTime;
use garden_core::{Message, MessageKind};
use native_db::*;
use native_model::{native_model, Model};
use serde::{Deserialize, Serialize};

/// Stored chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[native_model(id = 3, version = 1)]
#[native_db]
pub struct StoredMessage {
    /// Primary key - message ID.
    #[primary_key]
    pub id: String,
    /// Plant the message belongs to.
    #[secondary_key]
    pub plant_id: String,
    pub content: String,
    /// Message kind ("user", "plant", "growth", ...).
    pub kind: String,
    /// Creation time in milliseconds since the Unix epoch.
    pub created_at_ms: i64,
}

impl StoredMessage {
    /// Create from a garden Message.
    pub fn from_message(message: &Message) -> Self {
        Self {
            id: message.id.as_str().to_string(),
            plant_id: message.plant_id.as_str().to_string(),
            content: message.content.clone(),
            kind: message.kind.as_str().to_string(),
            created_at_ms: message.created_at.timestamp_millis(),
        }
    }

    /// Convert to a garden Message.
    pub fn to_message(&self) -> Message {
        let created_at = DateTime::from_timestamp_millis(self.created_at_ms).unwrap_or_default();
        Message::new(
            self.id.clone(),
            self.plant_id.clone(),
            MessageKind::parse(&self.kind),
            self.content.clone(),
            created_at,
        )
    }
}
