//! Store adapter contract
//!
//! The garden consumes plants and messages through this trait and never
//! sees the query or transport behind it. Implementations own connection
//! handling, reconnects and timeouts.

use crate::{Message, Plant, Result};
use std::fmt;

/// Callback invoked with every changed or inserted plant
pub type PlantCallback = Box<dyn FnMut(Plant) + Send + 'static>;

/// Callback invoked with every inserted message
pub type MessageCallback = Box<dyn FnMut(Message) + Send + 'static>;

/// Source of plants and messages for a garden
pub trait StoreAdapter {
    /// Fetch every plant currently in the store
    fn load_plants(&self) -> Result<Vec<Plant>>;

    /// Fetch the `limit` most recent messages, newest first
    fn load_recent_messages(&self, limit: usize) -> Result<Vec<Message>>;

    /// Deliver every plant insert or update until the subscription is cancelled
    fn subscribe_plant_changes(&self, on_change: PlantCallback) -> Result<Subscription>;

    /// Deliver every message insert until the subscription is cancelled
    fn subscribe_message_inserts(&self, on_insert: MessageCallback) -> Result<Subscription>;
}

/// Handle to a live change feed
///
/// Cancelling stops further callbacks and releases whatever the adapter
/// holds for the feed. Cancelling twice is a no-op, and dropping the
/// handle cancels it.
pub struct Subscription {
    name: String,
    cancel: Option<Box<dyn FnOnce() + Send + 'static>>,
}

impl Subscription {
    /// Create a subscription that runs `cancel` exactly once
    pub fn new(name: impl Into<String>, cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            name: name.into(),
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the feed is still delivering callbacks
    pub fn is_active(&self) -> bool {
        self.cancel.is_some()
    }

    /// Stop the feed
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            tracing::debug!(subscription = %self.name, "cancelling subscription");
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("name", &self.name)
            .field("active", &self.is_active())
            .finish()
    }
}
