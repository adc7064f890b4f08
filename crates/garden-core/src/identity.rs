//! Identity types for plants and messages

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque unique identifier of a plant, assigned by the store
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlantId(pub String);

impl PlantId {
    /// Create a new plant ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check whether the ID is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for PlantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "plant:{}", self.0)
    }
}

impl From<&str> for PlantId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for PlantId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Unique identifier of a chat message
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub String);

impl MessageId {
    /// Create a new message ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "message:{}", self.0)
    }
}

impl From<&str> for MessageId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for MessageId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plant_id() {
        let id = PlantId::new("p-42");
        assert_eq!(id.as_str(), "p-42");
        assert_eq!(format!("{}", id), "plant:p-42");
        assert!(!id.is_empty());
        assert!(PlantId::new("").is_empty());
    }

    #[test]
    fn test_message_id() {
        let id = MessageId::from("m-1");
        assert_eq!(id.as_str(), "m-1");
        assert_eq!(format!("{}", id), "message:m-1");
    }
}
