//! Plant and message records as delivered by the store

use crate::{MessageId, PlantId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Rarity tier of a plant
///
/// Serialized as its display name. Any tier the garden does not know
/// becomes [`Rarity::Unknown`] instead of failing the whole record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Rarity {
    Common,
    Rare,
    Legendary,
    #[default]
    Unknown,
}

impl Rarity {
    /// Parse a tier name; unrecognised names map to `Unknown`
    pub fn parse(name: &str) -> Self {
        match name {
            "Common" => Rarity::Common,
            "Rare" => Rarity::Rare,
            "Legendary" => Rarity::Legendary,
            _ => Rarity::Unknown,
        }
    }

    /// Display name of the tier
    pub fn as_str(&self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Rare => "Rare",
            Rarity::Legendary => "Legendary",
            Rarity::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Rarity {
    fn from(s: String) -> Self {
        Rarity::parse(&s)
    }
}

impl From<Rarity> for String {
    fn from(rarity: Rarity) -> Self {
        rarity.as_str().to_string()
    }
}

/// A user-owned plant shown in the garden
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plant {
    /// Store-assigned identifier
    pub id: PlantId,
    /// Display name
    pub species: String,
    /// Rarity tier (drives colour and emphasis)
    #[serde(default)]
    pub rarity: Rarity,
    /// Ordered trait labels
    #[serde(default)]
    pub traits: Vec<String>,
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default)]
    pub experience: u32,
    /// Display name of the owning user, resolved by the store
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub genome: String,
    #[serde(default)]
    pub growth: f64,
    #[serde(default)]
    pub energy: f64,
    #[serde(default)]
    pub environment: String,
}

fn default_level() -> u32 {
    1
}

impl Plant {
    /// Create a level-1 plant with no traits
    pub fn new(id: impl Into<PlantId>, species: impl Into<String>, rarity: Rarity) -> Self {
        Self {
            id: id.into(),
            species: species.into(),
            rarity,
            traits: Vec::new(),
            level: 1,
            experience: 0,
            owner: None,
            genome: String::new(),
            growth: 0.0,
            energy: 0.0,
            environment: String::new(),
        }
    }

    /// Builder-style owner assignment
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    /// Builder-style trait list
    pub fn with_traits<I, T>(mut self, traits: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.traits = traits.into_iter().map(Into::into).collect();
        self
    }

    /// Owner name, or "Unknown" when the store could not resolve one
    pub fn owner_or_unknown(&self) -> &str {
        self.owner.as_deref().unwrap_or("Unknown")
    }
}

/// Who or what produced a chat message
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MessageKind {
    /// Written by a human
    User,
    /// Spoken by the plant itself
    Plant,
    Growth,
    Evolution,
    Task,
    Content,
    /// A kind this build does not know about
    Other(String),
}

impl MessageKind {
    pub fn parse(name: &str) -> Self {
        match name {
            "user" => MessageKind::User,
            "plant" => MessageKind::Plant,
            "growth" => MessageKind::Growth,
            "evolution" => MessageKind::Evolution,
            "task" => MessageKind::Task,
            "content" => MessageKind::Content,
            other => MessageKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            MessageKind::User => "user",
            MessageKind::Plant => "plant",
            MessageKind::Growth => "growth",
            MessageKind::Evolution => "evolution",
            MessageKind::Task => "task",
            MessageKind::Content => "content",
            MessageKind::Other(name) => name,
        }
    }

    /// Whether a human wrote this message
    pub fn is_user(&self) -> bool {
        matches!(self, MessageKind::User)
    }
}

impl From<String> for MessageKind {
    fn from(s: String) -> Self {
        MessageKind::parse(&s)
    }
}

impl From<MessageKind> for String {
    fn from(kind: MessageKind) -> Self {
        kind.as_str().to_string()
    }
}

/// A timestamped chat message attached to a plant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub plant_id: PlantId,
    pub content: String,
    pub kind: MessageKind,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(
        id: impl Into<MessageId>,
        plant_id: impl Into<PlantId>,
        kind: MessageKind,
        content: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            plant_id: plant_id.into(),
            content: content.into(),
            kind,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rarity_parse() {
        assert_eq!(Rarity::parse("Legendary"), Rarity::Legendary);
        assert_eq!(Rarity::parse("Rare"), Rarity::Rare);
        assert_eq!(Rarity::parse("Common"), Rarity::Common);
        assert_eq!(Rarity::parse("Mythic"), Rarity::Unknown);
        assert_eq!(Rarity::Legendary.to_string(), "Legendary");
    }

    #[test]
    fn test_plant_from_ron() {
        let plant: Plant = ron::from_str(
            r#"(
                id: "p1",
                species: "Digital fern",
                rarity: "Mythic",
                traits: ["Self-Learning"],
            )"#,
        )
        .unwrap();

        assert_eq!(plant.id, PlantId::new("p1"));
        assert_eq!(plant.rarity, Rarity::Unknown);
        assert_eq!(plant.level, 1);
        assert_eq!(plant.owner_or_unknown(), "Unknown");
    }

    #[test]
    fn test_message_kind() {
        assert!(MessageKind::parse("user").is_user());
        assert_eq!(MessageKind::parse("growth"), MessageKind::Growth);
        assert_eq!(
            MessageKind::parse("weather"),
            MessageKind::Other("weather".to_string())
        );
        assert_eq!(MessageKind::Other("weather".into()).as_str(), "weather");
    }
}
