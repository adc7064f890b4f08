//! Plant and profile models for database storage.

use garden_core::{Plant, Rarity};
use native_db::*;
use native_model::{native_model, Model};
use serde::{Deserialize, Serialize};

/// Stored plant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[native_model(id = 1, version = 1)]
#[native_db]
pub struct StoredPlant {
    /// Primary key - plant ID.
    #[primary_key]
    pub id: String,
    pub species: String,
    /// Rarity name ("Common", "Rare", "Legendary").
    pub rarity: String,
    pub traits: Vec<String>,
    pub level: u32,
    pub experience: u32,
    /// Profile ID of the owner.
    pub owner_id: Option<String>,
    pub genome: String,
    pub growth: f64,
    pub energy: f64,
    pub environment: String,
}

impl StoredPlant {
    /// Create from a garden Plant.
    ///
    /// The plant's resolved owner name is not stored; ownership is kept as
    /// a profile ID.
    pub fn from_plant(plant: &Plant, owner_id: Option<String>) -> Self {
        Self {
            id: plant.id.as_str().to_string(),
            species: plant.species.clone(),
            rarity: plant.rarity.as_str().to_string(),
            traits: plant.traits.clone(),
            level: plant.level,
            experience: plant.experience,
            owner_id,
            genome: plant.genome.clone(),
            growth: plant.growth,
            energy: plant.energy,
            environment: plant.environment.clone(),
        }
    }

    /// Convert to a garden Plant with an already resolved owner name.
    pub fn to_plant(&self, owner: Option<String>) -> Plant {
        Plant {
            id: self.id.clone().into(),
            species: self.species.clone(),
            rarity: Rarity::parse(&self.rarity),
            traits: self.traits.clone(),
            level: self.level,
            experience: self.experience,
            owner,
            genome: self.genome.clone(),
            growth: self.growth,
            energy: self.energy,
            environment: self.environment.clone(),
        }
    }
}

/// Stored user profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[native_model(id = 2, version = 1)]
#[native_db]
pub struct StoredProfile {
    /// Primary key - profile ID.
    #[primary_key]
    pub id: String,
    /// Display name shown as the plant owner.
    pub username: String,
}

impl StoredProfile {
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
        }
    }
}
