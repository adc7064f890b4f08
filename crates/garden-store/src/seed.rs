//! RON seed fixtures
//!
//! A seed file lists profiles, plants and messages and is applied to a
//! store in that order:
//!
//! ```ron
//! (
//!     profiles: [(id: "u1", username: "ivy")],
//!     plants: [
//!         (owner_id: Some("u1"), plant: (id: "p1", species: "Digital k3x9a", rarity: "Rare")),
//!     ],
//!     messages: [
//!         (id: "m1", plant_id: "p1", content: "hello", kind: "user", created_at: "2024-05-01T12:00:00Z"),
//!     ],
//! )
//! ```

use crate::error::Result;
use crate::models::StoredProfile;
use crate::store::Store;
use garden_core::{Message, Plant};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

/// A plant entry together with its owner's profile ID
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedPlant {
    #[serde(default)]
    pub owner_id: Option<String>,
    pub plant: Plant,
}

/// Contents of a seed file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GardenSeed {
    pub profiles: Vec<StoredProfile>,
    pub plants: Vec<SeedPlant>,
    pub messages: Vec<Message>,
}

/// What applying a seed wrote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeedReport {
    pub profiles: usize,
    pub plants: usize,
    pub messages: usize,
}

impl GardenSeed {
    /// Parse a seed from a RON string
    pub fn from_ron_str(content: &str) -> Result<Self> {
        Ok(ron::from_str(content)?)
    }

    /// Load a seed from a RON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_ron_str(&content)
    }

    /// Write everything in the seed to `store`
    ///
    /// Plants and messages go through the regular write path, so live
    /// subscribers see them.
    pub fn apply(&self, store: &Store) -> Result<SeedReport> {
        for profile in &self.profiles {
            store.save_profile(profile.clone())?;
        }
        for entry in &self.plants {
            store.save_plant(&entry.plant, entry.owner_id.as_deref())?;
        }
        for message in &self.messages {
            store.insert_message(message)?;
        }

        let report = SeedReport {
            profiles: self.profiles.len(),
            plants: self.plants.len(),
            messages: self.messages.len(),
        };
        info!(
            profiles = report.profiles,
            plants = report.plants,
            messages = report.messages,
            "seed applied"
        );
        Ok(report)
    }
}
