//! Database store wrapper.

use crate::error::{Error, Result};
use crate::feed::Feed;
use crate::models::*;
use garden_core::{Message, Plant, PlantId};
use native_db::*;
use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, info};

// Static models for the database
static MODELS: LazyLock<Models> = LazyLock::new(|| {
    let mut models = Models::new();
    models.define::<StoredPlant>().unwrap();
    models.define::<StoredProfile>().unwrap();
    models.define::<StoredMessage>().unwrap();
    models
});

/// Embedded store for plants, profiles and chat messages.
///
/// Plant and message writes are published to change feeds once their
/// transaction has committed.
pub struct Store {
    pub(crate) db: Database<'static>,
    pub(crate) plant_feed: Feed<Plant>,
    pub(crate) message_feed: Feed<Message>,
}

impl Store {
    /// Open or create a database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = Builder::new()
            .create(&MODELS, path.as_ref())
            .map_err(|e| Error::Database(e.to_string()))?;
        info!(path = %path.as_ref().display(), "garden store opened");
        Ok(Self::with_db(db))
    }

    /// Create an in-memory database.
    pub fn in_memory() -> Result<Self> {
        let db = Builder::new()
            .create_in_memory(&MODELS)
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(Self::with_db(db))
    }

    fn with_db(db: Database<'static>) -> Self {
        Self {
            db,
            plant_feed: Feed::new("plants"),
            message_feed: Feed::new("messages"),
        }
    }

    /// Save a user profile.
    pub fn save_profile(&self, profile: StoredProfile) -> Result<()> {
        let rw = self.db.rw_transaction()?;
        rw.upsert(profile)?;
        rw.commit()?;
        Ok(())
    }

    /// Load a profile by ID.
    pub fn load_profile(&self, id: &str) -> Result<Option<StoredProfile>> {
        let r = self.db.r_transaction()?;
        let stored: Option<StoredProfile> = r.get().primary(id.to_string())?;
        Ok(stored)
    }

    /// Insert or update a plant.
    ///
    /// Returns the plant as subscribers see it, with the owner name
    /// resolved from the profile table.
    pub fn save_plant(&self, plant: &Plant, owner_id: Option<&str>) -> Result<Plant> {
        let stored = StoredPlant::from_plant(plant, owner_id.map(str::to_string));
        let rw = self.db.rw_transaction()?;
        rw.upsert(stored.clone())?;
        rw.commit()?;

        let resolved = stored.to_plant(self.owner_name(stored.owner_id.as_deref())?);
        debug!(plant = %resolved.id, "plant saved");
        self.plant_feed.publish(&resolved);
        Ok(resolved)
    }

    /// Modify a stored plant in place, keeping its owner.
    ///
    /// Runs in one transaction and publishes the result like `save_plant`.
    pub fn update_plant(&self, id: &PlantId, update: impl FnOnce(&mut Plant)) -> Result<Plant> {
        let rw = self.db.rw_transaction()?;
        let stored: Option<StoredPlant> = rw.get().primary(id.as_str().to_string())?;
        let stored = stored.ok_or_else(|| Error::NotFound(format!("plant {}", id.as_str())))?;

        let mut plant = stored.to_plant(None);
        update(&mut plant);
        let mut updated = StoredPlant::from_plant(&plant, stored.owner_id);
        // The record is keyed by ID; renaming it would orphan its messages.
        updated.id = stored.id;
        rw.upsert(updated.clone())?;
        rw.commit()?;

        let resolved = updated.to_plant(self.owner_name(updated.owner_id.as_deref())?);
        self.plant_feed.publish(&resolved);
        Ok(resolved)
    }

    /// Load a plant by ID.
    pub fn load_plant(&self, id: &PlantId) -> Result<Option<Plant>> {
        let r = self.db.r_transaction()?;
        let stored: Option<StoredPlant> = r.get().primary(id.as_str().to_string())?;
        match stored {
            Some(stored) => {
                let owner = self.owner_name(stored.owner_id.as_deref())?;
                Ok(Some(stored.to_plant(owner)))
            }
            None => Ok(None),
        }
    }

    /// Load all plants, owners resolved.
    pub fn load_plants(&self) -> Result<Vec<Plant>> {
        let usernames: HashMap<String, String> = self
            .load_profiles()?
            .into_iter()
            .map(|p| (p.id, p.username))
            .collect();

        Ok(self
            .all_plants()?
            .into_iter()
            .map(|stored| {
                let owner = stored
                    .owner_id
                    .as_ref()
                    .and_then(|id| usernames.get(id))
                    .cloned();
                stored.to_plant(owner)
            })
            .collect())
    }

    /// Insert a message on an existing plant.
    pub fn insert_message(&self, message: &Message) -> Result<()> {
        let rw = self.db.rw_transaction()?;
        let plant: Option<StoredPlant> = rw.get().primary(message.plant_id.as_str().to_string())?;
        if plant.is_none() {
            return Err(Error::NotFound(format!("plant {}", message.plant_id.as_str())));
        }
        rw.insert(StoredMessage::from_message(message))?;
        rw.commit()?;

        debug!(message = %message.id, plant = %message.plant_id, "message inserted");
        self.message_feed.publish(message);
        Ok(())
    }

    /// The `limit` most recent messages, newest first.
    pub fn recent_messages(&self, limit: usize) -> Result<Vec<Message>> {
        let mut messages = self.all_messages()?;
        messages.sort_by(|a, b| {
            b.created_at_ms
                .cmp(&a.created_at_ms)
                .then_with(|| b.id.cmp(&a.id))
        });
        messages.truncate(limit);
        Ok(messages.iter().map(StoredMessage::to_message).collect())
    }

    pub(crate) fn all_plants(&self) -> Result<Vec<StoredPlant>> {
        let r = self.db.r_transaction()?;
        let scan = r.scan().primary::<StoredPlant>()?;
        let iter = scan.all()?;
        let plants: std::result::Result<Vec<StoredPlant>, _> = iter.collect();
        plants.map_err(|e| Error::Database(e.to_string()))
    }

    /// Load all profiles.
    pub fn load_profiles(&self) -> Result<Vec<StoredProfile>> {
        let r = self.db.r_transaction()?;
        let scan = r.scan().primary::<StoredProfile>()?;
        let iter = scan.all()?;
        let profiles: std::result::Result<Vec<StoredProfile>, _> = iter.collect();
        profiles.map_err(|e| Error::Database(e.to_string()))
    }

    pub(crate) fn all_messages(&self) -> Result<Vec<StoredMessage>> {
        let r = self.db.r_transaction()?;
        let scan = r.scan().primary::<StoredMessage>()?;
        let iter = scan.all()?;
        let messages: std::result::Result<Vec<StoredMessage>, _> = iter.collect();
        messages.map_err(|e| Error::Database(e.to_string()))
    }

    fn owner_name(&self, owner_id: Option<&str>) -> Result<Option<String>> {
        match owner_id {
            Some(id) => Ok(self.load_profile(id)?.map(|p| p.username)),
            None => Ok(None),
        }
    }

    /// Clear all data.
    pub fn clear(&self) -> Result<()> {
        // First, collect all keys
        let plant_ids: Vec<String> = self.all_plants()?.into_iter().map(|p| p.id).collect();
        let profile_ids: Vec<String> = self.load_profiles()?.into_iter().map(|p| p.id).collect();
        let message_ids: Vec<String> = self.all_messages()?.into_iter().map(|m| m.id).collect();

        // Now delete in a separate transaction
        let rw = self.db.rw_transaction()?;
        for id in message_ids {
            if let Some(message) = rw.get().primary::<StoredMessage>(id)? {
                rw.remove(message)?;
            }
        }
        for id in plant_ids {
            if let Some(plant) = rw.get().primary::<StoredPlant>(id)? {
                rw.remove(plant)?;
            }
        }
        for id in profile_ids {
            if let Some(profile) = rw.get().primary::<StoredProfile>(id)? {
                rw.remove(profile)?;
            }
        }
        rw.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use garden_core::{MessageKind, Rarity};

    fn store() -> Store {
        Store::in_memory().unwrap()
    }

    fn message(id: &str, plant: &str, minute: u32) -> Message {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, minute, 0).unwrap();
        Message::new(id, plant, MessageKind::Plant, format!("note {id}"), at)
    }

    #[test]
    fn test_save_and_load_plant() {
        let store = store();
        store.save_profile(StoredProfile::new("u1", "ivy")).unwrap();
        let plant = Plant::new("p1", "Digital k3x9a", Rarity::Legendary)
            .with_traits(["Quantum Processing", "Neural Synthesis"]);

        let saved = store.save_plant(&plant, Some("u1")).unwrap();
        assert_eq!(saved.owner.as_deref(), Some("ivy"));

        let loaded = store.load_plant(&PlantId::new("p1")).unwrap().unwrap();
        assert_eq!(loaded, saved);
        assert_eq!(loaded.rarity, Rarity::Legendary);
        assert_eq!(loaded.traits.len(), 2);
        assert!(store.load_plant(&PlantId::new("missing")).unwrap().is_none());
    }

    #[test]
    fn test_unknown_owner_stays_unresolved() {
        let store = store();
        store
            .save_plant(&Plant::new("p1", "Digital aaaaa", Rarity::Common), Some("ghost"))
            .unwrap();

        let plants = store.load_plants().unwrap();
        assert_eq!(plants.len(), 1);
        assert_eq!(plants[0].owner, None);
        assert_eq!(plants[0].owner_or_unknown(), "Unknown");
    }

    #[test]
    fn test_upsert_replaces_plant() {
        let store = store();
        let mut plant = Plant::new("p1", "Digital aaaaa", Rarity::Common);
        store.save_plant(&plant, None).unwrap();
        plant.level = 4;
        store.save_plant(&plant, None).unwrap();

        let plants = store.load_plants().unwrap();
        assert_eq!(plants.len(), 1);
        assert_eq!(plants[0].level, 4);
    }

    #[test]
    fn test_update_plant_keeps_owner() {
        let store = store();
        store.save_profile(StoredProfile::new("u1", "ivy")).unwrap();
        store
            .save_plant(&Plant::new("p1", "Digital aaaaa", Rarity::Common), Some("u1"))
            .unwrap();

        let updated = store
            .update_plant(&PlantId::new("p1"), |plant| {
                plant.level += 1;
                plant.growth = 12.5;
            })
            .unwrap();

        assert_eq!(updated.level, 2);
        assert_eq!(updated.owner.as_deref(), Some("ivy"));
        let missing = store.update_plant(&PlantId::new("nope"), |_| {});
        assert!(matches!(missing, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_recent_messages_newest_first() {
        let store = store();
        store
            .save_plant(&Plant::new("p1", "Digital aaaaa", Rarity::Rare), None)
            .unwrap();
        for (id, minute) in [("m1", 1), ("m3", 3), ("m2", 2)] {
            store.insert_message(&message(id, "p1", minute)).unwrap();
        }

        let recent = store.recent_messages(2).unwrap();
        let ids: Vec<&str> = recent.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["m3", "m2"]);
        assert_eq!(recent[0].kind, MessageKind::Plant);
    }

    #[test]
    fn test_message_needs_plant() {
        let store = store();
        let result = store.insert_message(&message("m1", "nowhere", 1));
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_clear() {
        let store = store();
        store.save_profile(StoredProfile::new("u1", "ivy")).unwrap();
        store
            .save_plant(&Plant::new("p1", "Digital aaaaa", Rarity::Rare), Some("u1"))
            .unwrap();
        store.insert_message(&message("m1", "p1", 1)).unwrap();

        store.clear().unwrap();

        assert!(store.load_plants().unwrap().is_empty());
        assert!(store.recent_messages(10).unwrap().is_empty());
        assert!(store.load_profile("u1").unwrap().is_none());
    }
}
