//! Common query patterns for the store.

use crate::error::{Error, Result};
use crate::models::*;
use crate::store::Store;
use garden_core::{Message, Plant, PlantId};

impl Store {
    /// All messages of one plant, oldest first.
    pub fn messages_for_plant(&self, plant_id: &PlantId) -> Result<Vec<Message>> {
        let r = self.db.r_transaction()?;
        let scan = r.scan().secondary::<StoredMessage>(StoredMessageKey::plant_id)?;
        let iter = scan.start_with(plant_id.as_str())?;
        let messages: std::result::Result<Vec<StoredMessage>, _> = iter.collect();
        let mut messages = messages.map_err(|e| Error::Database(e.to_string()))?;

        // The scan is by prefix; "p1" also matches "p10".
        messages.retain(|m| m.plant_id == plant_id.as_str());
        messages.sort_by(|a, b| {
            a.created_at_ms
                .cmp(&b.created_at_ms)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(messages.iter().map(StoredMessage::to_message).collect())
    }

    /// Count messages of one plant.
    pub fn count_messages_for_plant(&self, plant_id: &PlantId) -> Result<usize> {
        let r = self.db.r_transaction()?;
        let scan = r.scan().secondary::<StoredMessage>(StoredMessageKey::plant_id)?;
        let iter = scan.start_with(plant_id.as_str())?;
        let mut count = 0;
        for message in iter {
            let message = message.map_err(|e| Error::Database(e.to_string()))?;
            if message.plant_id == plant_id.as_str() {
                count += 1;
            }
        }
        Ok(count)
    }

    /// All plants owned by one profile.
    pub fn plants_owned_by(&self, owner_id: &str) -> Result<Vec<Plant>> {
        let username = self.load_profile(owner_id)?.map(|p| p.username);
        Ok(self
            .all_plants()?
            .into_iter()
            .filter(|p| p.owner_id.as_deref() == Some(owner_id))
            .map(|p| p.to_plant(username.clone()))
            .collect())
    }

    /// Number of stored plants.
    pub fn count_plants(&self) -> Result<usize> {
        Ok(self.all_plants()?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use garden_core::{MessageKind, Rarity};

    #[test]
    fn test_messages_for_plant_oldest_first() {
        let store = Store::in_memory().unwrap();
        for id in ["p1", "p10"] {
            store
                .save_plant(&Plant::new(id, "Digital aaaaa", Rarity::Common), None)
                .unwrap();
        }

        let start = Utc::now();
        let entries = [("m2", "p1", 2), ("m1", "p1", 1), ("m3", "p10", 3)];
        for (id, plant, offset) in entries {
            let at = start + Duration::seconds(offset);
            let message = Message::new(id, plant, MessageKind::User, "hi", at);
            store.insert_message(&message).unwrap();
        }

        let p1 = PlantId::new("p1");
        let ids: Vec<String> = store
            .messages_for_plant(&p1)
            .unwrap()
            .into_iter()
            .map(|m| m.id.as_str().to_string())
            .collect();
        assert_eq!(ids, ["m1", "m2"]);
        assert_eq!(store.count_messages_for_plant(&p1).unwrap(), 2);
        assert_eq!(store.count_messages_for_plant(&PlantId::new("p10")).unwrap(), 1);
    }

    #[test]
    fn test_plants_owned_by() {
        let store = Store::in_memory().unwrap();
        store.save_profile(StoredProfile::new("u1", "ivy")).unwrap();
        store
            .save_plant(&Plant::new("p1", "Digital aaaaa", Rarity::Rare), Some("u1"))
            .unwrap();
        store
            .save_plant(&Plant::new("p2", "Digital bbbbb", Rarity::Common), Some("u2"))
            .unwrap();

        let owned = store.plants_owned_by("u1").unwrap();
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].owner.as_deref(), Some("ivy"));
        assert_eq!(store.count_plants().unwrap(), 2);
    }
}
