//! `StoreAdapter` implementation backed by the embedded store.

use crate::store::Store;
use garden_core::{Message, MessageCallback, Plant, PlantCallback, StoreAdapter, Subscription};
use tracing::warn;

impl StoreAdapter for Store {
    fn load_plants(&self) -> garden_core::Result<Vec<Plant>> {
        Store::load_plants(self).map_err(|err| {
            warn!(error = %err, "plant load failed");
            err.into_load_error()
        })
    }

    fn load_recent_messages(&self, limit: usize) -> garden_core::Result<Vec<Message>> {
        self.recent_messages(limit).map_err(|err| {
            warn!(error = %err, "message load failed");
            err.into_load_error()
        })
    }

    fn subscribe_plant_changes(
        &self,
        on_change: PlantCallback,
    ) -> garden_core::Result<Subscription> {
        Ok(self.plant_feed.subscribe(on_change))
    }

    fn subscribe_message_inserts(
        &self,
        on_insert: MessageCallback,
    ) -> garden_core::Result<Subscription> {
        Ok(self.message_feed.subscribe(on_insert))
    }
}
