//! Garden Store - embedded plant and message store using native_db
//!
//! Provides persistent storage for:
//! - Plants and the profiles that own them
//! - Chat messages, indexed by plant
//! - Change feeds for live garden updates (via `garden_core::StoreAdapter`)
//! - RON seed fixtures and plant sprouting

mod adapter;
mod error;
mod feed;
mod models;
mod queries;
pub mod seed;
pub mod sprout;
mod store;

pub use error::{Error, Result};
pub use models::{StoredMessage, StoredPlant, StoredProfile};
pub use seed::{GardenSeed, SeedPlant, SeedReport};
pub use sprout::sprout;
pub use store::Store;
