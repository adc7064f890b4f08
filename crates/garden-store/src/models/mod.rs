//! Database models for persistent storage.

mod message;
mod plant;

pub use message::*;
pub use plant::*;
