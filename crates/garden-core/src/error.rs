//! Error types for garden-core
//!
//! Nothing here is fatal to the garden: the frame loop logs and moves on,
//! and load failures are reported upward as notices.

use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    /// Initial or reload fetch from the store failed
    #[error("Store load failed: {0}")]
    StoreLoad(String),

    /// A change feed could not be opened or was dropped
    #[error("Store subscription failed: {0}")]
    StoreSubscription(String),

    /// The drawing surface is not attached or has no size yet
    #[error("Render surface unavailable")]
    SurfaceUnavailable,

    /// A record that cannot be reconciled into the simulation
    #[error("Invalid plant: {0}")]
    InvalidPlant(String),

    /// The frame handler was lost (the frame thread panicked)
    #[error("Animation driver unavailable: {0}")]
    DriverUnavailable(String),

    #[error("Config parse error: {0}")]
    Config(#[from] ron::error::SpannedError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Errors that only mean "skip this frame"
    pub fn is_frame_skip(&self) -> bool {
        matches!(self, Error::SurfaceUnavailable)
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
