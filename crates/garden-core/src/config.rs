//! Garden configuration, loadable from RON
//!
//! Every field has a default, so a config file only needs to name what it
//! changes:
//!
//! ```ron
//! (
//!     seed: 7,
//!     physics: (jitter: 0.02),
//!     links: (threshold: 120.0),
//! )
//! ```

use crate::physics::PhysicsParams;
use crate::render::{LinkStyle, NodeStyle};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Settings for one garden view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GardenConfig {
    /// Seed for node placement and physics jitter
    pub seed: u64,
    /// Time between frames in milliseconds
    pub frame_interval_ms: u64,
    /// Pointer hit radius in logical units
    pub pick_radius: f64,
    /// How many recent messages the initial load fetches
    pub message_limit: usize,
    /// Upper bound on the chat buffer, unbounded when absent
    pub chat_capacity: Option<usize>,
    /// Drop nodes whose plant is missing from a full reload
    pub prune_on_reload: bool,
    pub physics: PhysicsParams,
    pub nodes: NodeStyle,
    pub links: LinkStyle,
}

impl Default for GardenConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            frame_interval_ms: 16,
            pick_radius: 30.0,
            message_limit: 50,
            chat_capacity: None,
            prune_on_reload: false,
            physics: PhysicsParams::default(),
            nodes: NodeStyle::default(),
            links: LinkStyle::default(),
        }
    }
}

impl GardenConfig {
    /// Parse a config from a RON string
    pub fn from_ron_str(content: &str) -> Result<Self> {
        Ok(ron::from_str(content)?)
    }

    /// Load a config from a RON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_ron_str(&content)
    }

    /// Frame interval, never shorter than one millisecond
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms.max(1))
    }
}
