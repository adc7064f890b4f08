//! Per-plant simulation node

use crate::{Bounds, GardenRng, Plant, PlantId, Point};
use serde::{Deserialize, Serialize};

/// Physics and visual state of one plant
///
/// Position and velocity belong to the simulation; the plant payload
/// belongs to the store and is the only field reconciliation replaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimNode {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub plant: Plant,
}

impl SimNode {
    /// Create a node at rest at the given position
    pub fn at(plant: Plant, position: Point) -> Self {
        Self {
            x: position.x,
            y: position.y,
            vx: 0.0,
            vy: 0.0,
            plant,
        }
    }

    /// Seed a node at a random position inside `bounds` drifting at up
    /// to `initial_speed` units per frame on each axis
    ///
    /// Empty bounds seed the node at the origin.
    pub fn seeded(plant: Plant, bounds: Bounds, rng: &mut GardenRng, initial_speed: f64) -> Self {
        let x = rng.next_f64() * bounds.width.max(0.0);
        let y = rng.next_f64() * bounds.height.max(0.0);
        let vx = rng.symmetric(initial_speed);
        let vy = rng.symmetric(initial_speed);
        Self { x, y, vx, vy, plant }
    }

    /// Move the node to a random position inside `bounds`, keeping its
    /// velocity
    pub fn place(&mut self, bounds: Bounds, rng: &mut GardenRng) {
        self.x = rng.next_f64() * bounds.width.max(0.0);
        self.y = rng.next_f64() * bounds.height.max(0.0);
    }

    pub fn id(&self) -> &PlantId {
        &self.plant.id
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}
