//! Simulation state: the one source of truth for node positions

use crate::physics::{self, PhysicsParams};
use crate::{Bounds, Error, GardenRng, Plant, PlantId, Result, SimNode};
use indexmap::IndexMap;
use std::collections::HashSet;
use tracing::debug;

/// All simulated nodes of a garden session, keyed by plant id
///
/// Nodes keep their insertion order, which is the iteration order used by
/// physics, rendering and picking. Reconciliation only ever replaces a
/// node's plant payload; position and velocity are left to the physics
/// step. Nodes created while the bounds are empty wait at the origin and
/// are placed once the first non-empty bounds arrive.
#[derive(Debug, Clone)]
pub struct SimulationState {
    nodes: IndexMap<PlantId, SimNode>,
    unplaced: HashSet<PlantId>,
    bounds: Bounds,
    rng: GardenRng,
    initial_speed: f64,
}

impl SimulationState {
    /// Create an empty state seeded with `seed`
    pub fn new(seed: u64, bounds: Bounds) -> Self {
        Self {
            nodes: IndexMap::new(),
            unplaced: HashSet::new(),
            bounds,
            rng: GardenRng::new(seed),
            initial_speed: PhysicsParams::default().initial_speed,
        }
    }

    /// Set the per-axis speed bound for newly created nodes
    pub fn with_initial_speed(mut self, initial_speed: f64) -> Self {
        self.initial_speed = initial_speed;
        self
    }

    /// Merge a full reload
    ///
    /// Known plants keep their node (and so their place on screen) and
    /// only get the new payload; unknown plants get a freshly seeded node.
    /// Nodes missing from the reload are kept. Invalid plants are skipped.
    pub fn reset(&mut self, plants: impl IntoIterator<Item = Plant>) {
        for plant in plants {
            if let Err(err) = self.apply_change(plant) {
                debug!(error = %err, "skipping plant in reload");
            }
        }
    }

    /// Merge a full reload and drop every node the reload did not mention
    pub fn reset_pruning(&mut self, plants: impl IntoIterator<Item = Plant>) {
        let mut seen = HashSet::new();
        for plant in plants {
            let id = plant.id.clone();
            match self.apply_change(plant) {
                Ok(_) => {
                    seen.insert(id);
                }
                Err(err) => debug!(error = %err, "skipping plant in reload"),
            }
        }
        self.nodes.retain(|id, _| seen.contains(id));
        self.unplaced.retain(|id| seen.contains(id));
    }

    /// Upsert a single plant
    ///
    /// Returns `true` when a new node was created, `false` when an existing
    /// node's payload was replaced in place.
    pub fn apply_change(&mut self, plant: Plant) -> Result<bool> {
        if plant.id.is_empty() {
            return Err(Error::InvalidPlant(format!(
                "plant '{}' has an empty id",
                plant.species
            )));
        }

        if let Some(node) = self.nodes.get_mut(&plant.id) {
            node.plant = plant;
            return Ok(false);
        }

        let id = plant.id.clone();
        let node = SimNode::seeded(plant, self.bounds, &mut self.rng, self.initial_speed);
        if self.bounds.is_empty() {
            self.unplaced.insert(id.clone());
        }
        self.nodes.insert(id, node);
        Ok(true)
    }

    /// Advance every node by one frame
    pub fn step(&mut self, params: &PhysicsParams) {
        physics::step(self.nodes.values_mut(), self.bounds, &mut self.rng, params);
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Update the bounds (viewport resize)
    ///
    /// The first non-empty bounds also place every node that was created
    /// before the viewport had a size.
    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.bounds = bounds;
        if bounds.is_empty() || self.unplaced.is_empty() {
            return;
        }

        let unplaced = std::mem::take(&mut self.unplaced);
        for node in self.nodes.values_mut() {
            if unplaced.contains(node.id()) {
                node.place(bounds, &mut self.rng);
            }
        }
        debug!(placed = unplaced.len(), "placed nodes created before layout");
    }

    /// Get a node by plant id
    pub fn get(&self, id: &PlantId) -> Option<&SimNode> {
        self.nodes.get(id)
    }

    /// Look up the current payload of a plant
    pub fn plant(&self, id: &PlantId) -> Option<&Plant> {
        self.nodes.get(id).map(|node| &node.plant)
    }

    /// All nodes in iteration order
    pub fn nodes(&self) -> impl Iterator<Item = &SimNode> {
        self.nodes.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Point, Rarity};

    fn plant(id: &str) -> Plant {
        Plant::new(id, format!("species-{id}"), Rarity::Common)
    }

    fn positions(state: &SimulationState) -> Vec<(PlantId, Point, f64, f64)> {
        state
            .nodes()
            .map(|n| (n.id().clone(), n.position(), n.vx, n.vy))
            .collect()
    }

    #[test]
    fn test_reset_creates_one_node_per_plant() {
        let bounds = Bounds::new(800.0, 600.0);
        for n in [0usize, 1, 3, 50] {
            let mut state = SimulationState::new(42, bounds);
            state.reset((0..n).map(|i| plant(&format!("p{i}"))));

            assert_eq!(state.len(), n);
            let ids: HashSet<_> = state.nodes().map(|node| node.id().clone()).collect();
            assert_eq!(ids.len(), n);
            for node in state.nodes() {
                assert_eq!(node.id(), &node.plant.id);
                assert!(bounds.contains(node.position()));
            }
        }
    }

    #[test]
    fn test_reset_preserves_known_nodes() {
        let mut state = SimulationState::new(42, Bounds::new(800.0, 600.0));
        state.reset([plant("a"), plant("b")]);
        let before = positions(&state);

        let mut renamed = plant("a");
        renamed.species = "Renamed".to_string();
        state.reset([renamed, plant("b"), plant("c")]);

        assert_eq!(state.len(), 3);
        assert_eq!(&positions(&state)[..2], &before[..]);
        assert_eq!(state.plant(&PlantId::new("a")).unwrap().species, "Renamed");
    }

    #[test]
    fn test_reset_never_shrinks() {
        let mut state = SimulationState::new(42, Bounds::new(800.0, 600.0));
        state.reset([plant("a"), plant("b")]);
        state.reset([plant("b")]);
        assert_eq!(state.len(), 2);
        assert!(state.get(&PlantId::new("a")).is_some());
    }

    #[test]
    fn test_reset_pruning_drops_missing() {
        let mut state = SimulationState::new(42, Bounds::new(800.0, 600.0));
        state.reset([plant("a"), plant("b")]);
        let b_before = state.get(&PlantId::new("b")).unwrap().position();

        state.reset_pruning([plant("b")]);

        assert_eq!(state.len(), 1);
        assert_eq!(state.get(&PlantId::new("b")).unwrap().position(), b_before);
    }

    #[test]
    fn test_apply_change_is_idempotent_on_motion() {
        let mut state = SimulationState::new(42, Bounds::new(800.0, 600.0));
        assert!(state.apply_change(plant("a")).unwrap());
        let before = positions(&state);

        assert!(!state.apply_change(plant("a")).unwrap());
        assert_eq!(positions(&state), before);
        assert!(!state.apply_change(plant("a")).unwrap());
        assert_eq!(positions(&state), before);
    }

    #[test]
    fn test_apply_change_updates_payload() {
        let mut state = SimulationState::new(42, Bounds::new(800.0, 600.0));
        state.apply_change(plant("a")).unwrap();

        let mut grown = plant("a");
        grown.level = 7;
        grown.rarity = Rarity::Legendary;
        state.apply_change(grown).unwrap();

        let node = state.get(&PlantId::new("a")).unwrap();
        assert_eq!(node.plant.level, 7);
        assert_eq!(node.plant.rarity, Rarity::Legendary);
    }

    #[test]
    fn test_apply_change_rejects_empty_id() {
        let mut state = SimulationState::new(42, Bounds::new(800.0, 600.0));
        let result = state.apply_change(plant(""));
        assert!(matches!(result, Err(Error::InvalidPlant(_))));
        assert!(state.is_empty());
    }

    #[test]
    fn test_insert_after_load() {
        let mut state = SimulationState::new(42, Bounds::new(800.0, 600.0));
        state.reset([plant("A"), plant("B")]);
        let before = positions(&state);

        state.apply_change(plant("C")).unwrap();

        let ids: Vec<_> = state.nodes().map(|n| n.id().as_str().to_string()).collect();
        assert_eq!(ids, ["A", "B", "C"]);
        assert_eq!(&positions(&state)[..2], &before[..]);
    }

    #[test]
    fn test_nodes_placed_once_bounds_arrive() {
        let mut state = SimulationState::new(42, Bounds::default());
        state.reset([plant("a"), plant("b"), plant("c")]);
        assert!(state.nodes().all(|n| n.position() == Point::new(0.0, 0.0)));

        let bounds = Bounds::new(800.0, 600.0);
        state.set_bounds(bounds);
        for node in state.nodes() {
            assert!(bounds.contains(node.position()));
        }
        let placed = positions(&state);

        // Later resizes leave placed nodes where they are
        state.set_bounds(Bounds::new(1024.0, 768.0));
        assert_eq!(positions(&state), placed);
    }

    #[test]
    fn test_scenario_three_plants() {
        let mut state = SimulationState::new(7, Bounds::new(800.0, 600.0));
        state.reset([plant("a"), plant("b"), plant("c")]);
        assert_eq!(state.len(), 3);

        let params = PhysicsParams::default();
        for _ in 0..100 {
            state.step(&params);
        }
        assert_eq!(state.len(), 3);
    }

    #[test]
    fn test_same_seed_same_garden() {
        let run = || {
            let mut state = SimulationState::new(11, Bounds::new(640.0, 480.0));
            state.reset([plant("a"), plant("b"), plant("c")]);
            for _ in 0..60 {
                state.step(&PhysicsParams::default());
            }
            positions(&state)
        };
        assert_eq!(run(), run());
    }
}
