//! Physics step and proximity links
//!
//! The step is a pure function of the nodes, the surface bounds, the
//! tuning parameters and an injected RNG, so a fixed seed replays the
//! same garden frame for frame.

use crate::{Bounds, GardenRng, SimNode};
use serde::{Deserialize, Serialize};

/// Tuning for node motion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsParams {
    /// Per-axis velocity jitter added every step, drawn from `[-jitter, jitter)`
    pub jitter: f64,
    /// Fraction of speed kept when bouncing off an edge
    pub restitution: f64,
    /// Velocity multiplier applied every step
    pub damping: f64,
    /// Per-axis speed bound for newly seeded nodes
    pub initial_speed: f64,
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self {
            jitter: 0.05,
            restitution: 0.8,
            damping: 0.99,
            initial_speed: 1.0,
        }
    }
}

/// Advance every node by one frame
///
/// Jitter, Euler integration, edge reflection, then damping. Positions
/// are not clamped, so a node may overshoot an edge slightly before the
/// reflected velocity brings it back.
pub fn step<'a, I>(nodes: I, bounds: Bounds, rng: &mut GardenRng, params: &PhysicsParams)
where
    I: IntoIterator<Item = &'a mut SimNode>,
{
    for node in nodes {
        node.vx += rng.symmetric(params.jitter);
        node.vy += rng.symmetric(params.jitter);

        node.x += node.vx;
        node.y += node.vy;

        if node.x <= 0.0 || node.x >= bounds.width {
            node.vx *= -params.restitution;
        }
        if node.y <= 0.0 || node.y >= bounds.height {
            node.vy *= -params.restitution;
        }

        node.vx *= params.damping;
        node.vy *= params.damping;
    }
}

/// An inferred link between two nearby nodes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connection {
    /// Index of the first node
    pub a: usize,
    /// Index of the second node (always greater than `a`)
    pub b: usize,
    /// `(threshold - distance) / threshold`, in `(0, 1]`
    pub weight: f64,
}

/// Find every unordered pair of nodes closer than `threshold`
///
/// Pairwise, so O(n²) per call. Fine for the tens to low hundreds of
/// plants a garden holds; a uniform grid would be the next step.
pub fn connections(nodes: &[&SimNode], threshold: f64) -> Vec<Connection> {
    let mut links = Vec::new();
    if threshold <= 0.0 {
        return links;
    }

    for (a, first) in nodes.iter().enumerate() {
        let origin = first.position();
        for (offset, second) in nodes[a + 1..].iter().enumerate() {
            let distance = origin.distance(second.position());
            if distance < threshold {
                links.push(Connection {
                    a,
                    b: a + 1 + offset,
                    weight: (threshold - distance) / threshold,
                });
            }
        }
    }

    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Plant, Point, Rarity};

    fn node(id: &str, x: f64, y: f64, vx: f64, vy: f64) -> SimNode {
        let mut node = SimNode::at(Plant::new(id, "fern", Rarity::Common), Point::new(x, y));
        node.vx = vx;
        node.vy = vy;
        node
    }

    fn seeded_nodes(seed: u64, count: usize, bounds: Bounds) -> Vec<SimNode> {
        let mut rng = GardenRng::new(seed);
        (0..count)
            .map(|i| {
                let plant = Plant::new(format!("p{i}"), "fern", Rarity::Common);
                SimNode::seeded(plant, bounds, &mut rng, 1.0)
            })
            .collect()
    }

    #[test]
    fn test_step_is_deterministic() {
        let bounds = Bounds::new(800.0, 600.0);
        let params = PhysicsParams::default();

        let run = || {
            let mut nodes = seeded_nodes(9, 12, bounds);
            let mut rng = GardenRng::new(42);
            for _ in 0..500 {
                step(nodes.iter_mut(), bounds, &mut rng, &params);
            }
            nodes
        };

        assert_eq!(run(), run());
    }

    #[test]
    fn test_step_integrates_and_damps() {
        let params = PhysicsParams {
            jitter: 0.0,
            ..PhysicsParams::default()
        };
        let mut nodes = vec![node("a", 100.0, 100.0, 2.0, -1.0)];
        let mut rng = GardenRng::new(1);

        step(nodes.iter_mut(), Bounds::new(800.0, 600.0), &mut rng, &params);

        let n = &nodes[0];
        assert_eq!(n.x, 102.0);
        assert_eq!(n.y, 99.0);
        assert!((n.vx - 1.98).abs() < 1e-12);
        assert!((n.vy + 0.99).abs() < 1e-12);
    }

    #[test]
    fn test_reflection_is_inelastic_and_unclamped() {
        let params = PhysicsParams {
            jitter: 0.0,
            ..PhysicsParams::default()
        };
        let mut nodes = vec![node("a", 799.5, 300.0, 1.0, 0.0)];
        let mut rng = GardenRng::new(1);

        step(nodes.iter_mut(), Bounds::new(800.0, 600.0), &mut rng, &params);

        let n = &nodes[0];
        assert_eq!(n.x, 800.5);
        assert!((n.vx + 0.8 * 0.99).abs() < 1e-12);

        let mut nodes = vec![node("b", 0.5, 300.0, -1.0, 0.0)];
        step(nodes.iter_mut(), Bounds::new(800.0, 600.0), &mut rng, &params);
        assert_eq!(nodes[0].x, -0.5);
        assert!(nodes[0].vx > 0.0);
    }

    #[test]
    fn test_speed_decreases_without_jitter() {
        let bounds = Bounds::new(800.0, 600.0);
        let params = PhysicsParams {
            jitter: 0.0,
            ..PhysicsParams::default()
        };
        let mut nodes = seeded_nodes(5, 20, bounds);
        let mut rng = GardenRng::new(5);

        for _ in 0..300 {
            let before: Vec<(f64, f64)> = nodes.iter().map(|n| (n.vx.abs(), n.vy.abs())).collect();
            step(nodes.iter_mut(), bounds, &mut rng, &params);
            for (n, (vx, vy)) in nodes.iter().zip(before) {
                if vx > 1e-12 {
                    assert!(n.vx.abs() < vx);
                }
                if vy > 1e-12 {
                    assert!(n.vy.abs() < vy);
                }
            }
        }
    }

    #[test]
    fn test_connections() {
        let nodes = [
            node("a", 0.0, 0.0, 0.0, 0.0),
            node("b", 30.0, 40.0, 0.0, 0.0),
            node("c", 500.0, 500.0, 0.0, 0.0),
            node("d", 0.0, 150.0, 0.0, 0.0),
        ];
        let refs: Vec<&SimNode> = nodes.iter().collect();

        let links = connections(&refs, 150.0);

        // a-b at 50, b-d at ~114; a-d is exactly at the threshold
        assert_eq!(links.len(), 2);
        assert_eq!((links[0].a, links[0].b), (0, 1));
        assert!((links[0].weight - 100.0 / 150.0).abs() < 1e-12);
        assert_eq!((links[1].a, links[1].b), (1, 3));
        assert!(links.iter().all(|l| l.weight > 0.0 && l.weight <= 1.0));
    }

    #[test]
    fn test_connections_empty() {
        assert!(connections(&[], 150.0).is_empty());
        let lone = node("a", 1.0, 1.0, 0.0, 0.0);
        assert!(connections(&[&lone], 150.0).is_empty());
    }
}
