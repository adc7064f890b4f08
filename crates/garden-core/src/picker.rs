//! Pointer picking

use crate::{Plant, Point, SimNode};

/// Find the plant under the pointer
///
/// Returns the plant of the nearest node if it lies strictly closer than
/// `hit_radius`. On equal distances the node met first wins.
pub fn pick<'a, I>(nodes: I, pointer: Point, hit_radius: f64) -> Option<&'a Plant>
where
    I: IntoIterator<Item = &'a SimNode>,
{
    let mut closest: Option<(&SimNode, f64)> = None;

    for node in nodes {
        let distance = node.position().distance(pointer);
        if distance >= hit_radius {
            continue;
        }
        match closest {
            Some((_, best)) if distance >= best => {}
            _ => closest = Some((node, distance)),
        }
    }

    closest.map(|(node, _)| &node.plant)
}
