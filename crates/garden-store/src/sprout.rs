//! Sprouting: generate a brand-new plant from a seed roll

use garden_core::{GardenRng, Plant, PlantId, Rarity};

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

const LEGENDARY_TRAITS: [&[&str]; 3] = [
    &[
        "Quantum Processing",
        "Time Manipulation",
        "Reality Bending",
        "Dimensional Shift",
    ],
    &[
        "Neural Synthesis",
        "Cosmic Awareness",
        "Infinite Learning",
        "Quantum Entanglement",
    ],
    &[
        "Universal Adaptation",
        "Temporal Cognition",
        "Multidimensional Thinking",
    ],
];

const RARE_TRAITS: [&[&str]; 3] = [
    &[
        "Advanced Learning",
        "Parallel Processing",
        "Pattern Recognition",
        "Energy Manipulation",
    ],
    &[
        "Adaptive Evolution",
        "Deep Intuition",
        "Quantum Computing",
        "Neural Enhancement",
    ],
    &[
        "Rapid Growth",
        "Collective Intelligence",
        "Synergistic Thinking",
    ],
];

const COMMON_TRAITS: [&[&str]; 3] = [
    &[
        "Self-Learning",
        "Data Analysis",
        "Problem Solving",
        "Pattern Matching",
    ],
    &[
        "Adaptive Behavior",
        "Basic Evolution",
        "Neural Growth",
        "Energy Efficiency",
    ],
    &["Quick Learning", "Collaborative Spirit", "Logical Thinking"],
];

/// Roll a rarity: 5% Legendary, then 20% of the rest Rare, else Common
pub fn roll_rarity(rng: &mut GardenRng) -> Rarity {
    if rng.next_f64() > 0.95 {
        Rarity::Legendary
    } else if rng.next_f64() > 0.8 {
        Rarity::Rare
    } else {
        Rarity::Common
    }
}

/// The three trait pools a plant of `rarity` draws from
pub fn trait_pools(rarity: Rarity) -> &'static [&'static [&'static str]; 3] {
    match rarity {
        Rarity::Legendary => &LEGENDARY_TRAITS,
        Rarity::Rare => &RARE_TRAITS,
        Rarity::Common | Rarity::Unknown => &COMMON_TRAITS,
    }
}

fn base36(rng: &mut GardenRng, len: usize) -> String {
    (0..len)
        .filter_map(|_| rng.pick(BASE36).map(|&b| b as char))
        .collect()
}

/// Generate a fresh level-1 plant
///
/// One trait is drawn from each pool of the rolled rarity.
pub fn sprout(rng: &mut GardenRng, id: impl Into<PlantId>) -> Plant {
    let rarity = roll_rarity(rng);
    let traits: Vec<String> = trait_pools(rarity)
        .iter()
        .filter_map(|pool| rng.pick(pool).map(|t| t.to_string()))
        .collect();

    let mut plant = Plant::new(id, format!("Digital {}", base36(rng, 5)), rarity);
    plant.traits = traits;
    plant.genome = format!("ACTG{}", base36(rng, 5).to_uppercase());
    plant.growth = 0.0;
    plant.energy = 100.0;
    plant.experience = 0;
    plant.level = 1;
    plant.environment = "Optimal".to_string();
    plant
}
