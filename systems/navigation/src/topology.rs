//! Torus neighbor enumeration for the frontier search.

use rand::seq::SliceRandom;
use rand::Rng;
use serpent_core::{Cell, Direction, GridSize};

/// The four axis-aligned wrapped neighbors of `cell`, each paired with the
/// direction that produced it.
///
/// The order is randomized per call so that neither the greedy search nor the
/// bottleneck fallback carries a directional bias. Callers that need
/// reproducible orderings inject a seeded generator.
#[must_use]
pub fn shuffled_neighbors(
    cell: Cell,
    grid: GridSize,
    rng: &mut impl Rng,
) -> [(Cell, Direction); 4] {
    let mut neighbors =
        Direction::ALL.map(|direction| (grid.step(cell, direction), direction));
    neighbors.shuffle(rng);
    neighbors
}
