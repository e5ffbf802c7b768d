#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic targeting system that relocates the target after consumption.
//!
//! The navigation core treats the target as read-only; this system is the
//! collaborator that owns its relocation. Whenever the agent consumes the
//! target, a replacement is proposed on a uniformly random unoccupied cell.
//! A grid with no free cell left ends the run as fully filled.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serpent_core::{Cell, Command, Event, HaltReason};

/// Configuration parameters required to construct the targeting system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided randomness seed.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self { rng_seed }
    }
}

/// Pure system that reacts to target consumption with placement commands.
#[derive(Debug)]
pub struct Targeting {
    rng: ChaCha8Rng,
}

impl Targeting {
    /// Creates a new targeting system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Consumes events and the current free-cell census to emit placement
    /// commands.
    ///
    /// `free_cells` must reflect the world state after the consuming step was
    /// applied, so the freshly grown body is already excluded.
    pub fn handle(&mut self, events: &[Event], free_cells: &[Cell], out: &mut Vec<Command>) {
        for event in events {
            if !matches!(event, Event::TargetConsumed { .. }) {
                continue;
            }

            if free_cells.is_empty() {
                out.push(Command::EndRun {
                    reason: HaltReason::GridFilled,
                });
                continue;
            }

            let index = self.rng.gen_range(0..free_cells.len());
            out.push(Command::PlaceTarget {
                cell: free_cells[index],
            });
        }
    }
}
