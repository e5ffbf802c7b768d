#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Navigation system that routes the agent toward the target each tick.
//!
//! The algorithmic core lives in [`plan_step`]: a greedy best-first frontier
//! search over the torus grid, with a randomized-order neighbor enumeration,
//! a bottleneck fallback for narrow passages, and a terminal dead-end signal
//! when the head is fully enclosed. [`Navigation`] wraps that query as a pure
//! event-driven system: it consumes world events and read-only views and
//! responds with step commands, ending the run when no safe move remains.

mod search;
pub mod topology;

pub use search::{plan_step, Outcome, PlanError};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serpent_core::{AgentView, Cell, Command, Event, GridSize, HaltReason};

/// Configuration parameters required to construct the navigation system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided randomness seed.
    ///
    /// The seed drives only the neighbor-enumeration order; two systems built
    /// from the same seed produce identical command streams for identical
    /// world states.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self { rng_seed }
    }
}

/// Pure system that plans one step per tick and emits movement commands.
#[derive(Debug)]
pub struct Navigation {
    rng: ChaCha8Rng,
}

impl Navigation {
    /// Creates a new navigation system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Consumes events and immutable views to emit movement commands.
    ///
    /// Plans exactly one step per observed [`Event::TimeAdvanced`], from a
    /// fresh occupancy snapshot of the agent's body. A discovered route or
    /// emergency move becomes a [`Command::StepAgent`]; a dead end becomes
    /// [`Command::EndRun`]. Malformed views are dropped without output: the
    /// world upholds the body invariants, so a violation here has no
    /// recovery the system could attempt.
    pub fn handle(
        &mut self,
        events: &[Event],
        agent_view: &AgentView,
        target: Cell,
        grid: GridSize,
        out: &mut Vec<Command>,
    ) {
        if !events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { .. }))
        {
            return;
        }

        let Ok(outcome) = plan_step(agent_view.cells(), target, grid, &mut self.rng) else {
            return;
        };

        match outcome {
            Outcome::Step(direction) => out.push(Command::StepAgent { direction }),
            Outcome::DeadEnd => out.push(Command::EndRun {
                reason: HaltReason::Enclosed,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serpent_core::Direction;

    use super::*;

    fn tick_events() -> Vec<Event> {
        vec![Event::TimeAdvanced {
            dt: Duration::from_millis(100),
        }]
    }

    #[test]
    fn stays_silent_without_a_tick() {
        let mut navigation = Navigation::new(Config::new(1));
        let view = AgentView::from_cells(vec![Cell::new(1, 1)]);
        let mut commands = Vec::new();

        navigation.handle(
            &[],
            &view,
            Cell::new(3, 3),
            GridSize::new(5, 5),
            &mut commands,
        );

        assert!(commands.is_empty());
    }

    #[test]
    fn emits_a_step_when_a_route_exists() {
        let mut navigation = Navigation::new(Config::new(1));
        let view = AgentView::from_cells(vec![Cell::new(1, 1)]);
        let mut commands = Vec::new();

        navigation.handle(
            &tick_events(),
            &view,
            Cell::new(3, 3),
            GridSize::new(5, 5),
            &mut commands,
        );

        assert_eq!(commands.len(), 1);
        assert!(matches!(commands[0], Command::StepAgent { .. }));
    }

    #[test]
    fn ends_the_run_when_the_head_is_enclosed() {
        let mut navigation = Navigation::new(Config::new(1));
        let view = AgentView::from_cells(vec![
            Cell::new(1, 1),
            Cell::new(1, 0),
            Cell::new(2, 1),
            Cell::new(1, 2),
            Cell::new(0, 1),
        ]);
        let mut commands = Vec::new();

        navigation.handle(
            &tick_events(),
            &view,
            Cell::new(0, 0),
            GridSize::new(3, 3),
            &mut commands,
        );

        assert_eq!(
            commands,
            vec![Command::EndRun {
                reason: HaltReason::Enclosed,
            }]
        );
    }

    #[test]
    fn malformed_views_produce_no_commands() {
        let mut navigation = Navigation::new(Config::new(1));
        let view = AgentView::from_cells(Vec::new());
        let mut commands = Vec::new();

        navigation.handle(
            &tick_events(),
            &view,
            Cell::new(0, 0),
            GridSize::new(3, 3),
            &mut commands,
        );

        assert!(commands.is_empty());
    }

    #[test]
    fn heads_toward_the_wrapped_edge_when_shorter() {
        let mut navigation = Navigation::new(Config::new(9));
        let view = AgentView::from_cells(vec![Cell::new(0, 0)]);
        let mut commands = Vec::new();

        navigation.handle(
            &tick_events(),
            &view,
            Cell::new(3, 0),
            GridSize::new(4, 4),
            &mut commands,
        );

        assert_eq!(
            commands,
            vec![Command::StepAgent {
                direction: Direction::West,
            }]
        );
    }
}
