use std::time::Duration;

use serpent_core::{Command, Event, GridSize};
use serpent_system_navigation::{Config, Navigation};
use serpent_world::{self as world, query, World};

const TICKS: u32 = 40;
const SEED: u64 = 0x5EED;

/// Runs a headless world/navigation loop and records every command emitted.
fn record_run(seed: u64) -> Vec<Command> {
    let grid = GridSize::new(10, 8);
    let mut world = World::new(grid);
    let mut navigation = Navigation::new(Config::new(seed));
    let mut log = Vec::new();

    for _ in 0..TICKS {
        let mut events = Vec::new();
        world::apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(100),
            },
            &mut events,
        );

        let mut commands = Vec::new();
        navigation.handle(
            &events,
            &query::agent_view(&world),
            query::target(&world),
            grid,
            &mut commands,
        );

        let mut ended = false;
        for command in &commands {
            let mut step_events = Vec::new();
            world::apply(&mut world, *command, &mut step_events);
            if step_events
                .iter()
                .any(|event| matches!(event, Event::RunEnded { .. }))
            {
                ended = true;
            }
        }
        log.extend(commands);
        if ended {
            break;
        }
    }

    log
}

#[test]
fn identically_seeded_runs_emit_identical_command_streams() {
    let first = record_run(SEED);
    let second = record_run(SEED);
    assert_eq!(first, second);
    assert!(!first.is_empty(), "run emitted no commands at all");
}

#[test]
fn every_emitted_step_is_applied_without_rejection() {
    let grid = GridSize::new(10, 8);
    let mut world = World::new(grid);
    let mut navigation = Navigation::new(Config::new(SEED));

    for _ in 0..TICKS {
        let mut events = Vec::new();
        world::apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(100),
            },
            &mut events,
        );

        let mut commands = Vec::new();
        navigation.handle(
            &events,
            &query::agent_view(&world),
            query::target(&world),
            grid,
            &mut commands,
        );

        for command in commands {
            let mut step_events = Vec::new();
            world::apply(&mut world, command, &mut step_events);
            assert!(
                !step_events
                    .iter()
                    .any(|event| matches!(event, Event::StepRejected { .. })),
                "world rejected a planned step"
            );
        }
    }
}
