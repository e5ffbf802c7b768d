#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless command-line driver for the Serpent engine.
//!
//! Pumps the tick loop: the world emits events, the navigation system plans a
//! step, the targeting system relocates consumed targets, and the resulting
//! commands feed back into the world. Rendering and input are deliberately
//! absent; the only output is an end-of-run summary.

use std::time::Duration;

use anyhow::{ensure, Result};
use clap::Parser;
use serpent_core::{Command, Event, GridSize, HaltReason, RunStatus};
use serpent_system_navigation::{Config as NavigationConfig, Navigation};
use serpent_system_targeting::{Config as TargetingConfig, Targeting};
use serpent_world::{self as world, query, World};

/// Simulated time advanced per tick.
const TICK_DT: Duration = Duration::from_millis(100);
/// Salt separating the targeting RNG stream from the navigation stream.
const TARGETING_SEED_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

#[derive(Debug, Parser)]
#[command(name = "serpent", about = "Headless serpent run on a periodic grid")]
struct Args {
    /// Number of grid columns.
    #[arg(long, default_value_t = 16)]
    width: u32,
    /// Number of grid rows.
    #[arg(long, default_value_t = 12)]
    height: u32,
    /// Seed driving both systems' random number generators.
    #[arg(long, default_value_t = 0xC0FF_EE)]
    seed: u64,
    /// Maximum number of ticks before the run is cut off.
    #[arg(long, default_value_t = 2000)]
    max_ticks: u64,
}

/// Entry point for the Serpent command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    ensure!(
        args.width >= 4 && args.height >= 4,
        "grid must be at least 4x4 to host the seeded agent"
    );

    let grid = GridSize::new(args.width, args.height);
    let mut world = World::new(grid);
    let mut navigation = Navigation::new(NavigationConfig::new(args.seed));
    let mut targeting = Targeting::new(TargetingConfig::new(
        args.seed ^ TARGETING_SEED_SALT,
    ));

    let mut targets_consumed: u64 = 0;
    let mut halt_reason = None;

    'run: for _ in 0..args.max_ticks {
        let mut events = Vec::new();
        world::apply(&mut world, Command::Tick { dt: TICK_DT }, &mut events);

        let mut commands = Vec::new();
        navigation.handle(
            &events,
            &query::agent_view(&world),
            query::target(&world),
            grid,
            &mut commands,
        );

        let mut step_events = Vec::new();
        for command in commands {
            world::apply(&mut world, command, &mut step_events);
        }

        let free_cells = query::free_cells(&world);
        let mut placements = Vec::new();
        targeting.handle(&step_events, &free_cells, &mut placements);
        for command in placements {
            world::apply(&mut world, command, &mut step_events);
        }

        for event in &step_events {
            match event {
                Event::TargetConsumed { .. } => targets_consumed += 1,
                Event::RunEnded { reason } => {
                    halt_reason = Some(*reason);
                    break 'run;
                }
                _ => {}
            }
        }
    }

    let length = query::agent_view(&world).len();
    let ticks = query::tick_index(&world);
    println!("ticks survived:   {ticks}");
    println!("targets consumed: {targets_consumed}");
    println!("final length:     {length}");
    match halt_reason.or_else(|| match query::status(&world) {
        RunStatus::Ended { reason } => Some(reason),
        RunStatus::Running => None,
    }) {
        Some(HaltReason::Enclosed) => println!("outcome:          boxed in"),
        Some(HaltReason::GridFilled) => println!("outcome:          grid filled"),
        None => println!("outcome:          tick budget exhausted"),
    }

    Ok(())
}
