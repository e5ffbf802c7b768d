#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for the Serpent engine.
//!
//! The world owns the agent body, the target, and the dense occupancy mask,
//! and mutates them exclusively through [`apply`]. Systems never touch this
//! state directly; they observe it through the read-only accessors in
//! [`query`] and react with command batches of their own.

use std::collections::VecDeque;

use serpent_core::{
    Cell, Command, Direction, Event, GridSize, PlacementError, RunStatus, StepError,
};

const INITIAL_SEGMENT_COUNT: u32 = 3;
const DEFAULT_TARGET_SEED: Cell = Cell::new(3, 4);

/// Authoritative simulation state for a single run.
#[derive(Debug)]
pub struct World {
    grid: GridSize,
    agent: VecDeque<Cell>,
    target: Cell,
    occupancy: OccupancyGrid,
    status: RunStatus,
    tick_index: u64,
}

impl World {
    /// Creates a new world with a freshly seeded agent and target.
    ///
    /// The agent starts with three segments: the head at the grid center and
    /// the remainder trailing east, wrapping where the grid demands it. The
    /// target lands on its seed cell unless the agent already covers it, in
    /// which case the first free cell in row-major order is used instead.
    #[must_use]
    pub fn new(grid: GridSize) -> Self {
        let agent = seed_agent(grid);
        let mut occupancy = OccupancyGrid::new(grid);
        occupancy.rebuild(agent.iter().copied());
        let target = seed_target(grid, &occupancy);
        Self {
            grid,
            agent,
            target,
            occupancy,
            status: RunStatus::Running,
            tick_index: 0,
        }
    }

    fn head(&self) -> Cell {
        // The agent is seeded non-empty and only ever grows.
        *self.agent.front().expect("agent body is never empty")
    }

    fn apply_step(&mut self, direction: Direction, out_events: &mut Vec<Event>) {
        let from = self.head();
        let to = self.grid.step(from, direction);

        if to == self.target {
            self.agent.push_front(to);
            self.occupancy.occupy(to);
            out_events.push(Event::AgentAdvanced { from, to });
            out_events.push(Event::TargetConsumed {
                cell: to,
                length: u32::try_from(self.agent.len()).unwrap_or(u32::MAX),
            });
            return;
        }

        let tail = *self.agent.back().expect("agent body is never empty");
        if self.occupancy.is_occupied(to) && to != tail {
            out_events.push(Event::StepRejected {
                direction,
                reason: StepError::SelfCollision,
            });
            return;
        }

        let _ = self.agent.pop_back();
        self.occupancy.vacate(tail);
        self.agent.push_front(to);
        self.occupancy.occupy(to);
        out_events.push(Event::AgentAdvanced { from, to });
    }

    fn apply_target(&mut self, cell: Cell, out_events: &mut Vec<Event>) {
        if !self.grid.contains(cell) {
            out_events.push(Event::TargetRejected {
                cell,
                reason: PlacementError::OutOfBounds,
            });
            return;
        }
        if self.occupancy.is_occupied(cell) {
            out_events.push(Event::TargetRejected {
                cell,
                reason: PlacementError::Occupied,
            });
            return;
        }
        self.target = cell;
        out_events.push(Event::TargetPlaced { cell });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    if let RunStatus::Ended { .. } = world.status {
        if let Command::StepAgent { direction } = command {
            out_events.push(Event::StepRejected {
                direction,
                reason: StepError::RunOver,
            });
        }
        return;
    }

    match command {
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::StepAgent { direction } => {
            world.apply_step(direction, out_events);
        }
        Command::PlaceTarget { cell } => {
            world.apply_target(cell, out_events);
        }
        Command::EndRun { reason } => {
            world.status = RunStatus::Ended { reason };
            out_events.push(Event::RunEnded { reason });
        }
    }
}

fn seed_agent(grid: GridSize) -> VecDeque<Cell> {
    let head = Cell::new(grid.width() / 2, grid.height() / 2);
    let mut agent = VecDeque::with_capacity(INITIAL_SEGMENT_COUNT as usize);
    let mut cell = head;
    for _ in 0..INITIAL_SEGMENT_COUNT {
        if agent.contains(&cell) {
            // A grid narrower than the seed body folds onto itself; stop
            // before the invariant of distinct segments breaks.
            break;
        }
        agent.push_back(cell);
        cell = grid.step(cell, Direction::East);
    }
    agent
}

fn seed_target(grid: GridSize, occupancy: &OccupancyGrid) -> Cell {
    let seeded = Cell::new(
        serpent_core::wrap(i64::from(DEFAULT_TARGET_SEED.x()), grid.width()),
        serpent_core::wrap(i64::from(DEFAULT_TARGET_SEED.y()), grid.height()),
    );
    if !occupancy.is_occupied(seeded) {
        return seeded;
    }
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            let cell = Cell::new(x, y);
            if !occupancy.is_occupied(cell) {
                return cell;
            }
        }
    }
    seeded
}

/// Dense per-cell boolean mask tracking which cells the agent occupies.
#[derive(Clone, Debug)]
struct OccupancyGrid {
    cells: Vec<bool>,
    grid: GridSize,
}

impl OccupancyGrid {
    fn new(grid: GridSize) -> Self {
        Self {
            cells: vec![false; grid.cell_count()],
            grid,
        }
    }

    fn rebuild(&mut self, body: impl Iterator<Item = Cell>) {
        self.cells.fill(false);
        for cell in body {
            self.occupy(cell);
        }
    }

    fn occupy(&mut self, cell: Cell) {
        if let Some(index) = self.grid.index_of(cell) {
            self.cells[index] = true;
        }
    }

    fn vacate(&mut self, cell: Cell) {
        if let Some(index) = self.grid.index_of(cell) {
            self.cells[index] = false;
        }
    }

    fn is_occupied(&self, cell: Cell) -> bool {
        self.grid
            .index_of(cell)
            .map_or(false, |index| self.cells[index])
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use serpent_core::{AgentView, Cell, GridSize, OccupancyView, RunStatus};

    use super::World;

    /// Dimensions of the periodic grid hosting the run.
    #[must_use]
    pub fn grid_size(world: &World) -> GridSize {
        world.grid
    }

    /// Captures a head-first snapshot of the agent's body.
    #[must_use]
    pub fn agent_view(world: &World) -> AgentView {
        AgentView::from_cells(world.agent.iter().copied().collect())
    }

    /// Exposes a read-only view of the dense occupancy mask.
    #[must_use]
    pub fn occupancy_view(world: &World) -> OccupancyView<'_> {
        OccupancyView::new(&world.occupancy.cells, world.grid)
    }

    /// Cell the target currently occupies.
    #[must_use]
    pub fn target(world: &World) -> Cell {
        world.target
    }

    /// Lifecycle state of the run.
    #[must_use]
    pub fn status(world: &World) -> RunStatus {
        world.status
    }

    /// Number of ticks the world has processed so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Enumerates every cell not currently covered by the agent's body.
    #[must_use]
    pub fn free_cells(world: &World) -> Vec<Cell> {
        let mut free = Vec::new();
        for y in 0..world.grid.height() {
            for x in 0..world.grid.width() {
                let cell = Cell::new(x, y);
                if !world.occupancy.is_occupied(cell) {
                    free.push(cell);
                }
            }
        }
        free
    }
}
