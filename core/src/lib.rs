#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Serpent engine.
//!
//! This crate defines the message surface that connects the authoritative
//! world, the pure systems, and the driver adapter. Systems consume [`Event`]
//! streams together with read-only views of the world and respond exclusively
//! with new [`Command`] batches; the world executes those commands through its
//! `apply` entry point and broadcasts the resulting events. Alongside the
//! messages live the torus-grid value types every crate agrees on.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Commands that express all permissible world mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that the agent advance a single step in the given direction.
    StepAgent {
        /// Direction of travel for the attempted step.
        direction: Direction,
    },
    /// Requests that the target relocate to the provided cell.
    PlaceTarget {
        /// Cell the target should occupy next.
        cell: Cell,
    },
    /// Requests that the run transition to its terminal state.
    EndRun {
        /// Why the run can no longer continue.
        reason: HaltReason,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that the agent's head moved between two cells.
    AgentAdvanced {
        /// Cell the head occupied before moving.
        from: Cell,
        /// Cell the head occupies after completing the move.
        to: Cell,
    },
    /// Announces that the agent consumed the target and grew by one segment.
    TargetConsumed {
        /// Cell the consumed target occupied.
        cell: Cell,
        /// Body length after growth.
        length: u32,
    },
    /// Confirms that the target relocated to a new cell.
    TargetPlaced {
        /// Cell the target now occupies.
        cell: Cell,
    },
    /// Reports that a target placement request was rejected.
    TargetRejected {
        /// Cell provided in the placement request.
        cell: Cell,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Reports that a step request was rejected by the world.
    StepRejected {
        /// Direction provided in the step request.
        direction: Direction,
        /// Specific reason the step failed.
        reason: StepError,
    },
    /// Announces that the run reached its terminal state.
    RunEnded {
        /// Why the run ended.
        reason: HaltReason,
    },
}

/// Cardinal movement directions available to the agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// All four directions in compass order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Returns the direction pointing the opposite way.
    #[must_use]
    pub const fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    x: u32,
    y: u32,
}

impl Cell {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }
}

/// Maps an arbitrary integer offset back into `[0, size)` by modular
/// wraparound rather than clamping.
///
/// A `size` of zero yields zero so callers never observe a panic on a
/// degenerate grid.
#[must_use]
pub fn wrap(offset: i64, size: u32) -> u32 {
    if size == 0 {
        return 0;
    }
    let size = i64::from(size);
    let wrapped = offset.rem_euclid(size);
    // rem_euclid output is always in [0, size), so the cast cannot truncate.
    wrapped as u32
}

/// Dimensions of the periodic grid the agent inhabits.
///
/// Both axes wrap: stepping past the last column re-enters at column zero and
/// vice versa, and the same holds for rows. All cells produced through
/// [`GridSize::step`] therefore stay within bounds by construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    width: u32,
    height: u32,
}

impl GridSize {
    /// Creates a new grid size descriptor.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Total number of cells contained in the grid.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        usize::try_from(self.width).unwrap_or(0) * usize::try_from(self.height).unwrap_or(0)
    }

    /// Reports whether the cell lies within the grid bounds.
    #[must_use]
    pub const fn contains(&self, cell: Cell) -> bool {
        cell.x() < self.width && cell.y() < self.height
    }

    /// Row-major index of the cell, if it lies within bounds.
    #[must_use]
    pub fn index_of(&self, cell: Cell) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let row = usize::try_from(cell.y()).ok()?;
        let column = usize::try_from(cell.x()).ok()?;
        let width = usize::try_from(self.width).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }

    /// Moves the cell one step in the given direction, wrapping both axes.
    #[must_use]
    pub fn step(&self, cell: Cell, direction: Direction) -> Cell {
        let x = i64::from(cell.x());
        let y = i64::from(cell.y());
        let (x, y) = match direction {
            Direction::North => (x, y - 1),
            Direction::East => (x + 1, y),
            Direction::South => (x, y + 1),
            Direction::West => (x - 1, y),
        };
        Cell::new(wrap(x, self.width), wrap(y, self.height))
    }

    /// Wrap-aware Manhattan distance between two cells.
    ///
    /// Each axis contributes the shorter of the plane distance and the
    /// distance through the wrapped edge.
    #[must_use]
    pub fn manhattan_torus(&self, a: Cell, b: Cell) -> u32 {
        axis_torus(a.x(), b.x(), self.width) + axis_torus(a.y(), b.y(), self.height)
    }

    /// Wrap-aware squared distance between two cells.
    ///
    /// Provided for alternative heuristics; the default search orders its
    /// frontier by [`GridSize::manhattan_torus`] instead.
    #[must_use]
    pub fn squared_torus(&self, a: Cell, b: Cell) -> u64 {
        let dx = u64::from(axis_torus(a.x(), b.x(), self.width));
        let dy = u64::from(axis_torus(a.y(), b.y(), self.height));
        dx * dx + dy * dy
    }
}

fn axis_torus(a: u32, b: u32, size: u32) -> u32 {
    let plane = a.abs_diff(b);
    plane.min(size.saturating_sub(plane))
}

/// Determines the direction that moves `from` onto `to` in a single wrapped
/// step, if the two cells are torus-adjacent.
#[must_use]
pub fn direction_between(grid: GridSize, from: Cell, to: Cell) -> Option<Direction> {
    Direction::ALL
        .into_iter()
        .find(|direction| grid.step(from, *direction) == to)
}

/// Reasons the run may reach its terminal state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HaltReason {
    /// Every neighbor of the agent's head is occupied by its own body.
    Enclosed,
    /// No unoccupied cell remains for the target to relocate to.
    GridFilled,
}

/// Reasons a target placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementError {
    /// The requested cell lies outside the configured grid bounds.
    OutOfBounds,
    /// The requested cell is occupied by the agent's body.
    Occupied,
}

/// Reasons a step request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepError {
    /// The destination cell is occupied by the agent's own body.
    SelfCollision,
    /// The run already ended, so movement is disabled.
    RunOver,
}

/// Observable lifecycle state of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunStatus {
    /// The agent is alive and accepting step commands.
    Running,
    /// The run reached a terminal state.
    Ended {
        /// Why the run ended.
        reason: HaltReason,
    },
}

/// Read-only snapshot of the agent's body, head-first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AgentView {
    cells: Vec<Cell>,
}

impl AgentView {
    /// Creates a new view from head-first body cells.
    #[must_use]
    pub fn from_cells(cells: Vec<Cell>) -> Self {
        Self { cells }
    }

    /// The agent's head cell, if the body is non-empty.
    #[must_use]
    pub fn head(&self) -> Option<Cell> {
        self.cells.first().copied()
    }

    /// Body cells in head-first order.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Number of segments composing the body.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether the view captured an empty body.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Read-only view into the dense occupancy mask.
#[derive(Clone, Copy, Debug)]
pub struct OccupancyView<'a> {
    cells: &'a [bool],
    grid: GridSize,
}

impl<'a> OccupancyView<'a> {
    /// Captures a new occupancy view backed by the provided cell slice.
    #[must_use]
    pub fn new(cells: &'a [bool], grid: GridSize) -> Self {
        Self { cells, grid }
    }

    /// Reports whether the cell is currently blocked by the agent's body.
    #[must_use]
    pub fn is_occupied(&self, cell: Cell) -> bool {
        self.grid
            .index_of(cell)
            .and_then(|index| self.cells.get(index).copied())
            .unwrap_or(false)
    }

    /// Dimensions of the underlying occupancy grid.
    #[must_use]
    pub const fn grid(&self) -> GridSize {
        self.grid
    }

    /// Iterator over all cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = bool> + 'a {
        self.cells.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{de::DeserializeOwned, Serialize};

    #[test]
    fn wrap_reduces_offsets_into_bounds() {
        assert_eq!(wrap(-1, 4), 3);
        assert_eq!(wrap(4, 4), 0);
        assert_eq!(wrap(9, 4), 1);
        assert_eq!(wrap(-9, 4), 3);
    }

    #[test]
    fn wrap_is_idempotent() {
        for offset in -20..20 {
            let once = wrap(offset, 7);
            assert_eq!(wrap(i64::from(once), 7), once);
        }
    }

    #[test]
    fn wrap_tolerates_degenerate_size() {
        assert_eq!(wrap(5, 0), 0);
    }

    #[test]
    fn step_wraps_both_axes() {
        let grid = GridSize::new(4, 3);
        assert_eq!(
            grid.step(Cell::new(0, 0), Direction::West),
            Cell::new(3, 0)
        );
        assert_eq!(
            grid.step(Cell::new(3, 0), Direction::East),
            Cell::new(0, 0)
        );
        assert_eq!(
            grid.step(Cell::new(0, 0), Direction::North),
            Cell::new(0, 2)
        );
        assert_eq!(
            grid.step(Cell::new(0, 2), Direction::South),
            Cell::new(0, 0)
        );
    }

    #[test]
    fn step_never_leaves_bounds() {
        let grid = GridSize::new(5, 4);
        for x in 0..5 {
            for y in 0..4 {
                for direction in Direction::ALL {
                    let next = grid.step(Cell::new(x, y), direction);
                    assert!(grid.contains(next));
                }
            }
        }
    }

    #[test]
    fn manhattan_torus_prefers_wrapped_edges() {
        let grid = GridSize::new(4, 4);
        assert_eq!(grid.manhattan_torus(Cell::new(0, 0), Cell::new(3, 0)), 1);
        assert_eq!(grid.manhattan_torus(Cell::new(0, 0), Cell::new(2, 0)), 2);
        assert_eq!(grid.manhattan_torus(Cell::new(1, 1), Cell::new(1, 1)), 0);
        assert_eq!(grid.manhattan_torus(Cell::new(0, 0), Cell::new(3, 3)), 2);
    }

    #[test]
    fn squared_torus_matches_axis_shortcuts() {
        let grid = GridSize::new(4, 4);
        assert_eq!(grid.squared_torus(Cell::new(0, 0), Cell::new(3, 0)), 1);
        assert_eq!(grid.squared_torus(Cell::new(0, 0), Cell::new(2, 1)), 5);
    }

    #[test]
    fn direction_between_recognises_wrapped_adjacency() {
        let grid = GridSize::new(4, 4);
        let origin = Cell::new(0, 0);
        assert_eq!(
            direction_between(grid, origin, Cell::new(1, 0)),
            Some(Direction::East)
        );
        assert_eq!(
            direction_between(grid, origin, Cell::new(3, 0)),
            Some(Direction::West)
        );
        assert_eq!(
            direction_between(grid, origin, Cell::new(0, 3)),
            Some(Direction::North)
        );
        assert_eq!(direction_between(grid, origin, Cell::new(2, 0)), None);
        assert_eq!(direction_between(grid, origin, origin), None);
    }

    #[test]
    fn opposite_directions_pair_up() {
        for direction in Direction::ALL {
            assert_eq!(direction.opposite().opposite(), direction);
            assert_ne!(direction.opposite(), direction);
        }
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn cell_round_trips_through_bincode() {
        assert_round_trip(&Cell::new(5, 7));
    }

    #[test]
    fn grid_size_round_trips_through_bincode() {
        assert_round_trip(&GridSize::new(80, 48));
    }

    #[test]
    fn direction_round_trips_through_bincode() {
        assert_round_trip(&Direction::West);
    }

    #[test]
    fn halt_reason_round_trips_through_bincode() {
        assert_round_trip(&HaltReason::Enclosed);
    }
}
