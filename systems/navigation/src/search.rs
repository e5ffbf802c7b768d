//! Greedy best-first route search over the agent's occupancy snapshot.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::error::Error;
use std::fmt;

use rand::Rng;
use serpent_core::{direction_between, Cell, Direction, GridSize};

use crate::topology::shuffled_neighbors;

/// Result of a single navigation query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// First move of a discovered route, or an emergency safe move.
    Step(Direction),
    /// No unoccupied neighbor of the head exists; the run cannot continue.
    DeadEnd,
}

/// Contract violations reported when a query receives malformed input.
///
/// These are rejections, not recoverable conditions: the same input will fail
/// identically on retry, so callers are expected to fix the producing state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlanError {
    /// The body contained no cells.
    EmptyBody,
    /// A body cell lay outside the grid bounds.
    BodyOutOfBounds(Cell),
    /// The same cell appeared twice in the body.
    DuplicateBodyCell(Cell),
    /// The target lay outside the grid bounds.
    TargetOutOfBounds(Cell),
}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyBody => write!(f, "agent body is empty"),
            Self::BodyOutOfBounds(cell) => {
                write!(f, "body cell ({}, {}) is out of bounds", cell.x(), cell.y())
            }
            Self::DuplicateBodyCell(cell) => {
                write!(f, "body cell ({}, {}) appears twice", cell.x(), cell.y())
            }
            Self::TargetOutOfBounds(cell) => {
                write!(f, "target ({}, {}) is out of bounds", cell.x(), cell.y())
            }
        }
    }
}

impl Error for PlanError {}

/// Entry on the search frontier, ordered by heuristic priority with
/// insertion-order tie-breaking.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct FrontierEntry {
    priority: u32,
    sequence: u64,
    cell: Cell,
}

/// Per-query scratch state, rebuilt from the body before every search and
/// discarded afterwards.
#[derive(Debug)]
struct Scratch {
    occupied: Vec<bool>,
    visited: Vec<bool>,
    enqueued: Vec<bool>,
    predecessor: Vec<Option<Cell>>,
}

impl Scratch {
    /// Builds the occupancy mask from the body, validating the query contract
    /// along the way: every cell in bounds, no duplicates.
    fn from_body(body: &[Cell], grid: GridSize) -> Result<Self, PlanError> {
        let cell_count = grid.cell_count();
        let mut occupied = vec![false; cell_count];
        for &cell in body {
            let index = grid
                .index_of(cell)
                .ok_or(PlanError::BodyOutOfBounds(cell))?;
            if occupied[index] {
                return Err(PlanError::DuplicateBodyCell(cell));
            }
            occupied[index] = true;
        }
        let visited = occupied.clone();
        Ok(Self {
            occupied,
            visited,
            enqueued: vec![false; cell_count],
            predecessor: vec![None; cell_count],
        })
    }
}

/// Computes the agent's next move toward the target, if one exists.
///
/// The search is a greedy best-first search: the frontier is ordered by the
/// wrap-aware Manhattan distance to the target, not by accumulated path cost,
/// so the returned route is found quickly but is not guaranteed to be the
/// shortest. When the frontier degenerates to a single candidate before the
/// target is reached, the query falls back to an emergency move onto any
/// unoccupied neighbor of the head rather than grinding through a narrow
/// corridor. [`Outcome::DeadEnd`] is returned exactly when every neighbor of
/// the head is occupied.
///
/// All search state is rebuilt from the inputs on every call; nothing persists
/// between queries.
///
/// # Errors
///
/// Returns a [`PlanError`] when the body is empty or contains duplicate or
/// out-of-range cells, or when the target lies outside the grid. Out-of-range
/// input is rejected rather than wrapped; wraparound applies only to the
/// neighbor arithmetic inside the search.
pub fn plan_step(
    body: &[Cell],
    target: Cell,
    grid: GridSize,
    rng: &mut impl Rng,
) -> Result<Outcome, PlanError> {
    let head = *body.first().ok_or(PlanError::EmptyBody)?;
    if !grid.contains(target) {
        return Err(PlanError::TargetOutOfBounds(target));
    }

    let mut scratch = Scratch::from_body(body, grid)?;
    let head_index = grid.index_of(head).ok_or(PlanError::BodyOutOfBounds(head))?;

    // The head is part of the body, so it starts marked as an obstacle; the
    // search could never leave the start without clearing it.
    scratch.visited[head_index] = false;
    scratch.enqueued[head_index] = true;

    let mut frontier = BinaryHeap::new();
    let mut sequence: u64 = 0;
    frontier.push(Reverse(FrontierEntry {
        priority: 0,
        sequence,
        cell: head,
    }));

    while let Some(Reverse(entry)) = frontier.pop() {
        if entry.cell == target {
            return Ok(first_move(&scratch.predecessor, grid, head, target));
        }

        let Some(entry_index) = grid.index_of(entry.cell) else {
            continue;
        };

        for (neighbor, _) in shuffled_neighbors(entry.cell, grid, rng) {
            let Some(neighbor_index) = grid.index_of(neighbor) else {
                continue;
            };
            if scratch.visited[neighbor_index] || scratch.enqueued[neighbor_index] {
                continue;
            }
            scratch.predecessor[neighbor_index] = Some(entry.cell);
            scratch.enqueued[neighbor_index] = true;
            sequence += 1;
            frontier.push(Reverse(FrontierEntry {
                priority: grid.manhattan_torus(target, neighbor),
                sequence,
                cell: neighbor,
            }));
        }

        scratch.visited[entry_index] = true;

        // A frontier collapsed to a single candidate signals a narrow passage
        // forming around the agent. Abandon the search for an emergency move
        // instead of chasing the corridor to its end.
        if frontier.len() == 1 {
            if let Some(Reverse(lone)) = frontier.peek() {
                if lone.cell != target {
                    return Ok(bottleneck_escape(head, &scratch.occupied, grid, rng));
                }
            }
        }
    }

    Ok(Outcome::DeadEnd)
}

/// Picks any currently-unoccupied neighbor of the head as an emergency move.
///
/// Neighbor order is randomized, so the chosen escape varies run to run. This
/// trades route quality for a termination guarantee at narrow passages.
fn bottleneck_escape(
    head: Cell,
    occupied: &[bool],
    grid: GridSize,
    rng: &mut impl Rng,
) -> Outcome {
    for (neighbor, direction) in shuffled_neighbors(head, grid, rng) {
        let blocked = grid
            .index_of(neighbor)
            .map_or(true, |index| occupied[index]);
        if !blocked {
            return Outcome::Step(direction);
        }
    }
    Outcome::DeadEnd
}

/// Reconstructs the route by walking the predecessor map back from the target
/// and reads off the direction of its first edge.
fn first_move(
    predecessor: &[Option<Cell>],
    grid: GridSize,
    head: Cell,
    target: Cell,
) -> Outcome {
    let mut cursor = target;
    loop {
        let previous = grid
            .index_of(cursor)
            .and_then(|index| predecessor.get(index).copied())
            .flatten();
        match previous {
            Some(cell) if cell == head => break,
            Some(cell) => cursor = cell,
            // Only the head carries a sentinel predecessor; reaching it means
            // the target was the head itself and no move exists.
            None => return Outcome::DeadEnd,
        }
    }
    match direction_between(grid, head, cursor) {
        Some(direction) => Outcome::Step(direction),
        None => Outcome::DeadEnd,
    }
}
