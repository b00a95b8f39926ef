//! # Room Placement Engine
//!
//! Chooses lattice cells for the target number of rooms by randomized
//! expansion from a seed cell at the map center, so the induced 4-directional
//! adjacency graph is connected by construction.
//!
//! The dead-end phase grows one arm per special room: a chain of cells in
//! which every new cell touches only its predecessor, leaving the arm tip
//! with exactly one lattice neighbor. The backbone phase then fills any
//! shortfall with cells that keep the finished tips untouched.

use crate::generation::{validate, GenerationConfig, REQUIRED_SPECIAL_ROOMS};
use crate::world::{LatticePos, Room, RoomKind};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::collections::HashSet;

/// Produces a connected set of lattice cells for the requested room count.
///
/// The first cell is always the seed (spawn) cell at the lattice center.
/// Each candidate layout is checked against the lattice-level pre-check
/// before any carving; failing layouts are discarded and placement restarts,
/// up to the configured cap. Exhausting the cap keeps the last layout and
/// logs a warning; the outer retry loop is the final safety net.
pub fn place_rooms(config: &GenerationConfig, rng: &mut StdRng) -> Vec<LatticePos> {
    let mut last = Vec::new();
    for attempt in 1..=config.placement_attempts {
        let cells = expand_layout(config, rng);
        match validate::lattice_precheck(&cells) {
            Ok(()) => {
                log::debug!("placement: valid layout on attempt {attempt}");
                return cells;
            }
            Err(reason) => {
                log::debug!("placement: layout attempt {attempt} rejected: {reason}");
                last = cells;
            }
        }
    }
    log::warn!(
        "placement: no layout passed the pre-check in {} attempts, proceeding with the last one",
        config.placement_attempts
    );
    last
}

/// One placement attempt: seed the center cell, grow the dead-end arms, then
/// fill any shortfall along the frontier.
fn expand_layout(config: &GenerationConfig, rng: &mut StdRng) -> Vec<LatticePos> {
    let capacity = (config.lattice_cols() * config.lattice_rows()) as usize;
    let target = config.room_count.min(capacity);

    let mut placed = vec![config.center_cell()];
    let mut placed_set: HashSet<LatticePos> = placed.iter().copied().collect();
    let mut tips: HashSet<LatticePos> = HashSet::new();

    // One arm per special room; the cells are split across them so arm
    // interiors double as the backbone.
    let remaining = target.saturating_sub(1);
    let arms = REQUIRED_SPECIAL_ROOMS.min(remaining);
    for arm in 0..arms {
        let length = remaining / arms + usize::from(arm < remaining % arms);
        grow_arm(config, &mut placed, &mut placed_set, &mut tips, length, rng);
    }

    // Blocked arms leave a shortfall; fill it with frontier cells, keeping
    // clear of the tips so the finished arms stay dead ends.
    while placed.len() < target {
        let frontier = frontier_candidates(config, &placed, &placed_set);
        let safe: Vec<(LatticePos, usize)> = frontier
            .iter()
            .copied()
            .filter(|(cell, _)| cell.neighbors().iter().all(|n| !tips.contains(n)))
            .collect();
        let chosen = pick_by_neighbor_count(&safe, 1, rng)
            .or_else(|| safe.choose(rng).map(|&(cell, _)| cell))
            .or_else(|| frontier.choose(rng).map(|&(cell, _)| cell));
        let Some(cell) = chosen else {
            log::debug!(
                "placement: frontier exhausted with {} of {} rooms placed",
                placed.len(),
                target
            );
            break;
        };
        placed.push(cell);
        placed_set.insert(cell);
    }

    placed
}

/// Grows one chain of up to `length` cells off the placed set. Every new
/// cell touches only its predecessor, so the finished tip has exactly one
/// lattice neighbor and later arms can never attach to it.
fn grow_arm(
    config: &GenerationConfig,
    placed: &mut Vec<LatticePos>,
    placed_set: &mut HashSet<LatticePos>,
    tips: &mut HashSet<LatticePos>,
    length: usize,
    rng: &mut StdRng,
) {
    let mut starts: Vec<LatticePos> = placed
        .iter()
        .copied()
        .filter(|cell| !tips.contains(cell))
        .collect();
    starts.shuffle(rng);
    let Some(start) = starts
        .into_iter()
        .find(|&cell| !arm_extensions(config, cell, placed_set).is_empty())
    else {
        log::debug!("placement: no cell left to start an arm from");
        return;
    };

    let mut tip = start;
    for _ in 0..length {
        let options = arm_extensions(config, tip, placed_set);
        let Some(&next) = options.choose(rng) else {
            break;
        };
        placed.push(next);
        placed_set.insert(next);
        tip = next;
    }
    if tip != start {
        tips.insert(tip);
    }
}

/// Free in-bounds cells adjacent to `cell` that touch no other placed cell.
fn arm_extensions(
    config: &GenerationConfig,
    cell: LatticePos,
    placed_set: &HashSet<LatticePos>,
) -> Vec<LatticePos> {
    cell.neighbors()
        .into_iter()
        .filter(|&n| config.cell_in_bounds(n) && !placed_set.contains(&n))
        .filter(|&n| {
            n.neighbors()
                .iter()
                .filter(|p| placed_set.contains(p))
                .count()
                == 1
        })
        .collect()
}

/// All in-bounds unplaced cells adjacent to the placed set, with their
/// placed-neighbor counts.
fn frontier_candidates(
    config: &GenerationConfig,
    placed: &[LatticePos],
    placed_set: &HashSet<LatticePos>,
) -> Vec<(LatticePos, usize)> {
    let mut seen = HashSet::new();
    let mut frontier = Vec::new();
    for cell in placed {
        for neighbor in cell.neighbors() {
            if !config.cell_in_bounds(neighbor)
                || placed_set.contains(&neighbor)
                || !seen.insert(neighbor)
            {
                continue;
            }
            let count = neighbor
                .neighbors()
                .iter()
                .filter(|n| placed_set.contains(n))
                .count();
            frontier.push((neighbor, count));
        }
    }
    frontier
}

/// Uniform random choice among frontier cells with the wanted neighbor
/// count.
fn pick_by_neighbor_count(
    frontier: &[(LatticePos, usize)],
    wanted: usize,
    rng: &mut StdRng,
) -> Option<LatticePos> {
    let matching: Vec<LatticePos> = frontier
        .iter()
        .filter(|&&(_, n)| n == wanted)
        .map(|&(cell, _)| cell)
        .collect();
    matching.choose(rng).copied()
}

/// Instantiates the room list for a placement: the seed cell becomes the
/// spawn room, everything else starts as a normal room.
pub fn build_rooms(cells: &[LatticePos], config: &GenerationConfig) -> Vec<Room> {
    let mut rooms: Vec<Room> = cells
        .iter()
        .enumerate()
        .map(|(id, &cell)| Room::new(id, cell, config.floor_origin(cell), config.room_floor_size))
        .collect();
    if let Some(seed) = rooms.first_mut() {
        seed.kind = RoomKind::Spawn;
    }
    rooms
}
