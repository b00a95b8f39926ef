//! # Hallway Carving
//!
//! Carves 2-wide floor corridors and 2-tile door markers between room pairs,
//! and registers the pair in each other's connection sets.
//!
//! Adjacent pairs (lattice distance 1) get a straight corridor between their
//! facing walls; near pairs (distance 2-3) get an L-shaped corridor routed
//! through the room centers. Anything further is rejected without touching
//! the grid. Tile writes are idempotent; connection registration is not, so
//! the connection phases guard against double carving.

use crate::generation::CARVE_MAX_LATTICE_DISTANCE;
use crate::world::{link_rooms, Lattice, Position, Room, RoomId, RoomKind, TileGrid, TileKind};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::collections::HashSet;

/// Result of a single carve request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarveOutcome {
    /// Corridor and doors were written.
    Carved,
    /// Rooms further than [`CARVE_MAX_LATTICE_DISTANCE`] apart; nothing was
    /// written.
    TooFar,
    /// Centers are not axis-aligned for a straight corridor, or the pair is
    /// degenerate; nothing was written.
    Misaligned,
}

impl CarveOutcome {
    /// Whether tiles were written and a connection may be recorded.
    pub fn is_carved(self) -> bool {
        self == CarveOutcome::Carved
    }
}

/// Carves every room's floor rectangle. Runs before any corridor so door
/// placement can assume walls around each floor.
pub fn carve_room_floors(rooms: &[Room], grid: &mut TileGrid) {
    for room in rooms {
        for pos in room.floor_tiles() {
            grid.set(pos, TileKind::Floor);
        }
    }
}

/// Carves a corridor between two rooms, dispatching on lattice distance.
///
/// Does not record the connection; callers pair a `Carved` outcome with
/// [`link_rooms`].
pub fn carve_hallway(grid: &mut TileGrid, a: &Room, b: &Room) -> CarveOutcome {
    let distance = a.cell.distance(b.cell);
    if distance > CARVE_MAX_LATTICE_DISTANCE {
        return CarveOutcome::TooFar;
    }
    match distance {
        0 => CarveOutcome::Misaligned,
        1 => carve_straight(grid, a, b),
        _ => carve_l_shaped(grid, a, b),
    }
}

/// A 2-tile door on a room's boundary wall. East/west doors stack
/// vertically, north/south doors extend horizontally.
fn place_door(grid: &mut TileGrid, pos: Position, vertical_pair: bool) {
    grid.set(pos, TileKind::Door);
    let second = if vertical_pair {
        Position::new(pos.x, pos.y + 1)
    } else {
        Position::new(pos.x + 1, pos.y)
    };
    grid.set(second, TileKind::Door);
}

/// Straight corridor between the facing walls of two lattice-adjacent rooms.
fn carve_straight(grid: &mut TileGrid, a: &Room, b: &Room) -> CarveOutcome {
    let fs = a.floor_size;
    let off = fs / 2 - 1;
    let (af, bf) = (a.floor_origin, b.floor_origin);
    let dc = b.cell.col - a.cell.col;
    let dr = b.cell.row - a.cell.row;

    if dr == 0 && dc != 0 {
        // Horizontal: doors on the facing east/west walls, corridor between
        // them, 2 tiles wide.
        let (door_a, door_b) = if dc > 0 {
            (Position::new(af.x + fs, af.y + off), Position::new(bf.x - 1, bf.y + off))
        } else {
            (Position::new(af.x - 1, af.y + off), Position::new(bf.x + fs, bf.y + off))
        };
        let (start, end) = if dc > 0 {
            (door_a.x + 1, door_b.x - 1)
        } else {
            (door_b.x + 1, door_a.x - 1)
        };
        for x in start..=end {
            grid.set(Position::new(x, door_a.y), TileKind::Floor);
            grid.set(Position::new(x, door_a.y + 1), TileKind::Floor);
        }
        place_door(grid, door_a, true);
        place_door(grid, door_b, true);
        CarveOutcome::Carved
    } else if dc == 0 && dr != 0 {
        let (door_a, door_b) = if dr > 0 {
            (Position::new(af.x + off, af.y + fs), Position::new(bf.x + off, bf.y - 1))
        } else {
            (Position::new(af.x + off, af.y - 1), Position::new(bf.x + off, bf.y + fs))
        };
        let (start, end) = if dr > 0 {
            (door_a.y + 1, door_b.y - 1)
        } else {
            (door_b.y + 1, door_a.y - 1)
        };
        for y in start..=end {
            grid.set(Position::new(door_a.x, y), TileKind::Floor);
            grid.set(Position::new(door_a.x + 1, y), TileKind::Floor);
        }
        place_door(grid, door_a, false);
        place_door(grid, door_b, false);
        CarveOutcome::Carved
    } else {
        CarveOutcome::Misaligned
    }
}

/// L-shaped corridor for near pairs: a horizontal run at the first room's
/// center row, then a vertical run at the second room's center column. Pure
/// horizontal or vertical long runs degenerate to a single segment.
fn carve_l_shaped(grid: &mut TileGrid, a: &Room, b: &Room) -> CarveOutcome {
    let fs = a.floor_size;
    let off = fs / 2 - 1;
    let (af, bf) = (a.floor_origin, b.floor_origin);
    let (c1, c2) = (a.center_tile(), b.center_tile());
    let (dx, dy) = (c2.x - c1.x, c2.y - c1.y);

    let mut door_a = None;
    let mut door_b = None;

    if dx != 0 {
        for x in c1.x.min(c2.x)..=c1.x.max(c2.x) {
            grid.set(Position::new(x, c1.y), TileKind::Floor);
            grid.set(Position::new(x, c1.y + 1), TileKind::Floor);
        }
        // Exit door on the first room's east or west wall.
        door_a = Some((
            if dx > 0 {
                Position::new(af.x + fs, af.y + off)
            } else {
                Position::new(af.x - 1, af.y + off)
            },
            true,
        ));
        if dy == 0 {
            door_b = Some((
                if dx > 0 {
                    Position::new(bf.x - 1, bf.y + off)
                } else {
                    Position::new(bf.x + fs, bf.y + off)
                },
                true,
            ));
        }
    }

    if dy != 0 {
        for y in c1.y.min(c2.y)..=c1.y.max(c2.y) {
            grid.set(Position::new(c2.x, y), TileKind::Floor);
            grid.set(Position::new(c2.x + 1, y), TileKind::Floor);
        }
        // Entry door on the second room's north or south wall.
        door_b = Some((
            if dy > 0 {
                Position::new(bf.x + off, bf.y - 1)
            } else {
                Position::new(bf.x + off, bf.y + fs)
            },
            false,
        ));
        if dx == 0 {
            door_a = Some((
                if dy > 0 {
                    Position::new(af.x + off, af.y + fs)
                } else {
                    Position::new(af.x + off, af.y - 1)
                },
                false,
            ));
        }
    }

    for (pos, vertical) in [door_a, door_b].into_iter().flatten() {
        place_door(grid, pos, vertical);
    }
    CarveOutcome::Carved
}

/// Connects the whole dungeon: phase 1 spans spawn and normal rooms over
/// lattice adjacency, phase 2 gives each special room its single dead-end
/// connection.
pub fn connect_rooms(
    rooms: &mut [Room],
    lattice: &Lattice,
    grid: &mut TileGrid,
    rng: &mut StdRng,
) {
    let Some(spawn) = rooms.iter().find(|r| r.kind == RoomKind::Spawn).map(|r| r.id) else {
        return;
    };
    connect_backbone(rooms, lattice, grid, rng, spawn);
    connect_special_rooms(rooms, lattice, grid, rng);
}

/// Phase 1: attach every normal room to the growing connected component,
/// preferring the connected neighbor with the fewest existing connections.
fn connect_backbone(
    rooms: &mut [Room],
    lattice: &Lattice,
    grid: &mut TileGrid,
    rng: &mut StdRng,
    spawn: RoomId,
) {
    let mut connected: HashSet<RoomId> = HashSet::from([spawn]);
    loop {
        let mut progress = false;
        for id in 0..rooms.len() {
            if connected.contains(&id) || rooms[id].kind != RoomKind::Normal {
                continue;
            }
            let candidates: Vec<RoomId> = lattice
                .neighbor_ids(rooms[id].cell)
                .into_iter()
                .filter(|n| connected.contains(n))
                .filter(|&n| matches!(rooms[n].kind, RoomKind::Normal | RoomKind::Spawn))
                .collect();
            let Some(target) = fewest_connections(rooms, &candidates, rng) else {
                continue;
            };
            if carve_hallway(grid, &rooms[id], &rooms[target]).is_carved() {
                link_rooms(rooms, id, target);
                connected.insert(id);
                progress = true;
            }
        }
        if !progress {
            break;
        }
    }
}

/// Phase 2: each special room gets exactly one connection. Unlocked chests
/// prefer spawn; everything else may only attach to normal rooms.
fn connect_special_rooms(
    rooms: &mut [Room],
    lattice: &Lattice,
    grid: &mut TileGrid,
    rng: &mut StdRng,
) {
    for id in 0..rooms.len() {
        if !rooms[id].kind.is_special() || !rooms[id].connections.is_empty() {
            continue;
        }
        let mut spawn_neighbor = None;
        let mut normal_neighbors = Vec::new();
        for n in lattice.neighbor_ids(rooms[id].cell) {
            match rooms[n].kind {
                RoomKind::Spawn if rooms[id].kind == RoomKind::ChestUnlocked => {
                    spawn_neighbor = Some(n);
                }
                RoomKind::Normal => normal_neighbors.push(n),
                _ => {}
            }
        }
        let target = spawn_neighbor.or_else(|| fewest_connections(rooms, &normal_neighbors, rng));
        let Some(target) = target else {
            log::debug!(
                "carving: no usable neighbor for {:?} room {id}, leaving it for the validator",
                rooms[id].kind
            );
            continue;
        };
        if carve_hallway(grid, &rooms[id], &rooms[target]).is_carved() {
            link_rooms(rooms, id, target);
        }
    }
}

/// The candidate with the fewest existing connections, uniform random among
/// ties.
fn fewest_connections(rooms: &[Room], candidates: &[RoomId], rng: &mut StdRng) -> Option<RoomId> {
    let best = candidates.iter().map(|&id| rooms[id].connections.len()).min()?;
    let tied: Vec<RoomId> = candidates
        .iter()
        .copied()
        .filter(|&id| rooms[id].connections.len() == best)
        .collect();
    tied.choose(rng).copied()
}

/// Writes the 2x2 special-item blocks once all roles and corridors are
/// final: chests in chest rooms, the hole in the boss room.
pub fn place_room_items(rooms: &[Room], grid: &mut TileGrid) {
    for room in rooms {
        let item = match room.kind {
            RoomKind::ChestUnlocked => TileKind::ChestUnlocked,
            RoomKind::ChestLocked => TileKind::ChestLocked,
            RoomKind::Boss => TileKind::Hole,
            _ => continue,
        };
        let center = room.center_tile();
        for dy in 0..2 {
            for dx in 0..2 {
                grid.set(center + Position::new(dx, dy), item);
            }
        }
    }
}
