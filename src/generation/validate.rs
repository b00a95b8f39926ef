//! # Connectivity Validator
//!
//! Two levels of checking:
//!
//! - **Lattice-level** (pre-carving, cheap): BFS over the room adjacency
//!   lattice, run by placement before any tiles are touched.
//! - **Tile-level** (post-carving, authoritative): BFS over the actual tile
//!   grid from spawn's floor center. Carving can fail silently (distance
//!   rejections, boundary clipping) even when the lattice graph looked
//!   connected, so only this check decides whether an attempt is published.
//!
//! Validation failures are reported as plain reason strings; the retry loop
//! logs them and discards the attempt.

use crate::generation::{GenerationConfig, MIN_BACKBONE_ROOMS, REQUIRED_SPECIAL_ROOMS};
use crate::world::{LatticePos, Position, Room, RoomKind, TileGrid};
use std::collections::{HashSet, VecDeque};

/// Structural pre-check on a candidate placement, before any carving.
///
/// Passes iff the cells form one connected component, at least
/// [`REQUIRED_SPECIAL_ROOMS`] cells have exactly one lattice neighbor, and at
/// least [`MIN_BACKBONE_ROOMS`] have more than one.
pub fn lattice_precheck(cells: &[LatticePos]) -> Result<(), String> {
    let Some(&seed) = cells.first() else {
        return Err("no cells placed".to_string());
    };
    let set: HashSet<LatticePos> = cells.iter().copied().collect();

    let mut reached = HashSet::from([seed]);
    let mut queue = VecDeque::from([seed]);
    while let Some(cell) = queue.pop_front() {
        for neighbor in cell.neighbors() {
            if set.contains(&neighbor) && reached.insert(neighbor) {
                queue.push_back(neighbor);
            }
        }
    }
    if reached.len() != set.len() {
        return Err(format!(
            "{} of {} cells unreachable from the seed",
            set.len() - reached.len(),
            set.len()
        ));
    }

    let neighbor_count = |cell: &LatticePos| {
        cell.neighbors().iter().filter(|n| set.contains(n)).count()
    };
    let single = cells.iter().filter(|c| neighbor_count(c) == 1).count();
    let multi = cells.iter().filter(|c| neighbor_count(c) > 1).count();

    if single < REQUIRED_SPECIAL_ROOMS {
        return Err(format!(
            "only {single} single-neighbor cells, need {REQUIRED_SPECIAL_ROOMS} for special rooms"
        ));
    }
    if multi < MIN_BACKBONE_ROOMS {
        return Err(format!(
            "only {multi} multi-neighbor cells, need {MIN_BACKBONE_ROOMS} for the backbone"
        ));
    }
    Ok(())
}

/// 4-directional flood fill from `start` through walkable (floor/door)
/// tiles. The start tile itself is always part of the result.
pub fn flood_fill(grid: &TileGrid, start: Position) -> HashSet<Position> {
    let mut visited = HashSet::from([start]);
    let mut queue = VecDeque::from([start]);
    while let Some(pos) = queue.pop_front() {
        for next in pos.cardinal_adjacent_positions() {
            if visited.contains(&next) {
                continue;
            }
            if grid.get(next).is_some_and(|t| t.is_walkable()) {
                visited.insert(next);
                queue.push_back(next);
            }
        }
    }
    visited
}

/// The authoritative post-carving check on a finished attempt.
///
/// Verifies role cardinality, the dead-end invariant, the spawn-adjacency
/// restriction, and tile-level reachability of every room from spawn.
pub fn validate_world(
    rooms: &[Room],
    grid: &TileGrid,
    config: &GenerationConfig,
) -> Result<(), String> {
    if rooms.is_empty() {
        return Err("no rooms generated".to_string());
    }
    if rooms.len() < config.room_count {
        return Err(format!(
            "only {} rooms generated, need {}",
            rooms.len(),
            config.room_count
        ));
    }

    check_role_cardinality(rooms)?;
    check_dead_ends(rooms)?;
    check_spawn_neighbors(rooms)?;
    check_tile_reachability(rooms, grid)?;
    Ok(())
}

fn count_kind(rooms: &[Room], kind: RoomKind) -> usize {
    rooms.iter().filter(|r| r.kind == kind).count()
}

/// Exactly 1 spawn/boss/shop/unlocked chest, exactly 2 locked chests.
fn check_role_cardinality(rooms: &[Room]) -> Result<(), String> {
    let expectations = [
        (RoomKind::Spawn, 1),
        (RoomKind::Boss, 1),
        (RoomKind::Shop, 1),
        (RoomKind::ChestUnlocked, 1),
        (RoomKind::ChestLocked, 2),
    ];
    for (kind, expected) in expectations {
        let found = count_kind(rooms, kind);
        if found != expected {
            return Err(format!("found {found} {kind:?} rooms, need exactly {expected}"));
        }
    }
    Ok(())
}

/// Special rooms are dead ends with exactly one connection; spawn has at
/// least one.
fn check_dead_ends(rooms: &[Room]) -> Result<(), String> {
    for room in rooms {
        let count = room.connections.len();
        if room.kind.is_special() && count != 1 {
            return Err(format!(
                "{:?} room {} has {count} connections, must have exactly 1",
                room.kind, room.id
            ));
        }
        if room.kind == RoomKind::Spawn && count == 0 {
            return Err("spawn room has no connections".to_string());
        }
    }
    Ok(())
}

/// Spawn's direct connections may only be unlocked chests or normal rooms.
fn check_spawn_neighbors(rooms: &[Room]) -> Result<(), String> {
    let Some(spawn) = rooms.iter().find(|r| r.kind == RoomKind::Spawn) else {
        return Err("no spawn room".to_string());
    };
    for &peer in &spawn.connections {
        let kind = rooms
            .get(peer)
            .map(|r| r.kind)
            .ok_or_else(|| format!("spawn connected to missing room {peer}"))?;
        if !matches!(kind, RoomKind::ChestUnlocked | RoomKind::Normal) {
            return Err(format!("{kind:?} room {peer} is connected directly to spawn"));
        }
    }
    Ok(())
}

/// BFS from spawn's floor center; every room needs at least one reachable
/// floor tile (item blocks may cover the exact center).
fn check_tile_reachability(rooms: &[Room], grid: &TileGrid) -> Result<(), String> {
    let Some(spawn) = rooms.iter().find(|r| r.kind == RoomKind::Spawn) else {
        return Err("no spawn room".to_string());
    };
    let visited = flood_fill(grid, spawn.center_tile());

    let mut unreachable = Vec::new();
    for room in rooms {
        let reachable = room.floor_tiles().any(|pos| {
            visited.contains(&pos) && grid.get(pos) == Some(crate::TileKind::Floor)
        });
        if !reachable {
            unreachable.push(format!("{:?} ({})", room.kind, room.id));
        }
    }
    if !unreachable.is_empty() {
        return Err(format!(
            "{} rooms unreachable from spawn via floor tiles: {}",
            unreachable.len(),
            unreachable.join(", ")
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TileKind;

    fn strip(len: i32) -> Vec<LatticePos> {
        (0..len).map(|c| LatticePos::new(c, 0)).collect()
    }

    /// A cross of two-cell arms around a hub, with a forked east arm:
    /// leaves at (1,3), (3,1), (3,5), (5,2), (5,4).
    fn five_leaf_layout() -> Vec<LatticePos> {
        vec![
            LatticePos::new(3, 3), // hub
            LatticePos::new(2, 3),
            LatticePos::new(1, 3), // west leaf
            LatticePos::new(3, 2),
            LatticePos::new(3, 1), // north leaf
            LatticePos::new(3, 4),
            LatticePos::new(3, 5), // south leaf
            LatticePos::new(4, 3),
            LatticePos::new(5, 3), // east fork hub
            LatticePos::new(5, 2), // east leaf
            LatticePos::new(5, 4), // east leaf
        ]
    }

    #[test]
    fn test_precheck_rejects_empty() {
        assert!(lattice_precheck(&[]).is_err());
    }

    #[test]
    fn test_precheck_rejects_disconnected() {
        let mut cells = strip(6);
        cells.push(LatticePos::new(10, 10));
        let err = lattice_precheck(&cells).unwrap_err();
        assert!(err.contains("unreachable"));
    }

    #[test]
    fn test_precheck_rejects_too_few_dead_ends() {
        // A straight strip has only its two endpoints as single-neighbor
        // cells.
        let err = lattice_precheck(&strip(8)).unwrap_err();
        assert!(err.contains("single-neighbor"));
    }

    #[test]
    fn test_precheck_accepts_leafy_layout() {
        assert!(lattice_precheck(&five_leaf_layout()).is_ok());
    }

    #[test]
    fn test_flood_fill_respects_walls() {
        let mut grid = TileGrid::new(7, 3);
        for x in 0..3 {
            grid.set(Position::new(x, 1), TileKind::Floor);
        }
        // Wall at x=3, floor beyond it.
        for x in 4..7 {
            grid.set(Position::new(x, 1), TileKind::Floor);
        }
        let visited = flood_fill(&grid, Position::new(0, 1));
        assert!(visited.contains(&Position::new(2, 1)));
        assert!(!visited.contains(&Position::new(4, 1)));
    }

    #[test]
    fn test_flood_fill_passes_doors() {
        let mut grid = TileGrid::new(5, 3);
        grid.set(Position::new(0, 1), TileKind::Floor);
        grid.set(Position::new(1, 1), TileKind::Door);
        grid.set(Position::new(2, 1), TileKind::Floor);
        let visited = flood_fill(&grid, Position::new(0, 1));
        assert!(visited.contains(&Position::new(2, 1)));
    }

    fn test_rooms() -> Vec<Room> {
        let config = GenerationConfig::for_testing(1);
        five_leaf_layout()
            .into_iter()
            .enumerate()
            .map(|(id, cell)| Room::new(id, cell, config.floor_origin(cell), 14))
            .collect()
    }

    #[test]
    fn test_cardinality_check() {
        let mut rooms = test_rooms();
        rooms[0].kind = RoomKind::Spawn;
        rooms[1].kind = RoomKind::Boss;
        rooms[3].kind = RoomKind::Shop;
        rooms[4].kind = RoomKind::ChestUnlocked;
        rooms[5].kind = RoomKind::ChestLocked;
        // Only one locked chest: must fail.
        let err = check_role_cardinality(&rooms).unwrap_err();
        assert!(err.contains("ChestLocked"));

        rooms[6].kind = RoomKind::ChestLocked;
        assert!(check_role_cardinality(&rooms).is_ok());
    }

    #[test]
    fn test_dead_end_check_flags_extra_connections() {
        let mut rooms = test_rooms();
        rooms[0].kind = RoomKind::Spawn;
        rooms[1].kind = RoomKind::Boss;
        rooms[0].add_connection(1);
        rooms[1].add_connection(0);
        rooms[1].add_connection(2);
        let err = check_dead_ends(&rooms).unwrap_err();
        assert!(err.contains("Boss"));
    }

    #[test]
    fn test_spawn_neighbor_restriction() {
        let mut rooms = test_rooms();
        rooms[0].kind = RoomKind::Spawn;
        rooms[1].kind = RoomKind::Shop;
        rooms[0].add_connection(1);
        rooms[1].add_connection(0);
        let err = check_spawn_neighbors(&rooms).unwrap_err();
        assert!(err.contains("Shop"));

        rooms[1].kind = RoomKind::ChestUnlocked;
        assert!(check_spawn_neighbors(&rooms).is_ok());
    }
}
