//! # Role Assignment
//!
//! Promotes normal rooms to the five special roles after placement and
//! before any carving, scored by hop distance from spawn over the lattice:
//!
//! - **Boss**: farthest eligible room.
//! - **Unlocked chest**: closest eligible room, the one role allowed next to
//!   spawn.
//! - **Locked chests** (x2): farthest remaining, weighted double.
//! - **Shop**: balances distance from spawn against distance from the boss.
//!
//! Eligibility keeps specials on dead-end-capable cells: exactly one
//! normal-or-spawn lattice neighbor and no special neighbors. When a layout
//! cannot supply enough eligible cells the pass falls back to converting
//! arbitrary normal rooms and lets the repair pass clean up.

use crate::world::{Lattice, Room, RoomId, RoomKind};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::collections::HashMap;

/// Assigns every special role. `rooms` must contain exactly one spawn room.
pub fn assign_roles(rooms: &mut [Room], lattice: &Lattice, rng: &mut StdRng) {
    let Some(spawn) = rooms.iter().find(|r| r.kind == RoomKind::Spawn).map(|r| r.id) else {
        return;
    };
    let distances = lattice.hop_distances(spawn, rooms);

    assign_one(rooms, lattice, rng, RoomKind::Boss, |id| {
        distances.get(&id).map(|&d| d as i64)
    });
    assign_one(rooms, lattice, rng, RoomKind::ChestUnlocked, |id| {
        distances.get(&id).map(|&d| -(d as i64))
    });
    for _ in 0..2 {
        assign_one(rooms, lattice, rng, RoomKind::ChestLocked, |id| {
            distances.get(&id).map(|&d| 2 * d as i64)
        });
    }
    let boss_distance = rooms
        .iter()
        .find(|r| r.kind == RoomKind::Boss)
        .and_then(|r| distances.get(&r.id).copied())
        .unwrap_or(0) as i64;
    assign_one(rooms, lattice, rng, RoomKind::Shop, |id| {
        distances.get(&id).map(|&d| {
            let d = d as i64;
            2 * d + (boss_distance - d).abs()
        })
    });
}

/// Promotes the best-scoring eligible normal room to `role`, uniform random
/// among score ties. Falls back to a forced conversion when nothing is
/// eligible.
fn assign_one(
    rooms: &mut [Room],
    lattice: &Lattice,
    rng: &mut StdRng,
    role: RoomKind,
    score: impl Fn(RoomId) -> Option<i64>,
) {
    let candidates: Vec<(RoomId, i64)> = rooms
        .iter()
        .filter(|r| is_eligible(rooms, lattice, r.id, role))
        .filter_map(|r| score(r.id).map(|s| (r.id, s)))
        .collect();

    if let Some(best) = candidates.iter().map(|&(_, s)| s).max() {
        let tied: Vec<RoomId> = candidates
            .iter()
            .filter(|&&(_, s)| s == best)
            .map(|&(id, _)| id)
            .collect();
        if let Some(&chosen) = tied.choose(rng) {
            rooms[chosen].kind = role;
            return;
        }
    }
    force_conversion(rooms, lattice, rng, role);
}

/// Whether a normal room at this cell may take a dead-end special role:
/// exactly one normal-or-spawn lattice neighbor, no special neighbors, and
/// only unlocked chests directly beside spawn.
pub fn is_eligible(rooms: &[Room], lattice: &Lattice, id: RoomId, role: RoomKind) -> bool {
    if rooms[id].kind != RoomKind::Normal {
        return false;
    }
    let mut open_neighbors = 0;
    let mut beside_spawn = false;
    for n in lattice.neighbor_ids(rooms[id].cell) {
        match rooms[n].kind {
            RoomKind::Spawn => {
                open_neighbors += 1;
                beside_spawn = true;
            }
            RoomKind::Normal => open_neighbors += 1,
            _ => return false,
        }
    }
    open_neighbors == 1 && (!beside_spawn || role.may_neighbor_spawn())
}

/// Last resort when no cell satisfies the dead-end predicate: convert some
/// normal room anyway, preferring one the spawn rule at least allows. The
/// repair pass gets a chance to move it somewhere legal.
fn force_conversion(rooms: &mut [Room], lattice: &Lattice, rng: &mut StdRng, role: RoomKind) {
    let normals: Vec<RoomId> = rooms
        .iter()
        .filter(|r| r.kind == RoomKind::Normal)
        .map(|r| r.id)
        .collect();
    let allowed: Vec<RoomId> = normals
        .iter()
        .copied()
        .filter(|&id| {
            role.may_neighbor_spawn()
                || lattice
                    .neighbor_ids(rooms[id].cell)
                    .iter()
                    .all(|&n| rooms[n].kind != RoomKind::Spawn)
        })
        .collect();
    let pool = if allowed.is_empty() { &normals } else { &allowed };
    match pool.choose(rng) {
        Some(&id) => {
            log::warn!("assignment: no eligible dead-end cell for {role:?}, forcing room {id}");
            rooms[id].kind = role;
        }
        None => {
            log::warn!("assignment: no normal room left to take {role:?}");
        }
    }
}

/// Hop distances from spawn for callers that already hold the lattice.
pub fn spawn_distances(rooms: &[Room], lattice: &Lattice) -> HashMap<RoomId, u32> {
    match rooms.iter().find(|r| r.kind == RoomKind::Spawn) {
        Some(spawn) => lattice.hop_distances(spawn.id, rooms),
        None => HashMap::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::GenerationConfig;
    use crate::world::LatticePos;
    use rand::SeedableRng;

    /// Spawn hub with two-cell arms west/north/south and a forked east arm;
    /// the five leaves are the only eligible cells.
    fn leafy_rooms() -> Vec<Room> {
        let cells = [
            (3, 3), // spawn hub
            (2, 3),
            (1, 3), // west leaf
            (3, 2),
            (3, 1), // north leaf
            (3, 4),
            (3, 5), // south leaf
            (4, 3),
            (5, 3), // east fork hub
            (5, 2), // east leaf
            (5, 4), // east leaf
        ];
        let config = GenerationConfig::new(1);
        let mut rooms: Vec<Room> = cells
            .iter()
            .enumerate()
            .map(|(id, &(col, row))| {
                let cell = LatticePos::new(col, row);
                Room::new(id, cell, config.floor_origin(cell), config.room_floor_size)
            })
            .collect();
        rooms[0].kind = RoomKind::Spawn;
        rooms
    }

    #[test]
    fn test_eligibility_requires_single_open_neighbor() {
        let rooms = leafy_rooms();
        let lattice = Lattice::from_rooms(&rooms);
        // Leaves are eligible, arm interiors and hubs are not.
        assert!(is_eligible(&rooms, &lattice, 2, RoomKind::Boss));
        assert!(is_eligible(&rooms, &lattice, 4, RoomKind::Boss));
        assert!(!is_eligible(&rooms, &lattice, 1, RoomKind::Boss));
        assert!(!is_eligible(&rooms, &lattice, 8, RoomKind::Boss));
    }

    #[test]
    fn test_eligibility_rejects_special_neighbors() {
        let mut rooms = leafy_rooms();
        let lattice = Lattice::from_rooms(&rooms);
        assert!(is_eligible(&rooms, &lattice, 9, RoomKind::Shop));
        // A special on the fork hub poisons both east leaves.
        rooms[8].kind = RoomKind::Boss;
        assert!(!is_eligible(&rooms, &lattice, 9, RoomKind::Shop));
        assert!(!is_eligible(&rooms, &lattice, 10, RoomKind::Shop));
    }

    #[test]
    fn test_spawn_adjacent_cell_only_takes_unlocked_chest() {
        let cells = [(3, 3), (2, 3), (3, 2), (3, 4), (4, 3), (5, 3)];
        let config = GenerationConfig::new(1);
        let mut rooms: Vec<Room> = cells
            .iter()
            .enumerate()
            .map(|(id, &(col, row))| {
                let cell = LatticePos::new(col, row);
                Room::new(id, cell, config.floor_origin(cell), config.room_floor_size)
            })
            .collect();
        rooms[0].kind = RoomKind::Spawn;
        let lattice = Lattice::from_rooms(&rooms);

        // Room 1 is a leaf directly beside spawn.
        assert!(is_eligible(&rooms, &lattice, 1, RoomKind::ChestUnlocked));
        assert!(!is_eligible(&rooms, &lattice, 1, RoomKind::Boss));
        assert!(!is_eligible(&rooms, &lattice, 1, RoomKind::ChestLocked));
        assert!(!is_eligible(&rooms, &lattice, 1, RoomKind::Shop));
    }

    #[test]
    fn test_assignment_fills_all_roles_on_leaves() {
        let mut rooms = leafy_rooms();
        let lattice = Lattice::from_rooms(&rooms);
        let mut rng = StdRng::seed_from_u64(11);
        assign_roles(&mut rooms, &lattice, &mut rng);

        let count = |kind| rooms.iter().filter(|r| r.kind == kind).count();
        assert_eq!(count(RoomKind::Boss), 1);
        assert_eq!(count(RoomKind::Shop), 1);
        assert_eq!(count(RoomKind::ChestUnlocked), 1);
        assert_eq!(count(RoomKind::ChestLocked), 2);
        assert_eq!(count(RoomKind::Spawn), 1);

        // Every special landed on one of the five leaves.
        let leaves = [2usize, 4, 6, 9, 10];
        for room in rooms.iter().filter(|r| r.kind.is_special()) {
            assert!(leaves.contains(&room.id), "room {} is not a leaf", room.id);
        }
    }

    #[test]
    fn test_boss_takes_farthest_leaf_and_chest_the_closest() {
        // One long west arm and short stubs: the boss must take the far west
        // leaf, the unlocked chest a distance-2 leaf.
        let cells = [
            (5, 3), // spawn
            (4, 3),
            (3, 3),
            (2, 3),
            (1, 3), // west leaf, distance 4
            (5, 2),
            (5, 1), // north leaf, distance 2
            (5, 4),
            (5, 5), // south leaf, distance 2
            (6, 3),
            (7, 3), // east leaf, distance 2
            (4, 2),
            (4, 4),
        ];
        let config = GenerationConfig::new(1);
        let mut rooms: Vec<Room> = cells
            .iter()
            .enumerate()
            .map(|(id, &(col, row))| {
                let cell = LatticePos::new(col, row);
                Room::new(id, cell, config.floor_origin(cell), config.room_floor_size)
            })
            .collect();
        rooms[0].kind = RoomKind::Spawn;
        let lattice = Lattice::from_rooms(&rooms);
        let mut rng = StdRng::seed_from_u64(3);
        assign_roles(&mut rooms, &lattice, &mut rng);

        assert_eq!(rooms[4].kind, RoomKind::Boss);
        let chest = rooms.iter().find(|r| r.kind == RoomKind::ChestUnlocked);
        let distances = spawn_distances(&rooms, &lattice);
        assert_eq!(chest.and_then(|r| distances.get(&r.id)).copied(), Some(2));
    }

    #[test]
    fn test_forced_conversion_on_starved_layout() {
        // A plus shape has four leaves, one short of the requirement, so one
        // role must land somewhere illegal for repair to handle.
        let cells = [(3, 3), (2, 3), (4, 3), (3, 2), (3, 4)];
        let config = GenerationConfig::new(1);
        let mut rooms: Vec<Room> = cells
            .iter()
            .enumerate()
            .map(|(id, &(col, row))| {
                let cell = LatticePos::new(col, row);
                Room::new(id, cell, config.floor_origin(cell), config.room_floor_size)
            })
            .collect();
        rooms[0].kind = RoomKind::Spawn;
        let lattice = Lattice::from_rooms(&rooms);
        let mut rng = StdRng::seed_from_u64(9);
        assign_roles(&mut rooms, &lattice, &mut rng);

        // All four normals got converted; one role went unfilled.
        assert!(rooms[1..].iter().all(|r| r.kind.is_special()));
        let specials = rooms.iter().filter(|r| r.kind.is_special()).count();
        assert_eq!(specials, 4);
    }
}
