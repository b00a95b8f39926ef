//! # Role Repair
//!
//! Runs between role assignment and carving. Any special room whose cell
//! violates the dead-end placement rules (wrong neighbor count, a special
//! next door, or a forbidden role beside spawn) swaps roles with a normal
//! room whose cell satisfies them. Swaps are atomic: role and graph edges
//! move together while both rooms keep their lattice positions. One pass
//! over the specials is allowed; anything still violating afterwards aborts
//! the attempt.

use crate::world::{Lattice, Room, RoomId, RoomKind};
use std::collections::HashSet;

/// Repairs misplaced special rooms by swapping roles with suitable normal
/// rooms. Errors abort the current generation attempt.
pub fn repair_roles(rooms: &mut [Room], lattice: &Lattice) -> Result<(), String> {
    let specials: Vec<RoomId> = rooms
        .iter()
        .filter(|r| r.kind.is_special())
        .map(|r| r.id)
        .collect();

    for id in specials {
        if placement_ok(rooms, lattice, id) {
            continue;
        }
        let role = rooms[id].kind;
        let target = rooms
            .iter()
            .filter(|r| r.kind == RoomKind::Normal)
            .map(|r| r.id)
            .find(|&candidate| candidate_suits(rooms, lattice, candidate, role, id));
        match target {
            Some(target) => {
                log::debug!("repair: swapping {role:?} from room {id} to room {target}");
                swap_roles(rooms, id, target);
            }
            None => {
                return Err(format!(
                    "no normal room can host {role:?} currently on room {id}"
                ));
            }
        }
    }

    // The pass must have reached a fixed point.
    for room in rooms.iter().filter(|r| r.kind.is_special()) {
        if !placement_ok(rooms, lattice, room.id) {
            return Err(format!(
                "{:?} room {} still violates placement after repair",
                room.kind, room.id
            ));
        }
    }
    Ok(())
}

/// Whether the room's cell satisfies the dead-end rules for its current
/// role.
fn placement_ok(rooms: &[Room], lattice: &Lattice, id: RoomId) -> bool {
    cell_suits(rooms, lattice, id, rooms[id].kind, None)
}

/// Whether a normal room's cell would satisfy the rules for `role` once the
/// violating room `demoted` gives its role up.
fn candidate_suits(
    rooms: &[Room],
    lattice: &Lattice,
    candidate: RoomId,
    role: RoomKind,
    demoted: RoomId,
) -> bool {
    candidate != demoted && cell_suits(rooms, lattice, candidate, role, Some(demoted))
}

fn cell_suits(
    rooms: &[Room],
    lattice: &Lattice,
    id: RoomId,
    role: RoomKind,
    demoted: Option<RoomId>,
) -> bool {
    let mut open_neighbors = 0;
    let mut beside_spawn = false;
    for n in lattice.neighbor_ids(rooms[id].cell) {
        let kind = if Some(n) == demoted {
            RoomKind::Normal
        } else {
            rooms[n].kind
        };
        match kind {
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

/// Swaps the roles and connection sets of two rooms in one step. Edges held
/// by third rooms are rewired to follow the roles; an edge between the pair
/// itself stays an edge between the pair.
pub fn swap_roles(rooms: &mut [Room], a: RoomId, b: RoomId) {
    let kind = rooms[a].kind;
    rooms[a].kind = rooms[b].kind;
    rooms[b].kind = kind;

    let conns_a = std::mem::take(&mut rooms[a].connections);
    let conns_b = std::mem::take(&mut rooms[b].connections);

    let peers: HashSet<RoomId> = conns_a
        .iter()
        .chain(conns_b.iter())
        .copied()
        .filter(|&p| p != a && p != b)
        .collect();
    for peer in peers {
        for slot in &mut rooms[peer].connections {
            if *slot == a {
                *slot = b;
            } else if *slot == b {
                *slot = a;
            }
        }
    }

    rooms[a].connections = conns_b
        .into_iter()
        .map(|p| if p == a { b } else { p })
        .collect();
    rooms[b].connections = conns_a
        .into_iter()
        .map(|p| if p == b { a } else { p })
        .collect();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::GenerationConfig;
    use crate::world::{link_rooms, LatticePos};

    fn rooms_from(cells: &[(i32, i32)]) -> Vec<Room> {
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
    fn test_repair_leaves_valid_layout_alone() {
        // Spawn hub, one arm, boss on the leaf.
        let mut rooms = rooms_from(&[(3, 3), (4, 3), (5, 3)]);
        rooms[2].kind = RoomKind::Boss;
        let lattice = Lattice::from_rooms(&rooms);
        let before: Vec<RoomKind> = rooms.iter().map(|r| r.kind).collect();

        assert!(repair_roles(&mut rooms, &lattice).is_ok());
        let after: Vec<RoomKind> = rooms.iter().map(|r| r.kind).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_repair_moves_boss_off_spawn_neighbor() {
        // Boss forced onto the cell beside spawn; the leaf at the arm's end
        // is free.
        let mut rooms = rooms_from(&[(3, 3), (4, 3), (5, 3)]);
        rooms[1].kind = RoomKind::Boss;
        let lattice = Lattice::from_rooms(&rooms);

        assert!(repair_roles(&mut rooms, &lattice).is_ok());
        assert_eq!(rooms[1].kind, RoomKind::Normal);
        assert_eq!(rooms[2].kind, RoomKind::Boss);
    }

    #[test]
    fn test_repair_separates_adjacent_specials() {
        // Two specials side by side on an arm; the far leaf of a second arm
        // can host one of them.
        let mut rooms = rooms_from(&[(3, 3), (4, 3), (5, 3), (3, 2), (3, 1)]);
        rooms[1].kind = RoomKind::Shop;
        rooms[2].kind = RoomKind::Boss;
        let lattice = Lattice::from_rooms(&rooms);

        assert!(repair_roles(&mut rooms, &lattice).is_ok());
        let specials: Vec<RoomId> = rooms
            .iter()
            .filter(|r| r.kind.is_special())
            .map(|r| r.id)
            .collect();
        assert_eq!(specials.len(), 2);
        // No special borders another special afterwards.
        for &id in &specials {
            for n in lattice.neighbor_ids(rooms[id].cell) {
                assert!(!rooms[n].kind.is_special());
            }
        }
    }

    #[test]
    fn test_repair_fails_without_host() {
        // Plus shape: every non-spawn cell borders spawn, so a locked chest
        // can never be placed.
        let mut rooms = rooms_from(&[(3, 3), (2, 3), (4, 3), (3, 2), (3, 4)]);
        rooms[1].kind = RoomKind::ChestLocked;
        let lattice = Lattice::from_rooms(&rooms);
        assert!(repair_roles(&mut rooms, &lattice).is_err());
    }

    #[test]
    fn test_swap_moves_edges_with_roles() {
        let mut rooms = rooms_from(&[(3, 3), (4, 3), (5, 3), (3, 2)]);
        rooms[1].kind = RoomKind::Boss;
        link_rooms(&mut rooms, 0, 1);
        link_rooms(&mut rooms, 1, 2);
        link_rooms(&mut rooms, 0, 3);

        swap_roles(&mut rooms, 1, 3);

        assert_eq!(rooms[1].kind, RoomKind::Normal);
        assert_eq!(rooms[3].kind, RoomKind::Boss);
        // Room 3 inherits room 1's edges and vice versa, with third-party
        // edges rewired.
        assert_eq!(rooms[3].connections, vec![0, 2]);
        assert_eq!(rooms[1].connections, vec![0]);
        assert!(rooms[0].connections.contains(&1));
        assert!(rooms[0].connections.contains(&3));
        assert_eq!(rooms[2].connections, vec![3]);
    }

    #[test]
    fn test_swap_between_linked_pair_keeps_their_edge() {
        let mut rooms = rooms_from(&[(3, 3), (4, 3), (5, 3)]);
        rooms[2].kind = RoomKind::Boss;
        link_rooms(&mut rooms, 1, 2);

        swap_roles(&mut rooms, 1, 2);
        assert_eq!(rooms[1].kind, RoomKind::Boss);
        assert_eq!(rooms[2].kind, RoomKind::Normal);
        assert_eq!(rooms[1].connections, vec![2]);
        assert_eq!(rooms[2].connections, vec![1]);
    }
}
