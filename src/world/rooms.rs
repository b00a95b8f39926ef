//! # Rooms and the Room Lattice
//!
//! Rooms live on a coarse lattice of room-sized cells (spacing = room
//! footprint + hallway length), distinct from the fine per-tile grid. The
//! lattice gives O(1) adjacency lookups for placement, role assignment, and
//! repair; it is rebuilt whenever room membership changes.

use crate::Position;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

/// Index of a room in the dungeon's room list.
pub type RoomId = usize;

/// The role a room plays in the dungeon.
///
/// Every room carries an explicit role from creation (defaulting to
/// `Normal`); whether a room "is special" is never inferred from the presence
/// or absence of other data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomKind {
    /// Where the player starts. Exactly one per dungeon.
    Spawn,
    /// Regular room; the only kind enemies spawn in.
    Normal,
    /// Holds the 2x2 hole that leads to the boss fight. Exactly one.
    Boss,
    /// Merchant room. Exactly one.
    Shop,
    /// Free chest, placed close to spawn. Exactly one.
    ChestUnlocked,
    /// Keyed chest, placed far from spawn. Exactly two.
    ChestLocked,
}

impl RoomKind {
    /// Whether this role is one of the constrained special rooms.
    pub fn is_special(self) -> bool {
        matches!(
            self,
            RoomKind::Boss | RoomKind::Shop | RoomKind::ChestUnlocked | RoomKind::ChestLocked
        )
    }

    /// Special rooms are dead ends: exactly one hallway connection once
    /// generation succeeds.
    pub fn is_dead_end(self) -> bool {
        self.is_special()
    }

    /// Whether a room of this role may sit directly next to spawn.
    pub fn may_neighbor_spawn(self) -> bool {
        matches!(self, RoomKind::ChestUnlocked | RoomKind::Normal | RoomKind::Spawn)
    }
}

/// A cell coordinate on the room lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LatticePos {
    pub col: i32,
    pub row: i32,
}

impl LatticePos {
    pub fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// The 4 lattice-adjacent cells.
    pub fn neighbors(self) -> [LatticePos; 4] {
        [
            LatticePos::new(self.col + 1, self.row),
            LatticePos::new(self.col - 1, self.row),
            LatticePos::new(self.col, self.row + 1),
            LatticePos::new(self.col, self.row - 1),
        ]
    }

    /// Manhattan distance in lattice cells.
    pub fn distance(self, other: LatticePos) -> u32 {
        ((self.col - other.col).abs() + (self.row - other.row).abs()) as u32
    }
}

/// An axis-aligned rectangle in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl PixelRect {
    /// Center point of the rectangle.
    pub fn center(self) -> (i32, i32) {
        (self.x + self.w / 2, self.y + self.h / 2)
    }
}

/// One rectangular floor area of the dungeon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Index of this room in the dungeon's room list.
    pub id: RoomId,
    /// Cell on the room lattice. Unique per room.
    pub cell: LatticePos,
    /// Top-left tile of the floor area (inside the walls).
    pub floor_origin: Position,
    /// Floor edge length in tiles (rooms are square).
    pub floor_size: i32,
    /// The role this room plays.
    pub kind: RoomKind,
    /// Rooms this one is directly hallway-linked to. Kept symmetric by the
    /// carving pass.
    pub connections: Vec<RoomId>,
    /// Whether the player has entered this room yet.
    pub discovered: bool,
}

impl Room {
    /// Creates a room at the given lattice cell and floor origin.
    pub fn new(id: RoomId, cell: LatticePos, floor_origin: Position, floor_size: i32) -> Self {
        Self {
            id,
            cell,
            floor_origin,
            floor_size,
            kind: RoomKind::Normal,
            connections: Vec::new(),
            discovered: false,
        }
    }

    /// Special rooms must end up with exactly one connection.
    pub fn is_dead_end(&self) -> bool {
        self.kind.is_dead_end()
    }

    /// The tile used as this room's center: hallways, doors, and 2x2 item
    /// blocks all align on it. For a 14-tile floor this is offset (6, 6).
    pub fn center_tile(&self) -> Position {
        let off = self.floor_size / 2 - 1;
        self.floor_origin + Position::new(off, off)
    }

    /// Whether a tile position lies inside this room's floor rectangle.
    pub fn contains_tile(&self, pos: Position) -> bool {
        pos.x >= self.floor_origin.x
            && pos.y >= self.floor_origin.y
            && pos.x < self.floor_origin.x + self.floor_size
            && pos.y < self.floor_origin.y + self.floor_size
    }

    /// Iterates over every tile of the floor rectangle.
    pub fn floor_tiles(&self) -> impl Iterator<Item = Position> + '_ {
        let origin = self.floor_origin;
        let size = self.floor_size;
        (0..size).flat_map(move |dy| (0..size).map(move |dx| origin + Position::new(dx, dy)))
    }

    /// The floor rectangle in pixel space, for sprite placement and cameras.
    pub fn pixel_rect(&self, tile_size: u32) -> PixelRect {
        let ts = tile_size as i32;
        PixelRect {
            x: self.floor_origin.x * ts,
            y: self.floor_origin.y * ts,
            w: self.floor_size * ts,
            h: self.floor_size * ts,
        }
    }

    /// Registers a hallway link to another room. Intentionally does not
    /// deduplicate: carving the same pair twice without guarding produces a
    /// duplicate edge the validator will reject.
    pub fn add_connection(&mut self, other: RoomId) {
        self.connections.push(other);
    }

    /// Removes every edge to the given room.
    pub fn remove_connection(&mut self, other: RoomId) {
        self.connections.retain(|&id| id != other);
    }
}

/// Registers a symmetric hallway link between two rooms.
pub fn link_rooms(rooms: &mut [Room], a: RoomId, b: RoomId) {
    rooms[a].add_connection(b);
    rooms[b].add_connection(a);
}

/// O(1) lookup from lattice cell to room, rebuilt whenever room membership
/// changes.
#[derive(Debug, Clone, Default)]
pub struct Lattice {
    cells: HashMap<LatticePos, RoomId>,
}

impl Lattice {
    /// Builds the lattice from the current room list.
    pub fn from_rooms(rooms: &[Room]) -> Self {
        let mut cells = HashMap::with_capacity(rooms.len());
        for room in rooms {
            cells.insert(room.cell, room.id);
        }
        Self { cells }
    }

    /// Room occupying a cell, if any.
    pub fn get(&self, cell: LatticePos) -> Option<RoomId> {
        self.cells.get(&cell).copied()
    }

    /// Number of rooms on the lattice.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the lattice holds no rooms.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Ids of rooms in the 4 cells adjacent to `cell`.
    pub fn neighbor_ids(&self, cell: LatticePos) -> Vec<RoomId> {
        cell.neighbors()
            .iter()
            .filter_map(|&n| self.get(n))
            .collect()
    }

    /// How many of the 4 adjacent cells hold a room.
    pub fn neighbor_count(&self, cell: LatticePos) -> usize {
        cell.neighbors().iter().filter(|&&n| self.cells.contains_key(&n)).count()
    }

    /// BFS hop distance from `start` to every reachable room, via lattice
    /// adjacency. Unreachable rooms are absent from the result.
    pub fn hop_distances(&self, start: RoomId, rooms: &[Room]) -> HashMap<RoomId, u32> {
        let mut dist = HashMap::new();
        let Some(start_room) = rooms.get(start) else {
            return dist;
        };
        dist.insert(start, 0);
        let mut queue = VecDeque::from([start_room.cell]);
        while let Some(cell) = queue.pop_front() {
            let here = match self.get(cell).and_then(|id| dist.get(&id)) {
                Some(&d) => d,
                None => continue,
            };
            for neighbor in cell.neighbors() {
                if let Some(id) = self.get(neighbor) {
                    if !dist.contains_key(&id) {
                        dist.insert(id, here + 1);
                        queue.push_back(neighbor);
                    }
                }
            }
        }
        dist
    }
}
