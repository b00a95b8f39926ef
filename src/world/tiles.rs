//! # Tile Grid
//!
//! The fine per-tile grid the generator carves into and gameplay reads from.
//!
//! During generation the grid is exclusively owned by the pipeline; after a
//! successful attempt it is published read-mostly. The only state gameplay is
//! allowed to mutate afterwards is the per-tile `discovered` overlay used for
//! fog-of-war.

use crate::Position;
use serde::{Deserialize, Serialize};

/// The kind of a single grid tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    /// Solid wall; also the initial state of every cell.
    Wall,
    /// Open room or hallway floor.
    Floor,
    /// Hallway entry tile on a room's boundary wall.
    Door,
    /// Chest the player can open immediately.
    ChestUnlocked,
    /// Chest that needs a key.
    ChestLocked,
    /// The pit at the center of the boss room.
    Hole,
}

impl TileKind {
    /// Whether the connectivity flood fill (and the player) can traverse this
    /// tile.
    pub fn is_walkable(self) -> bool {
        matches!(self, TileKind::Floor | TileKind::Door)
    }

    /// Whether gameplay consumers should build collision geometry from this
    /// tile. Both chest kinds block movement like walls do.
    pub fn blocks_movement(self) -> bool {
        matches!(
            self,
            TileKind::Wall | TileKind::ChestUnlocked | TileKind::ChestLocked
        )
    }
}

/// The 2D tile array for one dungeon, plus the fog-of-war overlay.
///
/// Every cell starts as `Wall`; only the placement and carving passes
/// transition cells away from `Wall`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileGrid {
    width: usize,
    height: usize,
    tiles: Vec<Vec<TileKind>>,
    discovered: Vec<Vec<bool>>,
}

impl TileGrid {
    /// Creates a grid of the given dimensions, all walls, nothing discovered.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            tiles: vec![vec![TileKind::Wall; width]; height],
            discovered: vec![vec![false; width]; height],
        }
    }

    /// Grid width in tiles.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height in tiles.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Resets every tile back to `Wall` and clears discovery state.
    pub fn reset(&mut self) {
        for row in &mut self.tiles {
            row.fill(TileKind::Wall);
        }
        for row in &mut self.discovered {
            row.fill(false);
        }
    }

    /// Whether a position lies inside the grid.
    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    /// Returns the tile at `pos`, or `None` when out of bounds.
    pub fn get(&self, pos: Position) -> Option<TileKind> {
        if self.in_bounds(pos) {
            Some(self.tiles[pos.y as usize][pos.x as usize])
        } else {
            None
        }
    }

    /// Writes a tile, silently skipping out-of-bounds positions the way the
    /// carving routines clip at the map edge. Returns whether a write
    /// happened.
    pub fn set(&mut self, pos: Position, kind: TileKind) -> bool {
        if self.in_bounds(pos) {
            self.tiles[pos.y as usize][pos.x as usize] = kind;
            true
        } else {
            false
        }
    }

    /// Marks a tile as seen by the player. The one mutation gameplay may
    /// perform on a published grid.
    pub fn mark_discovered(&mut self, pos: Position) {
        if self.in_bounds(pos) {
            self.discovered[pos.y as usize][pos.x as usize] = true;
        }
    }

    /// Whether a tile has been seen by the player.
    pub fn is_discovered(&self, pos: Position) -> bool {
        self.in_bounds(pos) && self.discovered[pos.y as usize][pos.x as usize]
    }

    /// Iterates over all positions holding the given tile kind.
    pub fn positions_of(&self, kind: TileKind) -> impl Iterator<Item = Position> + '_ {
        self.tiles.iter().enumerate().flat_map(move |(y, row)| {
            row.iter().enumerate().filter_map(move |(x, &tile)| {
                if tile == kind {
                    Some(Position::new(x as i32, y as i32))
                } else {
                    None
                }
            })
        })
    }

    /// Counts tiles of the given kind.
    pub fn count_of(&self, kind: TileKind) -> usize {
        self.positions_of(kind).count()
    }
}
