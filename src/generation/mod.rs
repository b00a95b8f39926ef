//! # Generation Module
//!
//! The dungeon layout pipeline: room placement on the lattice, role
//! assignment with repair, hallway carving, and the connectivity validator,
//! all driven by a top-level retry loop.
//!
//! Control flow: [`pipeline`] drives [`placement`], which feeds [`roles`]
//! (with [`repair`] fixing misplaced specials), which feeds [`hallways`];
//! [`validate`] inspects the resulting grid and room graph and reports
//! pass/fail back to the retry loop.

pub mod hallways;
pub mod pipeline;
pub mod placement;
pub mod repair;
pub mod roles;
pub mod validate;

pub use pipeline::DungeonGenerator;

use crate::world::{LatticePos, Position, Room, RoomId, RoomKind, TileGrid};
use crate::{WarrenError, WarrenResult};
use serde::{Deserialize, Serialize};

/// Special rooms every dungeon needs: 1 boss + 1 shop + 1 unlocked chest +
/// 2 locked chests.
pub const REQUIRED_SPECIAL_ROOMS: usize = 5;

/// Rooms with more than one lattice neighbor needed to form a connective
/// backbone.
pub const MIN_BACKBONE_ROOMS: usize = 2;

/// Hallways are never carved between rooms further apart than this many
/// lattice cells.
pub const CARVE_MAX_LATTICE_DISTANCE: u32 = 3;

/// Configuration for dungeon generation.
///
/// Layout dimensions default to the game this generator serves: a 6400x5200
/// pixel world of 40-pixel tiles, 16 rooms of 14x14 floor tiles, 1-tile
/// walls, 4-tile hallways (so room centers sit 20 tiles apart on the
/// lattice).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Random seed for reproducible generation.
    pub seed: u64,
    /// Target number of rooms, spawn included.
    pub room_count: usize,
    /// Tile grid width.
    pub grid_width: usize,
    /// Tile grid height.
    pub grid_height: usize,
    /// Tile edge length in pixels, used only for the published pixel
    /// geometry.
    pub tile_size: u32,
    /// Floor edge length of every room, in tiles.
    pub room_floor_size: i32,
    /// Wall thickness around each room floor, in tiles.
    pub wall_thickness: i32,
    /// Straight hallway length between adjacent rooms, in tiles.
    pub hallway_length: i32,
    /// How many times placement may restart before settling for its last
    /// layout.
    pub placement_attempts: u32,
    /// How many whole-layout attempts the retry loop may spend.
    pub max_attempts: u32,
}

impl GenerationConfig {
    /// Creates the default configuration with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            room_count: crate::config::DEFAULT_ROOM_COUNT,
            grid_width: (crate::config::DEFAULT_WORLD_WIDTH / crate::config::DEFAULT_TILE_SIZE)
                as usize,
            grid_height: (crate::config::DEFAULT_WORLD_HEIGHT / crate::config::DEFAULT_TILE_SIZE)
                as usize,
            tile_size: crate::config::DEFAULT_TILE_SIZE,
            room_floor_size: 14,
            wall_thickness: 1,
            hallway_length: 4,
            placement_attempts: 20,
            max_attempts: 100,
        }
    }

    /// Derives the tile grid from world dimensions in pixels.
    pub fn from_world_dimensions(
        seed: u64,
        world_width: u32,
        world_height: u32,
        tile_size: u32,
    ) -> Self {
        Self {
            grid_width: (world_width / tile_size) as usize,
            grid_height: (world_height / tile_size) as usize,
            tile_size,
            ..Self::new(seed)
        }
    }

    /// A smaller map for tests: 120x90 tiles, 10 rooms.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            room_count: 10,
            grid_width: 120,
            grid_height: 90,
            ..Self::new(seed)
        }
    }

    /// Full room footprint including walls.
    pub fn room_total_size(&self) -> i32 {
        self.room_floor_size + 2 * self.wall_thickness
    }

    /// Lattice spacing: room footprint plus hallway length.
    pub fn spacing(&self) -> i32 {
        self.room_total_size() + self.hallway_length
    }

    /// How many lattice columns fit the grid.
    pub fn lattice_cols(&self) -> i32 {
        self.grid_width as i32 / self.spacing()
    }

    /// How many lattice rows fit the grid.
    pub fn lattice_rows(&self) -> i32 {
        self.grid_height as i32 / self.spacing()
    }

    /// The seed cell at the lattice center; the spawn room always lands
    /// here.
    pub fn center_cell(&self) -> LatticePos {
        LatticePos::new(self.lattice_cols() / 2, self.lattice_rows() / 2)
    }

    /// Whether a lattice cell lies inside the usable bounds.
    pub fn cell_in_bounds(&self, cell: LatticePos) -> bool {
        cell.col >= 0
            && cell.row >= 0
            && cell.col < self.lattice_cols()
            && cell.row < self.lattice_rows()
    }

    /// Top-left floor tile for a room at the given lattice cell.
    pub fn floor_origin(&self, cell: LatticePos) -> Position {
        let spacing = self.spacing();
        let center_x = cell.col * spacing + spacing / 2;
        let center_y = cell.row * spacing + spacing / 2;
        let half = self.room_total_size() / 2;
        Position::new(
            center_x - half + self.wall_thickness,
            center_y - half + self.wall_thickness,
        )
    }

    /// Rejects configurations that can never produce a valid world.
    pub fn validate(&self) -> WarrenResult<()> {
        let min_rooms = 1 + REQUIRED_SPECIAL_ROOMS + MIN_BACKBONE_ROOMS;
        if self.room_count < min_rooms {
            return Err(WarrenError::InvalidConfig(format!(
                "room_count {} is below the minimum of {} (spawn + {} specials + {} backbone)",
                self.room_count, min_rooms, REQUIRED_SPECIAL_ROOMS, MIN_BACKBONE_ROOMS
            )));
        }
        let capacity = (self.lattice_cols() * self.lattice_rows()) as usize;
        if capacity < self.room_count {
            return Err(WarrenError::InvalidConfig(format!(
                "lattice holds only {} rooms ({}x{} cells), {} requested",
                capacity,
                self.lattice_cols(),
                self.lattice_rows(),
                self.room_count
            )));
        }
        if self.room_floor_size < 4 || self.room_floor_size % 2 != 0 {
            return Err(WarrenError::InvalidConfig(format!(
                "room_floor_size {} must be even and at least 4 for centered 2-wide doors",
                self.room_floor_size
            )));
        }
        if self.wall_thickness < 1 || self.hallway_length < 1 {
            return Err(WarrenError::InvalidConfig(
                "wall_thickness and hallway_length must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new(42)
    }
}

/// A finished, validator-passing dungeon: the published world state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DungeonWorld {
    /// The finalized tile grid.
    pub grid: TileGrid,
    /// Every room with its role, geometry, and connection graph.
    pub rooms: Vec<Room>,
    /// Id of the spawn room.
    pub spawn: RoomId,
    /// Tile size the pixel geometry was computed with.
    pub tile_size: u32,
}

impl DungeonWorld {
    /// The spawn room.
    pub fn spawn_room(&self) -> &Room {
        &self.rooms[self.spawn]
    }

    /// Pixel center of the spawn room, where the player appears.
    pub fn spawn_point(&self) -> (i32, i32) {
        self.spawn_room().pixel_rect(self.tile_size).center()
    }

    /// Rooms of a given role.
    pub fn rooms_of_kind(&self, kind: RoomKind) -> impl Iterator<Item = &Room> {
        self.rooms.iter().filter(move |r| r.kind == kind)
    }

    /// Rooms eligible for enemy spawns: normal rooms only.
    pub fn enemy_rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms_of_kind(RoomKind::Normal)
    }

    /// Marks a room discovered on first entry, revealing its floor tiles on
    /// the grid overlay.
    pub fn discover_room(&mut self, id: RoomId) {
        let Some(room) = self.rooms.get_mut(id) else {
            return;
        };
        if room.discovered {
            return;
        }
        room.discovered = true;
        for pos in room.floor_tiles() {
            self.grid.mark_discovered(pos);
        }
    }
}
