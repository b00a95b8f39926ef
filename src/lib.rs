//! # Warren
//!
//! A constraint-validated procedural dungeon layout generator for top-down
//! roguelikes.
//!
//! ## Architecture Overview
//!
//! Warren builds a dungeon in composable passes driven by a top-level retry
//! loop:
//!
//! - **World model**: the shared tile grid, rooms, and the coarse room
//!   lattice used for adjacency queries
//! - **Placement**: randomized lattice expansion that keeps every room
//!   reachable from a central seed cell
//! - **Role assignment**: boss/shop/chest roles under dead-end and
//!   spawn-adjacency constraints, with a swap-based repair pass
//! - **Hallway carving**: 2-wide corridors and door tiles between connected
//!   room pairs
//! - **Validation**: a tile-level flood fill from spawn that is the
//!   authoritative traversability check
//!
//! A failed attempt is discarded wholesale; only a validator-passing world is
//! ever published to consumers.

pub mod generation;
pub mod world;

pub use generation::{
    DungeonGenerator, DungeonWorld, GenerationConfig, CARVE_MAX_LATTICE_DISTANCE,
    REQUIRED_SPECIAL_ROOMS,
};
pub use world::{Lattice, LatticePos, Position, Room, RoomId, RoomKind, TileGrid, TileKind};

/// Core error type for the Warren generator.
#[derive(thiserror::Error, Debug)]
pub enum WarrenError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Configuration cannot produce a valid world
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Generation failed after exhausting the attempt budget
    #[error("Generation failed: {0}")]
    GenerationFailed(String),
}

/// Result type used throughout the Warren codebase.
pub type WarrenResult<T> = Result<T, WarrenError>;

/// Version information for the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default world dimensions, matching the game this generator serves.
pub mod config {
    /// Default world width in pixels (160 tiles).
    pub const DEFAULT_WORLD_WIDTH: u32 = 6400;

    /// Default world height in pixels (130 tiles).
    pub const DEFAULT_WORLD_HEIGHT: u32 = 5200;

    /// Default tile size in pixels.
    pub const DEFAULT_TILE_SIZE: u32 = 40;

    /// Default number of rooms per dungeon.
    pub const DEFAULT_ROOM_COUNT: usize = 16;
}
