//! # Generation Pipeline
//!
//! Drives one full layout attempt per iteration of the retry loop: place
//! rooms, assign and repair roles, carve floors and hallways, place item
//! blocks, then hand the result to the validator. Only validator-passing
//! worlds are published; failed attempts are discarded whole, so callers
//! never observe a partially built layout.

use crate::generation::{
    hallways, placement, repair, roles, validate, DungeonWorld, GenerationConfig,
};
use crate::world::{Lattice, TileGrid};
use crate::{WarrenError, WarrenResult};
use rand::rngs::StdRng;

/// The dungeon layout generator.
///
/// Stateless apart from the caller-provided RNG; the same seed and
/// configuration always produce the same world.
#[derive(Debug, Default, Clone, Copy)]
pub struct DungeonGenerator;

impl DungeonGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Generates a validated dungeon, retrying whole layouts up to the
    /// configured attempt cap.
    pub fn generate(
        &self,
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) -> WarrenResult<DungeonWorld> {
        config.validate()?;

        for attempt in 1..=config.max_attempts {
            match self.generate_once(config, rng) {
                Ok(world) => {
                    log::info!(
                        "generated a {}-room dungeon on attempt {attempt}",
                        world.rooms.len()
                    );
                    return Ok(world);
                }
                Err(reason) => {
                    log::debug!("attempt {attempt} discarded: {reason}");
                }
            }
        }
        Err(WarrenError::GenerationFailed(format!(
            "no valid layout in {} attempts for seed {}",
            config.max_attempts, config.seed
        )))
    }

    /// One attempt on a fresh grid. The reason string feeds the retry log.
    fn generate_once(
        &self,
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) -> Result<DungeonWorld, String> {
        let mut grid = TileGrid::new(config.grid_width, config.grid_height);

        let cells = placement::place_rooms(config, rng);
        let mut rooms = placement::build_rooms(&cells, config);
        let lattice = Lattice::from_rooms(&rooms);

        roles::assign_roles(&mut rooms, &lattice, rng);
        repair::repair_roles(&mut rooms, &lattice)?;

        hallways::carve_room_floors(&rooms, &mut grid);
        hallways::connect_rooms(&mut rooms, &lattice, &mut grid, rng);
        hallways::place_room_items(&rooms, &mut grid);

        validate::validate_world(&rooms, &grid, config)?;

        Ok(DungeonWorld {
            grid,
            rooms,
            spawn: 0,
            tile_size: config.tile_size,
        })
    }
}
