//! # Warren CLI
//!
//! Generates a dungeon layout, prints a summary plus an ASCII rendering of
//! the tile grid, and optionally dumps the whole world as JSON.

use clap::Parser;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use warren::{
    DungeonGenerator, DungeonWorld, GenerationConfig, RoomKind, TileKind, WarrenResult,
};

/// Command line arguments for the warren generator.
#[derive(Parser, Debug)]
#[command(name = "warren")]
#[command(about = "A lattice-based dungeon layout generator")]
#[command(version)]
struct Args {
    /// Random seed; a random one is drawn (and printed) when omitted
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of rooms, spawn included
    #[arg(short, long, default_value_t = warren::config::DEFAULT_ROOM_COUNT)]
    rooms: usize,

    /// World width in pixels
    #[arg(long, default_value_t = warren::config::DEFAULT_WORLD_WIDTH)]
    width: u32,

    /// World height in pixels
    #[arg(long, default_value_t = warren::config::DEFAULT_WORLD_HEIGHT)]
    height: u32,

    /// Tile edge length in pixels
    #[arg(long, default_value_t = warren::config::DEFAULT_TILE_SIZE)]
    tile_size: u32,

    /// Dump the generated world as JSON instead of the ASCII map
    #[arg(long)]
    json: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> WarrenResult<()> {
    let args = Args::parse();

    env_logger::Builder::new()
        .parse_filters(&args.log_level)
        .init();

    log::info!("warren v{}", warren::VERSION);

    let seed = args.seed.unwrap_or_else(|| StdRng::from_entropy().next_u64());
    if args.seed.is_none() {
        println!("seed: {seed}");
    }

    let config = GenerationConfig {
        room_count: args.rooms,
        ..GenerationConfig::from_world_dimensions(seed, args.width, args.height, args.tile_size)
    };

    let mut rng = StdRng::seed_from_u64(seed);
    let world = DungeonGenerator::new().generate(&config, &mut rng)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&world)?);
        return Ok(());
    }

    print_summary(&world);
    print_map(&world);
    Ok(())
}

fn print_summary(world: &DungeonWorld) {
    let (sx, sy) = world.spawn_point();
    println!("rooms: {}", world.rooms.len());
    println!("spawn point: ({sx}, {sy}) px");
    for kind in [
        RoomKind::Boss,
        RoomKind::Shop,
        RoomKind::ChestUnlocked,
        RoomKind::ChestLocked,
    ] {
        for room in world.rooms_of_kind(kind) {
            println!(
                "{:?} room {} at lattice ({}, {})",
                kind, room.id, room.cell.col, room.cell.row
            );
        }
    }
}

/// Renders the tile grid one character per tile, cropped to the rows and
/// columns that contain anything carved.
fn print_map(world: &DungeonWorld) {
    let grid = &world.grid;
    let carved: Vec<(usize, usize)> = (0..grid.height())
        .flat_map(|y| (0..grid.width()).map(move |x| (x, y)))
        .filter(|&(x, y)| {
            grid.get(warren::Position::new(x as i32, y as i32)) != Some(TileKind::Wall)
        })
        .collect();
    let Some(&(x0, y0)) = carved.first() else {
        return;
    };
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (x0, y0, x0, y0);
    for &(x, y) in &carved {
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }

    for y in min_y..=max_y {
        let row: String = (min_x..=max_x)
            .map(|x| {
                match grid.get(warren::Position::new(x as i32, y as i32)) {
                    Some(TileKind::Floor) => '.',
                    Some(TileKind::Door) => '+',
                    Some(TileKind::ChestUnlocked) => 'c',
                    Some(TileKind::ChestLocked) => 'C',
                    Some(TileKind::Hole) => 'O',
                    _ => '#',
                }
            })
            .collect();
        println!("{row}");
    }
}
