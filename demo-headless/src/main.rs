use clap::Parser;
use forest_fire_core::{CellKind, Forest, ForestConfig, TileCoord};
use tracing::{info, warn};

/// Forest fire simulation demo with configurable parameters
#[derive(Parser, Debug)]
#[command(name = "forest-fire-demo")]
#[command(about = "Tiled forest fire cellular automaton, run headless", long_about = None)]
struct Args {
    /// Scheduling steps to run
    #[arg(short, long, default_value_t = 600)]
    steps: u64,

    /// Seed for the random source (entropy when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Cells per tile side
    #[arg(long, default_value_t = 60)]
    tile_size: usize,

    /// Tiles along world X
    #[arg(long, default_value_t = 6)]
    width: usize,

    /// Tiles along world Z
    #[arg(long, default_value_t = 6)]
    height: usize,

    /// Tile rows ticked per step
    #[arg(long, default_value_t = 2)]
    rows_per_step: usize,

    /// Per-tick chance a living tree gathers heat (0-1)
    #[arg(long, default_value_t = 0.6)]
    fire_spread_speed: f32,

    /// Per-tick chance a burning tree advances (0-1)
    #[arg(long, default_value_t = 0.6)]
    burn_speed: f32,

    /// Wind speed
    #[arg(short, long, default_value_t = 0.0)]
    wind_speed: f32,

    /// Direction the wind blows from, in degrees (0 = +X, 90 = +Z)
    #[arg(long, default_value_t = 0.0)]
    wind_direction: f32,

    /// Noise offsets for tree placement as X,Y (random when omitted)
    #[arg(long, value_delimiter = ',', num_args = 2)]
    offsets: Option<Vec<f32>>,

    /// Report interval in steps
    #[arg(short, long, default_value_t = 50)]
    report_interval: u64,

    /// Print an ASCII map of the tile under this world position X,Z at the end
    #[arg(long, value_delimiter = ',', num_args = 2)]
    map_at: Option<Vec<f32>>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    println!("=== Forest Fire Demo ===\n");

    let config = ForestConfig::with_dimensions(args.tile_size, args.width, args.height)
        .with_rows_per_step(args.rows_per_step)
        .with_fire_spread_speed(args.fire_spread_speed)
        .with_burn_speed(args.burn_speed);

    let forest = match args.seed {
        Some(seed) => Forest::seeded(config, seed),
        None => Forest::new(config),
    };
    let mut forest = match forest {
        Ok(forest) => forest,
        Err(err) => {
            eprintln!("Invalid configuration: {err}");
            std::process::exit(2);
        }
    };

    let planted = match args.offsets.as_deref() {
        Some(&[x, y]) => forest.regenerate(x, y),
        _ => forest.regenerate_random(),
    };
    let (offset_x, offset_y) = forest.offsets();
    println!(
        "Planted {} trees on {}x{} tiles (offsets {:.1}, {:.1})",
        planted, args.width, args.height, offset_x, offset_y
    );

    forest.set_wind(args.wind_speed, args.wind_direction.to_radians());
    let fires = forest.ignite_random_in_all_tiles();
    if fires == 0 {
        warn!("No living trees found to ignite");
    }
    println!("Started {} fires\n", fires);
    forest.set_active(true);

    println!("   Step | Alive  | Burning | Burned | Smoke events");
    println!("--------|--------|---------|--------|-------------");

    let mut smoke_events = 0;
    for step in 1..=args.steps {
        forest.tick_step();
        smoke_events += forest.drain_events().count();

        let census = forest.census();
        if step % args.report_interval.max(1) == 0 || step == args.steps {
            println!(
                "{:7} | {:6} | {:7} | {:6} | {:12}",
                step, census.alive, census.burning, census.burned, smoke_events
            );
        }
        if census.burning == 0 {
            info!("Fire went out after {} steps", step);
            break;
        }
    }

    let census = forest.census();
    println!("\n=== Simulation Complete ===");
    println!("Steps run: {}", forest.steps());
    println!(
        "Trees burned: {} of {} ({:.1}%)",
        census.burned,
        census.trees(),
        100.0 * census.burned as f32 / census.trees().max(1) as f32
    );

    if let Some(&[x, z]) = args.map_at.as_deref() {
        match forest.locate(x, z) {
            Ok((tile, _)) => print_tile(&forest, tile),
            Err(err) => eprintln!("Cannot map tile: {err}"),
        }
    }
}

/// One character per cell: `.` empty, `T` tree, `*` burning, `#` burned
fn print_tile(forest: &Forest, coord: TileCoord) {
    let Some(tile) = forest.tile(coord) else {
        return;
    };
    println!("\nTile ({}, {}), X down, Z across:", coord.x, coord.y);
    for x in 0..tile.size() {
        let Some(row) = tile.row(x) else {
            continue;
        };
        let line: String = row
            .iter()
            .map(|&cell| match CellKind::from_cell(cell) {
                CellKind::Empty => '.',
                CellKind::Alive { .. } => 'T',
                CellKind::Burning { .. } => '*',
                CellKind::Burned => '#',
            })
            .collect();
        println!("{line}");
    }
}
