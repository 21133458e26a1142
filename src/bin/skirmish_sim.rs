//! Headless Skirmish Runner
//!
//! Runs an AI vs AI skirmish on a generated map and prints a JSON summary.

use clap::Parser;
use serde::Serialize;

use skirmish::core::types::{MetaType, Side, UnitTypeId};
use skirmish::engine::{Battlefield, HeadlessPresenter, TurnDecisionEngine, TurnEventKind};
use skirmish::grid::coord::GridCoord;
use skirmish::grid::map::{TileGrid, TileProvider};
use skirmish::grid::tile::{Tile, TileKind};
use skirmish::units::balancing::{Balancing, BalancingStore};

const SOLDIER: UnitTypeId = UnitTypeId(1);
const ARCHER: UnitTypeId = UnitTypeId(2);

/// Headless Skirmish Runner - scripted AI battles for tuning
#[derive(Parser, Debug)]
#[command(name = "skirmish_sim")]
#[command(about = "Run an AI vs AI skirmish and output a JSON summary")]
struct Args {
    /// Map width in tiles
    #[arg(long, default_value_t = 12)]
    map_width: i32,

    /// Map height in tiles
    #[arg(long, default_value_t = 8)]
    map_height: i32,

    /// Maximum turns before timeout (draw)
    #[arg(long, default_value_t = 50)]
    max_turns: u32,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Enable verbose event logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

/// JSON output structure
#[derive(Serialize)]
struct SkirmishResult {
    outcome: String,
    turns: u32,
    player_survivors: usize,
    opponent_survivors: usize,
    events: usize,
    seed: u64,
}

fn balancing() -> BalancingStore {
    let mut store = BalancingStore::new();
    store.insert(
        Balancing::new(SOLDIER, MetaType::Land)
            .with_health(10)
            .with_movement_range(3)
            .with_tile_cost(TileKind::Grass, 1)
            .with_tile_cost(TileKind::Forest, 2)
            .with_tile_cost(TileKind::Road, 1)
            .with_attack_range(1)
            .with_damage(SOLDIER, 4)
            .with_damage(ARCHER, 5),
    );
    store.insert(
        Balancing::new(ARCHER, MetaType::Land)
            .with_health(6)
            .with_movement_range(2)
            .with_tile_cost(TileKind::Grass, 1)
            .with_tile_cost(TileKind::Forest, 2)
            .with_tile_cost(TileKind::Road, 1)
            .with_attack_range(3)
            .with_damage(SOLDIER, 3)
            .with_damage(ARCHER, 3),
    );
    store
}

fn build_field(args: &Args) -> skirmish::core::error::Result<Battlefield> {
    // A forest band through the middle makes approach costs interesting
    let band = args.map_width / 2;
    let mut grid = TileGrid::new();
    for x in 0..args.map_width {
        for y in 0..args.map_height {
            let kind = if x == band {
                TileKind::Forest
            } else {
                TileKind::Grass
            };
            grid.register(GridCoord::new(x, y), Tile::new(kind));
        }
    }

    let mut field = Battlefield::new(grid, balancing());
    let middle = args.map_height / 2;
    field.spawn_unit(SOLDIER, Side::Player, GridCoord::new(0, middle - 1))?;
    field.spawn_unit(SOLDIER, Side::Player, GridCoord::new(0, middle + 1))?;
    field.spawn_unit(ARCHER, Side::Player, GridCoord::new(0, middle))?;
    let far = args.map_width - 1;
    field.spawn_unit(SOLDIER, Side::Opponent, GridCoord::new(far, middle - 1))?;
    field.spawn_unit(SOLDIER, Side::Opponent, GridCoord::new(far, middle + 1))?;
    field.spawn_unit(ARCHER, Side::Opponent, GridCoord::new(far, middle))?;
    Ok(field)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);

    let field = match build_field(&args) {
        Ok(field) => field,
        Err(e) => {
            eprintln!("Failed to set up battlefield: {}", e);
            std::process::exit(1);
        }
    };

    let mut engine = TurnDecisionEngine::with_seed(field, HeadlessPresenter, seed);
    if args.verbose {
        engine.set_observer(Box::new(skirmish::nav::TracingObserver));
    }
    let mut turns = 0u32;
    let mut outcome = "draw";

    while turns < args.max_turns {
        let side = if turns % 2 == 0 {
            Side::Opponent
        } else {
            Side::Player
        };
        let events_before = engine.log().len();
        if let Err(e) = engine.start_turn(side) {
            eprintln!("Turn failed: {}", e);
            break;
        }
        turns += 1;

        if args.verbose {
            for event in engine.log().events.iter().skip(events_before) {
                eprintln!("  [{}] {:?}: {}", event.turn, event.kind, event.description);
            }
        }

        let player_left = engine.field().living_units_of(Side::Player).len();
        let opponent_left = engine.field().living_units_of(Side::Opponent).len();
        if player_left == 0 || opponent_left == 0 {
            outcome = if player_left == 0 {
                "opponent_victory"
            } else {
                "player_victory"
            };
            engine.signal_battle_ended();
            break;
        }
    }

    // Count destruction events before the summary consumes the engine
    let destroyed = engine
        .log()
        .events
        .iter()
        .filter(|e| matches!(e.kind, TurnEventKind::UnitDestroyed { .. }))
        .count();
    if args.verbose {
        eprintln!("Units destroyed over the battle: {}", destroyed);
    }

    let result = SkirmishResult {
        outcome: outcome.to_string(),
        turns,
        player_survivors: engine.field().living_units_of(Side::Player).len(),
        opponent_survivors: engine.field().living_units_of(Side::Opponent).len(),
        events: engine.log().len(),
        seed,
    };
    match serde_json::to_string_pretty(&result) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize result: {}", e),
    }
}
