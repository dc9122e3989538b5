use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use itertools::Itertools;
use log::{info, warn};
use owo_colors::OwoColorize;
use terrain_engine::{
    Packing, Projector, RawTerrainMap, TerrainEngine, TerrainMap, TerrainResolver,
    cliff::EdgeKind,
    math::{Dimensions, Point, Vec2},
    to_raw_terrain_map, to_terrain_map,
};

/// Create, inspect and probe raw terrain maps
#[derive(Parser)]
#[command(name = "terrain_engine", version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    engine: EngineArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct EngineArgs {
    /// Terrain definitions (terrains and terrain sets)
    #[arg(long, global = true, default_value = "terrains.toml")]
    defs: PathBuf,

    /// Engine config; defaults are used if omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Fill a new map and write it out
    New {
        /// Terrain set id
        #[arg(short, long)]
        set: String,
        #[arg(short = 'W', long, default_value_t = 16)]
        width: usize,
        #[arg(short = 'H', long, default_value_t = 16)]
        height: usize,
        /// Initial height of every sample
        #[arg(long, default_value_t = 0)]
        level: u8,
        /// Store arrays as base64 zlib data
        #[arg(long)]
        packed: bool,
        /// Output path
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Print size, terrain usage and cliff checks
    Info { map: PathBuf },
    /// Dump heights and cliffs as coloured text
    Ascii { map: PathBuf },
    /// Map a screen position back onto the flat map
    Project {
        map: PathBuf,
        x: f32,
        y: f32,
        /// Camera rotation in degrees, clockwise
        #[arg(short, long, default_value_t = 0.0)]
        rotation: f32,
    },
}

fn load_map(path: &Path, engine: &TerrainEngine) -> anyhow::Result<TerrainMap> {
    let raw = RawTerrainMap::load(path)?;
    to_terrain_map(&raw, engine).with_context(|| format!("Invalid map {}", path.display()))
}

fn print_info(map: &TerrainMap, engine: &TerrainEngine) {
    let size = map.get_size();
    println!("size: {}x{} tiles", size.width, size.height);
    println!("terrain set: {}", map.terrain_set().id);

    let usage = map.vertices().iter().copied().counts();
    let usage = usage
        .into_iter()
        .map(|(handle, count)| {
            let id = engine.terrain(handle).map_or("?", |t| t.id.as_str());
            (id.to_string(), count)
        })
        .collect::<BTreeMap<_, _>>();
    for (id, count) in &usage {
        println!("  {id:<16} {count:>6} vertices");
    }

    let lowest = map.heights().iter().map(|h| h.min()).min().unwrap_or_default();
    let highest = map.heights().iter().map(|h| h.max()).max().unwrap_or_default();
    println!("heights: {lowest}..={highest}");

    println!("cliffs: {}", map.cliffs().edges().count());
    match map.validate_cliffs() {
        Ok(()) => println!("  {}", "valid".green()),
        Err(e) => println!("  {}", e.red()),
    }
    let isolated = map.isolated_cliffs();
    if !isolated.is_empty() {
        println!("  {} isolated: {}", isolated.len().yellow(), isolated.iter().join(", "));
    }
}

fn height_glyph(height: u8) -> char {
    const GLYPHS: &[u8] = b" .:-=+*#%@";
    GLYPHS[height as usize * (GLYPHS.len() - 1) / u8::MAX as usize] as char
}

fn print_ascii(map: &TerrainMap) {
    let Dimensions { width, height } = map.get_size();
    for y in 0..height as isize {
        let row = (0..width as isize)
            .map(|x| {
                let tile = Point::new(x, y);
                let max = map.heights().get(tile).map_or(0, |h| h.max());
                let glyph = height_glyph(max).to_string();
                let flags = map.cliffs().flags(tile);
                if flags.diagonal().is_some() {
                    glyph.on_red().to_string()
                } else if flags.has(EdgeKind::Right) || flags.has(EdgeKind::Bottom) {
                    glyph.on_yellow().to_string()
                } else {
                    glyph
                }
            })
            .collect::<String>();
        println!("{row}");
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let cli = Cli::parse();
    let engine = TerrainEngine::load(cli.engine.config.as_deref(), &cli.engine.defs)?;

    match cli.command {
        Command::New { set, width, height, level, packed, output } => {
            let size = Dimensions::new(width, height);
            let map = TerrainMap::new(size, &set, level, &engine)
                .with_context(|| format!("Failed to create map with terrain set `{set}`"))?;
            let packing = if packed { Packing::Packed } else { Packing::Plain };
            to_raw_terrain_map(&map, &engine, packing)?.save(&output)?;
        }
        Command::Info { map } => print_info(&load_map(&map, &engine)?, &engine),
        Command::Ascii { map } => print_ascii(&load_map(&map, &engine)?),
        Command::Project { map, x, y, rotation } => {
            let map = load_map(&map, &engine)?;
            let projector = Projector::from_settings(&engine.tile_settings());
            let point = Vec2::new(x, y);
            let flat = projector.project(&map, point, rotation);
            let tile = flat.tile(engine.config().tile_size as f32);
            if !map.get_size().contains(tile) {
                warn!("{point} does not cover any terrain");
            }
            info!("{point} -> {flat} (tile {tile})");
            println!("{} {}", flat.x, flat.y);
        }
    }
    Ok(())
}
