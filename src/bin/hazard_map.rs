//! Hazard map preview
//!
//! Builds a grid, applies a zone file and prints the result.
//!
//! Usage:
//!   cargo run --bin hazard_map -- --zones data/zones/spread_and_stack.toml
//!   cargo run --bin hazard_map -- --zones zones.toml --config data/map.toml --format json

use std::path::PathBuf;

use arena_hazard_map::core::{Angle, MapConfig, Vec2};
use arena_hazard_map::spatial::{apply_zones, Grid, ZoneSet};
use clap::Parser;
use serde::Serialize;

/// Rasterize hazard and goal zones onto a grid
#[derive(Parser, Debug)]
#[command(name = "hazard_map")]
#[command(about = "Rasterize hazard and goal zones and print the resulting map")]
struct Args {
    /// Zone file (TOML with [[hazards]] and [[goals]])
    #[arg(long)]
    zones: PathBuf,

    /// Map config file; built-in defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Map center X (world units)
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    center_x: f32,

    /// Map center Y (world units)
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    center_y: f32,

    /// Map rotation in degrees
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    rotation_deg: f32,

    /// Output format: text or json
    #[arg(long, default_value = "text")]
    format: String,

    /// Enable debug logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

/// JSON output structure
#[derive(Serialize)]
struct MapSummary {
    width: i32,
    height: i32,
    resolution: f32,
    max_g: f32,
    max_priority: i32,
    dangerous_cells: usize,
    goal_cells: usize,
    safe_goal_cells: usize,
    blocked_updates: usize,
    goal_updates: usize,
}

fn render_text(grid: &Grid) -> String {
    let mut out = String::with_capacity(((grid.width() + 1) * grid.height()) as usize);
    // Top row first so that local +Y points up
    for y in (0..grid.height()).rev() {
        for x in 0..grid.width() {
            let cell = grid.cell(x, y);
            let ch = if cell.is_dangerous() {
                'x'
            } else if cell.is_goal() {
                char::from_digit(cell.priority.clamp(1, 9) as u32, 10).unwrap_or('*')
            } else {
                '.'
            };
            out.push(ch);
        }
        out.push('\n');
    }
    out
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let directive = if args.verbose {
        "arena_hazard_map=debug"
    } else {
        "arena_hazard_map=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(directive.parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match &args.config {
        Some(path) => MapConfig::load(path)?,
        None => MapConfig::default(),
    };
    let zones = ZoneSet::load(&args.zones)?;
    tracing::info!(
        "Loaded {} hazards and {} goals from {}",
        zones.hazards.len(),
        zones.goals.len(),
        args.zones.display()
    );

    let mut grid = Grid::from_config(
        &config,
        Vec2::new(args.center_x, args.center_y),
        Angle::from_degrees(args.rotation_deg),
    )?;
    let stats = apply_zones(&mut grid, &zones, &config);

    match args.format.as_str() {
        "json" => {
            let summary = MapSummary {
                width: grid.width(),
                height: grid.height(),
                resolution: grid.resolution(),
                max_g: grid.max_g(),
                max_priority: grid.max_priority(),
                dangerous_cells: grid.cells().iter().filter(|c| c.is_dangerous()).count(),
                goal_cells: grid.cells().iter().filter(|c| c.is_goal()).count(),
                safe_goal_cells: grid
                    .cells()
                    .iter()
                    .filter(|c| c.is_goal() && !c.is_dangerous())
                    .count(),
                blocked_updates: stats.blocked,
                goal_updates: stats.goals,
            };
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        "text" => print!("{}", render_text(&grid)),
        other => return Err(format!("Unknown format '{}': expected text or json", other).into()),
    }

    Ok(())
}
