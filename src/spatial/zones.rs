//! Batches of hazard and goal zones applied to a grid each frame
//!
//! Rasterization is pure, so a batch of shapes can be processed with rayon.
//! Merging into the grid stays on the calling thread.

use std::fs;
use std::path::Path;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::config::MapConfig;
use crate::core::error::Result;
use crate::spatial::coverage::{CellCoverage, CoverageMask};
use crate::spatial::grid::{Grid, GridGeometry};
use crate::spatial::raster::Shape;

/// Area that becomes unsafe after `max_g` units of travel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hazard {
    pub shape: Shape,
    pub max_g: f32,
    /// Overrides `MapConfig::block_coverage`
    #[serde(default)]
    pub coverage: Option<CoverageMask>,
}

/// Preferred destination area
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub shape: Shape,
    pub priority: i32,
    /// Overrides `MapConfig::goal_coverage`
    #[serde(default)]
    pub coverage: Option<CoverageMask>,
}

/// All zones for one planning pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneSet {
    #[serde(default)]
    pub hazards: Vec<Hazard>,
    #[serde(default)]
    pub goals: Vec<Goal>,
}

impl ZoneSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn add_hazard(&mut self, shape: Shape, max_g: f32) -> &mut Self {
        self.hazards.push(Hazard {
            shape,
            max_g,
            coverage: None,
        });
        self
    }

    pub fn add_goal(&mut self, shape: Shape, priority: i32) -> &mut Self {
        self.goals.push(Goal {
            shape,
            priority,
            coverage: None,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.hazards.len() + self.goals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Counts from one `apply_zones` call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyStats {
    /// Cell updates from hazards (a cell hit by two hazards counts twice)
    pub blocked: usize,
    /// Cell updates from goals
    pub goals: usize,
}

/// Rasterize every shape into its own buffer, in input order
///
/// Runs on the rayon pool once `shapes.len() >= parallel_threshold`.
pub fn rasterize_all(
    geometry: &GridGeometry,
    shapes: &[Shape],
    parallel_threshold: usize,
) -> Vec<Vec<CellCoverage>> {
    if shapes.len() >= parallel_threshold {
        shapes
            .par_iter()
            .map(|shape| geometry.rasterize(shape).iter().collect::<Vec<_>>())
            .collect()
    } else {
        shapes
            .iter()
            .map(|shape| geometry.rasterize(shape).iter().collect::<Vec<_>>())
            .collect()
    }
}

/// Rasterize all zones and merge them into the grid
///
/// Hazards are merged before goals; both merges are order independent.
pub fn apply_zones(grid: &mut Grid, zones: &ZoneSet, config: &MapConfig) -> ApplyStats {
    let shapes: Vec<Shape> = zones
        .hazards
        .iter()
        .map(|h| h.shape)
        .chain(zones.goals.iter().map(|g| g.shape))
        .collect();

    let buffers = rasterize_all(&grid.geometry(), &shapes, config.parallel_threshold);
    let (hazard_buffers, goal_buffers) = buffers.split_at(zones.hazards.len());

    let mut stats = ApplyStats::default();
    for (hazard, pixels) in zones.hazards.iter().zip(hazard_buffers) {
        let mask = hazard.coverage.unwrap_or(config.block_coverage);
        stats.blocked += grid.block_cells(pixels.iter().copied(), hazard.max_g, mask);
    }
    for (goal, pixels) in zones.goals.iter().zip(goal_buffers) {
        let mask = goal.coverage.unwrap_or(config.goal_coverage);
        stats.goals += grid.mark_goal_cells(pixels.iter().copied(), goal.priority, mask);
    }

    tracing::debug!(
        "Applied {} hazards and {} goals ({} blocked, {} goal cell updates)",
        zones.hazards.len(),
        zones.goals.len(),
        stats.blocked,
        stats.goals
    );
    stats
}
