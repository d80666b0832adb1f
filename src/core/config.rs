//! Map configuration with documented defaults
//!
//! Loaded from TOML (see `data/map.toml`); every field falls back to its
//! default when absent.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{MapError, Result};
use crate::spatial::coverage::CoverageMask;

/// Configuration for building and populating a hazard map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Edge length of one cell (world units)
    ///
    /// Smaller = finer avoidance near shape edges, but cost grows with the
    /// square of the cell count per rasterized shape.
    pub resolution: f32,

    /// Half extent of the covered area along the local X axis (world units)
    pub half_width: f32,

    /// Half extent of the covered area along the local Y axis (world units)
    pub half_height: f32,

    /// Classifications that block a cell when a hazard is merged
    ///
    /// `INSIDE | BORDER` never lets the agent clip a partially covered cell.
    pub block_coverage: CoverageMask,

    /// Classifications that mark a cell as a goal
    pub goal_coverage: CoverageMask,

    /// Minimum number of shapes in a batch before rasterizing in parallel
    ///
    /// Each shape touches every cell, so even a handful of shapes on a
    /// large grid benefits from rayon.
    pub parallel_threshold: usize,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            resolution: 0.5,
            half_width: 20.0,
            half_height: 20.0,
            block_coverage: CoverageMask::TOUCHING,
            goal_coverage: CoverageMask::INSIDE,
            parallel_threshold: 4,
        }
    }
}

impl MapConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if !self.resolution.is_finite() || self.resolution <= 0.0 {
            return Err(MapError::InvalidResolution(self.resolution));
        }
        if !(self.half_width.is_finite() && self.half_width >= 0.0)
            || !(self.half_height.is_finite() && self.half_height >= 0.0)
        {
            return Err(MapError::InvalidExtent {
                half_width: self.half_width,
                half_height: self.half_height,
            });
        }
        Ok(())
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: MapConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!("Loaded map config from {:?}: {:?}", path, config);
        Ok(config)
    }
}
