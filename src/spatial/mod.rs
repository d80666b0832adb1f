//! Hazard map grid and shape rasterization

pub mod coverage;
pub mod grid;
pub mod raster;
pub mod zones;

pub use coverage::{CellCoverage, Coverage, CoverageMask};
pub use grid::{Cell, Grid, GridGeometry, MAX_CELLS};
pub use raster::{RasterIter, Rasterization, Shape};
pub use zones::{apply_zones, rasterize_all, ApplyStats, Goal, Hazard, ZoneSet};
