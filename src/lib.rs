//! Arena Hazard Map - rasterized danger and goal grids for movement planning
//!
//! Build a `Grid` around the arena each frame, rasterize hazard and goal
//! shapes onto it, then hand the grid to a path search as read-only data.

pub mod core;
pub mod spatial;

pub use crate::core::{Angle, MapConfig, MapError, Result, Vec2};
pub use crate::spatial::{
    apply_zones, Cell, CellCoverage, Coverage, CoverageMask, Grid, GridGeometry, Rasterization, Shape, ZoneSet,
};
