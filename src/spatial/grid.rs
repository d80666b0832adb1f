//! Hazard map grid anchored to a rotated local frame
//!
//! The grid covers a rectangle around `center`, with cells of `resolution`
//! world units. Its local Y axis points along `rotation.to_direction()`, the
//! local X axis along `ortho_l` of that. Width and height are always even so
//! that `center` falls exactly on a cell corner.
//!
//! Each cell stores two independent values:
//! - `max_g`: the largest accumulated travel distance for which the cell is
//!   still safe (`INFINITY` if never dangerous)
//! - `priority`: goal priority (`0` = plain safe cell)
//!
//! Danger is meant to override goal state, but that precedence is left to
//! the path search: a cell may keep a stale priority after being blocked.

use std::f32::consts::FRAC_1_SQRT_2;

use crate::core::config::MapConfig;
use crate::core::error::{MapError, Result};
use crate::core::types::{ortho_l, Angle, Vec2};
use crate::spatial::coverage::{CellCoverage, CoverageMask};

/// Upper bound on `width * height` for a single grid
pub const MAX_CELLS: usize = 1 << 24;

/// Per-cell hazard and goal state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub max_g: f32,
    pub priority: i32,
}

impl Cell {
    /// Never dangerous, not a goal
    pub const SAFE: Cell = Cell {
        max_g: f32::INFINITY,
        priority: 0,
    };

    /// Returned for queries outside the grid: impassable for any travel distance
    pub const OUT_OF_BOUNDS: Cell = Cell {
        max_g: f32::NEG_INFINITY,
        priority: 0,
    };

    /// True if some hazard touches this cell at any point in time
    #[inline]
    pub fn is_dangerous(&self) -> bool {
        self.max_g < f32::INFINITY
    }

    /// True if the cell is unsafe once `g` units have been travelled
    #[inline]
    pub fn is_blocked(&self, g: f32) -> bool {
        self.max_g < g
    }

    #[inline]
    pub fn is_goal(&self) -> bool {
        self.priority > 0
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::SAFE
    }
}

/// Grid dimensions and world transform, without cell storage
///
/// Cheap to copy; rasterizers only need this, so shapes can be processed
/// while the owning `Grid` is borrowed elsewhere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridGeometry {
    resolution: f32,
    width: i32,
    height: i32,
    center: Vec2,
    rotation: Angle,
    axis_x: Vec2,
    axis_y: Vec2,
}

impl GridGeometry {
    pub fn new(
        resolution: f32,
        center: Vec2,
        half_width: f32,
        half_height: f32,
        rotation: Angle,
    ) -> Result<Self> {
        if !resolution.is_finite() || resolution <= 0.0 {
            return Err(MapError::InvalidResolution(resolution));
        }
        if !(half_width.is_finite() && half_width >= 0.0)
            || !(half_height.is_finite() && half_height >= 0.0)
        {
            return Err(MapError::InvalidExtent {
                half_width,
                half_height,
            });
        }

        // Range-checked before the cast to i32
        let width = 2.0 * (half_width / resolution).ceil();
        let height = 2.0 * (half_height / resolution).ceil();
        let too_large = MapError::GridTooLarge {
            width,
            height,
            limit: MAX_CELLS,
        };
        if !(width <= MAX_CELLS as f32 && height <= MAX_CELLS as f32) {
            return Err(too_large);
        }
        let (width, height) = (width as i32, height as i32);
        match (width as usize).checked_mul(height as usize) {
            Some(count) if count <= MAX_CELLS => {}
            _ => return Err(too_large),
        }

        let axis_y = rotation.to_direction();
        Ok(Self {
            resolution,
            width,
            height,
            center,
            rotation,
            axis_x: ortho_l(axis_y),
            axis_y,
        })
    }

    #[inline]
    pub fn resolution(&self) -> f32 {
        self.resolution
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }

    pub fn rotation(&self) -> Angle {
        self.rotation
    }

    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Half of a cell diagonal: max distance from a cell center to any point of the cell
    #[inline]
    pub fn half_diagonal(&self) -> f32 {
        self.resolution * FRAC_1_SQRT_2
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    /// Row-major index of a cell, or `None` outside the grid
    #[inline]
    pub fn index(&self, x: i32, y: i32) -> Option<usize> {
        if self.in_bounds(x, y) {
            Some(y as usize * self.width as usize + x as usize)
        } else {
            None
        }
    }

    /// World position to fractional grid coordinates
    ///
    /// `(width / 2, height / 2)` corresponds to `center`.
    #[inline]
    pub fn world_to_grid_frac(&self, world: Vec2) -> Vec2 {
        let offset = world - self.center;
        Vec2::new(
            (self.width / 2) as f32 + offset.dot(self.axis_x) / self.resolution,
            (self.height / 2) as f32 + offset.dot(self.axis_y) / self.resolution,
        )
    }

    #[inline]
    pub fn frac_to_grid(&self, frac: Vec2) -> (i32, i32) {
        (frac.x.floor() as i32, frac.y.floor() as i32)
    }

    /// Cell containing a world position (may be out of bounds)
    #[inline]
    pub fn world_to_grid(&self, world: Vec2) -> (i32, i32) {
        self.frac_to_grid(self.world_to_grid_frac(world))
    }

    /// Inverse of `world_to_grid_frac`: cell plus sub-cell offset in [0, 1)
    #[inline]
    pub fn grid_to_world(&self, gx: i32, gy: i32, fx: f32, fy: f32) -> Vec2 {
        let ax = ((gx - self.width / 2) as f32 + fx) * self.resolution;
        let ay = ((gy - self.height / 2) as f32 + fy) * self.resolution;
        self.center + self.axis_x * ax + self.axis_y * ay
    }

    #[inline]
    pub fn cell_center(&self, x: i32, y: i32) -> Vec2 {
        self.grid_to_world(x, y, 0.5, 0.5)
    }
}

/// Hazard/goal map for one planning pass
#[derive(Debug, Clone)]
pub struct Grid {
    geometry: GridGeometry,
    cells: Vec<Cell>,
    max_g: f32,
    max_priority: i32,
}

impl Grid {
    /// Create a grid covering at least `half_width` x `half_height` around `center`
    pub fn new(
        resolution: f32,
        center: Vec2,
        half_width: f32,
        half_height: f32,
        rotation: Angle,
    ) -> Result<Self> {
        let geometry = GridGeometry::new(resolution, center, half_width, half_height, rotation)?;
        tracing::debug!(
            "Created {}x{} hazard grid at ({:.2}, {:.2}), resolution {}",
            geometry.width,
            geometry.height,
            center.x,
            center.y,
            resolution
        );
        Ok(Self {
            geometry,
            cells: vec![Cell::SAFE; geometry.cell_count()],
            max_g: 0.0,
            max_priority: 0,
        })
    }

    pub fn from_config(config: &MapConfig, center: Vec2, rotation: Angle) -> Result<Self> {
        Self::new(
            config.resolution,
            center,
            config.half_width,
            config.half_height,
            rotation,
        )
    }

    /// Copy of the grid transform, for rasterizing shapes
    #[inline]
    pub fn geometry(&self) -> GridGeometry {
        self.geometry
    }

    pub fn resolution(&self) -> f32 {
        self.geometry.resolution
    }

    pub fn width(&self) -> i32 {
        self.geometry.width
    }

    pub fn height(&self) -> i32 {
        self.geometry.height
    }

    pub fn center(&self) -> Vec2 {
        self.geometry.center
    }

    pub fn rotation(&self) -> Angle {
        self.geometry.rotation
    }

    /// Largest `max_g` applied by any hazard so far
    pub fn max_g(&self) -> f32 {
        self.max_g
    }

    /// Largest goal priority applied so far
    pub fn max_priority(&self) -> i32 {
        self.max_priority
    }

    /// Row-major cell storage
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Cell at grid coordinates; `Cell::OUT_OF_BOUNDS` outside the grid
    #[inline]
    pub fn cell(&self, x: i32, y: i32) -> Cell {
        match self.geometry.index(x, y) {
            Some(idx) => self.cells[idx],
            None => Cell::OUT_OF_BOUNDS,
        }
    }

    /// Direct write access; `None` outside the grid
    #[inline]
    pub fn cell_mut(&mut self, x: i32, y: i32) -> Option<&mut Cell> {
        let idx = self.geometry.index(x, y)?;
        Some(&mut self.cells[idx])
    }

    /// Cell containing a world position
    pub fn cell_at(&self, world: Vec2) -> Cell {
        let (x, y) = self.world_to_grid(world);
        self.cell(x, y)
    }

    /// All cells with their coordinates, row-major
    pub fn iter_cells(&self) -> impl Iterator<Item = (i32, i32, Cell)> + '_ {
        let width = self.geometry.width.max(1) as usize;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, &cell)| ((i % width) as i32, (i / width) as i32, cell))
    }

    #[inline]
    pub fn world_to_grid_frac(&self, world: Vec2) -> Vec2 {
        self.geometry.world_to_grid_frac(world)
    }

    #[inline]
    pub fn frac_to_grid(&self, frac: Vec2) -> (i32, i32) {
        self.geometry.frac_to_grid(frac)
    }

    #[inline]
    pub fn world_to_grid(&self, world: Vec2) -> (i32, i32) {
        self.geometry.world_to_grid(world)
    }

    #[inline]
    pub fn grid_to_world(&self, gx: i32, gy: i32, fx: f32, fy: f32) -> Vec2 {
        self.geometry.grid_to_world(gx, gy, fx, fy)
    }

    /// Merge a hazard into the map
    ///
    /// Every entry whose coverage is in `mask` gets `max_g = min(current, max_g)`.
    /// Entries outside the grid are ignored. Returns the number of matched cells.
    ///
    /// A NaN `max_g` leaves every cell and the running maximum untouched,
    /// since `f32::min`/`f32::max` discard NaN operands.
    pub fn block_cells<I>(&mut self, pixels: I, max_g: f32, mask: CoverageMask) -> usize
    where
        I: IntoIterator<Item = CellCoverage>,
    {
        self.max_g = self.max_g.max(max_g);
        let mut matched = 0;
        for p in pixels {
            if !mask.matches(p.coverage) {
                continue;
            }
            if let Some(idx) = self.geometry.index(p.x, p.y) {
                let cell = &mut self.cells[idx];
                cell.max_g = cell.max_g.min(max_g);
                matched += 1;
            }
        }
        tracing::debug!("Blocked {} cells with max_g {}", matched, max_g);
        matched
    }

    /// Mark goal cells; higher priority wins where goals overlap
    ///
    /// Blocked cells are marked too: goal and danger are stored independently.
    pub fn mark_goal_cells<I>(&mut self, pixels: I, priority: i32, mask: CoverageMask) -> usize
    where
        I: IntoIterator<Item = CellCoverage>,
    {
        self.max_priority = self.max_priority.max(priority);
        let mut matched = 0;
        for p in pixels {
            if !mask.matches(p.coverage) {
                continue;
            }
            if let Some(idx) = self.geometry.index(p.x, p.y) {
                let cell = &mut self.cells[idx];
                cell.priority = cell.priority.max(priority);
                matched += 1;
            }
        }
        tracing::debug!("Marked {} goal cells with priority {}", matched, priority);
        matched
    }

    /// Reset all cells to `Cell::SAFE` and the running maxima to zero
    pub fn clear(&mut self) {
        self.cells.fill(Cell::SAFE);
        self.max_g = 0.0;
        self.max_priority = 0;
    }
}
