//! Shape rasterization
//!
//! Converts continuous shapes into per-cell `Coverage`. Cells are squares,
//! not points, so every test is done against the cell center with a
//! tolerance of half a cell diagonal: a cell is `Inside` only if the whole
//! square is inside, `Outside` only if the whole square is outside, and
//! `Border` otherwise.
//!
//! A `Rasterization` is a lazily evaluated, restartable description of the
//! result. Iterating it visits every cell in row-major order (y outer,
//! x inner); degenerate shapes produce no entries at all.

use std::f32::consts::PI;
use std::iter::FusedIterator;

use serde::{Deserialize, Serialize};

use crate::core::types::{ortho_l, Angle, Vec2};
use crate::spatial::coverage::{CellCoverage, Coverage};
use crate::spatial::grid::GridGeometry;

/// Shapes that can be rasterized onto a grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    Circle {
        origin: Vec2,
        radius: f32,
    },
    Donut {
        origin: Vec2,
        inner_radius: f32,
        outer_radius: f32,
    },
    /// Donut restricted to a wedge of `2 * half_angle` around `center_dir`
    DonutSector {
        origin: Vec2,
        inner_radius: f32,
        outer_radius: f32,
        center_dir: Angle,
        half_angle: Angle,
    },
    /// Rectangle extending `length_front` along `direction` and `length_back` opposite to it
    Rect {
        origin: Vec2,
        direction: Angle,
        length_front: f32,
        length_back: f32,
        half_width: f32,
    },
    /// Two perpendicular arms of `2 * length` centered on `origin`
    Cross {
        origin: Vec2,
        direction: Angle,
        length: f32,
        half_width: f32,
    },
}

impl Shape {
    /// True if the shape covers no area
    ///
    /// NaN sizes, angles and origins count as degenerate. Comparisons are
    /// written negated so that NaN falls on the empty side.
    pub fn is_degenerate(&self) -> bool {
        match *self {
            Shape::Circle { origin, radius } => !origin.is_finite() || !(radius > 0.0),
            Shape::Donut {
                origin,
                inner_radius,
                outer_radius,
            } => !origin.is_finite() || !(outer_radius > 0.0) || !(inner_radius < outer_radius),
            Shape::DonutSector {
                origin,
                inner_radius,
                outer_radius,
                center_dir,
                half_angle,
            } => {
                // A full ring ignores its direction
                let aimed = half_angle.rad() < PI;
                !origin.is_finite()
                    || !(half_angle.rad() > 0.0)
                    || (aimed && !center_dir.rad().is_finite())
                    || !(outer_radius > 0.0)
                    || !(inner_radius < outer_radius)
            }
            Shape::Rect {
                origin,
                direction,
                length_front,
                length_back,
                half_width,
            } => {
                !origin.is_finite()
                    || !direction.rad().is_finite()
                    || !(half_width > 0.0)
                    || !(length_front + length_back > 0.0)
            }
            Shape::Cross {
                origin,
                direction,
                length,
                half_width,
            } => {
                !origin.is_finite()
                    || !direction.rad().is_finite()
                    || !(length > 0.0)
                    || !(half_width > 0.0)
            }
        }
    }
}

/// Shape with precomputed thresholds for a given tolerance
#[derive(Debug, Clone, Copy, PartialEq)]
enum Kernel {
    Empty,
    /// Squared distance thresholds
    Donut {
        origin: Vec2,
        outside_far_sq: f32,
        inside_far_sq: f32,
        inside_near_sq: f32,
        outside_near_sq: f32,
    },
    /// Linear distance thresholds
    Sector {
        origin: Vec2,
        outside_far: f32,
        inside_far: f32,
        inside_near: f32,
        outside_near: f32,
        center_dir: Angle,
        half_angle: f32,
        delta: f32,
    },
    Rect {
        origin: Vec2,
        dir: Vec2,
        normal: Vec2,
        length_front: f32,
        length_back: f32,
        half_width: f32,
        delta: f32,
    },
    Cross {
        origin: Vec2,
        dir: Vec2,
        normal: Vec2,
        length: f32,
        half_width: f32,
        delta: f32,
    },
}

/// Radial band thresholds: (outside_far, inside_far, inside_near, outside_near)
///
/// `d >= outside_far || d < outside_near` is fully outside,
/// `inside_near <= d < inside_far` is fully inside.
fn radial_bands(inner: f32, outer: f32, delta: f32) -> (f32, f32, f32, f32) {
    let outside_far = outer + delta;
    let inside_far = (outer - delta).max(0.0);
    let inside_near = if inner > 0.0 { inner + delta } else { 0.0 };
    let outside_near = (inner - delta).max(0.0);
    (outside_far, inside_far, inside_near, outside_near)
}

impl Kernel {
    fn prepare(shape: &Shape, delta: f32) -> Self {
        if shape.is_degenerate() {
            return Kernel::Empty;
        }

        match *shape {
            Shape::Circle { origin, radius } => Self::donut(origin, 0.0, radius, delta),
            Shape::Donut {
                origin,
                inner_radius,
                outer_radius,
            } => Self::donut(origin, inner_radius, outer_radius, delta),
            Shape::DonutSector {
                origin,
                inner_radius,
                outer_radius,
                center_dir,
                half_angle,
            } => {
                if half_angle.rad() >= PI {
                    return Self::donut(origin, inner_radius, outer_radius, delta);
                }
                let (outside_far, inside_far, inside_near, outside_near) =
                    radial_bands(inner_radius, outer_radius, delta);
                Kernel::Sector {
                    origin,
                    outside_far,
                    inside_far,
                    inside_near,
                    outside_near,
                    center_dir,
                    half_angle: half_angle.rad(),
                    delta,
                }
            }
            Shape::Rect {
                origin,
                direction,
                length_front,
                length_back,
                half_width,
            } => {
                let dir = direction.to_direction();
                Kernel::Rect {
                    origin,
                    dir,
                    normal: ortho_l(dir),
                    length_front,
                    length_back,
                    half_width,
                    delta,
                }
            }
            Shape::Cross {
                origin,
                direction,
                length,
                half_width,
            } => {
                let dir = direction.to_direction();
                Kernel::Cross {
                    origin,
                    dir,
                    normal: ortho_l(dir),
                    length,
                    half_width,
                    delta,
                }
            }
        }
    }

    fn donut(origin: Vec2, inner: f32, outer: f32, delta: f32) -> Self {
        let (outside_far, inside_far, inside_near, outside_near) = radial_bands(inner, outer, delta);
        Kernel::Donut {
            origin,
            outside_far_sq: outside_far * outside_far,
            inside_far_sq: inside_far * inside_far,
            inside_near_sq: inside_near * inside_near,
            outside_near_sq: outside_near * outside_near,
        }
    }

    /// Classify a cell by its center point
    fn classify(&self, p: Vec2) -> Coverage {
        match *self {
            Kernel::Empty => Coverage::Outside,
            Kernel::Donut {
                origin,
                outside_far_sq,
                inside_far_sq,
                inside_near_sq,
                outside_near_sq,
            } => {
                let d = (p - origin).length_squared();
                if d >= outside_far_sq || d < outside_near_sq {
                    Coverage::Outside
                } else if d >= inside_near_sq && d < inside_far_sq {
                    Coverage::Inside
                } else {
                    Coverage::Border
                }
            }
            Kernel::Sector {
                origin,
                outside_far,
                inside_far,
                inside_near,
                outside_near,
                center_dir,
                half_angle,
                delta,
            } => {
                let off = p - origin;
                let d = off.length();
                if d >= outside_far || d < outside_near {
                    return Coverage::Outside;
                }

                let angular_dist = (Angle::from_direction(off) - center_dir).normalized().rad().abs();
                // Approximate distance from the nearest straight edge of the wedge
                let side_dist = (angular_dist - half_angle) * d;
                if side_dist >= delta {
                    Coverage::Outside
                } else if side_dist <= -delta && d >= inside_near && d < inside_far {
                    Coverage::Inside
                } else {
                    Coverage::Border
                }
            }
            Kernel::Rect {
                origin,
                dir,
                normal,
                length_front,
                length_back,
                half_width,
                delta,
            } => {
                let off = p - origin;
                let dot_dir = off.dot(dir);
                let dot_normal = off.dot(normal).abs();
                if dot_dir < -length_back - delta
                    || dot_dir > length_front + delta
                    || dot_normal > half_width + delta
                {
                    Coverage::Outside
                } else if dot_dir >= -length_back + delta
                    && dot_dir <= length_front - delta
                    && dot_normal <= half_width - delta
                {
                    Coverage::Inside
                } else {
                    Coverage::Border
                }
            }
            Kernel::Cross {
                origin,
                dir,
                normal,
                length,
                half_width,
                delta,
            } => {
                let off = p - origin;
                let dot_dir = off.dot(dir).abs();
                let dot_normal = off.dot(normal).abs();
                let min_dot = dot_dir.min(dot_normal);
                if dot_dir > length + delta || dot_normal > length + delta || min_dot > half_width + delta {
                    Coverage::Outside
                } else if dot_dir > length - delta
                    || dot_normal > length - delta
                    || min_dot > half_width - delta
                {
                    Coverage::Border
                } else {
                    Coverage::Inside
                }
            }
        }
    }
}

/// Coverage of one shape over a grid
///
/// Owns a copy of the grid geometry, so it can be sent to other threads and
/// iterated any number of times; each iteration recomputes the coverage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rasterization {
    geometry: GridGeometry,
    kernel: Kernel,
}

impl Rasterization {
    pub fn new(geometry: GridGeometry, shape: &Shape) -> Self {
        Self {
            geometry,
            kernel: Kernel::prepare(shape, geometry.half_diagonal()),
        }
    }

    /// Fresh iterator over all (x, y, coverage) entries
    pub fn iter(&self) -> RasterIter {
        let total = match self.kernel {
            Kernel::Empty => 0,
            _ => self.geometry.cell_count(),
        };
        RasterIter {
            geometry: self.geometry,
            kernel: self.kernel,
            x: 0,
            y: 0,
            remaining: total,
        }
    }

    /// True if iteration produces no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn len(&self) -> usize {
        self.iter().len()
    }

    /// Coverage of a single cell, without enumerating the grid
    pub fn classify_cell(&self, x: i32, y: i32) -> Coverage {
        self.kernel.classify(self.geometry.cell_center(x, y))
    }
}

impl IntoIterator for &Rasterization {
    type Item = CellCoverage;
    type IntoIter = RasterIter;

    fn into_iter(self) -> RasterIter {
        self.iter()
    }
}

impl IntoIterator for Rasterization {
    type Item = CellCoverage;
    type IntoIter = RasterIter;

    fn into_iter(self) -> RasterIter {
        self.iter()
    }
}

/// Row-major iterator over a `Rasterization`
#[derive(Debug, Clone)]
pub struct RasterIter {
    geometry: GridGeometry,
    kernel: Kernel,
    x: i32,
    y: i32,
    remaining: usize,
}

impl Iterator for RasterIter {
    type Item = CellCoverage;

    fn next(&mut self) -> Option<CellCoverage> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let (x, y) = (self.x, self.y);
        self.x += 1;
        if self.x == self.geometry.width() {
            self.x = 0;
            self.y += 1;
        }

        let coverage = self.kernel.classify(self.geometry.cell_center(x, y));
        Some(CellCoverage::new(x, y, coverage))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for RasterIter {}
impl FusedIterator for RasterIter {}

impl GridGeometry {
    pub fn rasterize(&self, shape: &Shape) -> Rasterization {
        Rasterization::new(*self, shape)
    }

    pub fn rasterize_circle(&self, origin: Vec2, radius: f32) -> Rasterization {
        self.rasterize(&Shape::Circle { origin, radius })
    }

    pub fn rasterize_donut(&self, origin: Vec2, inner_radius: f32, outer_radius: f32) -> Rasterization {
        self.rasterize(&Shape::Donut {
            origin,
            inner_radius,
            outer_radius,
        })
    }

    pub fn rasterize_donut_sector(
        &self,
        origin: Vec2,
        inner_radius: f32,
        outer_radius: f32,
        center_dir: Angle,
        half_angle: Angle,
    ) -> Rasterization {
        self.rasterize(&Shape::DonutSector {
            origin,
            inner_radius,
            outer_radius,
            center_dir,
            half_angle,
        })
    }

    pub fn rasterize_rect(
        &self,
        origin: Vec2,
        direction: Angle,
        length_front: f32,
        length_back: f32,
        half_width: f32,
    ) -> Rasterization {
        self.rasterize(&Shape::Rect {
            origin,
            direction,
            length_front,
            length_back,
            half_width,
        })
    }

    pub fn rasterize_cross(&self, origin: Vec2, direction: Angle, length: f32, half_width: f32) -> Rasterization {
        self.rasterize(&Shape::Cross {
            origin,
            direction,
            length,
            half_width,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::grid::Grid;
    use std::f32::consts::FRAC_PI_2;

    fn geometry() -> GridGeometry {
        Grid::new(1.0, Vec2::ZERO, 5.0, 5.0, Angle::default())
            .unwrap()
            .geometry()
    }

    fn coverage_at(r: &Rasterization, geometry: &GridGeometry, world: Vec2) -> Coverage {
        let (x, y) = geometry.world_to_grid(world);
        r.iter()
            .find(|p| p.x == x && p.y == y)
            .map(|p| p.coverage)
            .expect("cell should be enumerated")
    }

    #[test]
    fn test_enumerates_every_cell_row_major() {
        let g = geometry();
        let r = g.rasterize_circle(Vec2::ZERO, 3.0);
        let entries: Vec<_> = r.iter().collect();
        assert_eq!(entries.len(), 100);
        assert_eq!((entries[0].x, entries[0].y), (0, 0));
        assert_eq!((entries[1].x, entries[1].y), (1, 0));
        assert_eq!((entries[10].x, entries[10].y), (0, 1));
        assert_eq!((entries[99].x, entries[99].y), (9, 9));
        assert_eq!(r.len(), 100);
    }

    #[test]
    fn test_restartable() {
        let g = geometry();
        let r = g.rasterize_donut(Vec2::new(1.0, -1.0), 1.0, 3.0);
        let first: Vec<_> = r.iter().collect();
        let second: Vec<_> = (&r).into_iter().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_circle_example() {
        let g = geometry();
        let r = g.rasterize_circle(Vec2::ZERO, 3.0);
        assert_eq!(coverage_at(&r, &g, Vec2::new(0.1, 0.1)), Coverage::Inside);
        assert_eq!(coverage_at(&r, &g, Vec2::new(4.5, 4.5)), Coverage::Outside);
        assert_eq!(coverage_at(&r, &g, Vec2::new(3.0, 0.2)), Coverage::Border);
    }

    #[test]
    fn test_circle_border_tolerance() {
        // Cell center at distance 2.5 from origin, radius 3: boundary passes within half diagonal
        let g = geometry();
        let r = g.rasterize_circle(Vec2::new(0.0, 0.5), 3.0);
        assert_eq!(r.classify_cell(7, 5), Coverage::Border);
        // Center at 1.5: fully inside since 1.5 + 0.707 < 3
        assert_eq!(r.classify_cell(6, 5), Coverage::Inside);
    }

    #[test]
    fn test_donut_hole_is_outside() {
        let g = geometry();
        let r = g.rasterize_donut(Vec2::ZERO, 2.5, 4.5);
        assert_eq!(coverage_at(&r, &g, Vec2::new(0.5, 0.5)), Coverage::Outside);
        assert_eq!(coverage_at(&r, &g, Vec2::new(3.5, 0.5)), Coverage::Inside);
    }

    #[test]
    fn test_circle_equals_zero_inner_donut() {
        let g = geometry();
        let circle: Vec<_> = g.rasterize_circle(Vec2::new(0.3, -1.2), 2.7).iter().collect();
        let donut: Vec<_> = g.rasterize_donut(Vec2::new(0.3, -1.2), 0.0, 2.7).iter().collect();
        assert_eq!(circle, donut);
    }

    #[test]
    fn test_degenerate_donuts_are_empty() {
        let g = geometry();
        assert!(g.rasterize_circle(Vec2::ZERO, 0.0).is_empty());
        assert!(g.rasterize_circle(Vec2::ZERO, -2.0).is_empty());
        assert!(g.rasterize_donut(Vec2::ZERO, 3.0, 3.0).is_empty());
        assert!(g.rasterize_donut(Vec2::ZERO, 4.0, 3.0).is_empty());
    }

    #[test]
    fn test_degenerate_sector_is_empty() {
        let g = geometry();
        let r = g.rasterize_donut_sector(Vec2::ZERO, 0.0, 4.0, Angle(0.0), Angle(0.0));
        assert_eq!(r.iter().count(), 0);
        let r = g.rasterize_donut_sector(Vec2::ZERO, 0.0, 4.0, Angle(0.0), Angle(-0.5));
        assert!(r.is_empty());
    }

    #[test]
    fn test_full_sector_equals_donut() {
        let g = geometry();
        let donut: Vec<_> = g.rasterize_donut(Vec2::ZERO, 1.0, 4.0).iter().collect();
        for half in [PI, 4.0] {
            let sector: Vec<_> = g
                .rasterize_donut_sector(Vec2::ZERO, 1.0, 4.0, Angle(0.7), Angle(half))
                .iter()
                .collect();
            assert_eq!(sector, donut);
        }
    }

    #[test]
    fn test_sector_wedge() {
        // Quarter-circle cone facing world +Y
        let g = geometry();
        let r = g.rasterize_donut_sector(Vec2::ZERO, 0.0, 5.0, Angle(0.0), Angle(FRAC_PI_2 / 2.0));
        assert_eq!(coverage_at(&r, &g, Vec2::new(0.5, 3.5)), Coverage::Inside);
        assert_eq!(coverage_at(&r, &g, Vec2::new(0.5, -3.5)), Coverage::Outside);
        assert_eq!(coverage_at(&r, &g, Vec2::new(3.5, 0.5)), Coverage::Outside);
        // On the diagonal edge of the wedge
        assert_eq!(coverage_at(&r, &g, Vec2::new(2.5, 2.5)), Coverage::Border);
    }

    #[test]
    fn test_rect_asymmetric() {
        let g = geometry();
        let r = g.rasterize_rect(Vec2::ZERO, Angle(0.0), 4.0, 1.0, 1.0);
        assert_eq!(coverage_at(&r, &g, Vec2::new(0.0, 2.5)), Coverage::Border);
        assert_eq!(coverage_at(&r, &g, Vec2::new(-0.5, -3.5)), Coverage::Outside);
        assert_eq!(coverage_at(&r, &g, Vec2::new(3.5, 0.5)), Coverage::Outside);

        let wide = g.rasterize_rect(Vec2::ZERO, Angle(0.0), 4.0, 1.0, 2.0);
        assert_eq!(coverage_at(&wide, &g, Vec2::new(0.5, 2.5)), Coverage::Inside);
        assert_eq!(coverage_at(&wide, &g, Vec2::new(0.5, -0.5)), Coverage::Border);
    }

    #[test]
    fn test_rect_rotated() {
        // Facing world +X
        let g = geometry();
        let r = g.rasterize_rect(Vec2::ZERO, Angle(FRAC_PI_2), 5.0, 0.0, 2.0);
        assert_eq!(coverage_at(&r, &g, Vec2::new(2.5, 0.5)), Coverage::Inside);
        assert_eq!(coverage_at(&r, &g, Vec2::new(0.5, 3.5)), Coverage::Outside);
    }

    #[test]
    fn test_degenerate_rect_is_empty() {
        let g = geometry();
        assert!(g.rasterize_rect(Vec2::ZERO, Angle(0.0), 3.0, 1.0, 0.0).is_empty());
        assert!(g.rasterize_rect(Vec2::ZERO, Angle(0.0), 0.0, 0.0, 1.0).is_empty());
    }

    #[test]
    fn test_cross_arms() {
        let g = geometry();
        let r = g.rasterize_cross(Vec2::ZERO, Angle(0.0), 5.0, 1.5);
        // Along both arms near the center
        assert_eq!(coverage_at(&r, &g, Vec2::new(0.5, 2.5)), Coverage::Inside);
        assert_eq!(coverage_at(&r, &g, Vec2::new(2.5, 0.5)), Coverage::Inside);
        assert_eq!(coverage_at(&r, &g, Vec2::new(-2.5, -0.5)), Coverage::Inside);
        // Between the arms
        assert_eq!(coverage_at(&r, &g, Vec2::new(3.5, 3.5)), Coverage::Outside);
        // Arm edge band: min projection 1.5 lies within tolerance of half width
        assert_eq!(coverage_at(&r, &g, Vec2::new(1.5, 3.5)), Coverage::Border);
    }

    #[test]
    fn test_degenerate_cross_is_empty() {
        let g = geometry();
        assert!(g.rasterize_cross(Vec2::ZERO, Angle(0.0), 0.0, 1.0).is_empty());
        assert!(g.rasterize_cross(Vec2::ZERO, Angle(0.0), 3.0, -1.0).is_empty());
    }

    #[test]
    fn test_non_finite_parameters_are_empty() {
        let g = geometry();
        let nan = f32::NAN;
        let far = Vec2::new(f32::INFINITY, 0.0);

        assert!(g.rasterize_circle(Vec2::ZERO, nan).is_empty());
        assert!(g.rasterize_circle(Vec2::new(nan, 0.0), 2.0).is_empty());
        assert!(g.rasterize_donut(Vec2::ZERO, nan, 3.0).is_empty());
        assert!(g.rasterize_donut(Vec2::ZERO, 1.0, nan).is_empty());
        assert!(g.rasterize_donut(far, 1.0, 3.0).is_empty());
        assert!(g.rasterize_donut_sector(Vec2::ZERO, 0.0, 4.0, Angle(0.0), Angle(nan)).is_empty());
        assert!(g.rasterize_donut_sector(Vec2::ZERO, 0.0, 4.0, Angle(nan), Angle(0.5)).is_empty());
        assert!(g.rasterize_donut_sector(Vec2::ZERO, nan, 4.0, Angle(0.0), Angle(0.5)).is_empty());
        assert!(g.rasterize_rect(Vec2::ZERO, Angle(0.0), nan, 1.0, 1.0).is_empty());
        assert!(g.rasterize_rect(Vec2::ZERO, Angle(0.0), 3.0, 1.0, nan).is_empty());
        assert!(g.rasterize_rect(Vec2::ZERO, Angle(nan), 3.0, 1.0, 1.0).is_empty());
        assert!(g
            .rasterize_rect(Vec2::ZERO, Angle(0.0), f32::INFINITY, f32::NEG_INFINITY, 1.0)
            .is_empty());
        assert!(g.rasterize_cross(Vec2::ZERO, Angle(0.0), nan, 1.0).is_empty());
        assert!(g.rasterize_cross(Vec2::ZERO, Angle(0.0), 3.0, nan).is_empty());
        assert!(g.rasterize_cross(Vec2::ZERO, Angle(nan), 3.0, 1.0).is_empty());
        assert!(g.rasterize_cross(far, Angle(0.0), 3.0, 1.0).is_empty());
    }

    #[test]
    fn test_full_ring_ignores_direction() {
        let g = geometry();
        let donut: Vec<_> = g.rasterize_donut(Vec2::ZERO, 1.0, 4.0).iter().collect();
        let ring: Vec<_> = g
            .rasterize_donut_sector(Vec2::ZERO, 1.0, 4.0, Angle(f32::NAN), Angle(PI))
            .iter()
            .collect();
        assert_eq!(ring, donut);
    }

    #[test]
    fn test_shape_toml() {
        let shape: Shape = toml::from_str(
            r#"
            kind = "donut_sector"
            origin = [1.0, 2.0]
            inner_radius = 0.0
            outer_radius = 8.0
            center_dir = 0.5
            half_angle = 0.25
            "#,
        )
        .unwrap();
        assert_eq!(
            shape,
            Shape::DonutSector {
                origin: Vec2::new(1.0, 2.0),
                inner_radius: 0.0,
                outer_radius: 8.0,
                center_dir: Angle(0.5),
                half_angle: Angle(0.25),
            }
        );
        assert!(!shape.is_degenerate());
    }
}
