//! Hexagonal tiling of the viewport.
//!
//! ```
//! use vodeco_backdrop::engine::tiling::{CellOrientation, HexTiling};
//! use vodeco_backdrop::engine::viewport::ViewportState;
//!
//! let viewport = ViewportState::new(800.0, 600.0);
//! let tiling = HexTiling::new(viewport, 28.0, CellOrientation::PointyTop);
//! assert_eq!(tiling.cells().count(), tiling.cell_count());
//! ```

use bevy::prelude::*;
use hexx::{Hex, HexLayout, HexOrientation};

use super::viewport::ViewportState;

const SQRT_3: f32 = 1.732_050_8;

/// Smallest radius a tiling is built at, in pixels.
pub const MIN_RADIUS: f32 = 4.0;

/// Most cells one tiling enumerates; larger grids come out empty.
pub const MAX_CELLS: usize = 1 << 20;

/// Which way the hexagons point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Reflect)]
pub enum CellOrientation {
    /// Vertex at the top; rows are staggered.
    #[default]
    PointyTop,
    /// Edge at the top; columns are staggered.
    FlatTop,
}

impl CellOrientation {
    fn to_hexx(self) -> HexOrientation {
        match self {
            Self::PointyTop => HexOrientation::Pointy,
            Self::FlatTop => HexOrientation::Flat,
        }
    }
}

/// Cell sizing that adapts to the viewport class.
#[derive(Clone, Copy, Debug, PartialEq, Reflect)]
pub struct CellSizing {
    /// Cell radius on desktop-sized viewports (pixels).
    pub radius: f32,
    /// Coarser cell radius below the breakpoint (pixels).
    pub mobile_radius: f32,
    /// Viewport widths below this use `mobile_radius`.
    pub mobile_breakpoint: f32,
}

impl Default for CellSizing {
    fn default() -> Self {
        Self {
            radius: 28.0,
            mobile_radius: 35.0,
            mobile_breakpoint: 768.0,
        }
    }
}

impl CellSizing {
    /// Radius to use for a viewport `width` pixels wide.
    pub fn radius_for(&self, width: f32) -> f32 {
        let radius = if width < self.mobile_breakpoint {
            self.mobile_radius
        } else {
            self.radius
        };
        radius.max(MIN_RADIUS)
    }
}

/// One tile of the tiling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HexCell {
    /// Canvas-space center.
    pub center: Vec2,
    /// Offset-coordinate column (may be `-1` for the margin column).
    pub column: i32,
    /// Offset-coordinate row (may be `-1` for the margin row).
    pub row: i32,
    /// Equivalent axial coordinate.
    pub hex: Hex,
}

/// Hexagonal tiling of a viewport at a fixed radius.
///
/// Centers are derived from `(column, row)` so the enumeration follows the
/// viewport rectangle; corner offsets come from a unit `hexx` layout.
#[derive(Clone, Debug)]
pub struct HexTiling {
    orientation: CellOrientation,
    radius: f32,
    width: f32,
    height: f32,
    unit_corners: [Vec2; 6],
}

impl HexTiling {
    /// Tiling for `viewport` at `radius`.
    ///
    /// Positive radii below [`MIN_RADIUS`] are raised to it; zero, negative
    /// and non-finite radii give an empty tiling.
    pub fn new(viewport: ViewportState, radius: f32, orientation: CellOrientation) -> Self {
        let unit_layout = HexLayout {
            orientation: orientation.to_hexx(),
            scale: Vec2::splat(1.0),
            ..default()
        };
        let corners = unit_layout.center_aligned_hex_corners();
        let radius = if radius > 0.0 && radius.is_finite() {
            radius.max(MIN_RADIUS)
        } else {
            radius
        };
        Self {
            orientation,
            radius,
            width: viewport.width,
            height: viewport.height,
            unit_corners: std::array::from_fn(|i| corners[i]),
        }
    }

    /// Tiling whose radius follows the viewport class.
    pub fn adaptive(viewport: ViewportState, sizing: &CellSizing, orientation: CellOrientation) -> Self {
        Self::new(viewport, sizing.radius_for(viewport.width), orientation)
    }

    /// Cell radius in pixels.
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Distance between neighbouring centers along `(x, y)`.
    pub fn spacing(&self) -> Vec2 {
        let r = self.radius;
        match self.orientation {
            CellOrientation::PointyTop => Vec2::new(r * SQRT_3, 1.5 * r),
            CellOrientation::FlatTop => Vec2::new(0.75 * 2.0 * r, r * SQRT_3),
        }
    }

    fn is_degenerate(&self) -> bool {
        !(self.radius.is_finite() && self.radius > 0.0 && self.width > 0.0 && self.height > 0.0)
    }

    /// Number of columns and rows, margin included on both sides.
    ///
    /// `(0, 0)` when degenerate or when the grid would exceed [`MAX_CELLS`].
    fn extent(&self) -> (usize, usize) {
        if self.is_degenerate() {
            return (0, 0);
        }
        let s = self.spacing();
        // -1 ..= ceil(dim / spacing) + 1
        let cols = ((self.width / s.x).ceil() as usize).saturating_add(3);
        let rows = ((self.height / s.y).ceil() as usize).saturating_add(3);
        match cols.checked_mul(rows) {
            Some(n) if n <= MAX_CELLS => (cols, rows),
            _ => (0, 0),
        }
    }

    /// Number of cells [`Self::cells`] yields.
    pub fn cell_count(&self) -> usize {
        let (cols, rows) = self.extent();
        cols * rows
    }

    /// Center and identity of the cell at `(column, row)`.
    pub fn cell_at(&self, column: i32, row: i32) -> HexCell {
        let s = self.spacing();
        match self.orientation {
            CellOrientation::PointyTop => {
                let shift = row.rem_euclid(2) as f32 * 0.5 * s.x;
                let q = column - (row - row.rem_euclid(2)) / 2;
                HexCell {
                    center: Vec2::new(column as f32 * s.x + shift, row as f32 * s.y),
                    column,
                    row,
                    hex: Hex::new(q, row),
                }
            }
            CellOrientation::FlatTop => {
                let shift = column.rem_euclid(2) as f32 * 0.5 * s.y;
                let r = row - (column - column.rem_euclid(2)) / 2;
                HexCell {
                    center: Vec2::new(column as f32 * s.x, row as f32 * s.y + shift),
                    column,
                    row,
                    hex: Hex::new(column, r),
                }
            }
        }
    }

    /// Lazily enumerates every cell overlapping the viewport plus a
    /// one-spacing margin on each edge. Call again each frame to restart.
    pub fn cells(&self) -> CellIter<'_> {
        let (cols, rows) = self.extent();
        CellIter {
            tiling: self,
            cols,
            total: cols * rows,
            index: 0,
        }
    }

    /// Base (unperturbed) positions of the six vertices of `cell`.
    pub fn corners(&self, cell: &HexCell) -> [Vec2; 6] {
        std::array::from_fn(|i| cell.center + self.unit_corners[i] * self.radius)
    }
}

/// Iterator returned by [`HexTiling::cells`].
pub struct CellIter<'a> {
    tiling: &'a HexTiling,
    cols: usize,
    total: usize,
    index: usize,
}

impl Iterator for CellIter<'_> {
    type Item = HexCell;

    fn next(&mut self) -> Option<HexCell> {
        if self.index >= self.total {
            return None;
        }
        // extent is capped at MAX_CELLS, so both fit in i32
        let row = (self.index / self.cols) as i32 - 1;
        let column = (self.index % self.cols) as i32 - 1;
        self.index += 1;
        Some(self.tiling.cell_at(column, row))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.total - self.index;
        (left, Some(left))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport(width: f32, height: f32) -> ViewportState {
        ViewportState { width, height }
    }

    fn bounds(tiling: &HexTiling) -> (Vec2, Vec2) {
        tiling.cells().fold(
            (Vec2::splat(f32::MAX), Vec2::splat(f32::MIN)),
            |(lo, hi), c| (lo.min(c.center), hi.max(c.center)),
        )
    }

    // ── spacing ─────────────────────────────────────────────────────

    #[test]
    fn pointy_spacing() {
        let t = HexTiling::new(viewport(100.0, 100.0), 10.0, CellOrientation::PointyTop);
        let s = t.spacing();
        assert!((s.x - 17.320_508).abs() < 1e-4);
        assert!((s.y - 15.0).abs() < 1e-6);
    }

    #[test]
    fn flat_spacing() {
        let t = HexTiling::new(viewport(100.0, 100.0), 10.0, CellOrientation::FlatTop);
        let s = t.spacing();
        assert!((s.x - 15.0).abs() < 1e-6);
        assert!((s.y - 17.320_508).abs() < 1e-4);
    }

    // ── coverage ────────────────────────────────────────────────────

    #[test]
    fn centers_reach_one_spacing_past_each_edge() {
        for orientation in [CellOrientation::PointyTop, CellOrientation::FlatTop] {
            let t = HexTiling::new(viewport(1200.0, 800.0), 28.0, orientation);
            let s = t.spacing();
            let (lo, hi) = bounds(&t);
            assert!(lo.x <= -s.x + 1e-3 && lo.y <= -s.y + 1e-3, "{orientation:?} lo {lo:?}");
            assert!(
                hi.x >= 1200.0 + s.x - 1e-3 && hi.y >= 800.0 + s.y - 1e-3,
                "{orientation:?} hi {hi:?}"
            );
        }
    }

    #[test]
    fn every_viewport_point_lies_inside_some_cell() {
        for orientation in [CellOrientation::PointyTop, CellOrientation::FlatTop] {
            for (w, h, r) in [(800.0, 600.0, 28.0), (375.0, 667.0, 35.0), (97.0, 13.0, 20.0)] {
                let t = HexTiling::new(viewport(w, h), r, orientation);
                let centers: Vec<Vec2> = t.cells().map(|c| c.center).collect();
                let steps = 40;
                for i in 0..=steps {
                    for j in 0..=steps {
                        let p = Vec2::new(w * i as f32 / steps as f32, h * j as f32 / steps as f32);
                        let nearest = centers
                            .iter()
                            .map(|c| c.distance(p))
                            .fold(f32::MAX, f32::min);
                        assert!(
                            nearest <= r + 1e-3,
                            "{orientation:?} {w}x{h}: gap at {p:?} ({nearest} > {r})"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn enumeration_is_restartable() {
        let t = HexTiling::new(viewport(640.0, 480.0), 28.0, CellOrientation::PointyTop);
        let first: Vec<HexCell> = t.cells().collect();
        let second: Vec<HexCell> = t.cells().collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), t.cell_count());
        assert_eq!(t.cells().size_hint(), (first.len(), Some(first.len())));
    }

    // ── degenerate input ────────────────────────────────────────────

    #[test]
    fn zero_size_viewport_is_empty() {
        let t = HexTiling::new(viewport(0.0, 600.0), 28.0, CellOrientation::PointyTop);
        assert_eq!(t.cells().count(), 0);
        let t = HexTiling::new(viewport(0.0, 0.0), 28.0, CellOrientation::FlatTop);
        assert_eq!(t.cells().count(), 0);
    }

    #[test]
    fn bad_radius_is_empty() {
        for r in [0.0, -5.0, f32::NAN, f32::INFINITY] {
            let t = HexTiling::new(viewport(800.0, 600.0), r, CellOrientation::PointyTop);
            assert_eq!(t.cells().count(), 0, "radius {r}");
        }
    }

    #[test]
    fn tiny_radius_is_raised_to_the_minimum() {
        let t = HexTiling::new(viewport(1920.0, 1080.0), 0.01, CellOrientation::PointyTop);
        assert_eq!(t.radius(), MIN_RADIUS);
        assert_eq!(t.cells().take(3).count(), 3);
        let n = t.cell_count();
        assert!(n > 0 && n <= MAX_CELLS, "{n} cells");
        assert_eq!(t.cells().count(), n);
    }

    #[test]
    fn oversized_grid_is_empty() {
        let t = HexTiling::new(viewport(1.0e6, 1.0e6), MIN_RADIUS, CellOrientation::FlatTop);
        assert_eq!(t.cell_count(), 0);
        assert_eq!(t.cells().count(), 0);
        assert_eq!(t.cells().size_hint(), (0, Some(0)));
    }

    // ── identity / corners ──────────────────────────────────────────

    #[test]
    fn row_neighbours_are_adjacent_hexes() {
        for orientation in [CellOrientation::PointyTop, CellOrientation::FlatTop] {
            let t = HexTiling::new(viewport(400.0, 400.0), 20.0, orientation);
            for row in -1..4 {
                for col in -1..4 {
                    let a = t.cell_at(col, row);
                    let right = t.cell_at(col + 1, row);
                    let below = t.cell_at(col, row + 1);
                    assert_eq!(a.hex.distance_to(right.hex), 1, "{orientation:?} ({col},{row})");
                    assert_eq!(a.hex.distance_to(below.hex), 1, "{orientation:?} ({col},{row})");
                }
            }
        }
    }

    #[test]
    fn neighbouring_centers_are_one_cell_apart() {
        let r = 20.0;
        let t = HexTiling::new(viewport(400.0, 400.0), r, CellOrientation::PointyTop);
        let a = t.cell_at(2, 2);
        let b = t.cell_at(2, 3);
        assert!((a.center.distance(b.center) - r * SQRT_3).abs() < 1e-3);
    }

    #[test]
    fn corners_lie_on_circumcircle() {
        for orientation in [CellOrientation::PointyTop, CellOrientation::FlatTop] {
            let t = HexTiling::new(viewport(400.0, 400.0), 30.0, orientation);
            let cell = t.cell_at(3, 1);
            let corners = t.corners(&cell);
            for c in corners {
                assert!((c.distance(cell.center) - 30.0).abs() < 1e-3);
            }
            for i in 0..6 {
                let edge = corners[i].distance(corners[(i + 1) % 6]);
                assert!((edge - 30.0).abs() < 1e-3, "{orientation:?} edge {i}: {edge}");
            }
        }
    }

    // ── sizing ──────────────────────────────────────────────────────

    #[test]
    fn narrow_viewports_use_coarser_radius() {
        let sizing = CellSizing::default();
        assert_eq!(sizing.radius_for(375.0), 35.0);
        assert_eq!(sizing.radius_for(1280.0), 28.0);
        let mobile = HexTiling::adaptive(viewport(375.0, 667.0), &sizing, CellOrientation::PointyTop);
        assert_eq!(mobile.radius(), 35.0);
    }

    #[test]
    fn sizing_never_goes_below_the_minimum() {
        let sizing = CellSizing {
            radius: 0.5,
            mobile_radius: 0.0,
            ..default()
        };
        assert_eq!(sizing.radius_for(1280.0), MIN_RADIUS);
        assert_eq!(sizing.radius_for(375.0), MIN_RADIUS);
    }
}
