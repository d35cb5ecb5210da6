//! Drawing surface abstraction and the per-frame render pass.

use bevy::color::{Alpha, HexColorError, Srgba};
use bevy::prelude::*;

use super::tiling::HexTiling;
use super::wave::WaveField;

/// Drawing target of one backdrop.
pub trait WaveSurface {
    /// Erases everything drawn so far.
    fn clear(&mut self);
    /// Strokes a closed hexagon outline.
    fn stroke_polygon(&mut self, points: &[Vec2; 6], color: Srgba);
    /// Draws a small marker at a vertex.
    fn mark_vertex(&mut self, at: Vec2, radius: f32, color: Srgba);
}

/// One retained closed outline.
#[derive(Clone, Debug, PartialEq)]
pub struct Stroke {
    /// Canvas-space vertices.
    pub points: [Vec2; 6],
    /// Stroke color with alpha.
    pub color: Srgba,
}

/// One retained vertex marker.
#[derive(Clone, Debug, PartialEq)]
pub struct Marker {
    /// Canvas-space center.
    pub at: Vec2,
    /// Marker radius in pixels.
    pub radius: f32,
    /// Marker color with alpha.
    pub color: Srgba,
}

/// Retained drawing surface.
///
/// Holds whatever the last executed frame drew until the next one clears it,
/// so throttled host frames keep showing the previous image.
#[derive(Component, Clone, Debug, Default)]
pub struct DisplayList {
    strokes: Vec<Stroke>,
    markers: Vec<Marker>,
    generation: u64,
}

impl DisplayList {
    /// Retained outlines.
    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    /// Retained markers.
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Bumped on every mutation.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl WaveSurface for DisplayList {
    fn clear(&mut self) {
        self.strokes.clear();
        self.markers.clear();
        self.generation += 1;
    }

    fn stroke_polygon(&mut self, points: &[Vec2; 6], color: Srgba) {
        self.strokes.push(Stroke {
            points: *points,
            color,
        });
        self.generation += 1;
    }

    fn mark_vertex(&mut self, at: Vec2, radius: f32, color: Srgba) {
        self.markers.push(Marker { at, radius, color });
        self.generation += 1;
    }
}

/// Fallback stroke color (`#4fc3f7`).
pub const DEFAULT_COLOR: Srgba = Srgba::rgb(79.0 / 255.0, 195.0 / 255.0, 247.0 / 255.0);

/// Parses a `#rrggbb` / `#rgb` string.
pub fn parse_color(hex: &str) -> Result<Srgba, HexColorError> {
    Srgba::hex(hex)
}

/// Visual parameters of one backdrop.
#[derive(Component, Clone, Debug, Reflect)]
pub struct BackdropStyle {
    /// Base stroke color; alpha comes from the wave field.
    pub color: Srgba,
    /// Draw markers at each vertex.
    pub vertex_markers: bool,
    /// Marker radius in pixels.
    pub marker_radius: f32,
}

impl Default for BackdropStyle {
    fn default() -> Self {
        Self {
            color: DEFAULT_COLOR,
            vertex_markers: true,
            marker_radius: 1.5,
        }
    }
}

/// Counts from one rendered frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Cells stroked.
    pub cells: usize,
    /// Vertices sampled.
    pub vertices: usize,
}

/// Draws one frame of the backdrop onto `surface`.
///
/// Each vertex is displaced vertically by the field; the outline takes the
/// mean vertex alpha and markers take their own vertex alpha.
pub fn render_frame(
    surface: &mut impl WaveSurface,
    tiling: &HexTiling,
    field: &impl WaveField,
    phase: f32,
    style: &BackdropStyle,
) -> FrameStats {
    surface.clear();
    let mut stats = FrameStats::default();

    for cell in tiling.cells() {
        let corners = tiling.corners(&cell);
        let mut alphas = [0.0; 6];
        let mut points = corners;
        for (i, corner) in corners.iter().enumerate() {
            let s = field.sample(*corner, phase);
            points[i].y += s.displacement;
            alphas[i] = s.alpha;
        }
        stats.vertices += 6;

        let mean_alpha = alphas.iter().sum::<f32>() / 6.0;
        if mean_alpha <= 0.0 {
            continue;
        }
        surface.stroke_polygon(&points, style.color.with_alpha(mean_alpha));
        stats.cells += 1;

        if style.vertex_markers {
            for (p, a) in points.iter().zip(alphas) {
                if a > 0.0 {
                    surface.mark_vertex(*p, style.marker_radius, style.color.with_alpha(a));
                }
            }
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::tiling::CellOrientation;
    use crate::engine::viewport::ViewportState;
    use crate::engine::wave::{OpacityEnvelope, WaveSample, WaveStrategy, WaveVariant};

    struct Flat(f32, f32);

    impl WaveField for Flat {
        fn sample(&self, _pos: Vec2, _phase: f32) -> WaveSample {
            WaveSample {
                displacement: self.0,
                alpha: self.1,
            }
        }
    }

    fn tiling() -> HexTiling {
        HexTiling::new(ViewportState::new(200.0, 120.0), 20.0, CellOrientation::PointyTop)
    }

    #[test]
    fn parses_hex_colors() {
        let c = parse_color("#4fc3f7").unwrap();
        assert!((c.red - DEFAULT_COLOR.red).abs() < 1e-3);
        assert!(parse_color("#nothex").is_err());
    }

    #[test]
    fn strokes_every_cell_and_marks_every_vertex() {
        let mut list = DisplayList::default();
        let t = tiling();
        let stats = render_frame(&mut list, &t, &Flat(0.0, 0.5), 0.0, &BackdropStyle::default());
        assert_eq!(stats.cells, t.cell_count());
        assert_eq!(stats.vertices, 6 * t.cell_count());
        assert_eq!(list.strokes().len(), t.cell_count());
        assert_eq!(list.markers().len(), 6 * t.cell_count());
        assert!((list.strokes()[0].color.alpha - 0.5).abs() < 1e-6);
    }

    #[test]
    fn displacement_moves_vertices_vertically() {
        let mut list = DisplayList::default();
        let t = tiling();
        render_frame(&mut list, &t, &Flat(7.0, 1.0), 0.0, &BackdropStyle::default());
        let first = t.cells().next().unwrap();
        let base = t.corners(&first);
        for (drawn, base) in list.strokes()[0].points.iter().zip(base) {
            assert!((drawn.x - base.x).abs() < 1e-6);
            assert!((drawn.y - base.y - 7.0).abs() < 1e-5);
        }
    }

    #[test]
    fn markers_can_be_disabled() {
        let mut list = DisplayList::default();
        let style = BackdropStyle {
            vertex_markers: false,
            ..default()
        };
        render_frame(&mut list, &tiling(), &Flat(0.0, 0.4), 0.0, &style);
        assert!(list.markers().is_empty());
        assert!(!list.strokes().is_empty());
    }

    #[test]
    fn invisible_cells_are_skipped() {
        let mut list = DisplayList::default();
        let stats = render_frame(&mut list, &tiling(), &Flat(0.0, 0.0), 0.0, &BackdropStyle::default());
        assert_eq!(stats.cells, 0);
        assert!(list.strokes().is_empty());
    }

    #[test]
    fn each_frame_replaces_the_previous_one() {
        let mut list = DisplayList::default();
        let t = tiling();
        let field = WaveStrategy::new(
            WaveVariant::OceanSwell,
            OpacityEnvelope {
                base: 0.2,
                pulse: 0.8,
            },
        );
        let style = BackdropStyle::default();
        render_frame(&mut list, &t, &field, 0.0, &style);
        let n = list.strokes().len();
        let g = list.generation();
        render_frame(&mut list, &t, &field, 1.0, &style);
        assert_eq!(list.strokes().len(), n);
        assert!(list.generation() > g);
    }

    #[test]
    fn empty_viewport_only_clears() {
        let mut list = DisplayList::default();
        let t = HexTiling::new(ViewportState::new(0.0, 0.0), 20.0, CellOrientation::PointyTop);
        let stats = render_frame(&mut list, &t, &Flat(0.0, 1.0), 0.0, &BackdropStyle::default());
        assert_eq!(stats, FrameStats::default());
        assert_eq!(list.generation(), 1);
    }
}
