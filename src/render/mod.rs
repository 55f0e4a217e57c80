//! Flow-diagram rendering
//!
//! This module is organized into submodules:
//! - `defaults`: rendering constants outside the diagram geometry
//! - `types`: scene-level types like Tag, Layer, TurnPath, LabelAnchor, Layout
//! - `context`: RenderContext for collecting primitives during a render
//! - `geometry`: per-road anchor points and curve helpers
//! - `path_builder`: lane bars, arrows and turn bands with their stacking
//! - `labels`: label placement
//! - `shapes`: drawable primitives and the Canvas trait
//! - `svg`: SVG generation

pub mod context;
pub mod defaults;
pub mod geometry;
pub mod labels;
pub mod path_builder;
pub mod shapes;
pub mod svg;
pub mod types;

pub use context::RenderContext;
pub use geometry::AnchorSet;
pub use shapes::{Canvas, Primitive, Shape, ShapeEnum};
pub use svg::SvgCanvas;
pub use types::*;

use crate::config::{GeometryConstants, RenderConfig, StyleConfig};
use crate::errors::{FlowError, Warning};
use crate::model::{FlowMatrix, Intersection};
use crate::types::{BBox, Color, NumericError};

use shapes::TextShape;

/// The rendered diagram: an ordered list of primitives plus everything
/// computed on the way there.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    primitives: Vec<Primitive>,
    warnings: Vec<Warning>,
    layout: Layout,
    bounds: BBox,
    frame_half_size: f64,
    font_family: String,
}

impl Scene {
    /// Primitives in emission order
    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    /// Primitives sorted by layer, emission order kept within a layer
    pub fn layered(&self) -> Vec<&Primitive> {
        let mut out: Vec<&Primitive> = self.primitives.iter().collect();
        out.sort_by_key(|p| p.layer);
        out
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Bounds of everything drawn, stroke widths and text included
    pub fn bounds(&self) -> BBox {
        self.bounds
    }

    /// The area an export covers: the content plus a small margin when
    /// `tight`, otherwise the fixed square every diagram fits in.
    pub fn frame(&self, tight: bool) -> BBox {
        let full = BBox::square(self.frame_half_size);
        if self.bounds.is_empty() {
            return full;
        }
        if tight {
            return self.bounds.padded(defaults::TIGHT_PADDING);
        }
        let mut frame = full;
        frame.union(&self.bounds);
        frame
    }

    /// Replay the scene on `canvas`, back to front.
    pub fn paint(&self, canvas: &mut dyn Canvas) {
        for p in self.layered() {
            p.shape.paint(canvas);
        }
    }

    /// SVG document of the full frame on a transparent background
    pub fn to_svg(&self) -> String {
        self.svg_document(false, None)
    }

    pub fn svg_document(&self, tight: bool, background: Option<Color>) -> String {
        let mut canvas = SvgCanvas::new(self.frame(tight), &self.font_family);
        self.paint(&mut canvas);
        canvas.finish(background)
    }
}

fn check_angles(intersection: &Intersection) -> Result<(), FlowError> {
    for (entry, e) in intersection.entries().iter().enumerate() {
        let reason = if e.angle.raw().is_nan() {
            NumericError::NaN
        } else if e.angle.raw().is_infinite() {
            NumericError::Infinite
        } else {
            continue;
        };
        return Err(FlowError::InvalidAngle { entry, reason });
    }
    Ok(())
}

/// Run the whole pipeline: totals, anchors, stacking, bands, labels.
///
/// Pure: the same inputs always produce the same scene.
pub fn render_scene(
    intersection: &Intersection,
    flows: &FlowMatrix,
    style: &StyleConfig,
    geometry: &GeometryConstants,
    config: &RenderConfig,
) -> Result<Scene, FlowError> {
    let n = intersection.len();
    if flows.size() != n {
        return Err(FlowError::MatrixShape {
            rows: flows.size(),
            cols: flows.size(),
            expected: n,
        });
    }
    check_angles(intersection)?;
    crate::log::debug!(n, rule = %intersection.rule(), "rendering flow diagram");

    let mut ctx = RenderContext::new(style, geometry, *config);
    let totals = flows.totals();
    totals.check()?;
    if totals.zero_field {
        ctx.warn(Warning::ZeroVolumeField);
    }

    let anchors: Vec<AnchorSet> = (0..n)
        .map(|i| AnchorSet::new(i, intersection.angle(i), intersection.rule(), geometry))
        .collect();
    let lane_widths = path_builder::lane_widths(&totals, geometry);
    let turns = path_builder::stack_turns(intersection, flows, &totals, geometry);

    path_builder::emit_lanes(&mut ctx, &anchors, &lane_widths);
    path_builder::emit_turns(&mut ctx, &anchors, &turns);

    let labels = labels::place_labels(intersection, &totals, &anchors, &turns, geometry, &ctx.config);
    for label in &labels {
        ctx.push(
            Tag::Label(label.kind),
            Layer::Labels,
            ShapeEnum::Text(TextShape {
                label: label.clone(),
                color: style.text_color,
            }),
        );
    }

    crate::log::debug!(
        primitives = ctx.primitives.len(),
        warnings = ctx.warnings.len(),
        "scene complete"
    );

    Ok(Scene {
        primitives: ctx.primitives,
        warnings: ctx.warnings,
        layout: Layout {
            totals,
            anchors,
            lane_widths,
            turns,
            labels,
        },
        bounds: ctx.bounds,
        frame_half_size: geometry.frame_half_size(),
        font_family: style.font_family.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TrafficRule;

    fn scene(rows: &[Vec<f64>], angles: &[f64]) -> Result<Scene, FlowError> {
        let x = Intersection::from_parts(angles, &[], TrafficRule::Right)?;
        let m = FlowMatrix::from_rows(rows)?;
        render_scene(
            &x,
            &m,
            &StyleConfig::default(),
            &GeometryConstants::default(),
            &RenderConfig::default(),
        )
    }

    #[test]
    fn matrix_size_must_match_road_count() {
        let err = scene(&vec![vec![0.0; 4]; 4], &[0.0, 120.0, 240.0]).unwrap_err();
        assert_eq!(
            err,
            FlowError::MatrixShape {
                rows: 4,
                cols: 4,
                expected: 3
            }
        );
    }

    #[test]
    fn non_finite_angles_are_rejected() {
        let err = scene(&vec![vec![0.0; 3]; 3], &[0.0, f64::NAN, 240.0]).unwrap_err();
        assert_eq!(
            err,
            FlowError::InvalidAngle {
                entry: 1,
                reason: NumericError::NaN
            }
        );
    }

    #[test]
    fn overflowing_lane_totals_stop_the_render() {
        let rows = vec![
            vec![0.0, f64::MAX, f64::MAX],
            vec![0.0; 3],
            vec![0.0; 3],
        ];
        let err = scene(&rows, &[0.0, 120.0, 240.0]).unwrap_err();
        assert_eq!(
            err,
            FlowError::InvalidTotal {
                road: 0,
                lane: "entry",
                reason: NumericError::Infinite
            }
        );

        // large but representable totals still render finite geometry
        let rows = vec![
            vec![0.0, f64::MAX / 4.0, f64::MAX / 4.0],
            vec![0.0; 3],
            vec![0.0; 3],
        ];
        let s = scene(&rows, &[0.0, 120.0, 240.0]).unwrap();
        assert!(s.warnings().is_empty());
        for t in &s.layout().turns {
            assert!(t.entry_slot.is_finite() && t.exit_slot.is_finite() && t.width.is_finite());
        }
        assert!(s.bounds().min.is_finite() && s.bounds().max.is_finite());
    }

    #[test]
    fn layers_are_emitted_back_to_front() {
        let mut rows = vec![vec![0.0; 3]; 3];
        rows[0][1] = 5.0;
        rows[2][2] = 1.0;
        let s = scene(&rows, &[0.0, 120.0, 240.0]).unwrap();
        let layers: Vec<_> = s.primitives().iter().map(|p| p.layer).collect();
        let mut sorted = layers.clone();
        sorted.sort();
        assert_eq!(layers, sorted);
        assert_eq!(s.layered(), s.primitives().iter().collect::<Vec<_>>());
    }

    #[test]
    fn zero_field_still_draws_lane_bars() {
        let s = scene(&vec![vec![0.0; 3]; 3], &[0.0, 120.0, 240.0]).unwrap();
        assert_eq!(s.warnings(), &[Warning::ZeroVolumeField]);
        assert_eq!(s.primitives().len(), 6);
        assert!(s.primitives().iter().all(|p| p.shape.width() == Some(0.0)));
    }

    #[test]
    fn full_frame_contains_tight_frame() {
        let mut rows = vec![vec![0.0; 3]; 3];
        rows[1][0] = 2.0;
        let s = scene(&rows, &[0.0, 120.0, 240.0]).unwrap();
        let tight = s.frame(true);
        let full = s.frame(false);
        assert!(full.min.x <= tight.min.x && full.min.y <= tight.min.y);
        assert!(full.max.x >= tight.max.x && full.max.y >= tight.max.y);
        assert!(full.width() > tight.width() || full.height() > tight.height());
    }
}
