//! Geometry engine for intersection turning-movement diagrams.
//!
//! Given the compass angle of every road, the traffic rule and an
//! `entry × exit` flow matrix, [`render`] computes a [`Scene`]: lane bars,
//! arrowheads, U-turn arcs, turn bands and labels with final coordinates,
//! widths, colours and rotations. A scene can be replayed on any [`Canvas`]
//! or exported to SVG, PDF, PNG, JPEG or TIFF.
//!
//! ```
//! use turnflow::{FlowMatrix, Intersection, RenderConfig, TrafficRule};
//!
//! let roads = Intersection::from_parts(&[0.0, 120.0, 240.0], &["North", "East", "West"], TrafficRule::Right)?;
//! let flows = FlowMatrix::from_rows(&[
//!     vec![0.0, 5.0, 2.0],
//!     vec![3.0, 0.0, 1.0],
//!     vec![4.0, 6.0, 0.0],
//! ])?;
//! let svg = turnflow::render_svg(&roads, &flows, &RenderConfig::default())?;
//! assert!(svg.starts_with("<svg"));
//! # Ok::<(), turnflow::FlowError>(())
//! ```

pub mod config;
pub mod errors;
pub mod export;
pub mod log;
pub mod model;
pub mod render;
pub mod types;

pub use config::{ConfigFile, GeometryConstants, RenderConfig, StyleConfig, Validate};
pub use errors::{ExportError, FlowError, Warning};
pub use export::{ExportFormat, ExportOptions};
pub use model::{Entry, FlowMatrix, FlowTotals, Intersection, TrafficRule, normalize_index};
pub use render::{Canvas, LabelAnchor, LabelKind, Layer, Layout, Primitive, Scene, ShapeEnum, Tag, TurnPath};
pub use types::{Angle, BBox, Color, Point, Volume};

/// Renders flow diagrams with injected style and geometry.
///
/// The engine holds no state between renders; every call recomputes the
/// scene from its inputs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Engine {
    style: StyleConfig,
    geometry: GeometryConstants,
}

impl Engine {
    pub fn new(style: StyleConfig, geometry: GeometryConstants) -> Result<Self, FlowError> {
        geometry.validate()?;
        Ok(Self { style, geometry })
    }

    /// Engine built from the `[style]` and `[geometry]` tables of a config
    /// file.
    pub fn from_config(file: &ConfigFile) -> Result<Self, FlowError> {
        Self::new(file.style.clone(), file.geometry.clone())
    }

    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    pub fn geometry(&self) -> &GeometryConstants {
        &self.geometry
    }

    pub fn render(
        &self,
        intersection: &Intersection,
        flows: &FlowMatrix,
        config: &RenderConfig,
    ) -> Result<Scene, FlowError> {
        render::render_scene(intersection, flows, &self.style, &self.geometry, config)
    }

    /// Render and serialize to an SVG document framing the full diagram.
    pub fn render_svg(
        &self,
        intersection: &Intersection,
        flows: &FlowMatrix,
        config: &RenderConfig,
    ) -> Result<String, FlowError> {
        Ok(self.render(intersection, flows, config)?.to_svg())
    }
}

/// Render with the default style and geometry.
pub fn render(
    intersection: &Intersection,
    flows: &FlowMatrix,
    config: &RenderConfig,
) -> Result<Scene, FlowError> {
    Engine::default().render(intersection, flows, config)
}

/// Render with the default style and geometry, straight to SVG.
pub fn render_svg(
    intersection: &Intersection,
    flows: &FlowMatrix,
    config: &RenderConfig,
) -> Result<String, FlowError> {
    Engine::default().render_svg(intersection, flows, config)
}
