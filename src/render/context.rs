//! Rendering context - collects primitives during a render pass

use crate::config::{GeometryConstants, RenderConfig, StyleConfig};
use crate::errors::Warning;
use crate::types::BBox;

use super::shapes::{Primitive, Shape, ShapeEnum};
use super::types::{Layer, Tag};

/// Mutable state of one render pass. Created fresh for every render and
/// consumed into a [`super::Scene`].
pub struct RenderContext<'a> {
    pub style: &'a StyleConfig,
    pub geometry: &'a GeometryConstants,
    pub config: RenderConfig,
    /// All primitives in emission order
    pub primitives: Vec<Primitive>,
    /// Recovered problems
    pub warnings: Vec<Warning>,
    /// Bounding box of all primitives
    pub bounds: BBox,
}

impl<'a> RenderContext<'a> {
    pub fn new(style: &'a StyleConfig, geometry: &'a GeometryConstants, config: RenderConfig) -> Self {
        Self {
            style,
            geometry,
            config: config.sanitized(),
            primitives: Vec::new(),
            warnings: Vec::new(),
            bounds: BBox::new(),
        }
    }

    /// Add a primitive to the scene
    pub fn push(&mut self, tag: Tag, layer: Layer, shape: ShapeEnum) {
        self.bounds.union(&shape.bounds());
        crate::log::trace!(%tag, ?layer, "emit");
        self.primitives.push(Primitive { tag, layer, shape });
    }

    /// Record a recovered problem, once
    pub fn warn(&mut self, warning: Warning) {
        if self.warnings.contains(&warning) {
            return;
        }
        crate::log::warn!(%warning, "recovered");
        self.warnings.push(warning);
    }
}
