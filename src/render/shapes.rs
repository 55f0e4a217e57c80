//! Drawable primitives
//!
//! Each shape knows its bounds and how to replay itself on a [`Canvas`].
//! [`ShapeEnum`] dispatches to the concrete shape.

use glam::DVec2;

use crate::types::{Angle, BBox, Color, Point};

use super::defaults;
use super::geometry::arc_bounds;
use super::types::{Layer, LabelAnchor, Tag};

/// A drawing surface. Coordinates are diagram units (Y-up); the canvas owns
/// any transform to device space.
pub trait Canvas {
    fn line(&mut self, from: Point, to: Point, width: f64, color: Color);

    /// Counter-clockwise arc from `start` to `end`.
    fn arc(&mut self, center: Point, radius: f64, start: Angle, end: Angle, width: f64, color: Color);

    fn curve(&mut self, from: Point, ctrl1: Point, ctrl2: Point, to: Point, width: f64, color: Color);

    fn polygon(&mut self, points: &[Point], color: Color);

    fn text(&mut self, label: &LabelAnchor, color: Color);
}

/// Common behavior for all shapes
pub trait Shape {
    /// Bounds including stroke width
    fn bounds(&self) -> BBox;

    fn paint(&self, canvas: &mut dyn Canvas);
}

/// A straight stroked segment (lane bar)
#[derive(Debug, Clone, PartialEq)]
pub struct LineShape {
    pub from: Point,
    pub to: Point,
    pub width: f64,
    pub color: Color,
}

impl Shape for LineShape {
    fn bounds(&self) -> BBox {
        let mut bb = BBox::new();
        bb.expand_disc(self.from, self.width / 2.0);
        bb.expand_disc(self.to, self.width / 2.0);
        bb
    }

    fn paint(&self, canvas: &mut dyn Canvas) {
        canvas.line(self.from, self.to, self.width, self.color);
    }
}

/// A stroked circular arc (U-turn band)
#[derive(Debug, Clone, PartialEq)]
pub struct ArcShape {
    pub center: Point,
    pub radius: f64,
    pub start: Angle,
    pub end: Angle,
    pub width: f64,
    pub color: Color,
}

impl Shape for ArcShape {
    fn bounds(&self) -> BBox {
        arc_bounds(self.center, self.radius, self.start, self.end, self.width)
    }

    fn paint(&self, canvas: &mut dyn Canvas) {
        canvas.arc(self.center, self.radius, self.start, self.end, self.width, self.color);
    }
}

/// A stroked cubic Bézier (turn band)
#[derive(Debug, Clone, PartialEq)]
pub struct CurveShape {
    pub from: Point,
    pub ctrl1: Point,
    pub ctrl2: Point,
    pub to: Point,
    pub width: f64,
    pub color: Color,
}

impl Shape for CurveShape {
    fn bounds(&self) -> BBox {
        // the control polygon contains the curve
        let mut bb = BBox::new();
        for p in [self.from, self.ctrl1, self.ctrl2, self.to] {
            bb.expand_disc(p, self.width / 2.0);
        }
        bb
    }

    fn paint(&self, canvas: &mut dyn Canvas) {
        canvas.curve(self.from, self.ctrl1, self.ctrl2, self.to, self.width, self.color);
    }
}

/// A filled triangle `[tip, left, right]`
#[derive(Debug, Clone, PartialEq)]
pub struct ArrowShape {
    pub points: [Point; 3],
    pub color: Color,
}

impl Shape for ArrowShape {
    fn bounds(&self) -> BBox {
        let mut bb = BBox::new();
        for p in self.points {
            bb.expand_point(p);
        }
        bb
    }

    fn paint(&self, canvas: &mut dyn Canvas) {
        canvas.polygon(&self.points, self.color);
    }
}

/// Rotated text
#[derive(Debug, Clone, PartialEq)]
pub struct TextShape {
    pub label: LabelAnchor,
    pub color: Color,
}

impl TextShape {
    /// Approximate extent in diagram units: (width, height).
    pub fn extent(&self) -> DVec2 {
        let em = self.label.font_size / defaults::PX_PER_UNIT;
        let chars = self.label.text.chars().count() as f64;
        DVec2::new(chars * em * defaults::CHAR_WIDTH, em)
    }
}

impl Shape for TextShape {
    fn bounds(&self) -> BBox {
        // rotation-independent: the disc around the text box
        let mut bb = BBox::new();
        bb.expand_disc(self.label.position, self.extent().length() / 2.0);
        bb
    }

    fn paint(&self, canvas: &mut dyn Canvas) {
        canvas.text(&self.label, self.color);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShapeEnum {
    Line(LineShape),
    Arc(ArcShape),
    Curve(CurveShape),
    Arrow(ArrowShape),
    Text(TextShape),
}

impl ShapeEnum {
    fn as_shape(&self) -> &dyn Shape {
        match self {
            ShapeEnum::Line(s) => s,
            ShapeEnum::Arc(s) => s,
            ShapeEnum::Curve(s) => s,
            ShapeEnum::Arrow(s) => s,
            ShapeEnum::Text(s) => s,
        }
    }

    /// Stroke width for stroked shapes
    pub fn width(&self) -> Option<f64> {
        match self {
            ShapeEnum::Line(s) => Some(s.width),
            ShapeEnum::Arc(s) => Some(s.width),
            ShapeEnum::Curve(s) => Some(s.width),
            ShapeEnum::Arrow(_) | ShapeEnum::Text(_) => None,
        }
    }
}

impl Shape for ShapeEnum {
    fn bounds(&self) -> BBox {
        self.as_shape().bounds()
    }

    fn paint(&self, canvas: &mut dyn Canvas) {
        self.as_shape().paint(canvas)
    }
}

/// One entry of the scene: a shape plus what it is and where it layers.
#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    pub tag: Tag,
    pub layer: Layer,
    pub shape: ShapeEnum,
}
