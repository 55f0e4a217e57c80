//! Strongly-typed numeric primitives for turnflow (zero-cost newtypes).
//!
//! Positions are `glam::DVec2` in diagram space (Y-up, origin at the centre
//! of the intersection). Angles, volumes and colours get their own types so
//! degrees never meet radians and a NaN volume never reaches the geometry.

use std::fmt;
use std::str::FromStr;

use glam::{DVec2, dvec2};
use serde::Deserialize;

/// Error type for invalid numeric values
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericError {
    /// Value is NaN
    NaN,
    /// Value is infinite
    Infinite,
    /// Value is zero when non-zero required
    Zero,
    /// Value is negative when positive required
    Negative,
}

impl fmt::Display for NumericError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericError::NaN => write!(f, "value is NaN"),
            NumericError::Infinite => write!(f, "value is infinite"),
            NumericError::Zero => write!(f, "value is zero"),
            NumericError::Negative => write!(f, "value is negative"),
        }
    }
}

impl std::error::Error for NumericError {}

/// A point in diagram space
pub type Point = DVec2;

/// Compass angle of a road, in degrees, counter-clockwise from +x.
///
/// Any real value is accepted; callers may pass 450 or -90 and get the same
/// road as 90 and 270.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default, Deserialize)]
#[serde(transparent)]
pub struct Angle(pub f64);

impl Angle {
    #[inline]
    pub const fn degrees(val: f64) -> Angle {
        Angle(val)
    }

    #[inline]
    pub fn raw(self) -> f64 {
        self.0
    }

    #[inline]
    pub fn radians(self) -> f64 {
        self.0.to_radians()
    }

    /// Unit vector pointing from the centre out along the road.
    pub fn direction(self) -> DVec2 {
        let (sin, cos) = self.radians().sin_cos();
        dvec2(cos, sin)
    }

    /// Lateral normal of the road: the direction axis rotated clockwise by 90°.
    pub fn normal(self) -> DVec2 {
        let (sin, cos) = self.radians().sin_cos();
        dvec2(sin, -cos)
    }

    /// Rotation that keeps text within ±90° of horizontal.
    // (angle + 90) mod 180 - 90
    pub fn upright(self) -> Angle {
        Angle((self.0 + 90.0).rem_euclid(180.0) - 90.0)
    }

    /// Rotation for a road name so it reads across the road axis.
    // ((angle mod 180) + 270) mod 360
    pub fn across_road(self) -> Angle {
        Angle((self.0.rem_euclid(180.0) + 270.0).rem_euclid(360.0))
    }

    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }
}

impl std::ops::Add<f64> for Angle {
    type Output = Angle;
    fn add(self, rhs: f64) -> Angle {
        Angle(self.0 + rhs)
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.0)
    }
}

/// A non-negative, finite traffic volume.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default)]
#[repr(transparent)]
pub struct Volume(f64);

impl Volume {
    pub const ZERO: Volume = Volume(0.0);

    /// Create a Volume with validation (rejects NaN, infinite and negative)
    #[inline]
    pub fn try_new(val: f64) -> Result<Volume, NumericError> {
        if val.is_nan() {
            Err(NumericError::NaN)
        } else if val.is_infinite() {
            Err(NumericError::Infinite)
        } else if val < 0.0 {
            Err(NumericError::Negative)
        } else {
            Ok(Volume(val))
        }
    }

    #[inline]
    pub fn raw(self) -> f64 {
        self.0
    }

    #[inline]
    pub fn is_zero(self) -> bool {
        self.0 == 0.0
    }

    /// Integer-rounded text used by every volume label.
    pub fn label(self) -> String {
        format!("{:.0}", self.0.round())
    }
}

impl std::ops::Add for Volume {
    type Output = Volume;
    fn add(self, rhs: Volume) -> Volume {
        Volume(self.0 + rhs.0)
    }
}

impl std::iter::Sum for Volume {
    fn sum<I: Iterator<Item = Volume>>(iter: I) -> Volume {
        iter.fold(Volume::ZERO, |a, b| a + b)
    }
}

impl fmt::Display for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An opaque RGB colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Error returned when a colour string is neither `#rgb` nor `#rrggbb`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorParseError(pub String);

impl fmt::Display for ColorParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid colour `{}`", self.0)
    }
}

impl std::error::Error for ColorParseError {}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ColorParseError(s.to_string());
        let hex = s.trim().strip_prefix('#').ok_or_else(err)?;
        let digit = |c: u8| (c as char).to_digit(16).map(|d| d as u8).ok_or_else(err);
        let bytes = hex.as_bytes();
        match bytes.len() {
            3 => Ok(Color::rgb(
                digit(bytes[0])? * 17,
                digit(bytes[1])? * 17,
                digit(bytes[2])? * 17,
            )),
            6 => Ok(Color::rgb(
                digit(bytes[0])? << 4 | digit(bytes[1])?,
                digit(bytes[2])? << 4 | digit(bytes[3])?,
                digit(bytes[4])? << 4 | digit(bytes[5])?,
            )),
            _ => Err(err()),
        }
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Convert diagram units → SVG pixels, flipping Y.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scaler {
    pub px_per_unit: f64,
}

impl Scaler {
    /// Create a Scaler with validation (rejects NaN, infinite, zero, negative)
    pub fn try_new(px_per_unit: f64) -> Result<Self, NumericError> {
        if px_per_unit.is_nan() {
            Err(NumericError::NaN)
        } else if px_per_unit.is_infinite() {
            Err(NumericError::Infinite)
        } else if px_per_unit == 0.0 {
            Err(NumericError::Zero)
        } else if px_per_unit < 0.0 {
            Err(NumericError::Negative)
        } else {
            Ok(Scaler { px_per_unit })
        }
    }

    /// Convert a length in diagram units to pixels.
    #[inline]
    pub fn px(&self, len: f64) -> f64 {
        len * self.px_per_unit
    }

    /// Convert a diagram point to SVG pixels relative to the top-left corner
    /// of `frame`.
    pub fn to_svg(&self, p: Point, frame: &BBox) -> DVec2 {
        dvec2(self.px(p.x - frame.min.x), self.px(frame.max.y - p.y))
    }
}

/// Axis-aligned bounding box
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BBox {
    pub min: Point,
    pub max: Point,
}

impl Default for BBox {
    fn default() -> Self {
        Self::new()
    }
}

impl BBox {
    /// Create an empty bounding box (will expand on first point)
    pub fn new() -> Self {
        BBox {
            min: dvec2(f64::MAX, f64::MAX),
            max: dvec2(f64::MIN, f64::MIN),
        }
    }

    /// A box centred on the origin reaching `half` in every direction.
    pub fn square(half: f64) -> Self {
        BBox {
            min: dvec2(-half, -half),
            max: dvec2(half, half),
        }
    }

    /// Check if the bbox is empty (never expanded)
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    /// Expand to include a point. Non-finite points are ignored.
    pub fn expand_point(&mut self, p: Point) {
        if !p.is_finite() {
            return;
        }
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Expand to include a disc of radius `r` around `center`
    pub fn expand_disc(&mut self, center: Point, r: f64) {
        let r = dvec2(r.abs(), r.abs());
        self.expand_point(center - r);
        self.expand_point(center + r);
    }

    pub fn union(&mut self, other: &BBox) {
        if !other.is_empty() {
            self.expand_point(other.min);
            self.expand_point(other.max);
        }
    }

    pub fn padded(&self, pad: f64) -> BBox {
        BBox {
            min: self.min - dvec2(pad, pad),
            max: self.max + dvec2(pad, pad),
        }
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Point {
        (self.min + self.max) * 0.5
    }
}
