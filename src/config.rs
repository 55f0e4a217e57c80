//! Render configuration value objects.
//!
//! [`GeometryConstants`] and [`StyleConfig`] are injected into an
//! [`crate::Engine`] once; [`RenderConfig`] travels with each render call.
//! None of them are global and all are immutable once built.

use serde::Deserialize;

use crate::errors::FlowError;
use crate::render::defaults;
use crate::types::{Color, NumericError};

/// Smallest font size a label may use
pub const MIN_FONT_SIZE: f64 = 6.0;
/// Largest font size a label may use
pub const MAX_FONT_SIZE: f64 = 30.0;

/// Check a value object before it is used.
pub trait Validate {
    fn validate(&self) -> Result<(), FlowError>;
}

/// Fixed geometric constants, in diagram units.
///
/// These must be identical across renderers for visual parity; override them
/// only when you know every consumer does the same.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GeometryConstants {
    /// Lateral distance from the road axis to each lane centre line
    pub center_offset: f64,
    /// Radius where lane bars start and turn bands attach
    pub inner_radius: f64,
    /// Radius where per-turn volume labels sit
    pub middle_radius: f64,
    /// Radius where lane bars end
    pub outer_radius: f64,
    /// Extra length of the inbound bar past `outer_radius`
    pub extension_length: f64,
    /// Gap between the lane ends and the road name
    pub name_label_offset: f64,
    /// Width drawn for the largest single cell
    pub line_width_multiplier: f64,
    /// Arrowhead base, as a multiple of the outbound lane width
    pub arrow_width_factor: f64,
    /// Arrowhead length, as a multiple of its base
    pub arrow_length_factor: f64,
    /// Bézier handle length of a turn band, as a fraction of `inner_radius`
    pub turn_handle: f64,
}

impl Default for GeometryConstants {
    fn default() -> Self {
        Self {
            center_offset: 1.5,
            inner_radius: 3.0,
            middle_radius: 4.25,
            outer_radius: 8.0,
            extension_length: 1.0,
            name_label_offset: 0.8,
            line_width_multiplier: 0.8,
            arrow_width_factor: 1.8,
            arrow_length_factor: 1.0,
            turn_handle: 0.55,
        }
    }
}

impl GeometryConstants {
    /// Half-size of the square that always contains the whole diagram.
    ///
    /// Radially the diagram ends at the road names; the lateral lane offset
    /// is added on top so bars running along a frame edge stay inside.
    pub fn frame_half_size(&self) -> f64 {
        self.outer_radius
            + self.extension_length
            + self.name_label_offset * defaults::FRAME_NAME_ROOM
            + self.center_offset
    }
}

fn check_positive(name: &'static str, v: f64) -> Result<(), FlowError> {
    let reason = if v.is_nan() {
        NumericError::NaN
    } else if v.is_infinite() {
        NumericError::Infinite
    } else if v == 0.0 {
        NumericError::Zero
    } else if v < 0.0 {
        NumericError::Negative
    } else {
        return Ok(());
    };
    Err(FlowError::InvalidConstant { name, reason })
}

impl Validate for GeometryConstants {
    fn validate(&self) -> Result<(), FlowError> {
        check_positive("center_offset", self.center_offset)?;
        check_positive("inner_radius", self.inner_radius)?;
        check_positive("middle_radius", self.middle_radius)?;
        check_positive("outer_radius", self.outer_radius)?;
        check_positive("line_width_multiplier", self.line_width_multiplier)?;
        check_positive("arrow_width_factor", self.arrow_width_factor)?;
        check_positive("arrow_length_factor", self.arrow_length_factor)?;
        check_positive("turn_handle", self.turn_handle)?;
        // zero is fine for these two
        if !(self.extension_length.is_finite() && self.extension_length >= 0.0) {
            return Err(FlowError::InvalidConstant {
                name: "extension_length",
                reason: NumericError::Negative,
            });
        }
        if !(self.name_label_offset.is_finite() && self.name_label_offset >= 0.0) {
            return Err(FlowError::InvalidConstant {
                name: "name_label_offset",
                reason: NumericError::Negative,
            });
        }
        Ok(())
    }
}

/// Colours and fonts.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    /// Per-entry colours, reused cyclically
    pub palette: Vec<Color>,
    /// Colour of all label text
    pub text_color: Color,
    pub font_family: String,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            palette: vec![
                Color::rgb(0x1f, 0x77, 0xb4),
                Color::rgb(0xff, 0x7f, 0x0e),
                Color::rgb(0x2c, 0xa0, 0x2c),
                Color::rgb(0xd6, 0x27, 0x28),
                Color::rgb(0x94, 0x67, 0xbd),
                Color::rgb(0x8c, 0x56, 0x4b),
                Color::rgb(0xe3, 0x77, 0xc2),
                Color::rgb(0x7f, 0x7f, 0x7f),
                Color::rgb(0xbc, 0xbd, 0x22),
                Color::rgb(0x17, 0xbe, 0xcf),
            ],
            text_color: Color::BLACK,
            font_family: "sans-serif".to_string(),
        }
    }
}

impl StyleConfig {
    /// Colour of entry `i`, cycling through the palette.
    pub fn color(&self, i: usize) -> Color {
        if self.palette.is_empty() {
            return Color::BLACK;
        }
        self.palette[i % self.palette.len()]
    }
}

/// Per-render settings.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub road_label_font_size: f64,
    pub flow_label_font_size: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            road_label_font_size: 12.0,
            flow_label_font_size: 9.0,
        }
    }
}

/// Keep `value` if it is within the font bounds, else use `fallback`
/// (itself clamped into the bounds).
pub fn font_size_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() && (MIN_FONT_SIZE..=MAX_FONT_SIZE).contains(&value) {
        value
    } else if fallback.is_finite() {
        fallback.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE)
    } else {
        MIN_FONT_SIZE
    }
}

impl RenderConfig {
    /// Font sizes checked against [`RenderConfig::default`].
    pub fn new(road_label_font_size: f64, flow_label_font_size: f64) -> Self {
        Self::with_fallback(road_label_font_size, flow_label_font_size, &Self::default())
    }

    /// Font sizes checked against caller-supplied defaults.
    pub fn with_fallback(road: f64, flow: f64, defaults: &RenderConfig) -> Self {
        Self {
            road_label_font_size: font_size_or(road, defaults.road_label_font_size),
            flow_label_font_size: font_size_or(flow, defaults.flow_label_font_size),
        }
    }

    /// Copy with every size forced into bounds.
    pub fn sanitized(&self) -> Self {
        Self::new(self.road_label_font_size, self.flow_label_font_size)
    }
}

/// Everything a config file can set.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub render: RenderConfig,
    pub style: StyleConfig,
    pub geometry: GeometryConstants,
}

impl ConfigFile {
    /// Parse a `[render]`, `[style]` and `[geometry]` TOML document.
    ///
    /// Font sizes are sanitized, geometry constants validated.
    pub fn from_toml_str(text: &str) -> Result<Self, FlowError> {
        let file: ConfigFile = toml::from_str(text).map_err(|e| FlowError::ConfigParse {
            message: e.message().to_string(),
        })?;
        file.geometry.validate()?;
        Ok(ConfigFile {
            render: file.render.sanitized(),
            ..file
        })
    }
}
