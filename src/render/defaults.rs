//! Rendering constants that are not part of the diagram geometry

/// SVG pixels per diagram unit
pub const PX_PER_UNIT: f64 = 24.0;
/// Resolution the SVG pixel grid corresponds to
pub const BASE_DPI: f64 = 72.0;
/// Room kept past the lane ends for road names, in multiples of
/// `name_label_offset`: the gap itself plus about two gaps of text height
pub const FRAME_NAME_ROOM: f64 = 3.0;
/// Padding around the content when the bounding box is tightened
pub const TIGHT_PADDING: f64 = 0.25;
/// Directions shorter than this are treated as degenerate
pub const DEGENERATE_LENGTH: f64 = 1e-9;
/// Average glyph advance as a fraction of the font size
pub const CHAR_WIDTH: f64 = 0.6;
/// Samples used when measuring an arc
pub const ARC_SAMPLES: usize = 16;
