//! Error types with diagnostics using miette
//!
//! Only caller mistakes are errors. Geometry that degenerates while drawing
//! (zero-length directions, non-positive widths or radii) is recovered
//! locally and reported through [`Warning`] instead.

use miette::Diagnostic;
use thiserror::Error;

use crate::types::NumericError;

// ============================================================================
// Model / render errors
// ============================================================================

/// Errors that stop a render before any primitive is produced
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum FlowError {
    #[error("invalid topology: {count} entries (expected 3 to 6)")]
    #[diagnostic(
        code(turnflow::topology::invalid_entry_count),
        help("an intersection diagram needs between 3 and 6 roads")
    )]
    InvalidTopology { count: usize },

    #[error("flow matrix is {rows}x{cols}, expected {expected}x{expected}")]
    #[diagnostic(code(turnflow::model::matrix_shape))]
    MatrixShape {
        rows: usize,
        cols: usize,
        expected: usize,
    },

    #[error("invalid volume from entry {entry} to exit {exit}: {reason}")]
    #[diagnostic(
        code(turnflow::model::invalid_volume),
        help("volumes must be finite and non-negative")
    )]
    InvalidVolume {
        entry: usize,
        exit: usize,
        reason: NumericError,
    },

    #[error("cell ({entry}, {exit}) is outside a {size}x{size} flow matrix")]
    #[diagnostic(code(turnflow::model::index_out_of_range))]
    IndexOutOfRange {
        entry: usize,
        exit: usize,
        size: usize,
    },

    #[error("{lane} total of road {road} is not representable: {reason}")]
    #[diagnostic(
        code(turnflow::model::invalid_total),
        help("the volumes of one lane add up past the range of f64")
    )]
    InvalidTotal {
        road: usize,
        lane: &'static str,
        reason: NumericError,
    },

    #[error("invalid angle for entry {entry}: {reason}")]
    #[diagnostic(code(turnflow::model::invalid_angle))]
    InvalidAngle { entry: usize, reason: NumericError },

    #[error("unknown traffic rule `{value}`")]
    #[diagnostic(
        code(turnflow::model::unknown_traffic_rule),
        help("use `left` or `right`")
    )]
    UnknownTrafficRule { value: String },

    #[error("invalid geometry constant `{name}`: {reason}")]
    #[diagnostic(code(turnflow::config::invalid_constant))]
    InvalidConstant {
        name: &'static str,
        reason: NumericError,
    },

    #[error("failed to parse render configuration: {message}")]
    #[diagnostic(code(turnflow::config::parse))]
    ConfigParse { message: String },
}

// ============================================================================
// Export errors
// ============================================================================

/// Errors surfaced by [`crate::Scene::export`]
#[derive(Error, Diagnostic, Debug)]
pub enum ExportError {
    #[error("unsupported export format `{format}`")]
    #[diagnostic(
        code(turnflow::export::unsupported_format),
        help("supported formats: svg, pdf, png, jpg/jpeg, tif/tiff")
    )]
    UnsupportedFormat { format: String },

    #[error("invalid resolution: {dpi} dpi")]
    #[diagnostic(code(turnflow::export::invalid_dpi))]
    InvalidDpi { dpi: f64 },

    #[error("failed to parse generated SVG")]
    #[diagnostic(code(turnflow::export::svg_parse))]
    SvgParse,

    #[error("failed to allocate a {width}x{height} pixmap")]
    #[diagnostic(code(turnflow::export::pixmap_alloc))]
    PixmapAlloc { width: u32, height: u32 },

    #[error("failed to encode {format}")]
    #[diagnostic(code(turnflow::export::encode))]
    Encode { format: &'static str },

    #[error("failed to convert SVG to PDF")]
    #[diagnostic(code(turnflow::export::pdf_convert))]
    PdfConvert,

    #[error("{format} export requires the `raster` feature")]
    #[diagnostic(code(turnflow::export::feature_disabled))]
    FeatureDisabled { format: &'static str },

    #[error("failed to write {path}")]
    #[diagnostic(code(turnflow::export::io))]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// ============================================================================
// Recovered conditions
// ============================================================================

/// A problem the renderer worked around. Kept on the scene so callers can
/// surface it without the render failing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Warning {
    /// A direction used for the lane extension or arrowhead had (near) zero
    /// length; the extension or arrow was skipped.
    #[error("degenerate {what} direction at entry {entry}")]
    DegenerateGeometry { entry: usize, what: &'static str },
    /// Every cell was zero; widths were scaled against 1.0.
    #[error("all volumes are zero")]
    ZeroVolumeField,
    /// A nonzero turn produced a non-positive width or radius and was not drawn.
    #[error("turn {entry} -> {exit} omitted (non-positive size)")]
    OmittedTurn { entry: usize, exit: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warnings_display_and_chain_as_errors() {
        let w = Warning::OmittedTurn { entry: 2, exit: 2 };
        assert_eq!(w.to_string(), "turn 2 -> 2 omitted (non-positive size)");
        let w = Warning::DegenerateGeometry {
            entry: 1,
            what: "arrow",
        };
        assert_eq!(w.to_string(), "degenerate arrow direction at entry 1");
        let boxed: Box<dyn std::error::Error> = Box::new(Warning::ZeroVolumeField);
        assert_eq!(boxed.to_string(), "all volumes are zero");
    }

    #[test]
    fn total_overflow_names_the_lane() {
        let err = FlowError::InvalidTotal {
            road: 0,
            lane: "entry",
            reason: NumericError::Infinite,
        };
        assert_eq!(
            err.to_string(),
            "entry total of road 0 is not representable: value is infinite"
        );
    }
}
