//! Scene export: SVG always, PDF and raster formats behind the `raster`
//! feature.
//!
//! Every format goes through the SVG document. PDF is converted with
//! `svg2pdf`; PNG, JPEG and TIFF are rasterized with `resvg` at
//! `dpi / 72` pixels per SVG user unit.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::errors::ExportError;
use crate::render::Scene;
#[cfg(feature = "raster")]
use crate::render::defaults;
use crate::types::Color;

/// Output file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Svg,
    Pdf,
    Png,
    Jpeg,
    Tiff,
}

impl ExportFormat {
    /// Pick the format from a file extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ExportError> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| ExportError::UnsupportedFormat {
                format: path.display().to_string(),
            })?;
        ext.parse()
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Svg => "svg",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
            ExportFormat::Tiff => "tif",
        }
    }

    pub fn is_raster(self) -> bool {
        matches!(self, ExportFormat::Png | ExportFormat::Jpeg | ExportFormat::Tiff)
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "svg" => Ok(ExportFormat::Svg),
            "pdf" => Ok(ExportFormat::Pdf),
            "png" => Ok(ExportFormat::Png),
            "jpg" | "jpeg" => Ok(ExportFormat::Jpeg),
            "tif" | "tiff" => Ok(ExportFormat::Tiff),
            _ => Err(ExportError::UnsupportedFormat {
                format: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    pub format: ExportFormat,
    /// Resolution of raster output. Vector output ignores it.
    pub dpi: f64,
    /// Crop to the drawn content instead of the full diagram square
    pub tight_bbox: bool,
    /// Fill behind the diagram. JPEG falls back to white.
    pub background: Option<Color>,
    pub jpeg_quality: u8,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::Svg,
            dpi: 150.0,
            tight_bbox: false,
            background: None,
            jpeg_quality: 90,
        }
    }
}

impl ExportOptions {
    pub fn new(format: ExportFormat) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }

    pub fn with_dpi(self, dpi: f64) -> Self {
        Self { dpi, ..self }
    }

    pub fn tight(self, tight_bbox: bool) -> Self {
        Self { tight_bbox, ..self }
    }

    pub fn with_background(self, background: Color) -> Self {
        Self {
            background: Some(background),
            ..self
        }
    }

    fn check(&self) -> Result<(), ExportError> {
        if !(self.dpi.is_finite() && self.dpi > 0.0) {
            return Err(ExportError::InvalidDpi { dpi: self.dpi });
        }
        Ok(())
    }
}

impl Scene {
    /// Encode the scene in memory.
    pub fn export_bytes(&self, options: &ExportOptions) -> Result<Vec<u8>, ExportError> {
        options.check()?;
        crate::log::debug!(format = %options.format, dpi = options.dpi, tight = options.tight_bbox, "export");
        let background = match options.format {
            ExportFormat::Jpeg => Some(options.background.unwrap_or(Color::WHITE)),
            _ => options.background,
        };
        let svg = self.svg_document(options.tight_bbox, background);
        match options.format {
            ExportFormat::Svg => Ok(svg.into_bytes()),
            other => encode(&svg, other, options),
        }
    }

    /// Encode the scene and write it to `path`.
    pub fn export(&self, path: impl AsRef<Path>, options: &ExportOptions) -> Result<(), ExportError> {
        let path = path.as_ref();
        let bytes = self.export_bytes(options)?;
        std::fs::write(path, bytes).map_err(|source| ExportError::Io {
            path: path.display().to_string(),
            source,
        })
    }
}

#[cfg(not(feature = "raster"))]
fn encode(_svg: &str, format: ExportFormat, _options: &ExportOptions) -> Result<Vec<u8>, ExportError> {
    Err(ExportError::FeatureDisabled {
        format: format.extension(),
    })
}

#[cfg(feature = "raster")]
fn encode(svg: &str, format: ExportFormat, options: &ExportOptions) -> Result<Vec<u8>, ExportError> {
    match format {
        ExportFormat::Svg => Ok(svg.as_bytes().to_vec()),
        ExportFormat::Pdf => raster::svg_to_pdf(svg),
        ExportFormat::Png => raster::svg_to_png(svg, options),
        ExportFormat::Jpeg => raster::svg_to_jpeg(svg, options),
        ExportFormat::Tiff => raster::svg_to_tiff(svg, options),
    }
}

#[cfg(feature = "raster")]
mod raster {
    use super::*;

    use image::ImageEncoder;

    pub(super) fn svg_to_pdf(svg: &str) -> Result<Vec<u8>, ExportError> {
        let mut opt = svg2pdf::usvg::Options::default();
        opt.fontdb_mut().load_system_fonts();

        let tree = svg2pdf::usvg::Tree::from_str(svg, &opt).map_err(|_| ExportError::SvgParse)?;

        svg2pdf::to_pdf(
            &tree,
            svg2pdf::ConversionOptions::default(),
            svg2pdf::PageOptions::default(),
        )
        .map_err(|_| ExportError::PdfConvert)
    }

    pub(super) fn svg_to_png(svg: &str, options: &ExportOptions) -> Result<Vec<u8>, ExportError> {
        let pixmap = svg_to_pixmap(svg, options)?;
        pixmap
            .encode_png()
            .map_err(|_| ExportError::Encode { format: "png" })
    }

    pub(super) fn svg_to_jpeg(svg: &str, options: &ExportOptions) -> Result<Vec<u8>, ExportError> {
        let pixmap = svg_to_pixmap(svg, options)?;
        let (w, h) = (pixmap.width(), pixmap.height());

        // the document paints an opaque background, so alpha is always 255
        let rgba = pixmap.data();
        let mut rgb = vec![0u8; (w as usize) * (h as usize) * 3];
        for (src, dst) in rgba.chunks_exact(4).zip(rgb.chunks_exact_mut(3)) {
            dst.copy_from_slice(&src[..3]);
        }

        let mut out = Vec::new();
        let enc = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, options.jpeg_quality);
        enc.write_image(&rgb, w, h, image::ExtendedColorType::Rgb8)
            .map_err(|_| ExportError::Encode { format: "jpeg" })?;
        Ok(out)
    }

    pub(super) fn svg_to_tiff(svg: &str, options: &ExportOptions) -> Result<Vec<u8>, ExportError> {
        let pixmap = svg_to_pixmap(svg, options)?;
        let (w, h) = (pixmap.width(), pixmap.height());

        // tiny-skia stores premultiplied alpha
        let mut rgba = Vec::with_capacity(pixmap.data().len());
        for px in pixmap.pixels() {
            let c = px.demultiply();
            rgba.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }

        let mut out = std::io::Cursor::new(Vec::new());
        let enc = image::codecs::tiff::TiffEncoder::new(&mut out);
        enc.write_image(&rgba, w, h, image::ExtendedColorType::Rgba8)
            .map_err(|_| ExportError::Encode { format: "tiff" })?;
        Ok(out.into_inner())
    }

    fn svg_to_pixmap(svg: &str, options: &ExportOptions) -> Result<tiny_skia::Pixmap, ExportError> {
        let mut opt = usvg::Options::default();
        opt.fontdb_mut().load_system_fonts();

        let tree = usvg::Tree::from_str(svg, &opt).map_err(|_| ExportError::SvgParse)?;

        let scale = (options.dpi / defaults::BASE_DPI) as f32;
        let size = tree.size();
        let width = (size.width() * scale).ceil().max(1.0) as u32;
        let height = (size.height() * scale).ceil().max(1.0) as u32;

        let mut pixmap =
            tiny_skia::Pixmap::new(width, height).ok_or(ExportError::PixmapAlloc { width, height })?;
        resvg::render(
            &tree,
            tiny_skia::Transform::from_scale(scale, scale),
            &mut pixmap.as_mut(),
        );
        Ok(pixmap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_parse_from_names_and_paths() {
        assert_eq!("SVG".parse::<ExportFormat>().unwrap(), ExportFormat::Svg);
        assert_eq!(".jpeg".parse::<ExportFormat>().unwrap(), ExportFormat::Jpeg);
        assert_eq!("tif".parse::<ExportFormat>().unwrap(), ExportFormat::Tiff);
        assert_eq!(
            ExportFormat::from_path("out/diagram.PDF").unwrap(),
            ExportFormat::Pdf
        );
        assert!(matches!(
            ExportFormat::from_path("diagram.bmp"),
            Err(ExportError::UnsupportedFormat { .. })
        ));
        assert!(matches!(
            ExportFormat::from_path("diagram"),
            Err(ExportError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn dpi_must_be_positive() {
        for dpi in [0.0, -72.0, f64::NAN, f64::INFINITY] {
            let opts = ExportOptions::new(ExportFormat::Png).with_dpi(dpi);
            assert!(matches!(opts.check(), Err(ExportError::InvalidDpi { .. })));
        }
        assert!(ExportOptions::default().check().is_ok());
    }
}
