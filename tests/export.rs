//! Export contract: every format produces its signature, failures come back
//! as values.

use turnflow::{
    Color, ExportError, ExportFormat, ExportOptions, FlowMatrix, Intersection, RenderConfig,
    Scene, TrafficRule,
};

fn scene() -> Scene {
    let roads = Intersection::from_parts(
        &[0.0, 90.0, 180.0, 270.0],
        &["Main St", "Oak Ave", "Main St", "Oak Ave"],
        TrafficRule::Right,
    )
    .unwrap();
    let flows = FlowMatrix::from_raw(
        &[
            vec![1.0, 0.0, 2.0, 0.0],
            vec![12.0, 8.0, 10.0, 6.0],
            vec![30.0, 25.0, 28.0, 20.0],
            vec![9.0, 7.0, 11.0, 5.0],
        ],
        TrafficRule::Right,
        4,
    )
    .unwrap();
    turnflow::render(&roads, &flows, &RenderConfig::default()).unwrap()
}

fn svg_size(svg: &str) -> (f64, f64) {
    let attr = |name: &str| -> f64 {
        let key = format!(" {name}=\"");
        let start = svg.find(&key).unwrap() + key.len();
        let end = start + svg[start..].find('"').unwrap();
        svg[start..end].parse().unwrap()
    };
    (attr("width"), attr("height"))
}

#[test]
fn svg_export_writes_the_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("diagram.svg");
    let scene = scene();
    scene.export(&path, &ExportOptions::default()).unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written, scene.to_svg());
    assert!(written.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\""));
    assert!(written.contains(">Main St</text>"));
    assert_eq!(written.matches("<polygon").count(), 4);
}

#[test]
fn tight_bbox_shrinks_the_frame() {
    let scene = scene();
    let full = scene
        .export_bytes(&ExportOptions::new(ExportFormat::Svg))
        .unwrap();
    let tight = scene
        .export_bytes(&ExportOptions::new(ExportFormat::Svg).tight(true))
        .unwrap();
    let (fw, fh) = svg_size(std::str::from_utf8(&full).unwrap());
    let (tw, th) = svg_size(std::str::from_utf8(&tight).unwrap());
    assert!(tw < fw && th < fh, "tight {tw}x{th} vs full {fw}x{fh}");
    // the full frame is the fixed square
    assert_eq!(fw, fh);
}

#[test]
fn background_is_painted_when_requested() {
    let bytes = scene()
        .export_bytes(&ExportOptions::new(ExportFormat::Svg).with_background(Color::rgb(1, 2, 3)))
        .unwrap();
    let svg = String::from_utf8(bytes).unwrap();
    assert!(svg.contains("fill=\"#010203\"/>"));
}

#[test]
fn unsupported_extension_is_an_error() {
    let err = ExportFormat::from_path("diagram.gif").unwrap_err();
    assert!(matches!(err, ExportError::UnsupportedFormat { ref format } if format == "gif"));
}

#[test]
fn write_failures_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("diagram.svg");
    let err = scene().export(&path, &ExportOptions::default()).unwrap_err();
    match err {
        ExportError::Io { path: p, .. } => assert!(p.ends_with("diagram.svg")),
        other => panic!("expected an I/O error, got {other:?}"),
    }
}

#[test]
fn invalid_dpi_is_rejected_before_encoding() {
    let err = scene()
        .export_bytes(&ExportOptions::new(ExportFormat::Png).with_dpi(0.0))
        .unwrap_err();
    assert!(matches!(err, ExportError::InvalidDpi { .. }));
}

#[cfg(feature = "raster")]
mod raster {
    use super::*;

    #[test]
    fn png_has_signature_and_scales_with_dpi() {
        let scene = scene();
        let at_72 = scene
            .export_bytes(&ExportOptions::new(ExportFormat::Png).with_dpi(72.0))
            .unwrap();
        let at_144 = scene
            .export_bytes(&ExportOptions::new(ExportFormat::Png).with_dpi(144.0))
            .unwrap();
        assert!(at_72.starts_with(b"\x89PNG\r\n\x1a\n"));

        // IHDR width lives at bytes 16..20
        let width = |png: &[u8]| u32::from_be_bytes([png[16], png[17], png[18], png[19]]);
        let (svg_w, _) = svg_size(&scene.to_svg());
        assert_eq!(width(&at_72), svg_w.ceil() as u32);
        assert_eq!(width(&at_144), (svg_w * 2.0).ceil() as u32);
    }

    #[test]
    fn jpeg_has_signature() {
        let bytes = scene()
            .export_bytes(&ExportOptions::new(ExportFormat::Jpeg).with_dpi(72.0))
            .unwrap();
        assert!(bytes.starts_with(&[0xff, 0xd8, 0xff]));
    }

    #[test]
    fn tiff_has_signature() {
        let bytes = scene()
            .export_bytes(&ExportOptions::new(ExportFormat::Tiff).with_dpi(72.0))
            .unwrap();
        assert!(bytes.starts_with(b"II*\0") || bytes.starts_with(b"MM\0*"));
    }

    #[test]
    fn pdf_export_writes_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diagram.pdf");
        let format = ExportFormat::from_path(&path).unwrap();
        scene().export(&path, &ExportOptions::new(format)).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }
}

#[cfg(not(feature = "raster"))]
#[test]
fn raster_formats_need_the_feature() {
    let err = scene()
        .export_bytes(&ExportOptions::new(ExportFormat::Pdf))
        .unwrap_err();
    assert!(matches!(err, ExportError::FeatureDisabled { format: "pdf" }));
}
