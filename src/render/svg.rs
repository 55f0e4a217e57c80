//! SVG generation
//!
//! [`SvgCanvas`] is the built-in [`Canvas`]: every call appends one element
//! to a document framed by a diagram-space bounding box. One diagram unit is
//! [`defaults::PX_PER_UNIT`] user units, and one user unit is one point.

use std::fmt::Write;

use crate::types::{Angle, BBox, Color, Point, Scaler};

use super::defaults;
use super::shapes::Canvas;
use super::types::LabelAnchor;

pub struct SvgCanvas {
    scaler: Scaler,
    frame: BBox,
    font_family: String,
    body: String,
}

impl SvgCanvas {
    /// A canvas covering `frame` (diagram units).
    pub fn new(frame: BBox, font_family: &str) -> Self {
        Self {
            scaler: Scaler {
                px_per_unit: defaults::PX_PER_UNIT,
            },
            frame,
            font_family: font_family.to_string(),
            body: String::new(),
        }
    }

    /// Document size in user units
    pub fn size(&self) -> (f64, f64) {
        (
            self.scaler.px(self.frame.width()),
            self.scaler.px(self.frame.height()),
        )
    }

    fn pt(&self, p: Point) -> String {
        let s = self.scaler.to_svg(p, &self.frame);
        format!("{},{}", fmt_num(s.x), fmt_num(s.y))
    }

    fn stroke_attrs(&self, width: f64, color: Color) -> String {
        format!(
            r#"fill="none" stroke="{color}" stroke-width="{}""#,
            fmt_num(self.scaler.px(width))
        )
    }

    /// Close the document. `background` paints the whole frame first.
    pub fn finish(self, background: Option<Color>) -> String {
        let (width, height) = self.size();
        let (w, h) = (fmt_num(width), fmt_num(height));
        let mut out = String::with_capacity(self.body.len() + 256);
        let _ = writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
        );
        if let Some(bg) = background {
            let _ = writeln!(out, r#"  <rect x="0" y="0" width="{w}" height="{h}" fill="{bg}"/>"#);
        }
        out.push_str(&self.body);
        let _ = writeln!(out, "</svg>");
        out
    }
}

impl Canvas for SvgCanvas {
    fn line(&mut self, from: Point, to: Point, width: f64, color: Color) {
        let d = format!("M{} L{}", self.pt(from), self.pt(to));
        let attrs = self.stroke_attrs(width, color);
        let _ = writeln!(self.body, r#"  <path d="{d}" {attrs}/>"#);
    }

    fn arc(&mut self, center: Point, radius: f64, start: Angle, end: Angle, width: f64, color: Color) {
        // two halves so neither needs the large-arc flag
        let mid = Angle((start.raw() + end.raw()) / 2.0);
        let r = fmt_num(self.scaler.px(radius));
        let at = |a: Angle| center + a.direction() * radius;
        // counter-clockwise in diagram space is sweep 0 once Y is flipped
        let d = format!(
            "M{} A{r} {r} 0 0 0 {} A{r} {r} 0 0 0 {}",
            self.pt(at(start)),
            self.pt(at(mid)),
            self.pt(at(end)),
        );
        let attrs = self.stroke_attrs(width, color);
        let _ = writeln!(self.body, r#"  <path d="{d}" {attrs}/>"#);
    }

    fn curve(&mut self, from: Point, ctrl1: Point, ctrl2: Point, to: Point, width: f64, color: Color) {
        let d = format!(
            "M{} C{} {} {}",
            self.pt(from),
            self.pt(ctrl1),
            self.pt(ctrl2),
            self.pt(to)
        );
        let attrs = self.stroke_attrs(width, color);
        let _ = writeln!(self.body, r#"  <path d="{d}" {attrs}/>"#);
    }

    fn polygon(&mut self, points: &[Point], color: Color) {
        let pts: Vec<String> = points.iter().map(|&p| self.pt(p)).collect();
        let _ = writeln!(
            self.body,
            r#"  <polygon points="{}" fill="{color}"/>"#,
            pts.join(" ")
        );
    }

    fn text(&mut self, label: &LabelAnchor, color: Color) {
        let p = self.scaler.to_svg(label.position, &self.frame);
        let (x, y) = (fmt_num(p.x), fmt_num(p.y));
        // SVG rotates clockwise
        let rot = fmt_num(-label.rotation.raw());
        let _ = writeln!(
            self.body,
            r#"  <text x="{x}" y="{y}" transform="rotate({rot} {x} {y})" text-anchor="middle" dominant-baseline="central" font-family="{}" font-size="{}" fill="{color}">{}</text>"#,
            xml_escape(&self.font_family),
            fmt_num(label.font_size),
            xml_escape(&label.text),
        );
    }
}

/// Escape the five XML special characters for text content and attribute
/// values.
fn xml_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

/// Format a number like C's `%g` (6 significant figures, trailing zeros
/// trimmed).
pub(crate) fn fmt_num(value: f64) -> String {
    if value == 0.0 || !value.is_finite() {
        return "0".to_string();
    }

    let magnitude = value.abs().log10().floor() as i32;
    let scale = 10_f64.powi(5 - magnitude);
    let rounded = (value * scale).round() / scale;

    let decimals = (5 - magnitude).max(0) as usize;
    let s = format!("{:.prec$}", rounded, prec = decimals);
    let s = if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s.as_str()
    };
    if s == "-0" { "0".to_string() } else { s.to_string() }
}
