//! Geometry basis: per-road anchor points plus the curve helpers shared by
//! the path builder and the label placer.
//!
//! Diagram space is Y-up with the intersection centre at the origin. For a
//! road at angle θ, `d` is the outward radial direction and `m` the lateral
//! normal (d rotated clockwise). A point at radius `r` and lateral offset `l`
//! is `d * r + m * l`.

use glam::{DVec2, dvec2};

use crate::config::GeometryConstants;
use crate::model::TrafficRule;
use crate::types::{Angle, BBox, Point};

use super::defaults;

/// Anchor points of one road.
#[derive(Debug, Clone, PartialEq)]
pub struct AnchorSet {
    pub entry: usize,
    pub angle: Angle,
    /// Outward radial direction
    pub direction: DVec2,
    /// Lateral normal
    pub normal: DVec2,
    /// Lateral sign of the inbound lane
    pub entry_sign: f64,
    /// Lateral sign of the outbound lane
    pub exit_sign: f64,
    pub entry_inner: Point,
    /// Inbound lane end at `outer_radius`, before extension
    pub entry_outer: Point,
    /// Inbound lane end after the extension (equal to `entry_outer` when the
    /// extension was skipped)
    pub entry_outer_ext: Point,
    pub exit_inner: Point,
    pub exit_outer: Point,
    /// False when the inner→outer direction was degenerate
    pub extended: bool,
}

impl AnchorSet {
    pub fn new(entry: usize, angle: Angle, rule: TrafficRule, g: &GeometryConstants) -> Self {
        let direction = angle.direction();
        let normal = angle.normal();
        let entry_sign = rule.entry_sign();
        let exit_sign = rule.exit_sign();
        let at = |r: f64, lateral: f64| direction * r + normal * lateral;

        let entry_inner = at(g.inner_radius, entry_sign * g.center_offset);
        let entry_outer = at(g.outer_radius, entry_sign * g.center_offset);
        let exit_inner = at(g.inner_radius, exit_sign * g.center_offset);
        let exit_outer = at(g.outer_radius, exit_sign * g.center_offset);

        let (entry_outer_ext, extended) = match unit_between(entry_inner, entry_outer) {
            Some(u) => (entry_outer + u * g.extension_length, true),
            None => {
                crate::log::warn!(entry, angle = angle.raw(), "degenerate lane direction, extension skipped");
                (entry_outer, false)
            }
        };

        Self {
            entry,
            angle,
            direction,
            normal,
            entry_sign,
            exit_sign,
            entry_inner,
            entry_outer,
            entry_outer_ext,
            exit_inner,
            exit_outer,
            extended,
        }
    }

    /// Point at radius `r` and signed lateral offset `lateral`.
    pub fn at(&self, r: f64, lateral: f64) -> Point {
        self.direction * r + self.normal * lateral
    }

    /// Midpoint of the two lane ends at `outer_radius`.
    pub fn outer_mid(&self) -> Point {
        (self.entry_outer + self.exit_outer) * 0.5
    }
}

/// Unit vector from `from` to `to`, or None when they (nearly) coincide.
pub fn unit_between(from: Point, to: Point) -> Option<DVec2> {
    let delta = to - from;
    let len = delta.length();
    if !(len > defaults::DEGENERATE_LENGTH) {
        return None;
    }
    delta.try_normalize()
}

/// Arrowhead triangle with its base centred on `base` and the tip pointing
/// along `dir`. Returns `[tip, left, right]`.
pub fn arrowhead(base: Point, dir: DVec2, width: f64, length: f64) -> [Point; 3] {
    let perp = dvec2(-dir.y, dir.x);
    let half = width / 2.0;
    [base + dir * length, base + perp * half, base - perp * half]
}

/// Point on the cubic Bézier at parameter `t`.
pub fn cubic_point(p0: Point, p1: Point, p2: Point, p3: Point, t: f64) -> Point {
    let u = 1.0 - t;
    p0 * (u * u * u) + p1 * (3.0 * u * u * t) + p2 * (3.0 * u * t * t) + p3 * (t * t * t)
}

/// Point on a circle at `angle`.
pub fn arc_point(center: Point, radius: f64, angle: Angle) -> Point {
    center + angle.direction() * radius
}

/// Bounds of a stroked arc, sampled.
pub fn arc_bounds(center: Point, radius: f64, start: Angle, end: Angle, width: f64) -> BBox {
    let mut bb = BBox::new();
    let steps = defaults::ARC_SAMPLES;
    let sweep = end.raw() - start.raw();
    for s in 0..=steps {
        let a = start + sweep * s as f64 / steps as f64;
        bb.expand_disc(arc_point(center, radius, a), width / 2.0);
    }
    bb
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: DVec2, b: DVec2) -> bool {
        (a - b).length() < 1e-9
    }

    #[test]
    fn right_hand_east_road_anchors() {
        let g = GeometryConstants::default();
        let a = AnchorSet::new(0, Angle(0.0), TrafficRule::Right, &g);
        assert!(close(a.entry_inner, dvec2(3.0, 1.5)));
        assert!(close(a.entry_outer, dvec2(8.0, 1.5)));
        assert!(close(a.entry_outer_ext, dvec2(9.0, 1.5)));
        assert!(close(a.exit_inner, dvec2(3.0, -1.5)));
        assert!(close(a.exit_outer, dvec2(8.0, -1.5)));
        assert!(a.extended);
    }

    #[test]
    fn handedness_swaps_lane_sides() {
        let g = GeometryConstants::default();
        for deg in [0.0, 37.0, 90.0, 200.0] {
            let r = AnchorSet::new(0, Angle(deg), TrafficRule::Right, &g);
            let l = AnchorSet::new(0, Angle(deg), TrafficRule::Left, &g);
            assert!(close(r.entry_inner, l.exit_inner));
            assert!(close(r.exit_outer, l.entry_outer));
        }
    }

    #[test]
    fn inbound_lane_keeps_to_the_right_for_right_hand_traffic() {
        // North road: inbound traffic drives south, so its right is west (x < 0)
        let g = GeometryConstants::default();
        let a = AnchorSet::new(0, Angle(90.0), TrafficRule::Right, &g);
        assert!(a.entry_inner.x < 0.0);
        assert!(a.exit_inner.x > 0.0);
    }

    #[test]
    fn degenerate_direction_skips_extension() {
        let g = GeometryConstants {
            outer_radius: 3.0,
            ..GeometryConstants::default()
        };
        let a = AnchorSet::new(2, Angle(45.0), TrafficRule::Left, &g);
        assert!(!a.extended);
        assert_eq!(a.entry_outer_ext, a.entry_outer);
    }

    #[test]
    fn unit_between_rejects_coincident_and_nan() {
        assert!(unit_between(dvec2(1.0, 1.0), dvec2(1.0, 1.0)).is_none());
        assert!(unit_between(dvec2(f64::NAN, 0.0), dvec2(1.0, 1.0)).is_none());
        let u = unit_between(dvec2(0.0, 0.0), dvec2(0.0, 2.0)).unwrap();
        assert!(close(u, dvec2(0.0, 1.0)));
    }

    #[test]
    fn arrowhead_points_along_direction() {
        let [tip, l, r] = arrowhead(dvec2(8.0, 0.0), dvec2(1.0, 0.0), 2.0, 1.5);
        assert!(close(tip, dvec2(9.5, 0.0)));
        assert!(close(l, dvec2(8.0, 1.0)));
        assert!(close(r, dvec2(8.0, -1.0)));
    }

    #[test]
    fn cubic_endpoints_and_midpoint() {
        let (p0, p1, p2, p3) = (
            dvec2(0.0, 0.0),
            dvec2(0.0, 1.0),
            dvec2(1.0, 1.0),
            dvec2(1.0, 0.0),
        );
        assert!(close(cubic_point(p0, p1, p2, p3, 0.0), p0));
        assert!(close(cubic_point(p0, p1, p2, p3, 1.0), p3));
        assert!(close(cubic_point(p0, p1, p2, p3, 0.5), dvec2(0.5, 0.75)));
    }

    #[test]
    fn half_circle_bounds() {
        let bb = arc_bounds(dvec2(0.0, 0.0), 1.0, Angle(90.0), Angle(270.0), 0.0);
        assert!((bb.min.x + 1.0).abs() < 1e-9);
        assert!(bb.max.x.abs() < 1e-9);
        assert!((bb.max.y - 1.0).abs() < 1e-9);
        assert!((bb.min.y + 1.0).abs() < 1e-9);
    }
}
