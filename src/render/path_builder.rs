//! Path builder: lane bars, arrowheads, U-turn arcs and turn bands.
//!
//! # Stacking
//!
//! Every lane bar is split into consecutive slots, one per nonzero turn using
//! that lane. Slots start at the median-side edge of the bar (the edge
//! closest to the road axis) and follow the ordinal turn position, so the
//! U-turn always hugs the median and each later turn sits further out. The
//! ordinal of a movement is the same seen from its entry and from its exit,
//! which keeps bands that share a lane from crossing each other there.

use crate::config::GeometryConstants;
use crate::errors::Warning;
use crate::model::{FlowMatrix, FlowTotals, Intersection};
use crate::types::Point;

use super::context::RenderContext;
use super::geometry::{AnchorSet, arrowhead, unit_between};
use super::shapes::{ArcShape, ArrowShape, CurveShape, LineShape, ShapeEnum};
use super::types::{Layer, Tag, TurnPath};

/// Width drawn for `volume`, scaled so the largest cell gets the multiplier.
pub fn band_width(volume: f64, totals: &FlowTotals, g: &GeometryConstants) -> f64 {
    volume * g.line_width_multiplier / totals.max_volume
}

/// Lane bar widths per road: (entry, exit).
pub fn lane_widths(totals: &FlowTotals, g: &GeometryConstants) -> Vec<(f64, f64)> {
    totals
        .entry_total
        .iter()
        .zip(&totals.exit_total)
        .map(|(e, x)| (band_width(e.raw(), totals, g), band_width(x.raw(), totals, g)))
        .collect()
}

/// One lane's slots, in ordinal order: (ordinal, stack order, slot centre).
fn lane_slots(
    lane_width: f64,
    sign: f64,
    widths: impl Iterator<Item = (usize, f64)>,
    g: &GeometryConstants,
) -> Vec<(usize, usize, f64)> {
    let edge = g.center_offset - lane_width / 2.0;
    let mut acc = 0.0;
    let mut order = 0;
    let mut slots = Vec::new();
    for (k, w) in widths {
        // U-turn keeps order 0 and does not count toward later turns
        let stack = if k == 0 { 0 } else { order };
        slots.push((k, stack, sign * (edge + acc + w / 2.0)));
        acc += w;
        if k != 0 {
            order += 1;
        }
    }
    slots
}

/// Compute every nonzero movement with its stacking slots.
///
/// Turns are returned by entry, then ordinal.
pub fn stack_turns(
    intersection: &Intersection,
    flows: &FlowMatrix,
    totals: &FlowTotals,
    g: &GeometryConstants,
) -> Vec<TurnPath> {
    let n = flows.size();
    let rule = intersection.rule();
    let widths = lane_widths(totals, g);

    // Exit-side slots, keyed by (exit, ordinal)
    let mut exit_slots = vec![vec![None; n]; n];
    for (x, slots) in exit_slots.iter_mut().enumerate() {
        let arriving = (0..n).filter_map(|k| {
            let v = flows.cell(rule.entry_for(x, k, n), x);
            (!v.is_zero()).then(|| (k, band_width(v.raw(), totals, g)))
        });
        for (k, stack, slot) in lane_slots(widths[x].1, rule.exit_sign(), arriving, g) {
            slots[k] = Some((stack, slot));
        }
    }

    let mut turns = Vec::new();
    for e in 0..n {
        let leaving = (0..n).filter_map(|k| {
            let v = flows.cell(e, rule.exit_for(e, k, n));
            (!v.is_zero()).then(|| (k, band_width(v.raw(), totals, g)))
        });
        for (k, stack, slot) in lane_slots(widths[e].0, rule.entry_sign(), leaving, g) {
            let x = rule.exit_for(e, k, n);
            let Some((exit_stack, exit_slot)) = exit_slots[x][k] else {
                continue;
            };
            let volume = flows.cell(e, x);
            turns.push(TurnPath {
                entry: e,
                exit: x,
                volume,
                ordinal: k,
                stack_order_at_entry: stack,
                stack_order_at_exit: exit_stack,
                entry_slot: slot,
                exit_slot,
                width: band_width(volume.raw(), totals, g),
            });
        }
    }
    turns
}

/// Centre and radius of a U-turn arc, or None when it cannot be drawn.
pub fn u_turn_arc(anchor: &AnchorSet, turn: &TurnPath, g: &GeometryConstants) -> Option<(Point, f64)> {
    // negative once the lane bars are wider than the gap between them
    let radius = anchor.exit_sign * (turn.exit_slot - turn.entry_slot) / 2.0;
    let valid = |v: f64| v.is_finite() && v > 0.0;
    if !valid(radius) || !valid(turn.width) {
        return None;
    }
    let center = anchor.at(g.inner_radius, (turn.entry_slot + turn.exit_slot) / 2.0);
    Some((center, radius))
}

/// Bézier control points of a generic turn band: `[p0, p1, p2, p3]`.
pub fn turn_curve(from: &AnchorSet, to: &AnchorSet, turn: &TurnPath, g: &GeometryConstants) -> [Point; 4] {
    let handle = g.turn_handle * g.inner_radius;
    let p0 = from.at(g.inner_radius, turn.entry_slot);
    let p3 = to.at(g.inner_radius, turn.exit_slot);
    [p0, p0 - from.direction * handle, p3 - to.direction * handle, p3]
}

/// Emit both lane bars of every road plus the exit arrowheads.
pub fn emit_lanes(ctx: &mut RenderContext<'_>, anchors: &[AnchorSet], widths: &[(f64, f64)]) {
    let g = ctx.geometry;
    for (a, &(w_entry, w_exit)) in anchors.iter().zip(widths) {
        let color = ctx.style.color(a.entry);
        if !a.extended {
            ctx.warn(Warning::DegenerateGeometry {
                entry: a.entry,
                what: "extension",
            });
        }
        ctx.push(
            Tag::EntryBar(a.entry),
            Layer::Lanes,
            ShapeEnum::Line(LineShape {
                from: a.entry_inner,
                to: a.entry_outer_ext,
                width: w_entry,
                color,
            }),
        );
        ctx.push(
            Tag::ExitBar(a.entry),
            Layer::Lanes,
            ShapeEnum::Line(LineShape {
                from: a.exit_inner,
                to: a.exit_outer,
                width: w_exit,
                color,
            }),
        );

        if !(w_exit > 0.0) {
            continue;
        }
        let Some(dir) = unit_between(a.exit_inner, a.exit_outer) else {
            ctx.warn(Warning::DegenerateGeometry {
                entry: a.entry,
                what: "arrow",
            });
            continue;
        };
        let base = g.arrow_width_factor * w_exit;
        ctx.push(
            Tag::Arrow(a.entry),
            Layer::Lanes,
            ShapeEnum::Arrow(ArrowShape {
                points: arrowhead(a.exit_outer, dir, base, g.arrow_length_factor * base),
                color,
            }),
        );
    }
}

/// Emit one band per turn: an arc for U-turns, a curve otherwise.
pub fn emit_turns(ctx: &mut RenderContext<'_>, anchors: &[AnchorSet], turns: &[TurnPath]) {
    let g = ctx.geometry;
    for turn in turns {
        let color = ctx.style.color(turn.entry);
        let from = &anchors[turn.entry];
        if turn.is_u_turn() {
            let Some((center, radius)) = u_turn_arc(from, turn, g) else {
                ctx.warn(Warning::OmittedTurn {
                    entry: turn.entry,
                    exit: turn.exit,
                });
                continue;
            };
            ctx.push(
                Tag::UTurn(turn.entry),
                Layer::Bands,
                ShapeEnum::Arc(ArcShape {
                    center,
                    radius,
                    start: from.angle + 90.0,
                    end: from.angle + 270.0,
                    width: turn.width,
                    color,
                }),
            );
            continue;
        }

        if !(turn.width.is_finite() && turn.width > 0.0) {
            ctx.warn(Warning::OmittedTurn {
                entry: turn.entry,
                exit: turn.exit,
            });
            continue;
        }
        let [p0, p1, p2, p3] = turn_curve(from, &anchors[turn.exit], turn, g);
        ctx.push(
            Tag::Turn {
                entry: turn.entry,
                exit: turn.exit,
            },
            Layer::Bands,
            ShapeEnum::Curve(CurveShape {
                from: p0,
                ctrl1: p1,
                ctrl2: p2,
                to: p3,
                width: turn.width,
                color,
            }),
        );
    }
}

/// Apex of a U-turn arc, where its label goes.
pub fn u_turn_apex(anchor: &AnchorSet, center: Point, radius: f64) -> Point {
    super::geometry::arc_point(center, radius, anchor.angle + 180.0)
}
