//! Label placer: road names, lane totals and per-turn volumes.

use crate::config::{GeometryConstants, RenderConfig};
use crate::model::{FlowTotals, Intersection};

use super::geometry::AnchorSet;
use super::path_builder::{u_turn_apex, u_turn_arc};
use super::types::{LabelAnchor, LabelKind, TurnPath};

/// Place every label, in drawing order: per road its name and the two lane
/// totals, then the turn volumes by entry and ordinal.
pub fn place_labels(
    intersection: &Intersection,
    totals: &FlowTotals,
    anchors: &[AnchorSet],
    turns: &[TurnPath],
    g: &GeometryConstants,
    config: &RenderConfig,
) -> Vec<LabelAnchor> {
    let mut labels = Vec::new();
    for a in anchors {
        let i = a.entry;
        let (entry_total, exit_total) = (totals.entry_total[i], totals.exit_total[i]);

        // roads with no traffic at all stay unnamed
        if !entry_total.is_zero() || !exit_total.is_zero() {
            labels.push(LabelAnchor {
                kind: LabelKind::EntryName(i),
                text: intersection.display_name(i),
                position: a.outer_mid() + a.direction * (g.name_label_offset + g.extension_length),
                rotation: a.angle.across_road(),
                font_size: config.road_label_font_size,
            });
        }
        if !entry_total.is_zero() {
            labels.push(LabelAnchor {
                kind: LabelKind::EntryTotal(i),
                text: entry_total.label(),
                position: (a.entry_inner + a.entry_outer_ext) * 0.5,
                rotation: a.angle.upright(),
                font_size: config.flow_label_font_size,
            });
        }
        if !exit_total.is_zero() {
            labels.push(LabelAnchor {
                kind: LabelKind::ExitTotal(i),
                text: exit_total.label(),
                position: (a.exit_inner + a.exit_outer) * 0.5,
                rotation: a.angle.upright(),
                font_size: config.flow_label_font_size,
            });
        }
    }

    for turn in turns {
        let a = &anchors[turn.entry];
        let position = if turn.is_u_turn() {
            // an omitted arc has nothing to label
            let Some((center, radius)) = u_turn_arc(a, turn, g) else {
                continue;
            };
            u_turn_apex(a, center, radius)
        } else {
            if !(turn.width.is_finite() && turn.width > 0.0) {
                continue;
            }
            a.at(g.middle_radius, turn.entry_slot)
        };
        labels.push(LabelAnchor {
            kind: LabelKind::Turn {
                entry: turn.entry,
                exit: turn.exit,
            },
            text: turn.volume.label(),
            position,
            rotation: a.angle.upright(),
            font_size: config.flow_label_font_size,
        });
    }
    labels
}
