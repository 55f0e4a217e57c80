//! Flow model: intersection topology, handedness and the entry × exit matrix.
//!
//! The data-entry side hands us one table per ordinal turn position
//! (`raw[k][entry]`, k = 0 is the U-turn). Everything downstream works on the
//! reshaped `flow[entry][exit]` matrix built here.

use std::fmt;
use std::str::FromStr;

use crate::errors::FlowError;
use crate::types::{Angle, NumericError, Volume};

/// Smallest supported number of roads
pub const MIN_ENTRIES: usize = 3;
/// Largest supported number of roads
pub const MAX_ENTRIES: usize = 6;

/// Which side of the road traffic keeps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrafficRule {
    Left,
    #[default]
    Right,
}

impl TrafficRule {
    /// Lateral sign of the inbound lane (relative to [`Angle::normal`]).
    pub fn entry_sign(self) -> f64 {
        match self {
            TrafficRule::Right => -1.0,
            TrafficRule::Left => 1.0,
        }
    }

    /// Lateral sign of the outbound lane; always opposite to the inbound one.
    pub fn exit_sign(self) -> f64 {
        -self.entry_sign()
    }

    /// Exit reached from `entry` at ordinal turn position `k`.
    pub fn exit_for(self, entry: usize, k: usize, n: usize) -> usize {
        let e = entry as i64 + 1;
        let k = k as i64;
        let x = match self {
            TrafficRule::Right => e - k,
            TrafficRule::Left => e + k,
        };
        normalize_index(x, n) - 1
    }

    /// Entry that reaches `exit` at ordinal turn position `k`.
    pub fn entry_for(self, exit: usize, k: usize, n: usize) -> usize {
        let x = exit as i64 + 1;
        let k = k as i64;
        let e = match self {
            TrafficRule::Right => x + k,
            TrafficRule::Left => x - k,
        };
        normalize_index(e, n) - 1
    }

    /// Ordinal turn position of the `entry -> exit` movement.
    ///
    /// Inverse of [`TrafficRule::exit_for`]. The same ordinal orders bands at
    /// the entry lane and at the exit lane.
    pub fn ordinal(self, entry: usize, exit: usize, n: usize) -> usize {
        let (e, x, n) = (entry as i64, exit as i64, n as i64);
        let k = match self {
            TrafficRule::Right => e - x,
            TrafficRule::Left => x - e,
        };
        k.rem_euclid(n) as usize
    }
}

impl fmt::Display for TrafficRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrafficRule::Left => write!(f, "left"),
            TrafficRule::Right => write!(f, "right"),
        }
    }
}

impl FromStr for TrafficRule {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(TrafficRule::Left),
            "right" => Ok(TrafficRule::Right),
            _ => Err(FlowError::UnknownTrafficRule {
                value: s.to_string(),
            }),
        }
    }
}

/// Map any integer onto `[1, n]` with 1-based wraparound.
///
/// `((x - 1) mod n) + 1`, positive for negative `x` as well.
pub fn normalize_index(x: i64, n: usize) -> usize {
    debug_assert!(n > 0);
    ((x - 1).rem_euclid(n as i64) + 1) as usize
}

/// One road meeting the intersection
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub angle: Angle,
    pub name: String,
}

impl Entry {
    pub fn new(angle: f64, name: impl Into<String>) -> Self {
        Self {
            angle: Angle(angle),
            name: name.into(),
        }
    }
}

/// The roads of the intersection and the traffic rule. Immutable for a render.
#[derive(Debug, Clone, PartialEq)]
pub struct Intersection {
    entries: Vec<Entry>,
    rule: TrafficRule,
}

impl Intersection {
    /// Validate the road count; it is never clamped.
    pub fn new(entries: Vec<Entry>, rule: TrafficRule) -> Result<Self, FlowError> {
        if !(MIN_ENTRIES..=MAX_ENTRIES).contains(&entries.len()) {
            return Err(FlowError::InvalidTopology {
                count: entries.len(),
            });
        }
        Ok(Self { entries, rule })
    }

    /// Build from parallel angle and name arrays. Missing names are empty.
    pub fn from_parts(
        angles: &[f64],
        names: &[&str],
        rule: TrafficRule,
    ) -> Result<Self, FlowError> {
        let entries = angles
            .iter()
            .enumerate()
            .map(|(i, &a)| Entry::new(a, names.get(i).copied().unwrap_or("")))
            .collect();
        Self::new(entries, rule)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn rule(&self) -> TrafficRule {
        self.rule
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn angle(&self, i: usize) -> Angle {
        self.entries[i].angle
    }

    /// Name to print for entry `i`; blank names become `Road {i+1}`.
    pub fn display_name(&self, i: usize) -> String {
        let name = self.entries[i].name.trim();
        if name.is_empty() {
            format!("Road {}", i + 1)
        } else {
            name.to_string()
        }
    }

    /// Same roads and names under the other traffic rule.
    pub fn with_rule(&self, rule: TrafficRule) -> Self {
        Self {
            entries: self.entries.clone(),
            rule,
        }
    }
}

/// Square `flow[entry][exit]` matrix of validated volumes.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowMatrix {
    n: usize,
    cells: Vec<Volume>,
}

impl FlowMatrix {
    /// An all-zero matrix for `n` roads.
    pub fn zeros(n: usize) -> Result<Self, FlowError> {
        if !(MIN_ENTRIES..=MAX_ENTRIES).contains(&n) {
            return Err(FlowError::InvalidTopology { count: n });
        }
        Ok(Self {
            n,
            cells: vec![Volume::ZERO; n * n],
        })
    }

    /// Accept an already shaped matrix.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, FlowError> {
        let n = rows.len();
        let mut m = Self::zeros(n)?;
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n {
                return Err(FlowError::MatrixShape {
                    rows: n,
                    cols: row.len(),
                    expected: n,
                });
            }
            for (j, &v) in row.iter().enumerate() {
                m.set(i, j, v)?;
            }
        }
        Ok(m)
    }

    /// Reshape per-ordinal tables (`raw[k][entry]`) into `flow[entry][exit]`.
    ///
    /// Missing positions or entries count as zero; extra ones are ignored.
    pub fn from_raw(raw: &[Vec<f64>], rule: TrafficRule, n: usize) -> Result<Self, FlowError> {
        let mut m = Self::zeros(n)?;
        for (k, by_entry) in raw.iter().take(n).enumerate() {
            for (entry, &v) in by_entry.iter().take(n).enumerate() {
                let exit = rule.exit_for(entry, k, n);
                m.set(entry, exit, v)?;
            }
        }
        crate::log::trace!(n, %rule, "reshaped raw flows");
        Ok(m)
    }

    /// Inverse of [`FlowMatrix::from_raw`].
    pub fn to_raw(&self, rule: TrafficRule) -> Vec<Vec<f64>> {
        (0..self.n)
            .map(|k| {
                (0..self.n)
                    .map(|entry| self.cell(entry, rule.exit_for(entry, k, self.n)).raw())
                    .collect()
            })
            .collect()
    }

    pub fn set(&mut self, entry: usize, exit: usize, value: f64) -> Result<(), FlowError> {
        if entry >= self.n || exit >= self.n {
            return Err(FlowError::IndexOutOfRange {
                entry,
                exit,
                size: self.n,
            });
        }
        let v = Volume::try_new(value).map_err(|reason| FlowError::InvalidVolume {
            entry,
            exit,
            reason,
        })?;
        self.cells[entry * self.n + exit] = v;
        Ok(())
    }

    /// Volume from `entry` to `exit`, or None outside the matrix.
    pub fn get(&self, entry: usize, exit: usize) -> Option<Volume> {
        if entry >= self.n || exit >= self.n {
            return None;
        }
        Some(self.cell(entry, exit))
    }

    /// Unchecked cell access for indices derived from `size()`.
    pub(crate) fn cell(&self, entry: usize, exit: usize) -> Volume {
        self.cells[entry * self.n + exit]
    }

    pub fn size(&self) -> usize {
        self.n
    }

    /// Nonzero cells in row-major order.
    pub fn nonzero(&self) -> impl Iterator<Item = (usize, usize, Volume)> + '_ {
        (0..self.n).flat_map(move |i| {
            (0..self.n).filter_map(move |j| {
                let v = self.cell(i, j);
                (!v.is_zero()).then_some((i, j, v))
            })
        })
    }

    pub fn totals(&self) -> FlowTotals {
        FlowTotals::of(self)
    }
}

/// Per-road aggregates and the width-scaling reference.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowTotals {
    pub entry_total: Vec<Volume>,
    pub exit_total: Vec<Volume>,
    /// Largest cell value, floored to 1.0 when every cell is zero
    pub max_volume: f64,
    /// True when the floor above was applied
    pub zero_field: bool,
}

impl FlowTotals {
    pub fn of(m: &FlowMatrix) -> Self {
        let n = m.size();
        let entry_total = (0..n).map(|i| (0..n).map(|j| m.cell(i, j)).sum()).collect();
        let exit_total = (0..n).map(|j| (0..n).map(|i| m.cell(i, j)).sum()).collect();
        let true_max = m.cells.iter().map(|v| v.raw()).fold(0.0_f64, f64::max);
        let zero_field = true_max <= 0.0;
        if zero_field {
            crate::log::debug!("zero volume field, scaling widths against 1.0");
        }
        Self {
            entry_total,
            exit_total,
            max_volume: if zero_field { 1.0 } else { true_max },
            zero_field,
        }
    }

    /// Reject totals that overflowed, even though every cell is finite.
    pub fn check(&self) -> Result<(), FlowError> {
        let lanes = [("entry", &self.entry_total), ("exit", &self.exit_total)];
        for (lane, totals) in lanes {
            if let Some(road) = totals.iter().position(|t| !t.raw().is_finite()) {
                return Err(FlowError::InvalidTotal {
                    road,
                    lane,
                    reason: NumericError::Infinite,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_index_range_and_period() {
        for n in MIN_ENTRIES..=MAX_ENTRIES {
            for x in -20_i64..20 {
                let v = normalize_index(x, n);
                assert!((1..=n).contains(&v), "x={x} n={n} -> {v}");
                assert_eq!(v, normalize_index(x + n as i64, n));
            }
            assert_eq!(normalize_index(n as i64, n), n);
            assert_eq!(normalize_index(1, n), 1);
            assert_eq!(normalize_index(0, n), n);
        }
    }

    #[test]
    fn right_hand_ordinals_walk_down_exit_indices() {
        let exits: Vec<_> = (0..4).map(|k| TrafficRule::Right.exit_for(1, k, 4)).collect();
        assert_eq!(exits, vec![1, 0, 3, 2]);
    }

    #[test]
    fn left_hand_ordinals_walk_up_exit_indices() {
        let exits: Vec<_> = (0..4).map(|k| TrafficRule::Left.exit_for(1, k, 4)).collect();
        assert_eq!(exits, vec![1, 2, 3, 0]);
    }

    #[test]
    fn ordinal_inverts_exit_for() {
        for rule in [TrafficRule::Left, TrafficRule::Right] {
            for n in MIN_ENTRIES..=MAX_ENTRIES {
                for e in 0..n {
                    for k in 0..n {
                        let x = rule.exit_for(e, k, n);
                        assert_eq!(rule.ordinal(e, x, n), k);
                        assert_eq!(rule.entry_for(x, k, n), e);
                    }
                }
            }
        }
    }

    #[test]
    fn traffic_rule_from_str() {
        assert_eq!("Right".parse::<TrafficRule>(), Ok(TrafficRule::Right));
        assert_eq!(" left ".parse::<TrafficRule>(), Ok(TrafficRule::Left));
        assert!(matches!(
            "middle".parse::<TrafficRule>(),
            Err(FlowError::UnknownTrafficRule { .. })
        ));
    }

    #[test]
    fn topology_is_validated_not_clamped() {
        for n in [0, 1, 2, 7, 10] {
            let entries = (0..n).map(|i| Entry::new(i as f64 * 30.0, "")).collect();
            assert_eq!(
                Intersection::new(entries, TrafficRule::Right),
                Err(FlowError::InvalidTopology { count: n })
            );
        }
        assert!(FlowMatrix::zeros(7).is_err());
    }

    #[test]
    fn blank_names_get_placeholders() {
        let x = Intersection::from_parts(&[0.0, 120.0, 240.0], &["Main St", "  "], TrafficRule::Left)
            .unwrap();
        assert_eq!(x.display_name(0), "Main St");
        assert_eq!(x.display_name(1), "Road 2");
        assert_eq!(x.display_name(2), "Road 3");
    }

    #[test]
    fn raw_reshape_places_u_turn_on_diagonal() {
        let raw = vec![vec![10.0, 0.0, 0.0, 0.0]];
        let m = FlowMatrix::from_raw(&raw, TrafficRule::Right, 4).unwrap();
        assert_eq!(m.cell(0, 0).raw(), 10.0);
        assert_eq!(m.nonzero().count(), 1);
    }

    #[test]
    fn raw_reshape_tolerates_missing_and_round_trips() {
        let raw = vec![
            vec![1.0, 2.0, 3.0],
            vec![4.0, 5.0],
            vec![7.0, 8.0, 9.0],
        ];
        for rule in [TrafficRule::Left, TrafficRule::Right] {
            let m = FlowMatrix::from_raw(&raw, rule, 3).unwrap();
            let back = m.to_raw(rule);
            assert_eq!(back[1], vec![4.0, 5.0, 0.0]);
            assert_eq!(back[2], vec![7.0, 8.0, 9.0]);
        }
        let m = FlowMatrix::from_raw(&raw, TrafficRule::Right, 3).unwrap();
        // entry 0, position 1 under right-hand traffic exits at index 2
        assert_eq!(m.cell(0, 2).raw(), 4.0);
        let m = FlowMatrix::from_raw(&raw, TrafficRule::Left, 3).unwrap();
        assert_eq!(m.cell(0, 1).raw(), 4.0);
    }

    #[test]
    fn invalid_cells_are_rejected() {
        let err = FlowMatrix::from_rows(&[
            vec![0.0, 1.0, 0.0],
            vec![0.0, 0.0, -2.0],
            vec![0.0, 0.0, 0.0],
        ])
        .unwrap_err();
        assert!(matches!(err, FlowError::InvalidVolume { entry: 1, exit: 2, .. }));

        let err = FlowMatrix::from_rows(&[vec![0.0; 3], vec![0.0; 2], vec![0.0; 3]]).unwrap_err();
        assert_eq!(
            err,
            FlowError::MatrixShape {
                rows: 3,
                cols: 2,
                expected: 3
            }
        );
    }

    #[test]
    fn indices_outside_the_matrix_are_rejected() {
        let mut m = FlowMatrix::zeros(3).unwrap();
        assert_eq!(
            m.set(0, 4, 7.0),
            Err(FlowError::IndexOutOfRange {
                entry: 0,
                exit: 4,
                size: 3
            })
        );
        assert!(matches!(
            m.set(3, 0, 1.0),
            Err(FlowError::IndexOutOfRange { entry: 3, .. })
        ));
        // nothing was written through a wrapped index
        assert!(m.nonzero().next().is_none());

        m.set(2, 1, 4.0).unwrap();
        assert_eq!(m.get(2, 1).map(Volume::raw), Some(4.0));
        assert_eq!(m.get(0, 3), None);
        assert_eq!(m.get(usize::MAX, 0), None);
    }

    #[test]
    fn overflowing_totals_are_rejected() {
        let m = FlowMatrix::from_rows(&[
            vec![0.0, f64::MAX, f64::MAX],
            vec![0.0; 3],
            vec![0.0; 3],
        ])
        .unwrap();
        assert_eq!(
            m.totals().check(),
            Err(FlowError::InvalidTotal {
                road: 0,
                lane: "entry",
                reason: NumericError::Infinite
            })
        );

        let m = FlowMatrix::from_rows(&[
            vec![0.0, f64::MAX, 0.0],
            vec![0.0; 3],
            vec![0.0, f64::MAX, 0.0],
        ])
        .unwrap();
        assert_eq!(
            m.totals().check(),
            Err(FlowError::InvalidTotal {
                road: 1,
                lane: "exit",
                reason: NumericError::Infinite
            })
        );

        let m = FlowMatrix::from_rows(&[vec![0.0, 1.0, 2.0], vec![3.0; 3], vec![0.0; 3]]).unwrap();
        assert_eq!(m.totals().check(), Ok(()));
    }

    #[test]
    fn totals_conserve_row_and_column_sums() {
        let m = FlowMatrix::from_rows(&[
            vec![1.0, 2.0, 3.0, 0.5],
            vec![0.0, 4.0, 0.0, 1.5],
            vec![6.0, 0.0, 0.0, 0.0],
            vec![0.0, 0.0, 7.0, 8.0],
        ])
        .unwrap();
        let t = m.totals();
        let rows: Vec<f64> = t.entry_total.iter().map(|v| v.raw()).collect();
        let cols: Vec<f64> = t.exit_total.iter().map(|v| v.raw()).collect();
        assert_eq!(rows, vec![6.5, 5.5, 6.0, 15.0]);
        assert_eq!(cols, vec![7.0, 6.0, 10.0, 10.0]);
        assert_eq!(t.max_volume, 8.0);
        assert!(!t.zero_field);
    }

    #[test]
    fn zero_field_floors_max_volume() {
        let t = FlowMatrix::zeros(5).unwrap().totals();
        assert_eq!(t.max_volume, 1.0);
        assert!(t.zero_field);
    }
}
