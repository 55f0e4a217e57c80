//! Core types for flow-diagram rendering

use std::fmt;

use crate::model::FlowTotals;
use crate::types::{Angle, Point, Volume};

use super::geometry::AnchorSet;

/// Drawing layer. Lower layers render first (behind).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Layer {
    Lanes,
    Bands,
    Labels,
}

/// What a primitive represents, for callers that want to style or pick
/// individual pieces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    EntryBar(usize),
    ExitBar(usize),
    Arrow(usize),
    UTurn(usize),
    Turn { entry: usize, exit: usize },
    Label(LabelKind),
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::EntryBar(i) => write!(f, "entry-bar {i}"),
            Tag::ExitBar(i) => write!(f, "exit-bar {i}"),
            Tag::Arrow(i) => write!(f, "arrow {i}"),
            Tag::UTurn(i) => write!(f, "u-turn {i}"),
            Tag::Turn { entry, exit } => write!(f, "turn {entry}->{exit}"),
            Tag::Label(kind) => write!(f, "{kind}"),
        }
    }
}

/// The three label families (four kinds: aggregates come in two sides).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelKind {
    EntryName(usize),
    EntryTotal(usize),
    ExitTotal(usize),
    Turn { entry: usize, exit: usize },
}

impl fmt::Display for LabelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelKind::EntryName(i) => write!(f, "name {i}"),
            LabelKind::EntryTotal(i) => write!(f, "entry-total {i}"),
            LabelKind::ExitTotal(i) => write!(f, "exit-total {i}"),
            LabelKind::Turn { entry, exit } => write!(f, "turn-label {entry}->{exit}"),
        }
    }
}

/// A piece of text with its final placement. Text is centred on `position`.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelAnchor {
    pub kind: LabelKind,
    pub text: String,
    pub position: Point,
    /// Counter-clockwise rotation in degrees
    pub rotation: Angle,
    pub font_size: f64,
}

/// A nonzero `entry -> exit` movement and where its band sits.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnPath {
    pub entry: usize,
    pub exit: usize,
    pub volume: Volume,
    /// Position in the turn sequence; 0 is the U-turn
    pub ordinal: usize,
    /// Other nonzero turns between this one and the U-turn at the entry lane
    pub stack_order_at_entry: usize,
    /// Same, at the exit lane
    pub stack_order_at_exit: usize,
    /// Signed lateral offset of the band centre at the entry road
    pub entry_slot: f64,
    /// Signed lateral offset of the band centre at the exit road
    pub exit_slot: f64,
    pub width: f64,
}

impl TurnPath {
    pub fn is_u_turn(&self) -> bool {
        self.entry == self.exit
    }
}

/// Everything computed before primitives are emitted.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub totals: FlowTotals,
    pub anchors: Vec<AnchorSet>,
    /// Lane bar widths per road: (entry, exit)
    pub lane_widths: Vec<(f64, f64)>,
    pub turns: Vec<TurnPath>,
    pub labels: Vec<LabelAnchor>,
}

impl Layout {
    pub fn turn(&self, entry: usize, exit: usize) -> Option<&TurnPath> {
        self.turns.iter().find(|t| t.entry == entry && t.exit == exit)
    }
}
