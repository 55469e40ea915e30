//! Cells — the binary-valued leaf operands of an operation graph.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value::BitValue;

/// Stable handle of a cell within an [`OpGraph`](crate::OpGraph) arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellId(pub u32);

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cell{}", self.0)
    }
}

/// How a cell is identified in rendered output and in compiled objectives.
///
/// User-visible operands carry a `Named` label (base name plus an optional
/// bit position for multi-bit operands). Cells synthesized internally carry
/// an `Aux` label — an operator mark plus a per-graph sequence number. The
/// label variant is the auxiliary marker: only `Aux` cells may be silently
/// written by constant folding during output binding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellLabel {
    /// A user-named cell, optionally one bit of a multi-bit operand.
    Named {
        /// Operand base name.
        base: String,
        /// Bit position within the operand, LSB = 0; `None` for single cells.
        bit: Option<u32>,
    },
    /// An internally synthesized cell.
    Aux {
        /// Mark of the operator that produced the cell.
        mark: String,
        /// Per-graph sequence number; re-numbered when graphs merge.
        seq: u32,
    },
}

impl CellLabel {
    /// Render the label as a variable identifier.
    pub fn render(&self) -> String {
        match self {
            CellLabel::Named { base, bit: None } => base.clone(),
            CellLabel::Named { base, bit: Some(at) } => format!("{base}{at}"),
            CellLabel::Aux { mark, seq } => format!("_{mark}{seq}"),
        }
    }
}

impl fmt::Display for CellLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// A single binary operand with a ternary value domain.
///
/// Cells hold the only mutable value state in a graph. During solving they
/// additionally accumulate one solution value per returned sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    label: CellLabel,
    value: BitValue,
    /// A pinned cell holds an internal constant; folding never rewrites it.
    pinned: bool,
    solutions: Vec<BitValue>,
}

impl Cell {
    /// Create a cell with the given label and value.
    pub fn new(label: CellLabel, value: BitValue) -> Self {
        Self {
            label,
            value,
            pinned: false,
            solutions: vec![],
        }
    }

    /// Mark the cell as an internal constant.
    pub fn pin(&mut self) {
        self.pinned = true;
    }

    /// Whether the cell is a pinned internal constant.
    pub fn is_pinned(&self) -> bool {
        self.pinned
    }

    /// The cell's label.
    pub fn label(&self) -> &CellLabel {
        &self.label
    }

    /// The rendered variable identifier.
    pub fn var_name(&self) -> String {
        self.label.render()
    }

    /// Whether the cell was synthesized internally (foldable).
    pub fn is_aux(&self) -> bool {
        matches!(self.label, CellLabel::Aux { .. })
    }

    /// Current value.
    pub fn value(&self) -> BitValue {
        self.value
    }

    /// Set the value.
    pub fn set_value(&mut self, v: BitValue) {
        self.value = v;
    }

    /// Re-label the cell. Assignment binding uses this to let an auxiliary
    /// cell adopt the assignee operand's identity.
    pub fn set_label(&mut self, label: CellLabel) {
        self.label = label;
    }

    /// Record a solved value for the next sample id.
    pub fn push_solution(&mut self, v: BitValue) {
        self.solutions.push(v);
    }

    /// The solved value for a sample id, falling back to the cell's own
    /// value when the sample did not mention it (folded or constant cells).
    pub fn solution(&self, sample_id: usize) -> BitValue {
        self.solutions.get(sample_id).copied().unwrap_or(self.value)
    }

    /// Number of recorded solutions.
    pub fn solution_count(&self) -> usize {
        self.solutions.len()
    }

    /// Discard all recorded solutions.
    pub fn clear_solutions(&mut self) {
        self.solutions.clear();
    }
}
