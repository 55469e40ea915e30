//! Expressions — operation graphs with typed roots.

use std::collections::BTreeMap;
use std::fmt;

use rimfax_compile::SampleSet;
use rimfax_ir::{BitValue, CellLabel, OpGraph, OperandRef, OperatorKind};

/// Render one clause per synthesized bit-level operation, `;`-separated.
pub(crate) fn decompose(g: &OpGraph) -> String {
    let leaf = |r: OperandRef| g.var_name(r).unwrap_or_else(|_| "?".to_string());
    let mut clauses = Vec::new();
    for (_, node) in g.nodes() {
        if node.kind == OperatorKind::Carry {
            continue;
        }
        let ins: Vec<String> = node.inputs.iter().map(|r| leaf(*r)).collect();
        let out = match node.output {
            Some(r) => leaf(r),
            None => "?".to_string(),
        };
        let clause = if node.kind.is_comparison() {
            format!("{} {} {}", ins.join(" "), node.kind.mark(), out)
        } else if node.kind.is_addition() {
            let carry = node
                .carry
                .map(|id| leaf(OperandRef::Node(id)))
                .unwrap_or_else(|| "?".to_string());
            format!("{} = {} #{}", out, ins.join(" + "), carry)
        } else {
            format!("{} = {}", out, ins.join(&format!(" {} ", node.kind.mark())))
        };
        clauses.push(clause);
    }
    let mut text = clauses.join("; ");
    if !text.is_empty() {
        text.push(';');
    }
    text
}

/// Store one solution value per cell for every sample in the set.
///
/// This is the explicit "apply solution" step: the only point where solved
/// values reach leaf cells, keyed by sample id. Cells the sampler did not
/// mention (folded or constant) fall back to their own value.
pub(crate) fn apply_samples(g: &mut OpGraph, samples: &SampleSet) {
    for sample in samples.iter() {
        for (_, cell) in g.cells_mut() {
            let solved = sample
                .bit(&cell.var_name())
                .map(BitValue::from_bit)
                .unwrap_or_else(|| cell.value());
            cell.push_solution(solved);
        }
    }
}

/// Number of stored solutions.
pub(crate) fn solution_count(g: &OpGraph) -> usize {
    g.cells()
        .map(|(_, cell)| cell.solution_count())
        .max()
        .unwrap_or(0)
}

/// Decode a named operand's value in one sample.
pub(crate) fn decode_named(g: &OpGraph, name: &str, sample_id: usize) -> Option<u64> {
    let mut single: Option<BitValue> = None;
    let mut bits: BTreeMap<u32, BitValue> = BTreeMap::new();
    for (_, cell) in g.cells() {
        if let CellLabel::Named { base, bit } = cell.label() {
            if base == name {
                match bit {
                    None => single = Some(cell.solution(sample_id)),
                    Some(at) => {
                        bits.insert(*at, cell.solution(sample_id));
                    }
                }
            }
        }
    }
    if let Some(v) = single {
        return v.bit().map(u64::from);
    }
    if bits.is_empty() {
        return None;
    }
    let mut value = 0u64;
    for (at, v) in bits {
        if at < 64 {
            value |= u64::from(v.bit()?) << at;
        }
    }
    Some(value)
}

/// Render every named operand's solved value in one sample.
pub(crate) fn solution_string(g: &OpGraph, sample_id: usize) -> String {
    let mut operands: BTreeMap<String, BTreeMap<u32, BitValue>> = BTreeMap::new();
    let mut singles: BTreeMap<String, BitValue> = BTreeMap::new();
    for (_, cell) in g.cells() {
        if let CellLabel::Named { base, bit } = cell.label() {
            match bit {
                None => {
                    singles.insert(base.clone(), cell.solution(sample_id));
                }
                Some(at) => {
                    operands
                        .entry(base.clone())
                        .or_default()
                        .insert(*at, cell.solution(sample_id));
                }
            }
        }
    }
    let mut rendered = Vec::new();
    for (name, value) in &singles {
        rendered.push(format!("{name}/{}/", value.symbol()));
    }
    for (name, bits) in &operands {
        let width = bits.keys().max().map_or(0, |top| top + 1) as usize;
        let mut text = String::with_capacity(width);
        for at in (0..width as u32).rev() {
            text.push(bits.get(&at).copied().unwrap_or(BitValue::Zero).symbol());
        }
        rendered.push(format!("{name}/{width}b:{text}/"));
    }
    rendered.join("; ")
}

/// The shared body of an expression: its own operation graph plus the root
/// references, one per bit position (LSB first).
#[derive(Debug, Clone, Default)]
pub(crate) struct ExprCore {
    pub(crate) graph: OpGraph,
    pub(crate) bits: Vec<OperandRef>,
    /// Synthesized constraint roots that are not value bits (slack-ladder
    /// bindings of subtraction, division and order comparisons).
    pub(crate) constraints: Vec<OperandRef>,
    /// Set on comparisons: the expression asserts a relation and cannot
    /// serve as an assignment source.
    pub(crate) constraint_only: bool,
    pub(crate) summary: String,
}

impl ExprCore {
    /// A plain (non-constraint) expression body.
    pub(crate) fn from_bits(graph: OpGraph, bits: Vec<OperandRef>, summary: String) -> Self {
        Self {
            graph,
            bits,
            constraints: vec![],
            constraint_only: false,
            summary,
        }
    }

    /// Append another expression's graph, returning its remapped roots.
    pub(crate) fn merge(&mut self, other: ExprCore) -> Vec<OperandRef> {
        let (cell_off, node_off) = self.graph.merge(other.graph);
        self.constraints.extend(
            other
                .constraints
                .iter()
                .map(|r| OpGraph::remap(*r, cell_off, node_off)),
        );
        self.constraint_only |= other.constraint_only;
        other
            .bits
            .iter()
            .map(|r| OpGraph::remap(*r, cell_off, node_off))
            .collect()
    }

    /// Every root the compiler must reach: value bits plus constraints.
    pub(crate) fn roots(&self) -> Vec<OperandRef> {
        let mut roots = self.bits.clone();
        roots.extend(self.constraints.iter().copied());
        roots
    }

    /// Decode the expression's current (folded) value; `None` when any bit
    /// is unknown.
    pub(crate) fn value(&self) -> Option<u64> {
        let mut value = 0u64;
        for (at, bit) in self.bits.iter().enumerate() {
            let b = self.graph.value_of(*bit).bit()?;
            if at < 64 {
                value |= u64::from(b) << at;
            }
        }
        Some(value)
    }
}

/// A single-bit expression.
#[derive(Debug, Clone)]
pub struct BitExpr {
    pub(crate) core: ExprCore,
}

/// A multi-bit (numeric or constraint) expression.
#[derive(Debug, Clone)]
pub struct NumExpr {
    pub(crate) core: ExprCore,
}

impl From<BitExpr> for NumExpr {
    fn from(expr: BitExpr) -> Self {
        NumExpr { core: expr.core }
    }
}

macro_rules! expr_common {
    ($ty:ty) => {
        impl $ty {
            /// Number of bit positions in the expression root.
            pub fn width(&self) -> usize {
                self.core.bits.len()
            }

            /// The expression's current value, available when every bit
            /// folded to a concrete value during construction.
            pub fn value(&self) -> Option<u64> {
                self.core.value()
            }

            /// Decode a named operand's value in one solved sample.
            pub fn decode(&self, name: &str, sample_id: usize) -> Option<u64> {
                decode_named(&self.core.graph, name, sample_id)
            }

            /// Decode the expression root's value in one solved sample.
            pub fn solved(&self, sample_id: usize) -> Option<u64> {
                let mut value = 0u64;
                for (at, bit) in self.core.bits.iter().enumerate() {
                    let cell = self.core.graph.resolve(*bit)?;
                    let b = self.core.graph.cell(cell).solution(sample_id).bit()?;
                    if at < 64 {
                        value |= u64::from(b) << at;
                    }
                }
                Some(value)
            }

            /// Render the expression; `decomposed` expands to one clause
            /// per synthesized bit-level operation.
            pub fn render(&self, decomposed: bool) -> String {
                if decomposed {
                    decompose(&self.core.graph)
                } else {
                    self.core.summary.clone()
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.core.summary)
            }
        }
    };
}

expr_common!(BitExpr);
expr_common!(NumExpr);
