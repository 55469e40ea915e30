//! Single-bit typed operands.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitXor, Not};

use serde::{Deserialize, Serialize};

use rimfax_ir::{BitValue, OpGraph, OperandRef, OperatorKind};

use crate::error::{TypeError, TypeResult};
use crate::expr::{BitExpr, ExprCore};
use crate::operand::Operand;

/// A named single-bit operand.
///
/// A fresh bit is in the unknown (superposition) state; a solver decides
/// its value unless it is pinned with [`set_value`](Bit::set_value).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bit {
    name: String,
    value: BitValue,
}

impl Bit {
    /// An unknown bit.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: BitValue::Unknown,
        }
    }

    /// A bit holding a concrete value; anything other than 0 or 1 leaves
    /// it unknown.
    pub fn with_value(name: impl Into<String>, value: u8) -> Self {
        Self {
            name: name.into(),
            value: BitValue::from_bit(value),
        }
    }

    /// The bit's value.
    pub fn value(&self) -> BitValue {
        self.value
    }

    /// Set the bit's value.
    pub fn set_value(&mut self, value: BitValue) {
        self.value = value;
    }

    /// Negated conjunction with another bit.
    pub fn nand(&self, rhs: &Bit) -> BitExpr {
        gate(OperatorKind::Nand, self, rhs)
    }

    /// Negated disjunction with another bit.
    pub fn nor(&self, rhs: &Bit) -> BitExpr {
        gate(OperatorKind::Nor, self, rhs)
    }

    /// Equivalence (negated exclusive or) with another bit.
    pub fn xnor(&self, rhs: &Bit) -> BitExpr {
        gate(OperatorKind::Nxor, self, rhs)
    }

    /// Constrain this bit to equal `rhs`.
    pub fn equal(&self, rhs: &Bit) -> BitExpr {
        compare(OperatorKind::Eq, self, rhs, "==")
    }

    /// Constrain this bit to differ from `rhs`.
    pub fn not_equal(&self, rhs: &Bit) -> BitExpr {
        compare(OperatorKind::Neq, self, rhs, "!=")
    }

    /// Constrain this bit to be less than `rhs`.
    ///
    /// Comparisons relate their input against their output operand, and
    /// this bit is the output, so the mirrored kind is emitted.
    pub fn less(&self, rhs: &Bit) -> BitExpr {
        compare(OperatorKind::Gt, self, rhs, "<")
    }

    /// Constrain this bit to be at most `rhs`.
    pub fn less_equal(&self, rhs: &Bit) -> BitExpr {
        compare(OperatorKind::Ge, self, rhs, "<=")
    }

    /// Constrain this bit to be greater than `rhs`.
    pub fn greater(&self, rhs: &Bit) -> BitExpr {
        compare(OperatorKind::Lt, self, rhs, ">")
    }

    /// Constrain this bit to be at least `rhs`.
    pub fn greater_equal(&self, rhs: &Bit) -> BitExpr {
        compare(OperatorKind::Le, self, rhs, ">=")
    }
}

impl Operand for Bit {
    fn name(&self) -> &str {
        &self.name
    }

    fn width(&self) -> usize {
        1
    }

    fn resize(&mut self, width: usize) -> TypeResult<()> {
        if width == 1 {
            return Ok(());
        }
        Err(TypeError::NotResizable {
            name: self.name.clone(),
            width: 1,
            needed: width,
        })
    }

    fn bit_value(&self, at: usize) -> BitValue {
        if at == 0 { self.value } else { BitValue::Zero }
    }

    fn capture(&self, g: &mut OpGraph) -> Vec<OperandRef> {
        vec![OperandRef::Cell(g.named_cell(
            self.name.clone(),
            None,
            self.value,
        ))]
    }
}

impl fmt::Display for Bit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/", self.name, self.value.symbol())
    }
}

/// Build a two-input gate expression over two bits.
fn gate(kind: OperatorKind, l: &Bit, r: &Bit) -> BitExpr {
    let mut g = OpGraph::new();
    let lc = l.capture(&mut g)[0];
    let rc = r.capture(&mut g)[0];
    let node = g
        .add_gate(kind, vec![lc, rc])
        .expect("two inputs match every gate arity");
    g.bind_fresh_output(node)
        .expect("fresh auxiliary outputs never conflict");
    BitExpr {
        core: ExprCore::from_bits(g, vec![OperandRef::Node(node)], format!("({} {} {})", l.name, kind.mark(), r.name)),
    }
}

/// Chain a gate between an expression root and a bit.
fn gate_expr(kind: OperatorKind, l: BitExpr, r: &Bit, flipped: bool) -> BitExpr {
    let mut core = l.core;
    let rc = r.capture(&mut core.graph)[0];
    let root = core.bits[0];
    let inputs = if flipped { vec![rc, root] } else { vec![root, rc] };
    let node = core
        .graph
        .add_gate(kind, inputs)
        .expect("two inputs match every gate arity");
    core.graph
        .bind_fresh_output(node)
        .expect("fresh auxiliary outputs never conflict");
    let summary = if flipped {
        format!("({} {} {})", r.name(), kind.mark(), core.summary)
    } else {
        format!("({} {} {})", core.summary, kind.mark(), r.name())
    };
    BitExpr {
        core: ExprCore::from_bits(core.graph, vec![OperandRef::Node(node)], summary),
    }
}

/// Join two expressions with a gate.
fn gate_exprs(kind: OperatorKind, l: BitExpr, r: BitExpr) -> BitExpr {
    let mut core = l.core;
    let r_summary = r.core.summary.clone();
    let r_bits = core.merge(r.core);
    let node = core
        .graph
        .add_gate(kind, vec![core.bits[0], r_bits[0]])
        .expect("two inputs match every gate arity");
    core.graph
        .bind_fresh_output(node)
        .expect("fresh auxiliary outputs never conflict");
    let summary = format!("({} {} {})", core.summary, kind.mark(), r_summary);
    BitExpr {
        core: ExprCore::from_bits(core.graph, vec![OperandRef::Node(node)], summary),
    }
}

/// Build an output-compared constraint: `l` is the output, `r` the input.
fn compare(kind: OperatorKind, l: &Bit, r: &Bit, mark: &str) -> BitExpr {
    let mut g = OpGraph::new();
    let out = l.capture(&mut g)[0];
    let input = r.capture(&mut g)[0];
    let node = g
        .add_gate(kind, vec![input])
        .expect("comparisons take one input");
    g.bind_output(node, out)
        .expect("a comparison binding never conflicts");
    BitExpr {
        core: ExprCore::from_bits(g, vec![OperandRef::Node(node)], format!("({} {} {})", l.name, mark, r.name)),
    }
}

impl BitAnd for &Bit {
    type Output = BitExpr;
    fn bitand(self, rhs: &Bit) -> BitExpr {
        gate(OperatorKind::And, self, rhs)
    }
}

impl BitOr for &Bit {
    type Output = BitExpr;
    fn bitor(self, rhs: &Bit) -> BitExpr {
        gate(OperatorKind::Or, self, rhs)
    }
}

impl BitXor for &Bit {
    type Output = BitExpr;
    fn bitxor(self, rhs: &Bit) -> BitExpr {
        gate(OperatorKind::Xor, self, rhs)
    }
}

impl BitAnd<&Bit> for BitExpr {
    type Output = BitExpr;
    fn bitand(self, rhs: &Bit) -> BitExpr {
        gate_expr(OperatorKind::And, self, rhs, false)
    }
}

impl BitAnd<BitExpr> for &Bit {
    type Output = BitExpr;
    fn bitand(self, rhs: BitExpr) -> BitExpr {
        gate_expr(OperatorKind::And, rhs, self, true)
    }
}

impl BitAnd for BitExpr {
    type Output = BitExpr;
    fn bitand(self, rhs: BitExpr) -> BitExpr {
        gate_exprs(OperatorKind::And, self, rhs)
    }
}

impl BitOr<&Bit> for BitExpr {
    type Output = BitExpr;
    fn bitor(self, rhs: &Bit) -> BitExpr {
        gate_expr(OperatorKind::Or, self, rhs, false)
    }
}

impl BitOr<BitExpr> for &Bit {
    type Output = BitExpr;
    fn bitor(self, rhs: BitExpr) -> BitExpr {
        gate_expr(OperatorKind::Or, rhs, self, true)
    }
}

impl BitOr for BitExpr {
    type Output = BitExpr;
    fn bitor(self, rhs: BitExpr) -> BitExpr {
        gate_exprs(OperatorKind::Or, self, rhs)
    }
}

impl BitXor<&Bit> for BitExpr {
    type Output = BitExpr;
    fn bitxor(self, rhs: &Bit) -> BitExpr {
        gate_expr(OperatorKind::Xor, self, rhs, false)
    }
}

impl BitXor<BitExpr> for &Bit {
    type Output = BitExpr;
    fn bitxor(self, rhs: BitExpr) -> BitExpr {
        gate_expr(OperatorKind::Xor, rhs, self, true)
    }
}

impl BitXor for BitExpr {
    type Output = BitExpr;
    fn bitxor(self, rhs: BitExpr) -> BitExpr {
        gate_exprs(OperatorKind::Xor, self, rhs)
    }
}

impl Not for &Bit {
    type Output = BitExpr;

    /// Inversion is a not-equal constraint against a derived `~name`
    /// operand.
    fn not(self) -> BitExpr {
        let mut g = OpGraph::new();
        let input = self.capture(&mut g)[0];
        let out = g.named_cell(format!("~{}", self.name), None, BitValue::Unknown);
        let node = g
            .add_gate(OperatorKind::Neq, vec![input])
            .expect("comparisons take one input");
        g.bind_output(node, OperandRef::Cell(out))
            .expect("binding an unknown output never conflicts");
        BitExpr {
            core: ExprCore::from_bits(g, vec![OperandRef::Node(node)], format!("(~{})", self.name)),
        }
    }
}

impl Not for BitExpr {
    type Output = BitExpr;

    fn not(self) -> BitExpr {
        let mut core = self.core;
        let root = core.bits[0];
        let node = core
            .graph
            .add_gate(OperatorKind::Neq, vec![root])
            .expect("comparisons take one input");
        core.graph
            .bind_fresh_output(node)
            .expect("fresh auxiliary outputs never conflict");
        BitExpr {
            core: ExprCore::from_bits(core.graph, vec![OperandRef::Node(node)], format!("(~{})", core.summary)),
        }
    }
}

/// A named boolean operand; a [`Bit`] with `T`/`F` rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bool {
    name: String,
    value: BitValue,
}

impl Bool {
    /// An undetermined boolean.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: BitValue::Unknown,
        }
    }

    /// A boolean holding a concrete truth value.
    pub fn with_value(name: impl Into<String>, value: bool) -> Self {
        Self {
            name: name.into(),
            value: BitValue::from(value),
        }
    }

    /// The underlying ternary value.
    pub fn value(&self) -> BitValue {
        self.value
    }

    fn as_bit(&self) -> Bit {
        let mut bit = Bit::new(self.name.clone());
        bit.set_value(self.value);
        bit
    }

    /// Conjunction.
    pub fn and(&self, rhs: &Bool) -> BitExpr {
        gate(OperatorKind::And, &self.as_bit(), &rhs.as_bit())
    }

    /// Disjunction.
    pub fn or(&self, rhs: &Bool) -> BitExpr {
        gate(OperatorKind::Or, &self.as_bit(), &rhs.as_bit())
    }

    /// Constrain this boolean to equal `rhs`.
    pub fn equal(&self, rhs: &Bool) -> BitExpr {
        compare(OperatorKind::Eq, &self.as_bit(), &rhs.as_bit(), "==")
    }

    /// Constrain this boolean to differ from `rhs`.
    pub fn not_equal(&self, rhs: &Bool) -> BitExpr {
        compare(OperatorKind::Neq, &self.as_bit(), &rhs.as_bit(), "!=")
    }
}

impl Not for &Bool {
    type Output = BitExpr;
    fn not(self) -> BitExpr {
        !&self.as_bit()
    }
}

impl Operand for Bool {
    fn name(&self) -> &str {
        &self.name
    }

    fn width(&self) -> usize {
        1
    }

    fn resize(&mut self, width: usize) -> TypeResult<()> {
        if width == 1 {
            return Ok(());
        }
        Err(TypeError::NotResizable {
            name: self.name.clone(),
            width: 1,
            needed: width,
        })
    }

    fn bit_value(&self, at: usize) -> BitValue {
        if at == 0 { self.value } else { BitValue::Zero }
    }

    fn capture(&self, g: &mut OpGraph) -> Vec<OperandRef> {
        vec![OperandRef::Cell(g.named_cell(
            self.name.clone(),
            None,
            self.value,
        ))]
    }
}

impl fmt::Display for Bool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self.value {
            BitValue::Zero => 'F',
            BitValue::One => 'T',
            BitValue::Unknown => 'U',
        };
        write!(f, "{}/{}/", self.name, symbol)
    }
}
