//! Multi-bit unsigned operands.

use std::fmt;
use std::ops::{Add, Div, Mul, Shl, ShlAssign, Shr, ShrAssign, Sub};

use serde::{Deserialize, Serialize};

use rimfax_ir::{BitValue, OpGraph, OperandRef, OperatorKind, ladder};

use crate::error::{TypeError, TypeResult};
use crate::expr::{ExprCore, NumExpr};
use crate::operand::Operand;

/// A named, arbitrary-width unsigned integer operand.
///
/// Bits are ordered LSB first. Fresh bits are unknown; a solver decides
/// them. The operand is resizable: assignments grow it when the bound
/// expression is wider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unsigned {
    name: String,
    bits: Vec<BitValue>,
}

fn bit_len(value: u64) -> usize {
    (64 - value.leading_zeros() as usize).max(1)
}

impl Unsigned {
    /// An unknown operand of the given width.
    pub fn new(name: impl Into<String>, width: usize) -> Self {
        Self {
            name: name.into(),
            bits: vec![BitValue::Unknown; width],
        }
    }

    /// An operand holding a concrete value, sized to the minimal width.
    pub fn with_value(name: impl Into<String>, value: u64) -> Self {
        let mut bits = Vec::with_capacity(bit_len(value));
        for at in 0..bit_len(value) {
            bits.push(BitValue::from_bit(((value >> at) & 1) as u8));
        }
        Self {
            name: name.into(),
            bits,
        }
    }

    /// The operand's numeric value; `None` while any bit is unknown.
    pub fn value(&self) -> Option<u64> {
        let mut value = 0u64;
        for (at, bit) in self.bits.iter().enumerate() {
            let b = bit.bit()?;
            if at < 64 {
                value |= u64::from(b) << at;
            }
        }
        Some(value)
    }

    /// Pin the operand to a concrete value, growing it if needed.
    pub fn set_value(&mut self, value: u64) {
        let width = bit_len(value).max(self.bits.len());
        self.bits = (0..width)
            .map(|at| BitValue::from_bit(((value >> at) & 1) as u8))
            .collect();
    }

    /// The bit at a position; positions beyond the width read as a
    /// synthetic constant `Zero` and never fail.
    pub fn bit(&self, at: usize) -> BitValue {
        self.bits.get(at).copied().unwrap_or(BitValue::Zero)
    }

    /// Set the bit at a position; writing beyond the width is an error.
    pub fn set_bit(&mut self, at: usize, value: BitValue) -> TypeResult<()> {
        let width = self.bits.len();
        match self.bits.get_mut(at) {
            Some(bit) => {
                *bit = value;
                Ok(())
            }
            None => Err(TypeError::BitIndexOutOfRange { index: at, width }),
        }
    }

    /// Resize: grow by appending fresh bits holding `fill`, shrink by
    /// truncation. Neither direction fails.
    pub fn resize_with(&mut self, width: usize, fill: BitValue) {
        self.bits.resize(width, fill);
    }
}

impl Operand for Unsigned {
    fn name(&self) -> &str {
        &self.name
    }

    fn width(&self) -> usize {
        self.bits.len()
    }

    fn is_resizable(&self) -> bool {
        true
    }

    fn resize(&mut self, width: usize) -> TypeResult<()> {
        self.resize_with(width, BitValue::Unknown);
        Ok(())
    }

    fn bit_value(&self, at: usize) -> BitValue {
        self.bit(at)
    }

    fn capture(&self, g: &mut OpGraph) -> Vec<OperandRef> {
        self.bits
            .iter()
            .enumerate()
            .map(|(at, bit)| OperandRef::Cell(g.named_cell(self.name.clone(), Some(at as u32), *bit)))
            .collect()
    }
}

impl fmt::Display for Unsigned {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.bits.len();
        match self.value() {
            Some(_) => {
                let mut text = String::with_capacity(width);
                for at in (0..width).rev() {
                    text.push(self.bit(at).symbol());
                }
                write!(f, "{}/{width}b:{text}/", self.name)
            }
            None => write!(f, "{}/{width}b:U/", self.name),
        }
    }
}

impl Shl<usize> for &Unsigned {
    type Output = Unsigned;

    /// Shift left, inserting `Zero` bits at vacated positions.
    fn shl(self, by: usize) -> Unsigned {
        let mut shifted = self.clone();
        shifted <<= by;
        shifted
    }
}

impl ShlAssign<usize> for Unsigned {
    fn shl_assign(&mut self, by: usize) {
        let width = self.bits.len();
        for at in (0..width).rev() {
            self.bits[at] = if at >= by {
                self.bits[at - by]
            } else {
                BitValue::Zero
            };
        }
    }
}

impl Shr<usize> for &Unsigned {
    type Output = Unsigned;

    /// Shift right, inserting `Zero` bits at vacated positions.
    fn shr(self, by: usize) -> Unsigned {
        let mut shifted = self.clone();
        shifted >>= by;
        shifted
    }
}

impl ShrAssign<usize> for Unsigned {
    fn shr_assign(&mut self, by: usize) {
        let width = self.bits.len();
        for at in 0..width {
            self.bits[at] = if at + by < width {
                self.bits[at + by]
            } else {
                BitValue::Zero
            };
        }
    }
}

/// Bind synthesized bits onto an operand's cells, position by position.
///
/// Node bits are rebound to the operand's cell; pass-through cell bits get
/// an equality constraint instead. Positions beyond the operand's width
/// bind to constant `Zero` cells, so the synthesized number cannot
/// silently overflow past the operand. Returns the constraint roots.
fn bind_onto(g: &mut OpGraph, bits: &[OperandRef], target: &Unsigned) -> Vec<OperandRef> {
    let mut constraints = Vec::with_capacity(bits.len());
    for (at, bit) in bits.iter().enumerate() {
        let out = if at < target.width() {
            g.named_cell(target.name.clone(), Some(at as u32), target.bit(at))
        } else {
            g.aux_value_cell("0", BitValue::Zero)
        };
        match *bit {
            OperandRef::Node(id) => {
                g.bind_output(id, OperandRef::Cell(out))
                    .expect("synthesized sums are unknown and cannot conflict");
                constraints.push(OperandRef::Node(id));
            }
            OperandRef::Cell(cell) => {
                let eq = g
                    .add_gate(OperatorKind::Eq, vec![OperandRef::Cell(cell)])
                    .expect("comparisons take one input");
                g.bind_output(eq, OperandRef::Cell(out))
                    .expect("an unknown equality binding cannot conflict");
                constraints.push(OperandRef::Node(eq));
            }
        }
    }
    constraints
}

/// Fresh auxiliary operand cells for slack/difference/quotient values.
fn aux_operand(g: &mut OpGraph, mark: &str, width: usize) -> Vec<OperandRef> {
    (0..width)
        .map(|_| OperandRef::Cell(g.aux_cell(mark)))
        .collect()
}

fn add_operands(l: &Unsigned, r: &Unsigned) -> NumExpr {
    let mut g = OpGraph::new();
    let lb = l.capture(&mut g);
    let rb = r.capture(&mut g);
    let bits = ladder::add(&mut g, &lb, &rb).expect("ladder synthesis over fresh operands");
    NumExpr {
        core: ExprCore::from_bits(g, bits, format!("({} + {})", l.name, r.name)),
    }
}

impl Add for &Unsigned {
    type Output = NumExpr;
    fn add(self, rhs: &Unsigned) -> NumExpr {
        add_operands(self, rhs)
    }
}

impl Add<&Unsigned> for NumExpr {
    type Output = NumExpr;

    /// Chain a further addend onto an existing ladder; half adders promote
    /// to full adders in place instead of layering new nodes.
    fn add(self, rhs: &Unsigned) -> NumExpr {
        let mut core = self.core;
        let rb = rhs.capture(&mut core.graph);
        let lb = core.bits.clone();
        core.bits =
            ladder::add(&mut core.graph, &lb, &rb).expect("ladder synthesis over fresh operands");
        core.summary = format!("({} + {})", core.summary, rhs.name);
        NumExpr { core }
    }
}

impl Add<NumExpr> for &Unsigned {
    type Output = NumExpr;
    fn add(self, rhs: NumExpr) -> NumExpr {
        let mut core = rhs.core;
        let lb = self.capture(&mut core.graph);
        let rb = core.bits.clone();
        core.bits =
            ladder::add(&mut core.graph, &lb, &rb).expect("ladder synthesis over fresh operands");
        core.summary = format!("({} + {})", self.name, core.summary);
        NumExpr { core }
    }
}

impl Add for NumExpr {
    type Output = NumExpr;
    fn add(self, rhs: NumExpr) -> NumExpr {
        let mut core = self.core;
        let r_summary = rhs.core.summary.clone();
        let rb = core.merge(rhs.core);
        let lb = core.bits.clone();
        core.bits =
            ladder::add(&mut core.graph, &lb, &rb).expect("ladder synthesis over fresh operands");
        core.summary = format!("({} + {})", core.summary, r_summary);
        NumExpr { core }
    }
}

impl Sub for &Unsigned {
    type Output = NumExpr;

    /// `x - y` is synthesized as the inverse addition `d + y = x` over an
    /// auxiliary difference `d`, which carries the expression's value.
    fn sub(self, rhs: &Unsigned) -> NumExpr {
        let mut g = OpGraph::new();
        let y = rhs.capture(&mut g);
        let d = aux_operand(&mut g, "-", self.width().max(rhs.width()).max(1));
        let sum = ladder::add(&mut g, &d, &y).expect("ladder synthesis over fresh operands");
        let constraints = bind_onto(&mut g, &sum, self);
        NumExpr {
            core: ExprCore {
                graph: g,
                bits: d,
                constraints,
                constraint_only: false,
                summary: format!("({} - {})", self.name, rhs.name),
            },
        }
    }
}

impl Mul for &Unsigned {
    type Output = NumExpr;

    /// Shift-and-add partial-product synthesis.
    fn mul(self, rhs: &Unsigned) -> NumExpr {
        let mut g = OpGraph::new();
        let lb = self.capture(&mut g);
        let rb = rhs.capture(&mut g);
        let bits =
            ladder::multiply(&mut g, &lb, &rb).expect("partial products over fresh operands");
        NumExpr {
            core: ExprCore::from_bits(g, bits, format!("({} * {})", self.name, rhs.name)),
        }
    }
}

impl Div for &Unsigned {
    type Output = NumExpr;

    /// Exact division: the inverse multiplication `q * y = x` over an
    /// auxiliary quotient `q`. Non-divisible pairs have no zero-energy
    /// sample.
    fn div(self, rhs: &Unsigned) -> NumExpr {
        let mut g = OpGraph::new();
        let y = rhs.capture(&mut g);
        let q = aux_operand(&mut g, "/", self.width().max(1));
        let product = ladder::multiply(&mut g, &q, &y).expect("partial products over fresh operands");
        let constraints = bind_onto(&mut g, &product, self);
        NumExpr {
            core: ExprCore {
                graph: g,
                bits: q,
                constraints,
                constraint_only: false,
                summary: format!("({} / {})", self.name, rhs.name),
            },
        }
    }
}

impl Unsigned {
    /// Constrain this operand to equal `rhs`, bit by bit over the
    /// reconciled width.
    pub fn equal(&self, rhs: &Unsigned) -> NumExpr {
        let mut g = OpGraph::new();
        let y = rhs.capture(&mut g);
        let width = self.width().max(rhs.width()).max(1);
        let mut bits = Vec::with_capacity(width);
        for at in 0..width {
            let input = match y.get(at) {
                Some(r) => *r,
                None => OperandRef::Cell(g.aux_value_cell("0", BitValue::Zero)),
            };
            let out = if at < self.width() {
                g.named_cell(self.name.clone(), Some(at as u32), self.bit(at))
            } else {
                g.aux_value_cell("0", BitValue::Zero)
            };
            let eq = g
                .add_gate(OperatorKind::Eq, vec![input])
                .expect("comparisons take one input");
            g.bind_output(eq, OperandRef::Cell(out))
                .expect("an unknown equality binding cannot conflict");
            bits.push(OperandRef::Node(eq));
        }
        NumExpr {
            core: ExprCore {
                graph: g,
                bits,
                constraints: vec![],
                constraint_only: true,
                summary: format!("({} == {})", self.name, rhs.name),
            },
        }
    }

    /// Constrain this operand to differ from `rhs`: the bitwise xor of the
    /// reconciled operands, or-reduced and pinned to one.
    pub fn not_equal(&self, rhs: &Unsigned) -> NumExpr {
        let mut g = OpGraph::new();
        let x = self.capture(&mut g);
        let y = rhs.capture(&mut g);
        let width = self.width().max(rhs.width()).max(1);
        let mut diffs = Vec::with_capacity(width);
        for at in 0..width {
            let a = x
                .get(at)
                .copied()
                .unwrap_or_else(|| OperandRef::Cell(g.aux_value_cell("0", BitValue::Zero)));
            let b = y
                .get(at)
                .copied()
                .unwrap_or_else(|| OperandRef::Cell(g.aux_value_cell("0", BitValue::Zero)));
            let xor = g
                .add_gate(OperatorKind::Xor, vec![a, b])
                .expect("two inputs match every gate arity");
            g.bind_fresh_output(xor)
                .expect("fresh auxiliary outputs never conflict");
            diffs.push(OperandRef::Node(xor));
        }
        let mut acc = diffs[0];
        for diff in &diffs[1..] {
            let or = g
                .add_gate(OperatorKind::Or, vec![acc, *diff])
                .expect("two inputs match every gate arity");
            g.bind_fresh_output(or)
                .expect("fresh auxiliary outputs never conflict");
            acc = OperandRef::Node(or);
        }
        // Pin the reduction to one: at least one bit differs.
        let one = g.aux_value_cell("1", BitValue::One);
        if let OperandRef::Node(id) = acc {
            g.bind_output(id, OperandRef::Cell(one))
                .expect("an unknown reduction binding cannot conflict");
        }
        NumExpr {
            core: ExprCore {
                graph: g,
                bits: vec![acc],
                constraints: vec![],
                constraint_only: true,
                summary: format!("({} != {})", self.name, rhs.name),
            },
        }
    }

    /// Constrain `self >= rhs` via the slack ladder `rhs + d = self`.
    pub fn greater_equal(&self, rhs: &Unsigned) -> NumExpr {
        self.order(rhs, false, ">=")
    }

    /// Constrain `self > rhs` via the slack ladder `rhs + d + 1 = self`.
    pub fn greater(&self, rhs: &Unsigned) -> NumExpr {
        self.order(rhs, true, ">")
    }

    /// Constrain `self <= rhs` via the slack ladder `self + d = rhs`.
    pub fn less_equal(&self, rhs: &Unsigned) -> NumExpr {
        let mut expr = rhs.order(self, false, "<=");
        expr.core.summary = format!("({} <= {})", self.name, rhs.name);
        expr
    }

    /// Constrain `self < rhs` via the slack ladder `self + d + 1 = rhs`.
    pub fn less(&self, rhs: &Unsigned) -> NumExpr {
        let mut expr = rhs.order(self, true, "<");
        expr.core.summary = format!("({} < {})", self.name, rhs.name);
        expr
    }

    /// The shared slack ladder: `rhs + d [+ 1] = self`.
    fn order(&self, rhs: &Unsigned, strict: bool, mark: &str) -> NumExpr {
        let mut g = OpGraph::new();
        let y = rhs.capture(&mut g);
        let d = aux_operand(&mut g, mark, self.width().max(1));
        let width = y.len().max(d.len());
        let mut columns = vec![Vec::new(); width];
        for (at, column) in columns.iter_mut().enumerate() {
            if let Some(bit) = y.get(at) {
                column.push(*bit);
            }
            if let Some(bit) = d.get(at) {
                column.push(*bit);
            }
        }
        if strict {
            columns[0].push(OperandRef::Cell(g.aux_value_cell("1", BitValue::One)));
        }
        let sum = ladder::reduce_columns(&mut g, columns).expect("ladder synthesis over fresh operands");
        let constraints = bind_onto(&mut g, &sum, self);
        NumExpr {
            core: ExprCore {
                graph: g,
                bits: sum,
                constraints,
                constraint_only: true,
                summary: format!("({} {} {})", self.name, mark, rhs.name),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_width_constants() {
        assert_eq!(Unsigned::with_value("x", 0).width(), 1);
        assert_eq!(Unsigned::with_value("x", 1).width(), 1);
        assert_eq!(Unsigned::with_value("x", 5).width(), 3);
        assert_eq!(Unsigned::with_value("x", 255).width(), 8);
        assert_eq!(Unsigned::with_value("x", 5).value(), Some(5));
    }

    #[test]
    fn test_bit_access() {
        let mut x = Unsigned::new("x", 3);
        assert_eq!(x.value(), None);
        // Reads beyond the width are synthetic zeros, never errors.
        assert_eq!(x.bit(17), BitValue::Zero);
        x.set_bit(0, BitValue::One).unwrap();
        x.set_bit(1, BitValue::Zero).unwrap();
        x.set_bit(2, BitValue::One).unwrap();
        assert_eq!(x.value(), Some(5));
        assert!(matches!(
            x.set_bit(3, BitValue::One).unwrap_err(),
            TypeError::BitIndexOutOfRange { index: 3, width: 3 }
        ));
    }

    #[test]
    fn test_resize() {
        let mut x = Unsigned::with_value("x", 5);
        x.resize_with(5, BitValue::Zero);
        assert_eq!(x.value(), Some(5));
        x.resize_with(2, BitValue::Zero);
        assert_eq!(x.value(), Some(1)); // truncation is deliberate
    }

    #[test]
    fn test_shifts() {
        let x = Unsigned::with_value("x", 0b0110);
        let mut left = &x << 1;
        assert_eq!(left.value(), Some(0b1100));
        left >>= 2;
        assert_eq!(left.value(), Some(0b0011));
        // Vacated positions hold zeros.
        let right = &x >> 2;
        assert_eq!(right.value(), Some(0b0001));
    }

    #[test]
    fn test_display() {
        let x = Unsigned::with_value("x", 5);
        assert_eq!(format!("{x}"), "x/3b:101/");
        let u = Unsigned::new("u", 2);
        assert_eq!(format!("{u}"), "u/2b:U/");
    }

    #[test]
    fn test_addition_folds() {
        let x = Unsigned::with_value("x", 5);
        let y = Unsigned::with_value("y", 9);
        let expr = &x + &y;
        assert_eq!(expr.value(), Some(14));
    }

    #[test]
    fn test_chained_addition_folds() {
        let x = Unsigned::with_value("x", 3);
        let y = Unsigned::with_value("y", 5);
        let z = Unsigned::with_value("z", 7);
        let expr = &x + &y + &z;
        assert_eq!(expr.value(), Some(15));
        assert_eq!(expr.render(false), "((x + y) + z)");
    }

    #[test]
    fn test_multiplication_folds() {
        let x = Unsigned::with_value("x", 6);
        let y = Unsigned::with_value("y", 7);
        assert_eq!((&x * &y).value(), Some(42));
    }

    #[test]
    fn test_unknown_addition_does_not_fold() {
        let x = Unsigned::new("x", 2);
        let y = Unsigned::with_value("y", 1);
        assert_eq!((&x + &y).value(), None);
    }
}
