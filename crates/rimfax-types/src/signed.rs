//! Multi-bit signed (two's complement) operands.

use std::fmt;
use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

use rimfax_ir::{BitValue, OpGraph, OperandRef, OperatorKind, ladder};

use crate::error::TypeResult;
use crate::expr::{ExprCore, NumExpr};
use crate::operand::Operand;

/// A named, arbitrary-width signed integer operand in two's complement.
///
/// Bits are LSB first; the top bit is the sign. Width reconciliation
/// sign-extends, so mixing widths behaves like ordinary two's-complement
/// arithmetic. Supports addition, subtraction and equality; richer
/// arithmetic stays on [`Unsigned`](crate::Unsigned).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signed {
    name: String,
    bits: Vec<BitValue>,
}

impl Signed {
    /// An unknown operand of the given width (at least one bit).
    pub fn new(name: impl Into<String>, width: usize) -> Self {
        Self {
            name: name.into(),
            bits: vec![BitValue::Unknown; width.max(1)],
        }
    }

    /// An operand holding a concrete value, sized to the minimal
    /// two's-complement width.
    pub fn with_value(name: impl Into<String>, value: i64) -> Self {
        let magnitude = if value < 0 { !value } else { value } as u64;
        let width = (64 - magnitude.leading_zeros() as usize) + 1;
        let raw = value as u64;
        let bits = (0..width)
            .map(|at| BitValue::from_bit(((raw >> at) & 1) as u8))
            .collect();
        Self {
            name: name.into(),
            bits,
        }
    }

    /// The operand's numeric value; `None` while any bit is unknown.
    pub fn value(&self) -> Option<i64> {
        let width = self.bits.len();
        let mut raw = 0u64;
        for (at, bit) in self.bits.iter().enumerate() {
            let b = bit.bit()?;
            if at < 64 {
                raw |= u64::from(b) << at;
            }
        }
        // Sign-extend from the top bit.
        if width < 64 && (raw >> (width - 1)) & 1 == 1 {
            raw |= u64::MAX << width;
        }
        Some(raw as i64)
    }

    /// The bit at a position; positions beyond the width read as the sign
    /// extension of the top bit.
    pub fn bit(&self, at: usize) -> BitValue {
        self.bits
            .get(at)
            .copied()
            .unwrap_or_else(|| *self.bits.last().expect("signed operands have at least one bit"))
    }

    /// Capture sign-extended to `width`: positions past the operand's top
    /// bit reuse the sign cell reference, sharing the variable.
    fn capture_extended(&self, g: &mut OpGraph, width: usize) -> Vec<OperandRef> {
        let mut refs = self.capture(g);
        let sign = *refs.last().expect("signed operands have at least one bit");
        while refs.len() < width {
            refs.push(sign);
        }
        refs
    }
}

impl Operand for Signed {
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
        let fill = match self.bits.last() {
            Some(sign) if sign.is_known() => *sign,
            _ => BitValue::Unknown,
        };
        self.bits.resize(width.max(1), fill);
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

impl fmt::Display for Signed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.bits.len();
        match self.value() {
            Some(_) => {
                let mut text = String::with_capacity(width);
                for at in (0..width).rev() {
                    text.push(self.bits[at].symbol());
                }
                write!(f, "{}/{width}b:{text}/", self.name)
            }
            None => write!(f, "{}/{width}b:U/", self.name),
        }
    }
}

impl Add for &Signed {
    type Output = NumExpr;

    /// Two's-complement addition over the sign-extended common width; the
    /// final carry is discarded (wraparound semantics).
    fn add(self, rhs: &Signed) -> NumExpr {
        let width = self.width().max(rhs.width()) + 1;
        let mut g = OpGraph::new();
        let lx = self.capture_extended(&mut g, width);
        let rx = rhs.capture_extended(&mut g, width);
        let mut bits = ladder::add(&mut g, &lx, &rx).expect("ladder synthesis over fresh operands");
        bits.truncate(width);
        NumExpr {
            core: ExprCore::from_bits(g, bits, format!("({} + {})", self.name, rhs.name)),
        }
    }
}

impl Sub for &Signed {
    type Output = NumExpr;

    /// `x - y = x + !y + 1` over the sign-extended common width.
    fn sub(self, rhs: &Signed) -> NumExpr {
        let width = self.width().max(rhs.width()) + 1;
        let mut g = OpGraph::new();
        let lx = self.capture_extended(&mut g, width);
        let ry = rhs.capture_extended(&mut g, width);

        // Bitwise complement of the subtrahend: concrete bits flip at
        // construction time, unknown bits get a not-equal node.
        let mut complement = Vec::with_capacity(width);
        for r in &ry {
            let flipped = match g.value_of(*r).bit() {
                Some(bit) => {
                    OperandRef::Cell(g.aux_value_cell("~", BitValue::from_bit(1 - bit)))
                }
                None => {
                    let not = g
                        .add_gate(OperatorKind::Neq, vec![*r])
                        .expect("comparisons take one input");
                    g.bind_fresh_output(not)
                        .expect("fresh auxiliary outputs never conflict");
                    OperandRef::Node(not)
                }
            };
            complement.push(flipped);
        }

        let mut columns = vec![Vec::new(); width];
        for (at, column) in columns.iter_mut().enumerate() {
            column.push(lx[at]);
            column.push(complement[at]);
        }
        columns[0].push(OperandRef::Cell(g.aux_value_cell("1", BitValue::One)));
        let mut bits =
            ladder::reduce_columns(&mut g, columns).expect("ladder synthesis over fresh operands");
        bits.truncate(width);
        NumExpr {
            core: ExprCore::from_bits(g, bits, format!("({} - {})", self.name, rhs.name)),
        }
    }
}

impl Signed {
    /// Constrain this operand to equal `rhs`, bit by bit over the
    /// sign-extended common width.
    pub fn equal(&self, rhs: &Signed) -> NumExpr {
        let width = self.width().max(rhs.width());
        let mut g = OpGraph::new();
        let y = rhs.capture_extended(&mut g, width);
        let x = self.capture_extended(&mut g, width);
        let mut bits = Vec::with_capacity(width);
        for at in 0..width {
            let eq = g
                .add_gate(OperatorKind::Eq, vec![y[at]])
                .expect("comparisons take one input");
            g.bind_output(eq, x[at])
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
}
