//! Quadratic penalty templates, one per operator kind.
//!
//! Each template is the orthodox QUBO encoding of its gate: a quadratic
//! form over slot indices whose ground states (energy 0) are exactly the
//! valid input/output configurations of the gate. Slot order:
//!
//! - two-input gates: `[a, b, r]`
//! - comparisons (output-compared): `[x, r]`
//! - `Xor` (half adder): `[a, b, s, c]` with the carry as fourth slot
//! - `Adder` (full adder): `[a, b, d, s, c]`
//! - `Nxor`: `[a, b, s, c]` with the ancilla as fourth slot
//!
//! The addition templates are expansions of the defining constraints
//! `a + b = s + 2c` and `a + b + d = s + 2c`; the comparison templates are
//! the minimal two-variable order penalties.

use rimfax_ir::OperatorKind;

/// A penalty template over slot indices.
#[derive(Debug, Clone, Copy)]
pub struct Penalty {
    /// Number of variable slots.
    pub slots: usize,
    /// Quadratic form entries `(slot_i, slot_j, coefficient)`; `i == j`
    /// entries are linear terms.
    pub terms: &'static [(usize, usize, f64)],
    /// Constant offset making satisfied configurations energy 0.
    pub offset: f64,
}

const AND: Penalty = Penalty {
    slots: 3,
    terms: &[(0, 1, 1.0), (0, 2, -2.0), (1, 2, -2.0), (2, 2, 3.0)],
    offset: 0.0,
};

const NAND: Penalty = Penalty {
    slots: 3,
    terms: &[
        (0, 1, 1.0),
        (0, 2, 2.0),
        (1, 2, 2.0),
        (0, 0, -2.0),
        (1, 1, -2.0),
        (2, 2, -3.0),
    ],
    offset: 3.0,
};

const OR: Penalty = Penalty {
    slots: 3,
    terms: &[
        (0, 1, 1.0),
        (0, 0, 1.0),
        (1, 1, 1.0),
        (0, 2, -2.0),
        (1, 2, -2.0),
        (2, 2, 1.0),
    ],
    offset: 0.0,
};

const NOR: Penalty = Penalty {
    slots: 3,
    terms: &[
        (0, 1, 1.0),
        (0, 0, -1.0),
        (1, 1, -1.0),
        (0, 2, 2.0),
        (1, 2, 2.0),
        (2, 2, -1.0),
    ],
    offset: 1.0,
};

/// Half adder, `(a + b - s - 2c)²`.
const XOR: Penalty = Penalty {
    slots: 4,
    terms: &[
        (0, 0, 1.0),
        (1, 1, 1.0),
        (2, 2, 1.0),
        (3, 3, 4.0),
        (0, 1, 2.0),
        (0, 2, -2.0),
        (1, 2, -2.0),
        (0, 3, -4.0),
        (1, 3, -4.0),
        (2, 3, 4.0),
    ],
    offset: 0.0,
};

/// `(a + b + s - 1 - 2c)²` — nxor with its product ancilla.
const NXOR: Penalty = Penalty {
    slots: 4,
    terms: &[
        (0, 0, -1.0),
        (1, 1, -1.0),
        (2, 2, -1.0),
        (3, 3, 8.0),
        (0, 1, 2.0),
        (0, 2, 2.0),
        (1, 2, 2.0),
        (0, 3, -4.0),
        (1, 3, -4.0),
        (2, 3, -4.0),
    ],
    offset: 1.0,
};

/// Full adder, `(a + b + d - s - 2c)²`.
const ADDER: Penalty = Penalty {
    slots: 5,
    terms: &[
        (0, 0, 1.0),
        (1, 1, 1.0),
        (2, 2, 1.0),
        (3, 3, 1.0),
        (4, 4, 4.0),
        (0, 1, 2.0),
        (0, 2, 2.0),
        (1, 2, 2.0),
        (0, 3, -2.0),
        (1, 3, -2.0),
        (2, 3, -2.0),
        (0, 4, -4.0),
        (1, 4, -4.0),
        (2, 4, -4.0),
        (3, 4, 4.0),
    ],
    offset: 0.0,
};

/// `(x - r)²`.
const EQ: Penalty = Penalty {
    slots: 2,
    terms: &[(0, 0, 1.0), (1, 1, 1.0), (0, 1, -2.0)],
    offset: 0.0,
};

/// `(x + r - 1)²`.
const NEQ: Penalty = Penalty {
    slots: 2,
    terms: &[(0, 0, -1.0), (1, 1, -1.0), (0, 1, 2.0)],
    offset: 1.0,
};

const LT: Penalty = Penalty {
    slots: 2,
    terms: &[(1, 1, -1.0), (0, 1, 1.0)],
    offset: 1.0,
};

const LE: Penalty = Penalty {
    slots: 2,
    terms: &[(0, 0, 1.0), (0, 1, -1.0)],
    offset: 0.0,
};

const GT: Penalty = Penalty {
    slots: 2,
    terms: &[(0, 0, -1.0), (0, 1, 1.0)],
    offset: 1.0,
};

const GE: Penalty = Penalty {
    slots: 2,
    terms: &[(1, 1, 1.0), (0, 1, -1.0)],
    offset: 0.0,
};

/// The penalty template of an operator kind; `None` for `Carry`, which is
/// constrained jointly by its owning addition's template.
pub fn penalty(kind: OperatorKind) -> Option<Penalty> {
    match kind {
        OperatorKind::And => Some(AND),
        OperatorKind::Nand => Some(NAND),
        OperatorKind::Or => Some(OR),
        OperatorKind::Nor => Some(NOR),
        OperatorKind::Xor => Some(XOR),
        OperatorKind::Nxor => Some(NXOR),
        OperatorKind::Eq => Some(EQ),
        OperatorKind::Neq => Some(NEQ),
        OperatorKind::Lt => Some(LT),
        OperatorKind::Le => Some(LE),
        OperatorKind::Gt => Some(GT),
        OperatorKind::Ge => Some(GE),
        OperatorKind::Adder => Some(ADDER),
        OperatorKind::Carry => None,
    }
}
