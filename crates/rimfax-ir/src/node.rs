//! Operation nodes and the closed operator kind set.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::cell::CellId;

/// Stable handle of an operation node within an [`OpGraph`](crate::OpGraph).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node{}", self.0)
    }
}

/// Reference to an operand: either a leaf cell or another operation node.
///
/// Node references resolve through the node's output to a leaf cell; the
/// same reference may appear as an input to many nodes (sharing).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperandRef {
    /// A leaf cell.
    Cell(CellId),
    /// An operation node, standing for its output.
    Node(NodeId),
}

/// The closed set of operator kinds.
///
/// The equality family (`Eq` through `Ge`) is unary-input and
/// output-compared: the operator relates its single input against the value
/// of its own output operand rather than against a second input. `Xor`
/// doubles as the half adder, `Adder` is the three-input full adder, and
/// `Carry` is the companion operation owned by either of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperatorKind {
    /// Logical conjunction.
    And,
    /// Negated conjunction.
    Nand,
    /// Logical disjunction.
    Or,
    /// Negated disjunction.
    Nor,
    /// Exclusive or; also the half adder (sum bit).
    Xor,
    /// Negated exclusive or; a two-output gate (needs an ancilla).
    Nxor,
    /// Input equals output.
    Eq,
    /// Input differs from output.
    Neq,
    /// Input less than output.
    Lt,
    /// Input less than or equal to output.
    Le,
    /// Input greater than output.
    Gt,
    /// Input greater than or equal to output.
    Ge,
    /// Three-input full adder (sum bit).
    Adder,
    /// Carry companion of an `Xor`/`Adder` node.
    Carry,
}

impl OperatorKind {
    /// Symbolic mark used in auxiliary labels and rendered expressions.
    pub fn mark(&self) -> &'static str {
        match self {
            OperatorKind::And => "&",
            OperatorKind::Nand => "!&",
            OperatorKind::Or => "|",
            OperatorKind::Nor => "!|",
            OperatorKind::Xor => "^",
            OperatorKind::Nxor => "!^",
            OperatorKind::Eq => "==",
            OperatorKind::Neq => "!=",
            OperatorKind::Lt => "<",
            OperatorKind::Le => "<=",
            OperatorKind::Gt => ">",
            OperatorKind::Ge => ">=",
            OperatorKind::Adder => "+",
            OperatorKind::Carry => "#",
        }
    }

    /// Declared input count; `None` for `Carry`, whose inputs mirror its
    /// owning addition.
    pub fn arity(&self) -> Option<usize> {
        match self {
            OperatorKind::And
            | OperatorKind::Nand
            | OperatorKind::Or
            | OperatorKind::Nor
            | OperatorKind::Xor
            | OperatorKind::Nxor => Some(2),
            OperatorKind::Eq
            | OperatorKind::Neq
            | OperatorKind::Lt
            | OperatorKind::Le
            | OperatorKind::Gt
            | OperatorKind::Ge => Some(1),
            OperatorKind::Adder => Some(3),
            OperatorKind::Carry => None,
        }
    }

    /// Whether this kind compares its input against its output operand.
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            OperatorKind::Eq
                | OperatorKind::Neq
                | OperatorKind::Lt
                | OperatorKind::Le
                | OperatorKind::Gt
                | OperatorKind::Ge
        )
    }

    /// Whether this kind owns a carry companion.
    pub fn is_addition(&self) -> bool {
        matches!(self, OperatorKind::Xor | OperatorKind::Adder)
    }

    /// Pure truth function over concrete input values (and, for the
    /// comparison family, the concrete output value).
    ///
    /// Returns `None` when the kind is output-compared and no output value
    /// is available. `Carry` implements the full-adder majority rule: the
    /// carry is 1 when at least two inputs are 1.
    pub fn calculate(&self, ins: &[u8], out: Option<u8>) -> Option<u8> {
        let v = match self {
            OperatorKind::And => ins[0] & ins[1],
            OperatorKind::Nand => 1 - (ins[0] & ins[1]),
            OperatorKind::Or => ins[0] | ins[1],
            OperatorKind::Nor => 1 - (ins[0] | ins[1]),
            OperatorKind::Nxor => 1 - (ins[0] ^ ins[1]),
            OperatorKind::Xor | OperatorKind::Adder => {
                ins.iter().map(|v| u32::from(*v)).sum::<u32>() as u8 & 1
            }
            OperatorKind::Carry => u8::from(ins.iter().map(|v| u32::from(*v)).sum::<u32>() >= 2),
            OperatorKind::Eq => u8::from(ins[0] == out?),
            OperatorKind::Neq => u8::from(ins[0] != out?),
            OperatorKind::Lt => u8::from(ins[0] < out?),
            OperatorKind::Le => u8::from(ins[0] <= out?),
            OperatorKind::Gt => u8::from(ins[0] > out?),
            OperatorKind::Ge => u8::from(ins[0] >= out?),
        };
        Some(v)
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mark())
    }
}

/// An operation node.
///
/// A node's value is purely derived from its inputs (and, for the
/// comparison family, its output); it is never independently settable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Operator kind.
    pub kind: OperatorKind,
    /// Ordered input references (shared, not owned).
    pub inputs: Vec<OperandRef>,
    /// Output reference; bound after construction.
    pub output: Option<OperandRef>,
    /// Carry companion node for `Xor`/`Adder` kinds.
    pub carry: Option<NodeId>,
    /// Owning addition for `Carry` kinds.
    pub owner: Option<NodeId>,
    /// Ancilla cell for two-output gates (`Nxor`).
    pub ancilla: Option<CellId>,
    /// Set once a half adder has been promoted to a full adder by fusion;
    /// a promoted node can never absorb another input.
    pub extended: bool,
}

impl Node {
    /// Create an unbound node.
    pub fn new(kind: OperatorKind, inputs: Vec<OperandRef>) -> Self {
        Self {
            kind,
            inputs,
            output: None,
            carry: None,
            owner: None,
            ancilla: None,
            extended: false,
        }
    }
}
