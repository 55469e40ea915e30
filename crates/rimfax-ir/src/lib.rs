//! Rimfax operand and operation graph model
//!
//! This crate provides the core data structures for representing bit-level
//! expressions in Rimfax. It forms the foundation of the whole compilation
//! stack: typed operands (in `rimfax-types`) build graphs out of these
//! primitives, and the lowering compiler (in `rimfax-compile`) walks them to
//! emit quadratic objectives.
//!
//! # Overview
//!
//! Expressions are arenas of [`Cell`]s (binary operands with a ternary
//! value domain) and [`Node`]s (operations), addressed by stable
//! [`CellId`]/[`NodeId`] handles. Sharing — the same cell feeding several
//! operations — is expressed as handle references, never as aliased
//! pointers.
//!
//! # Core components
//!
//! - **Values**: [`BitValue`] — ternary `{Zero, One, Unknown}` domain
//! - **Cells**: [`Cell`], [`CellLabel`] — named or auxiliary leaf operands
//! - **Operations**: [`Node`], [`OperatorKind`] — the closed gate set,
//!   including the half/full adder and its carry companion
//! - **Graph**: [`OpGraph`] — the arena, with constant folding at output
//!   binding time and the half-adder→full-adder fusion entry point
//! - **Synthesis**: [`ladder`] — ripple-carry column reduction for
//!   addition and multiplication
//! - **Registry**: [`OperatorRegistry`] — late-bound symbolic tag lookup
//!
//! # Example: a folded AND gate
//!
//! ```rust
//! use rimfax_ir::{BitValue, OpGraph, OperandRef, OperatorKind};
//!
//! let mut g = OpGraph::new();
//! let a = OperandRef::Cell(g.named_cell("a", None, BitValue::One));
//! let b = OperandRef::Cell(g.named_cell("b", None, BitValue::One));
//! let and = g.add_gate(OperatorKind::And, vec![a, b]).unwrap();
//! let out = g.bind_fresh_output(and).unwrap();
//!
//! // Both inputs are concrete, so the auxiliary output folded immediately.
//! assert_eq!(g.cell(out).value(), BitValue::One);
//! ```

pub mod cell;
pub mod error;
pub mod graph;
pub mod ladder;
pub mod node;
pub mod registry;
pub mod value;

pub use cell::{Cell, CellId, CellLabel};
pub use error::{IrError, IrResult};
pub use graph::OpGraph;
pub use node::{Node, NodeId, OperandRef, OperatorKind};
pub use registry::OperatorRegistry;
pub use value::BitValue;
