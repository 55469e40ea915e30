//! Rimfax QUBO Lowering Compiler
//!
//! This crate lowers operation graphs built with `rimfax-ir` into sparse
//! quadratic objectives ready for an energy-minimizing sampler, and defines
//! the exchange types crossing that boundary in both directions.
//!
//! # Overview
//!
//! ```text
//! OpGraph ──→ QuboCompiler ──→ Qubo ──→ (sampler) ──→ SampleSet
//!                  │                       ▲
//!                  └── penalty templates ──┘
//! ```
//!
//! - [`Qubo`] — the objective: unordered variable pairs → coefficients,
//!   plus a constant offset; supports [`split`](Qubo::split) for
//!   size-limited backends
//! - [`QuboCompiler`] — walks each distinct node once and accumulates the
//!   per-gate penalty templates; *generic* keeps every variable symbolic,
//!   *finalized* substitutes deterministic cell values
//! - [`tables`] — the orthodox per-gate QUBO encodings
//! - [`QuboAnalyzer`] — variable/interaction counts for sizing
//! - [`Sample`]/[`SampleSet`] — solver-returned evaluations
//!
//! # Example
//!
//! ```rust
//! use rimfax_compile::QuboCompiler;
//! use rimfax_ir::{BitValue, OpGraph, OperandRef, OperatorKind};
//!
//! let mut g = OpGraph::new();
//! let a = OperandRef::Cell(g.named_cell("a", None, BitValue::Unknown));
//! let b = OperandRef::Cell(g.named_cell("b", None, BitValue::Unknown));
//! let and = g.add_gate(OperatorKind::And, vec![a, b]).unwrap();
//! g.bind_fresh_output(and).unwrap();
//!
//! let mut compiler = QuboCompiler::new();
//! compiler.compile(&g, &[OperandRef::Node(and)]).unwrap();
//! assert_eq!(compiler.qubo().len(), 4);
//! ```

pub mod analyzer;
pub mod compiler;
pub mod error;
pub mod evaluation;
pub mod qubo;
pub mod tables;

pub use analyzer::QuboAnalyzer;
pub use compiler::QuboCompiler;
pub use error::{CompileError, CompileResult};
pub use evaluation::{Sample, SampleSet};
pub use qubo::{Qubo, VarPair};
