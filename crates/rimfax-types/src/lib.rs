//! Rimfax Typed Operand Layer
//!
//! The user-facing surface of Rimfax: typed operands with ordinary
//! operator syntax that build bit-level operation graphs, compile to QUBO
//! objectives, and decode sampler results back into values.
//!
//! # Types
//!
//! | Type | Width | Operations |
//! |------|-------|------------|
//! | [`Bit`] | 1 | `&`, `\|`, `^`, `!`, nand/nor/xnor, comparisons |
//! | [`Bool`] | 1 | and/or/not, comparisons |
//! | [`Unsigned`] | any | `+`, `-`, `*`, `/`, `<<`, `>>`, comparisons |
//! | [`Signed`] | any | `+`, `-` (two's complement), equality |
//!
//! # Statements
//!
//! Expressions, [`Assignment`]s, [`Block`]s and [`Function`]s all
//! implement [`Statement`]: they compile into a shared objective, solve
//! against any [`Sampler`](rimfax_anneal::Sampler), and decode per-sample
//! values.
//!
//! # Example: solving a constrained addition
//!
//! ```rust
//! use rimfax_anneal::ExhaustiveSampler;
//! use rimfax_types::{Statement, Unsigned};
//!
//! let a = Unsigned::new("a", 2);
//! let b = Unsigned::new("b", 2);
//! let mut sum = Unsigned::with_value("S", 5);
//!
//! let mut assignment = sum.assign(&a + &b).unwrap();
//! let samples = assignment.solve_with(&ExhaustiveSampler::new()).unwrap();
//!
//! // Every ground sample satisfies a + b == 5.
//! for id in 0..samples.len() {
//!     let a = assignment.decode_operand("a", id).unwrap();
//!     let b = assignment.decode_operand("b", id).unwrap();
//!     assert_eq!(a + b, 5);
//! }
//! ```

pub mod assign;
pub mod bit;
pub mod block;
pub mod error;
pub mod expr;
pub mod function;
pub mod operand;
pub mod signed;
pub mod unsigned;

pub use assign::Assignment;
pub use bit::{Bit, Bool};
pub use block::{Block, Statement};
pub use error::{TypeError, TypeResult};
pub use expr::{BitExpr, NumExpr};
pub use function::Function;
pub use operand::Operand;
pub use signed::Signed;
pub use unsigned::Unsigned;
