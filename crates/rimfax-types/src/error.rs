//! Error types for the typed layer.

use thiserror::Error;

/// Errors raised by typed operands and statements.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TypeError {
    /// A non-resizable assignee would need to grow to the expression
    /// width; the assignee and expression types are incompatible.
    #[error("Assignee '{name}' has {width} bits, needs {needed}, and is not resizable")]
    NotResizable {
        /// Assignee name.
        name: String,
        /// Assignee width.
        width: usize,
        /// Width required by the expression.
        needed: usize,
    },

    /// Mutable bit access beyond the operand's current width.
    #[error("Bit {index} is out of range for a {width}-bit operand")]
    BitIndexOutOfRange {
        /// Requested bit position.
        index: usize,
        /// Operand width.
        width: usize,
    },

    /// Comparison expressions assert a relation between operands and have
    /// no value to bind to an assignee.
    #[error("Expression '{summary}' is a constraint and cannot be assigned")]
    Unassignable {
        /// Rendering of the offending expression.
        summary: String,
    },

    /// Graph-level failure (output conflict, arity mismatch).
    #[error(transparent)]
    Ir(#[from] rimfax_ir::IrError),

    /// Lowering failure.
    #[error(transparent)]
    Compile(#[from] rimfax_compile::CompileError),

    /// Sampler failure while solving a statement.
    #[error(transparent)]
    Anneal(#[from] rimfax_anneal::AnnealError),
}

/// Result type for typed-layer operations.
pub type TypeResult<T> = Result<T, TypeError>;
