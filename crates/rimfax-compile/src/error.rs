//! Error types for the compile crate.

use thiserror::Error;

/// Errors produced while lowering an operation graph to an objective.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompileError {
    /// The graph handed to the compiler was malformed (typically an
    /// operation whose output was never bound).
    #[error("IR error during lowering: {0}")]
    Ir(#[from] rimfax_ir::IrError),

    /// A two-output gate reached the compiler without its ancilla.
    #[error("Operation {0:?} has no ancilla cell; bind its output first")]
    MissingAncilla(rimfax_ir::NodeId),
}

/// Result type for compilation operations.
pub type CompileResult<T> = Result<T, CompileError>;
