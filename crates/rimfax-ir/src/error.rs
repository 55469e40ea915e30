//! Error types for the IR crate.

use thiserror::Error;

/// Errors that can occur while building or mutating an operation graph.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// Operator given the wrong number of inputs.
    #[error("Operator '{op}' requires {expected} inputs, got {got}")]
    ArityMismatch {
        /// Operator mark.
        op: String,
        /// Declared input count.
        expected: usize,
        /// Actual input count.
        got: usize,
    },

    /// The half-adder/full-adder fusion entry accepts only 2 or 3 inputs.
    #[error("Adder fusion takes 2 or 3 inputs, got {0}")]
    FusionArity(usize),

    /// Attempt to set a value directly on an operation; operation values
    /// are always derived from inputs.
    #[error("Cannot set the value of operation {0:?}: operation values are derived")]
    DerivedValue(crate::NodeId),

    /// An output binding whose concrete value conflicts with the
    /// operation's computed value.
    #[error("Output '{cell}' holds {bound} but the operation computes {computed}")]
    OutputConflict {
        /// Variable identifier of the conflicting output cell.
        cell: String,
        /// Value already held by the output.
        bound: u8,
        /// Value computed from the operation's inputs.
        computed: u8,
    },

    /// Operator tag not present in the registry.
    #[error("Unknown operator tag '{0}'")]
    UnknownOperator(String),

    /// A node reference did not resolve to a leaf cell.
    #[error("Operation {0:?} has no bound output")]
    UnboundOutput(crate::NodeId),
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
