//! Error types for the sampler boundary.

use thiserror::Error;

/// Errors surfaced by samplers.
///
/// Sampler failures are fatal for the compile/solve attempt: nothing is
/// retried internally and a failed solve yields no evaluations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AnnealError {
    /// The objective exceeds what the sampler can enumerate or embed.
    /// Pre-partition the objective with `Qubo::split` instead.
    #[error("Objective has {variables} variables, sampler limit is {limit}")]
    TooLarge {
        /// Distinct variables in the submitted objective.
        variables: usize,
        /// The sampler's variable limit.
        limit: usize,
    },

    /// The backend rejected or failed the submission.
    #[error("Sampler '{sampler}' failed: {reason}")]
    SamplerFailed {
        /// Sampler name.
        sampler: String,
        /// Failure description.
        reason: String,
    },
}

/// Result type for sampler operations.
pub type AnnealResult<T> = Result<T, AnnealError>;
