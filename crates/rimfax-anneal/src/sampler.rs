//! The sampler trait — the boundary between the compiler and an
//! energy-minimizing backend.

use rimfax_compile::{Qubo, SampleSet};

use crate::error::AnnealResult;

/// An energy-minimizing sampler for quadratic objectives.
///
/// # Contract
///
/// - `sample()` is synchronous and potentially long-running; there is no
///   cancellation. Callers wanting bounded submissions pre-partition the
///   objective with [`Qubo::split`] rather than rely on sampler-side
///   cancellation.
/// - Failures are fatal for the attempt; no retry policy is defined and a
///   failed solve yields no evaluations.
/// - Returned samples are ordered; their positions are the sample ids used
///   when decoding solutions onto expression cells.
pub trait Sampler {
    /// The sampler's name.
    fn name(&self) -> &str;

    /// The largest number of distinct variables the sampler accepts, if
    /// limited. Used together with `QuboAnalyzer` to size submissions.
    fn max_variables(&self) -> Option<usize> {
        None
    }

    /// Sample the objective, returning evaluations with energies and
    /// occurrence counts.
    fn sample(&self, qubo: &Qubo, num_reads: u32) -> AnnealResult<SampleSet>;
}
