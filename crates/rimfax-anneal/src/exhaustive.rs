//! Deterministic exhaustive reference sampler.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use rimfax_compile::{Qubo, Sample, SampleSet};

use crate::error::{AnnealError, AnnealResult};
use crate::sampler::Sampler;

/// Default variable limit; 2^24 assignments is the most an exhaustive
/// sweep should ever be asked to do.
const DEFAULT_MAX_VARIABLES: usize = 24;

/// An exact sampler that enumerates every assignment and returns all
/// minimum-energy samples in lexicographic order.
///
/// Intended for tests and for small sub-objectives produced by
/// [`Qubo::split`]; it refuses anything beyond its configured variable
/// limit. Being exhaustive and deterministic, repeated calls over the same
/// objective return identical sample sets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExhaustiveSampler {
    max_variables: usize,
}

impl Default for ExhaustiveSampler {
    fn default() -> Self {
        Self {
            max_variables: DEFAULT_MAX_VARIABLES,
        }
    }
}

impl ExhaustiveSampler {
    /// A sampler with the default variable limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the variable limit.
    pub fn with_max_variables(mut self, max_variables: usize) -> Self {
        self.max_variables = max_variables;
        self
    }
}

impl Sampler for ExhaustiveSampler {
    fn name(&self) -> &str {
        "exhaustive"
    }

    fn max_variables(&self) -> Option<usize> {
        Some(self.max_variables)
    }

    fn sample(&self, qubo: &Qubo, _num_reads: u32) -> AnnealResult<SampleSet> {
        let vars: Vec<String> = qubo.variables().iter().map(|v| v.to_string()).collect();
        if vars.len() > self.max_variables {
            return Err(AnnealError::TooLarge {
                variables: vars.len(),
                limit: self.max_variables,
            });
        }

        // A fully deterministic objective still evaluates to one sample:
        // the empty assignment at the offset energy.
        if vars.is_empty() {
            let mut set = SampleSet::new();
            set.push(Sample::new(BTreeMap::new(), qubo.offset()));
            return Ok(set);
        }

        let mut best_energy = f64::INFINITY;
        let mut best: Vec<BTreeMap<String, u8>> = Vec::new();
        for pattern in 0u64..(1u64 << vars.len()) {
            let assignment: BTreeMap<String, u8> = vars
                .iter()
                .enumerate()
                .map(|(at, var)| (var.clone(), ((pattern >> at) & 1) as u8))
                .collect();
            let energy = qubo.energy(&assignment);
            if energy < best_energy {
                best_energy = energy;
                best.clear();
            }
            if energy == best_energy {
                best.push(assignment);
            }
        }

        debug!(
            variables = vars.len(),
            ground_states = best.len(),
            energy = best_energy,
            "exhaustive sweep complete"
        );
        let mut set = SampleSet::new();
        for assignment in best {
            set.push(Sample::new(assignment, best_energy));
        }
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rimfax_compile::VarPair;

    #[test]
    fn test_single_variable_minimum() {
        let mut qubo = Qubo::new();
        qubo.add(VarPair::new("a", "a"), 1.0);
        let set = ExhaustiveSampler::new().sample(&qubo, 1).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(0).unwrap().bit("a"), Some(0));
        assert_eq!(set.lowest_energy(), Some(0.0));
    }

    #[test]
    fn test_degenerate_ground_states_all_returned() {
        // E = -ab has minimum -1 at (1,1) only; E = ab has minimum 0 at
        // three assignments.
        let mut qubo = Qubo::new();
        qubo.add(VarPair::new("a", "b"), 1.0);
        let set = ExhaustiveSampler::new().sample(&qubo, 1).unwrap();
        assert_eq!(set.len(), 3);
        for sample in set.iter() {
            assert_eq!(sample.energy, 0.0);
            assert_eq!(sample.bit("a").unwrap() & sample.bit("b").unwrap(), 0);
        }
    }

    #[test]
    fn test_empty_objective_yields_offset_sample() {
        let mut qubo = Qubo::new();
        qubo.add_offset(2.5);
        let set = ExhaustiveSampler::new().sample(&qubo, 1).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(0).unwrap().energy, 2.5);
        assert!(set.get(0).unwrap().assignment.is_empty());
    }

    #[test]
    fn test_variable_limit() {
        let mut qubo = Qubo::new();
        for at in 0..5 {
            qubo.add(VarPair::new(format!("v{at}"), format!("v{at}")), 1.0);
        }
        let sampler = ExhaustiveSampler::new().with_max_variables(4);
        assert!(matches!(
            sampler.sample(&qubo, 1).unwrap_err(),
            AnnealError::TooLarge {
                variables: 5,
                limit: 4
            }
        ));
    }

    #[test]
    fn test_config_roundtrip() {
        let sampler = ExhaustiveSampler::new().with_max_variables(16);
        let json = serde_json::to_string(&sampler).unwrap();
        let back: ExhaustiveSampler = serde_json::from_str(&json).unwrap();
        assert_eq!(back.max_variables(), Some(16));
    }

    #[test]
    fn test_determinism() {
        let mut qubo = Qubo::new();
        qubo.add(VarPair::new("a", "b"), -1.0);
        qubo.add(VarPair::new("a", "a"), 0.5);
        let sampler = ExhaustiveSampler::new();
        let first = sampler.sample(&qubo, 1).unwrap();
        let second = sampler.sample(&qubo, 1).unwrap();
        assert_eq!(first, second);
    }
}
