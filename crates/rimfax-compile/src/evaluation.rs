//! Sample/evaluation exchange types returned by the solver boundary.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One solver-returned bit assignment with its energy and occurrence count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Variable identifier → bit value.
    pub assignment: BTreeMap<String, u8>,
    /// Objective energy of the assignment.
    pub energy: f64,
    /// How many times the sampler observed this assignment.
    pub occurrences: u32,
}

impl Sample {
    /// Create a sample observed once.
    pub fn new(assignment: BTreeMap<String, u8>, energy: f64) -> Self {
        Self {
            assignment,
            energy,
            occurrences: 1,
        }
    }

    /// The bit assigned to a variable, if present.
    pub fn bit(&self, var: &str) -> Option<u8> {
        self.assignment.get(var).copied()
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (at, (var, bit)) in self.assignment.iter().enumerate() {
            if at > 0 {
                write!(f, " ")?;
            }
            write!(f, "{var}={bit}")?;
        }
        write!(f, "] energy {} x{}", self.energy, self.occurrences)
    }
}

/// An ordered collection of samples, as handed back by a sampler.
///
/// Sample ids used for solution decoding are positions in this collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleSet {
    samples: Vec<Sample>,
}

impl SampleSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from samples.
    pub fn from_samples(samples: Vec<Sample>) -> Self {
        Self { samples }
    }

    /// Append a sample.
    pub fn push(&mut self, sample: Sample) {
        self.samples.push(sample);
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Iterate samples in sample-id order.
    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    /// The sample with the given id.
    pub fn get(&self, sample_id: usize) -> Option<&Sample> {
        self.samples.get(sample_id)
    }

    /// The lowest energy present in the set.
    pub fn lowest_energy(&self) -> Option<f64> {
        self.samples
            .iter()
            .map(|s| s.energy)
            .min_by(|x, y| x.total_cmp(y))
    }
}

impl fmt::Display for SampleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (at, sample) in self.samples.iter().enumerate() {
            writeln!(f, "{at}: {sample}")?;
        }
        Ok(())
    }
}
