//! Structural statistics over compiled objectives.

use crate::qubo::Qubo;

/// Read-only analyzer used for sizing a problem before dispatch to a
/// sampler (e.g. deciding whether to [`split`](Qubo::split)).
#[derive(Debug, Clone, Copy)]
pub struct QuboAnalyzer<'a> {
    qubo: &'a Qubo,
}

impl<'a> QuboAnalyzer<'a> {
    /// Analyze an objective.
    pub fn new(qubo: &'a Qubo) -> Self {
        Self { qubo }
    }

    /// Number of distinct variable identifiers appearing in any entry.
    pub fn node_count(&self) -> usize {
        self.qubo.variables().len()
    }

    /// Number of distinct off-diagonal entries (quadratic interactions).
    pub fn interaction_count(&self) -> usize {
        self.qubo
            .terms()
            .filter(|(pair, _)| !pair.is_diagonal())
            .count()
    }
}
