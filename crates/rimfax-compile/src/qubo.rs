//! The sparse quadratic objective.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// An unordered pair of variable identifiers, normalized so that the
/// lexicographically smaller identifier comes first. A self-pair stands for
/// a linear (diagonal) term.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VarPair {
    a: String,
    b: String,
}

impl VarPair {
    /// Build a normalized pair.
    pub fn new(x: impl Into<String>, y: impl Into<String>) -> Self {
        let (x, y) = (x.into(), y.into());
        if x <= y { Self { a: x, b: y } } else { Self { a: y, b: x } }
    }

    /// The smaller identifier.
    pub fn first(&self) -> &str {
        &self.a
    }

    /// The larger identifier.
    pub fn second(&self) -> &str {
        &self.b
    }

    /// Whether this is a diagonal (linear) term.
    pub fn is_diagonal(&self) -> bool {
        self.a == self.b
    }
}

impl fmt::Display for VarPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.a, self.b)
    }
}

/// A quadratic unconstrained binary optimization objective.
///
/// A mapping from unordered variable pairs to coefficients, plus a constant
/// offset so that a fully satisfied constraint system has energy zero.
/// Contributions to the same pair accumulate additively; iteration order is
/// the sorted key order, which makes compiled objectives reproducible
/// byte-for-byte.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "QuboRepr", into = "QuboRepr")]
pub struct Qubo {
    terms: BTreeMap<VarPair, f64>,
    offset: f64,
}

impl Qubo {
    /// An empty objective.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate a coefficient onto a pair.
    pub fn add(&mut self, pair: VarPair, coeff: f64) {
        *self.terms.entry(pair).or_insert(0.0) += coeff;
    }

    /// Accumulate onto the constant offset.
    pub fn add_offset(&mut self, offset: f64) {
        self.offset += offset;
    }

    /// The constant offset.
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Whether the objective has no entries.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Iterate entries in sorted key order.
    pub fn terms(&self) -> impl Iterator<Item = (&VarPair, f64)> {
        self.terms.iter().map(|(pair, coeff)| (pair, *coeff))
    }

    /// The coefficient of a pair, or 0.
    pub fn coeff(&self, pair: &VarPair) -> f64 {
        self.terms.get(pair).copied().unwrap_or(0.0)
    }

    /// The distinct variable identifiers appearing in any entry.
    pub fn variables(&self) -> BTreeSet<&str> {
        let mut vars = BTreeSet::new();
        for pair in self.terms.keys() {
            vars.insert(pair.first());
            vars.insert(pair.second());
        }
        vars
    }

    /// Fold another objective into this one, entry by entry.
    pub fn merge(&mut self, other: &Qubo) {
        for (pair, coeff) in other.terms() {
            self.add(pair.clone(), coeff);
        }
        self.offset += other.offset;
    }

    /// Evaluate the energy of a bit assignment.
    ///
    /// Variables missing from the assignment count as 0.
    pub fn energy(&self, assignment: &BTreeMap<String, u8>) -> f64 {
        let bit = |name: &str| f64::from(assignment.get(name).copied().unwrap_or(0));
        let mut energy = self.offset;
        for (pair, coeff) in self.terms() {
            energy += coeff * bit(pair.first()) * bit(pair.second());
        }
        energy
    }

    /// Partition the objective into `⌈N / batch_size⌉` balanced
    /// sub-objectives whose entries union to the original multiset exactly.
    ///
    /// The constant offset rides with the first partition. Used to fit
    /// size-limited samplers; callers solve the parts independently.
    pub fn split(&self, batch_size: usize) -> Vec<Qubo> {
        let batch_size = batch_size.max(1);
        if self.terms.is_empty() {
            return vec![self.clone()];
        }
        let total = self.terms.len();
        let parts = total.div_ceil(batch_size);
        let base = total / parts;
        let extra = total % parts;

        let mut result = Vec::with_capacity(parts);
        let mut entries = self.terms.iter();
        for at in 0..parts {
            let take = if at < extra { base + 1 } else { base };
            let mut part = Qubo::new();
            if at == 0 {
                part.offset = self.offset;
            }
            for _ in 0..take {
                let (pair, coeff) = entries.next().expect("partition sizes sum to the entry count");
                part.terms.insert(pair.clone(), *coeff);
            }
            result.push(part);
        }
        result
    }
}

impl fmt::Display for Qubo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (at, (pair, coeff)) in self.terms().enumerate() {
            if at > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{pair}: {coeff}")?;
        }
        write!(f, "}}")?;
        if self.offset != 0.0 {
            write!(f, " + {}", self.offset)?;
        }
        Ok(())
    }
}

/// Serialized form: an entry list, since unordered pairs cannot be JSON map
/// keys.
#[derive(Serialize, Deserialize)]
struct QuboRepr {
    terms: Vec<(String, String, f64)>,
    offset: f64,
}

impl From<Qubo> for QuboRepr {
    fn from(qubo: Qubo) -> Self {
        Self {
            terms: qubo
                .terms
                .into_iter()
                .map(|(pair, coeff)| (pair.a, pair.b, coeff))
                .collect(),
            offset: qubo.offset,
        }
    }
}

impl From<QuboRepr> for Qubo {
    fn from(repr: QuboRepr) -> Self {
        let mut qubo = Qubo::new();
        qubo.offset = repr.offset;
        for (a, b, coeff) in repr.terms {
            qubo.add(VarPair::new(a, b), coeff);
        }
        qubo
    }
}
