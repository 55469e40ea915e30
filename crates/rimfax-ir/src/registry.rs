//! String-tag lookup table for operator construction.
//!
//! The operator set itself is the closed [`OperatorKind`] enum; the registry
//! is the thin, late-bound extension layer on top of it: symbolic tags map
//! to kinds, and callers may register additional aliases at runtime.

use rustc_hash::FxHashMap;

use crate::error::{IrError, IrResult};
use crate::graph::OpGraph;
use crate::node::{NodeId, OperandRef, OperatorKind};

/// All directly constructible operator kinds (`Carry` companions are
/// created automatically by the graph and have no tag).
const DEFAULT_KINDS: &[OperatorKind] = &[
    OperatorKind::And,
    OperatorKind::Nand,
    OperatorKind::Or,
    OperatorKind::Nor,
    OperatorKind::Xor,
    OperatorKind::Nxor,
    OperatorKind::Eq,
    OperatorKind::Neq,
    OperatorKind::Lt,
    OperatorKind::Le,
    OperatorKind::Gt,
    OperatorKind::Ge,
    OperatorKind::Adder,
];

/// Maps symbolic operator tags to operator kinds.
#[derive(Debug, Clone)]
pub struct OperatorRegistry {
    map: FxHashMap<String, OperatorKind>,
}

impl Default for OperatorRegistry {
    fn default() -> Self {
        let mut map = FxHashMap::default();
        for kind in DEFAULT_KINDS {
            map.insert(kind.mark().to_string(), *kind);
        }
        Self { map }
    }
}

impl OperatorRegistry {
    /// A registry holding the default tag for every constructible kind.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an additional tag (or override an existing one).
    pub fn register(&mut self, tag: impl Into<String>, kind: OperatorKind) {
        self.map.insert(tag.into(), kind);
    }

    /// Look up the kind for a tag.
    pub fn kind(&self, tag: &str) -> Option<OperatorKind> {
        self.map.get(tag).copied()
    }

    /// Instantiate the operation a tag stands for over the given inputs.
    pub fn create(
        &self,
        g: &mut OpGraph,
        tag: &str,
        inputs: Vec<OperandRef>,
    ) -> IrResult<NodeId> {
        let kind = self
            .kind(tag)
            .ok_or_else(|| IrError::UnknownOperator(tag.to_string()))?;
        g.add_gate(kind, inputs)
    }
}
