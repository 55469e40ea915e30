//! The operation graph arena.
//!
//! All cells and operation nodes of one expression live in a single
//! [`OpGraph`], addressed by stable [`CellId`]/[`NodeId`] handles. Sharing
//! is expressed as handle references — the same cell may feed many nodes —
//! so there are no hidden aliased mutation paths. Capturing an operand from
//! user code always clones its cells into the graph; two unrelated graphs
//! never share state.

use serde::{Deserialize, Serialize};

use crate::cell::{Cell, CellId, CellLabel};
use crate::error::{IrError, IrResult};
use crate::node::{Node, NodeId, OperandRef, OperatorKind};
use crate::value::BitValue;

/// Arena of cells and operation nodes forming one expression graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpGraph {
    cells: Vec<Cell>,
    nodes: Vec<Node>,
    next_aux: u32,
}

impl OpGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cells in the arena.
    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    /// Number of nodes in the arena.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Add a cell with an explicit label and value.
    pub fn add_cell(&mut self, label: CellLabel, value: BitValue) -> CellId {
        let id = CellId(self.cells.len() as u32);
        self.cells.push(Cell::new(label, value));
        id
    }

    /// Add a user-named cell (one bit of an operand when `bit` is set).
    pub fn named_cell(&mut self, base: impl Into<String>, bit: Option<u32>, value: BitValue) -> CellId {
        self.add_cell(
            CellLabel::Named {
                base: base.into(),
                bit,
            },
            value,
        )
    }

    /// Add an auxiliary cell in the unknown state.
    pub fn aux_cell(&mut self, mark: &str) -> CellId {
        self.aux_value_cell(mark, BitValue::Unknown)
    }

    /// Add an auxiliary cell with a concrete value (internal constants).
    /// The cell is pinned: folding never rewrites it.
    pub fn aux_value_cell(&mut self, mark: &str, value: BitValue) -> CellId {
        let seq = self.next_aux;
        self.next_aux += 1;
        let id = self.add_cell(
            CellLabel::Aux {
                mark: mark.to_string(),
                seq,
            },
            value,
        );
        if value.is_known() {
            self.cells[id.0 as usize].pin();
        }
        id
    }

    /// Borrow a cell.
    ///
    /// # Panics
    ///
    /// Panics if the handle does not belong to this graph.
    pub fn cell(&self, id: CellId) -> &Cell {
        &self.cells[id.0 as usize]
    }

    /// Mutably borrow a cell. Cells are single-writer within a graph.
    pub fn cell_mut(&mut self, id: CellId) -> &mut Cell {
        &mut self.cells[id.0 as usize]
    }

    /// Borrow a node.
    ///
    /// # Panics
    ///
    /// Panics if the handle does not belong to this graph.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0 as usize]
    }

    /// Iterate over all cells.
    pub fn cells(&self) -> impl Iterator<Item = (CellId, &Cell)> {
        self.cells
            .iter()
            .enumerate()
            .map(|(at, cell)| (CellId(at as u32), cell))
    }

    /// Iterate mutably over all cells (solution write-back).
    pub fn cells_mut(&mut self) -> impl Iterator<Item = (CellId, &mut Cell)> {
        self.cells
            .iter_mut()
            .enumerate()
            .map(|(at, cell)| (CellId(at as u32), cell))
    }

    /// Iterate over all nodes.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(at, node)| (NodeId(at as u32), node))
    }

    /// Create a gate node over the given inputs.
    ///
    /// The node's output is unbound; bind it with [`bind_output`] or
    /// [`bind_fresh_output`]. Additions (`Xor`/`Adder`) receive a companion
    /// `Carry` node whose inputs mirror theirs.
    ///
    /// [`bind_output`]: OpGraph::bind_output
    /// [`bind_fresh_output`]: OpGraph::bind_fresh_output
    pub fn add_gate(&mut self, kind: OperatorKind, inputs: Vec<OperandRef>) -> IrResult<NodeId> {
        if let Some(expected) = kind.arity() {
            if inputs.len() != expected {
                return Err(IrError::ArityMismatch {
                    op: kind.mark().to_string(),
                    expected,
                    got: inputs.len(),
                });
            }
        }
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(kind, inputs.clone()));
        if kind.is_addition() {
            let carry_id = NodeId(self.nodes.len() as u32);
            let mut carry = Node::new(OperatorKind::Carry, inputs);
            carry.owner = Some(id);
            self.nodes.push(carry);
            self.nodes[id.0 as usize].carry = Some(carry_id);
        }
        Ok(id)
    }

    /// Replace a node's inputs.
    ///
    /// The arity must match the operator's declared input count. Mirrors the
    /// new inputs onto the carry companion and re-runs the auxiliary-output
    /// folding check.
    pub fn set_inputs(&mut self, id: NodeId, inputs: Vec<OperandRef>) -> IrResult<()> {
        let kind = self.nodes[id.0 as usize].kind;
        if let Some(expected) = kind.arity() {
            if inputs.len() != expected {
                return Err(IrError::ArityMismatch {
                    op: kind.mark().to_string(),
                    expected,
                    got: inputs.len(),
                });
            }
        }
        self.nodes[id.0 as usize].inputs = inputs.clone();
        if let Some(carry) = self.nodes[id.0 as usize].carry {
            self.nodes[carry.0 as usize].inputs = inputs;
        }
        self.refold_all()
    }

    /// Bind the operand a node writes into.
    ///
    /// Side effects, in order: the folding/conflict check of the computed
    /// value against the new output; carry companions get an auxiliary
    /// output cell on first binding; two-output gates (`Nxor`) get their
    /// ancilla cell on first binding, shaped like the primary output.
    pub fn bind_output(&mut self, id: NodeId, out: OperandRef) -> IrResult<()> {
        self.fold_into(id, out)?;
        self.nodes[id.0 as usize].output = Some(out);
        if let Some(carry) = self.nodes[id.0 as usize].carry {
            if self.nodes[carry.0 as usize].output.is_none() {
                let cell = self.aux_cell(OperatorKind::Carry.mark());
                self.nodes[carry.0 as usize].output = Some(OperandRef::Cell(cell));
            }
            self.fold_node(carry)?;
        }
        if self.nodes[id.0 as usize].kind == OperatorKind::Nxor
            && self.nodes[id.0 as usize].ancilla.is_none()
        {
            let cell = self.aux_cell("?");
            self.nodes[id.0 as usize].ancilla = Some(cell);
        }
        Ok(())
    }

    /// Bind a freshly created auxiliary output cell and return it.
    pub fn bind_fresh_output(&mut self, id: NodeId) -> IrResult<CellId> {
        let mark = self.nodes[id.0 as usize].kind.mark().to_string();
        let cell = self.aux_cell(&mark);
        self.bind_output(id, OperandRef::Cell(cell))?;
        Ok(cell)
    }

    /// The value of an operand reference: a cell's stored value, or a
    /// node's derived value.
    pub fn value_of(&self, r: OperandRef) -> BitValue {
        match r {
            OperandRef::Cell(id) => self.cell(id).value(),
            OperandRef::Node(id) => self.node_value(id),
        }
    }

    /// A node's derived value: `Unknown` if any input is unknown, otherwise
    /// the operator's truth function of the inputs (and, for the comparison
    /// family, of the current output value).
    pub fn node_value(&self, id: NodeId) -> BitValue {
        let node = &self.nodes[id.0 as usize];
        let mut ins = Vec::with_capacity(node.inputs.len());
        for r in &node.inputs {
            match self.value_of(*r).bit() {
                Some(bit) => ins.push(bit),
                None => return BitValue::Unknown,
            }
        }
        if ins.is_empty() {
            return BitValue::Unknown;
        }
        let out = if node.kind.is_comparison() {
            match node.output {
                Some(r) => self.value_of(r).bit(),
                None => None,
            }
        } else {
            None
        };
        match node.kind.calculate(&ins, out) {
            Some(bit) => BitValue::from_bit(bit),
            None => BitValue::Unknown,
        }
    }

    /// Set the value of an operand reference.
    ///
    /// Only leaf cells hold settable values; attempting to set a node's
    /// value is a logic error — node values are always derived.
    pub fn set_value(&mut self, r: OperandRef, v: BitValue) -> IrResult<()> {
        match r {
            OperandRef::Cell(id) => {
                self.cell_mut(id).set_value(v);
                Ok(())
            }
            OperandRef::Node(id) => Err(IrError::DerivedValue(id)),
        }
    }

    /// Resolve a reference through node outputs to its leaf cell.
    pub fn resolve(&self, r: OperandRef) -> Option<CellId> {
        let mut current = r;
        loop {
            match current {
                OperandRef::Cell(id) => return Some(id),
                OperandRef::Node(id) => current = self.nodes[id.0 as usize].output?,
            }
        }
    }

    /// The variable identifier a reference stands for in a compiled
    /// objective.
    pub fn var_name(&self, r: OperandRef) -> IrResult<String> {
        match self.resolve(r) {
            Some(id) => Ok(self.cell(id).var_name()),
            None => match r {
                OperandRef::Node(id) => Err(IrError::UnboundOutput(id)),
                OperandRef::Cell(_) => unreachable!("cell references always resolve"),
            },
        }
    }

    /// The half-adder/full-adder fusion entry point.
    ///
    /// - 3 inputs: a fresh full adder.
    /// - 2 inputs, one of which is a not-yet-promoted `Xor` node: that node
    ///   is promoted in place to a three-input `Adder` — its identity and
    ///   downstream references are preserved — and the returned flag is
    ///   `true`. A promoted node's carry keeps flowing through whatever
    ///   already consumed it, so the caller must not chain it again.
    /// - 2 other inputs: a fresh `Xor`.
    /// - any other arity: [`IrError::FusionArity`].
    pub fn xor_adder(&mut self, ins: &[OperandRef]) -> IrResult<(NodeId, bool)> {
        match ins.len() {
            3 => Ok((self.add_gate(OperatorKind::Adder, ins.to_vec())?, false)),
            2 => {
                for at in 0..2 {
                    if let OperandRef::Node(id) = ins[at] {
                        let node = &self.nodes[id.0 as usize];
                        if node.kind == OperatorKind::Xor && !node.extended {
                            let other = ins[1 - at];
                            let node = &mut self.nodes[id.0 as usize];
                            node.kind = OperatorKind::Adder;
                            node.inputs.push(other);
                            node.extended = true;
                            let inputs = node.inputs.clone();
                            if let Some(carry) = node.carry {
                                self.nodes[carry.0 as usize].inputs = inputs;
                            }
                            self.refold_all()?;
                            return Ok((id, true));
                        }
                    }
                }
                Ok((self.add_gate(OperatorKind::Xor, ins.to_vec())?, false))
            }
            n => Err(IrError::FusionArity(n)),
        }
    }

    /// Append another graph, remapping its handles into this arena.
    ///
    /// Auxiliary cells of the appended graph are re-numbered from this
    /// graph's sequence so that no two distinct auxiliary cells share a
    /// variable identifier. Returns the (cell, node) handle offsets for
    /// remapping outstanding references via [`OpGraph::remap`].
    pub fn merge(&mut self, other: OpGraph) -> (u32, u32) {
        let cell_off = self.cells.len() as u32;
        let node_off = self.nodes.len() as u32;
        for mut cell in other.cells {
            if let CellLabel::Aux { mark, .. } = cell.label() {
                let mark = mark.clone();
                let seq = self.next_aux;
                self.next_aux += 1;
                cell.set_label(CellLabel::Aux { mark, seq });
            }
            self.cells.push(cell);
        }
        for mut node in other.nodes {
            for r in &mut node.inputs {
                *r = Self::remap(*r, cell_off, node_off);
            }
            node.output = node.output.map(|r| Self::remap(r, cell_off, node_off));
            node.carry = node.carry.map(|id| NodeId(id.0 + node_off));
            node.owner = node.owner.map(|id| NodeId(id.0 + node_off));
            node.ancilla = node.ancilla.map(|id| CellId(id.0 + cell_off));
            self.nodes.push(node);
        }
        (cell_off, node_off)
    }

    /// Re-number every auxiliary cell label sequentially from `start`,
    /// returning the next free sequence number.
    ///
    /// Jointly-compiled graphs must not share auxiliary identifiers — two
    /// distinct cells with the same variable name would silently unify in
    /// the objective. Containers (blocks, functions) re-number their
    /// statements' graphs with this before compiling them together.
    pub fn renumber_aux(&mut self, start: u32) -> u32 {
        let mut next = start;
        for cell in &mut self.cells {
            if let CellLabel::Aux { mark, .. } = cell.label() {
                let mark = mark.clone();
                cell.set_label(CellLabel::Aux { mark, seq: next });
                next += 1;
            }
        }
        self.next_aux = next;
        next
    }

    /// Remap a reference by the offsets returned from [`OpGraph::merge`].
    pub fn remap(r: OperandRef, cell_off: u32, node_off: u32) -> OperandRef {
        match r {
            OperandRef::Cell(id) => OperandRef::Cell(CellId(id.0 + cell_off)),
            OperandRef::Node(id) => OperandRef::Node(NodeId(id.0 + node_off)),
        }
    }

    /// Discard all recorded solutions, keeping values and structure.
    pub fn clear_solutions(&mut self) {
        for cell in &mut self.cells {
            cell.clear_solutions();
        }
    }

    /// Re-run the folding check of a node against its current output (and
    /// its carry companion's output, if any).
    fn fold_node(&mut self, id: NodeId) -> IrResult<()> {
        if let Some(out) = self.nodes[id.0 as usize].output {
            self.fold_into(id, out)?;
        }
        if let Some(carry) = self.nodes[id.0 as usize].carry {
            if let Some(out) = self.nodes[carry.0 as usize].output {
                self.fold_into(carry, out)?;
            }
        }
        Ok(())
    }

    /// Constant propagation at binding time.
    ///
    /// When the node's inputs are all concrete, an auxiliary output cell
    /// silently receives the computed value — including a re-fold after
    /// fusion mutated the node's inputs. Pinned constants are left alone
    /// (an unsatisfiable binding surfaces as solve-time energy, not as an
    /// overwrite). A non-auxiliary output whose concrete value conflicts
    /// with the computed value is rejected — user-named cells are never
    /// overwritten.
    fn fold_into(&mut self, id: NodeId, out: OperandRef) -> IrResult<()> {
        let OperandRef::Cell(cid) = out else {
            return Ok(());
        };
        let Some(computed) = self.node_value(id).bit() else {
            return Ok(());
        };
        let cell = &self.cells[cid.0 as usize];
        match cell.value().bit() {
            None if cell.is_aux() => {
                self.cells[cid.0 as usize].set_value(BitValue::from_bit(computed));
                Ok(())
            }
            Some(bound) if bound != computed => {
                if cell.is_aux() {
                    if !cell.is_pinned() {
                        self.cells[cid.0 as usize].set_value(BitValue::from_bit(computed));
                    }
                    Ok(())
                } else {
                    Err(IrError::OutputConflict {
                        cell: cell.var_name(),
                        bound,
                        computed,
                    })
                }
            }
            _ => Ok(()),
        }
    }

    /// Re-run the folding check on every node, in creation order. Fusion
    /// mutates a node's inputs after downstream outputs may already have
    /// folded, so the promoted graph gets one full refold pass.
    fn refold_all(&mut self) -> IrResult<()> {
        for at in 0..self.nodes.len() {
            self.fold_node(NodeId(at as u32))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bit(g: &mut OpGraph, name: &str, v: BitValue) -> OperandRef {
        OperandRef::Cell(g.named_cell(name, None, v))
    }

    #[test]
    fn test_gate_arity_checked() {
        let mut g = OpGraph::new();
        let a = bit(&mut g, "a", BitValue::Unknown);
        let err = g.add_gate(OperatorKind::And, vec![a]).unwrap_err();
        assert!(matches!(err, IrError::ArityMismatch { got: 1, .. }));
    }

    #[test]
    fn test_constant_folding_into_aux_output() {
        let mut g = OpGraph::new();
        let a = bit(&mut g, "a", BitValue::One);
        let b = bit(&mut g, "b", BitValue::One);
        let and = g.add_gate(OperatorKind::And, vec![a, b]).unwrap();
        let out = g.bind_fresh_output(and).unwrap();
        assert_eq!(g.cell(out).value(), BitValue::One);
        assert_eq!(g.node_value(and), BitValue::One);
    }

    #[test]
    fn test_no_folding_into_user_cell() {
        let mut g = OpGraph::new();
        let a = bit(&mut g, "a", BitValue::One);
        let b = bit(&mut g, "b", BitValue::Zero);
        let and = g.add_gate(OperatorKind::And, vec![a, b]).unwrap();
        let out = g.named_cell("r", None, BitValue::Unknown);
        g.bind_output(and, OperandRef::Cell(out)).unwrap();
        // User cells stay untouched even when the value is computable.
        assert_eq!(g.cell(out).value(), BitValue::Unknown);
    }

    #[test]
    fn test_output_conflict_rejected() {
        let mut g = OpGraph::new();
        let a = bit(&mut g, "a", BitValue::One);
        let b = bit(&mut g, "b", BitValue::One);
        let and = g.add_gate(OperatorKind::And, vec![a, b]).unwrap();
        let out = g.named_cell("r", None, BitValue::Zero);
        let err = g.bind_output(and, OperandRef::Cell(out)).unwrap_err();
        assert!(matches!(
            err,
            IrError::OutputConflict {
                bound: 0,
                computed: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_node_value_is_derived_only() {
        let mut g = OpGraph::new();
        let a = bit(&mut g, "a", BitValue::Unknown);
        let b = bit(&mut g, "b", BitValue::One);
        let or = g.add_gate(OperatorKind::Or, vec![a, b]).unwrap();
        assert_eq!(g.node_value(or), BitValue::Unknown);
        let err = g.set_value(OperandRef::Node(or), BitValue::One).unwrap_err();
        assert!(matches!(err, IrError::DerivedValue(_)));
    }

    #[test]
    fn test_comparison_reads_output() {
        let mut g = OpGraph::new();
        let a = bit(&mut g, "a", BitValue::One);
        let eq = g.add_gate(OperatorKind::Eq, vec![a]).unwrap();
        assert_eq!(g.node_value(eq), BitValue::Unknown);
        let out = g.named_cell("r", None, BitValue::One);
        g.bind_output(eq, OperandRef::Cell(out)).unwrap();
        assert_eq!(g.node_value(eq), BitValue::One);
    }

    #[test]
    fn test_fusion_promotes_in_place() {
        let mut g = OpGraph::new();
        let a = bit(&mut g, "a", BitValue::Unknown);
        let b = bit(&mut g, "b", BitValue::Unknown);
        let c = bit(&mut g, "c", BitValue::Unknown);
        let (xor, fused) = g.xor_adder(&[a, b]).unwrap();
        assert!(!fused);
        g.bind_fresh_output(xor).unwrap();
        assert_eq!(g.node(xor).kind, OperatorKind::Xor);

        let (same, fused) = g.xor_adder(&[OperandRef::Node(xor), c]).unwrap();
        assert!(fused);
        assert_eq!(same, xor);
        assert_eq!(g.node(xor).kind, OperatorKind::Adder);
        assert!(g.node(xor).extended);
        assert_eq!(g.node(xor).inputs.len(), 3);
        // Carry companion mirrors the promoted inputs.
        let carry = g.node(xor).carry.unwrap();
        assert_eq!(g.node(carry).inputs.len(), 3);

        // A promoted node never absorbs a fourth input.
        let d = bit(&mut g, "d", BitValue::Unknown);
        let (layered, fused) = g.xor_adder(&[OperandRef::Node(xor), d]).unwrap();
        assert!(!fused);
        assert_ne!(layered, xor);
        assert_eq!(g.node(layered).kind, OperatorKind::Xor);
    }

    #[test]
    fn test_fusion_arity_rejected() {
        let mut g = OpGraph::new();
        let a = bit(&mut g, "a", BitValue::Unknown);
        assert!(matches!(
            g.xor_adder(&[a]).unwrap_err(),
            IrError::FusionArity(1)
        ));
        let b = bit(&mut g, "b", BitValue::Unknown);
        let c = bit(&mut g, "c", BitValue::Unknown);
        let d = bit(&mut g, "d", BitValue::Unknown);
        assert!(matches!(
            g.xor_adder(&[a, b, c, d]).unwrap_err(),
            IrError::FusionArity(4)
        ));
    }

    #[test]
    fn test_merge_renumbers_aux_labels() {
        let mut left = OpGraph::new();
        let a = bit(&mut left, "a", BitValue::Unknown);
        let b = bit(&mut left, "b", BitValue::Unknown);
        let and = left.add_gate(OperatorKind::And, vec![a, b]).unwrap();
        let left_out = left.bind_fresh_output(and).unwrap();

        let mut right = OpGraph::new();
        let c = bit(&mut right, "c", BitValue::Unknown);
        let d = bit(&mut right, "d", BitValue::Unknown);
        let or = right.add_gate(OperatorKind::Or, vec![c, d]).unwrap();
        let right_out = right.bind_fresh_output(or).unwrap();

        let (cell_off, node_off) = left.merge(right);
        let merged_out = CellId(right_out.0 + cell_off);
        assert_ne!(
            left.cell(left_out).var_name(),
            left.cell(merged_out).var_name()
        );
        let merged_or = NodeId(or.0 + node_off);
        assert_eq!(left.node(merged_or).kind, OperatorKind::Or);
        assert_eq!(
            left.resolve(OperandRef::Node(merged_or)),
            Some(merged_out)
        );
    }

    #[test]
    fn test_resolve_through_chains() {
        let mut g = OpGraph::new();
        let a = bit(&mut g, "a", BitValue::Unknown);
        let b = bit(&mut g, "b", BitValue::Unknown);
        let and = g.add_gate(OperatorKind::And, vec![a, b]).unwrap();
        assert_eq!(g.resolve(OperandRef::Node(and)), None);
        assert!(g.var_name(OperandRef::Node(and)).is_err());
        let out = g.bind_fresh_output(and).unwrap();
        assert_eq!(g.resolve(OperandRef::Node(and)), Some(out));
    }
}
