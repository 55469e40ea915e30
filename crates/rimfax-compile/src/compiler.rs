//! The lowering compiler: operation graphs → quadratic objectives.

use rustc_hash::FxHashSet;
use tracing::debug;

use rimfax_ir::{OpGraph, OperandRef, OperatorKind};

use crate::error::{CompileError, CompileResult};
use crate::qubo::{Qubo, VarPair};
use crate::tables::penalty;

/// One variable slot during emission: its identifier plus its concrete
/// value when the backing cell is deterministic.
struct Slot {
    name: String,
    value: Option<u8>,
}

/// Compiles operation graphs into a [`Qubo`] objective.
///
/// The compiler accumulates: several `compile` calls (a block of
/// statements, or several expressions) contribute to one shared objective.
/// Each distinct node contributes exactly once per call — nodes referenced
/// from multiple places are not double counted — and contributions to a
/// shared variable pair are summed, never overwritten.
///
/// A finalized compiler (the default) substitutes cells with deterministic
/// values into the form, folding quadratic terms to linear ones and linear
/// terms into the offset. A generic compiler keeps every cell symbolic,
/// which is the un-reduced form useful for inspection.
#[derive(Debug)]
pub struct QuboCompiler {
    finalized: bool,
    qubo: Qubo,
}

impl Default for QuboCompiler {
    fn default() -> Self {
        Self::new()
    }
}

impl QuboCompiler {
    /// A finalized (solver-ready) compiler.
    pub fn new() -> Self {
        Self {
            finalized: true,
            qubo: Qubo::new(),
        }
    }

    /// A generic (symbolic, pre-reduction) compiler.
    pub fn generic() -> Self {
        Self {
            finalized: false,
            qubo: Qubo::new(),
        }
    }

    /// Whether this compiler produces finalized objectives.
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// The accumulated objective.
    pub fn qubo(&self) -> &Qubo {
        &self.qubo
    }

    /// Consume the compiler, yielding the objective.
    pub fn into_qubo(self) -> Qubo {
        self.qubo
    }

    /// Clear the accumulated objective without touching any graph,
    /// enabling recompilation.
    pub fn reset(&mut self) {
        self.qubo = Qubo::new();
    }

    /// Lower the graph reachable from `roots` into the objective.
    pub fn compile(&mut self, g: &OpGraph, roots: &[OperandRef]) -> CompileResult<()> {
        let mut visited: FxHashSet<u32> = FxHashSet::default();
        let mut stack: Vec<OperandRef> = roots.to_vec();
        while let Some(r) = stack.pop() {
            let OperandRef::Node(mut id) = r else {
                continue;
            };
            // A carry reference compiles through its owning addition; the
            // adder template constrains sum and carry jointly.
            if g.node(id).kind == OperatorKind::Carry {
                match g.node(id).owner {
                    Some(owner) => id = owner,
                    None => continue,
                }
            }
            if !visited.insert(id.0) {
                continue;
            }
            self.emit(g, id)?;
            let node = g.node(id);
            stack.extend(node.inputs.iter().copied());
            if let Some(out @ OperandRef::Node(_)) = node.output {
                stack.push(out);
            }
        }
        debug!(
            nodes = visited.len(),
            terms = self.qubo.len(),
            finalized = self.finalized,
            "lowered operation graph"
        );
        Ok(())
    }

    fn emit(&mut self, g: &OpGraph, id: rimfax_ir::NodeId) -> CompileResult<()> {
        let node = g.node(id);
        let Some(p) = penalty(node.kind) else {
            return Ok(());
        };

        let mut slots: Vec<Slot> = Vec::with_capacity(p.slots);
        for input in &node.inputs {
            slots.push(self.slot(g, *input)?);
        }
        let out = node
            .output
            .ok_or(rimfax_ir::IrError::UnboundOutput(id))?;
        slots.push(self.slot(g, out)?);
        match node.kind {
            OperatorKind::Xor | OperatorKind::Adder => {
                let carry = node
                    .carry
                    .expect("additions always own a carry companion");
                slots.push(self.slot(g, OperandRef::Node(carry))?);
            }
            OperatorKind::Nxor => {
                let ancilla = node.ancilla.ok_or(CompileError::MissingAncilla(id))?;
                slots.push(self.slot(g, OperandRef::Cell(ancilla))?);
            }
            _ => {}
        }
        debug_assert_eq!(slots.len(), p.slots);

        for (i, j, coeff) in p.terms {
            self.accumulate(&slots[*i], &slots[*j], *coeff);
        }
        self.qubo.add_offset(p.offset);
        Ok(())
    }

    fn slot(&self, g: &OpGraph, r: OperandRef) -> CompileResult<Slot> {
        let name = g.var_name(r)?;
        let cell = g
            .resolve(r)
            .expect("var_name succeeded, so the reference resolves");
        let value = if self.finalized {
            g.cell(cell).value().bit()
        } else {
            None
        };
        Ok(Slot { name, value })
    }

    fn accumulate(&mut self, a: &Slot, b: &Slot, coeff: f64) {
        match (a.value, b.value) {
            (Some(x), Some(y)) => {
                self.qubo.add_offset(coeff * f64::from(x) * f64::from(y));
            }
            (Some(x), None) => {
                if x == 1 {
                    self.qubo.add(VarPair::new(&*b.name, &*b.name), coeff);
                }
            }
            (None, Some(y)) => {
                if y == 1 {
                    self.qubo.add(VarPair::new(&*a.name, &*a.name), coeff);
                }
            }
            (None, None) => {
                self.qubo.add(VarPair::new(&*a.name, &*b.name), coeff);
            }
        }
    }
}
