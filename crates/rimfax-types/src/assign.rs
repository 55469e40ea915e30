//! Assignments — binding an expression onto an assignee operand.

use std::fmt;

use tracing::debug;

use rimfax_ir::{IrError, OperandRef, OperatorKind};

use crate::error::{TypeError, TypeResult};
use crate::expr::{ExprCore, NumExpr};
use crate::operand::Operand;

/// A statement binding an expression's output to an assignee operand.
///
/// Width reconciliation happens at construction:
///
/// 1. A wider expression grows a resizable assignee (a non-resizable
///    assignee fails with [`TypeError::NotResizable`]).
/// 2. A narrower expression is extended to the assignee width with
///    zero-constraint positions — the surplus assignee bits must solve
///    to 0.
/// 3. Each expression root bit is bound onto the assignee's cell at that
///    position, triggering the usual folding/conflict checks.
#[derive(Debug, Clone)]
pub struct Assignment {
    target: String,
    pub(crate) core: ExprCore,
}

impl Assignment {
    /// Bind `expr` onto `assignee`.
    pub fn new(assignee: &mut dyn Operand, expr: impl Into<NumExpr>) -> TypeResult<Self> {
        let expr: NumExpr = expr.into();
        let mut core = expr.core;
        if core.constraint_only {
            return Err(TypeError::Unassignable {
                summary: core.summary,
            });
        }

        let needed = core.bits.len();
        let width = assignee.width();
        if needed > width {
            if !assignee.is_resizable() {
                return Err(TypeError::NotResizable {
                    name: assignee.name().to_string(),
                    width,
                    needed,
                });
            }
            assignee.resize(needed)?;
        }
        let width = assignee.width();
        let targets = assignee.capture(&mut core.graph);

        let mut bound = Vec::with_capacity(width);
        for (at, target) in targets.iter().enumerate() {
            let OperandRef::Cell(target_cell) = *target else {
                unreachable!("captured operands are cell references");
            };
            if at < needed {
                match core.bits[at] {
                    OperandRef::Node(id) => {
                        core.graph.bind_output(id, *target)?;
                        bound.push(core.bits[at]);
                    }
                    OperandRef::Cell(cell) if core.graph.cell(cell).is_aux() => {
                        // An auxiliary root bit (slack difference, quotient)
                        // adopts the assignee's identity and value outright.
                        let label = core.graph.cell(target_cell).label().clone();
                        let target_value = core.graph.cell(target_cell).value();
                        let held = core.graph.cell(cell).value();
                        if let (Some(have), Some(want)) = (held.bit(), target_value.bit()) {
                            if have != want {
                                return Err(TypeError::Ir(IrError::OutputConflict {
                                    cell: label.render(),
                                    bound: want,
                                    computed: have,
                                }));
                            }
                        }
                        let adopted = core.graph.cell_mut(cell);
                        adopted.set_label(label);
                        if !adopted.value().is_known() {
                            adopted.set_value(target_value);
                        }
                        bound.push(core.bits[at]);
                    }
                    OperandRef::Cell(cell) => {
                        // A pass-through user cell is equality-bound.
                        let eq = core
                            .graph
                            .add_gate(OperatorKind::Eq, vec![OperandRef::Cell(cell)])?;
                        core.graph.bind_output(eq, *target)?;
                        bound.push(OperandRef::Node(eq));
                    }
                }
            } else {
                // Surplus assignee bits solve to zero.
                let zero = core.graph.aux_value_cell("0", rimfax_ir::BitValue::Zero);
                let eq = core
                    .graph
                    .add_gate(OperatorKind::Eq, vec![OperandRef::Cell(zero)])?;
                core.graph.bind_output(eq, *target)?;
                bound.push(OperandRef::Node(eq));
            }
        }
        core.bits = bound;
        core.summary = format!("{} = {}", assignee.name(), core.summary);
        debug!(
            assignee = assignee.name(),
            width,
            expression_bits = needed,
            "bound expression onto assignee"
        );
        Ok(Self {
            target: assignee.name().to_string(),
            core,
        })
    }

    /// The assignee's name.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Decode the assignee's value in one solved sample.
    pub fn decode(&self, sample_id: usize) -> Option<u64> {
        crate::expr::decode_named(&self.core.graph, &self.target, sample_id)
    }

    /// Decode any named operand's value in one solved sample.
    pub fn decode_operand(&self, name: &str, sample_id: usize) -> Option<u64> {
        crate::expr::decode_named(&self.core.graph, name, sample_id)
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.core.summary)
    }
}

impl crate::unsigned::Unsigned {
    /// Bind an expression onto this operand, growing it if needed.
    pub fn assign(&mut self, expr: impl Into<NumExpr>) -> TypeResult<Assignment> {
        Assignment::new(self, expr)
    }
}

impl crate::signed::Signed {
    /// Bind an expression onto this operand, growing it if needed.
    pub fn assign(&mut self, expr: impl Into<NumExpr>) -> TypeResult<Assignment> {
        Assignment::new(self, expr)
    }
}

impl crate::bit::Bit {
    /// Bind a single-bit expression onto this bit.
    pub fn assign(&mut self, expr: crate::expr::BitExpr) -> TypeResult<Assignment> {
        Assignment::new(self, expr)
    }
}

impl crate::bit::Bool {
    /// Bind a single-bit expression onto this boolean.
    pub fn assign(&mut self, expr: crate::expr::BitExpr) -> TypeResult<Assignment> {
        Assignment::new(self, expr)
    }
}
