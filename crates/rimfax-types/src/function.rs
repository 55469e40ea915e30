//! Functions — statements regrouped into per-bit atomic units.

use std::fmt;

use rimfax_compile::{QuboCompiler, SampleSet};
use rimfax_ir::{NodeId, OpGraph, OperandRef};

use crate::block::Statement;
use crate::error::TypeResult;
use crate::expr;

/// A named group of statements whose operations are bucketed by bit
/// position into atomic units.
///
/// Where a [`Block`](crate::Block) compiles statement after statement, a
/// function merges the statements' graphs and walks them *bit position by
/// bit position*: all sibling operations at one position compile as a
/// single unit before the next position starts. This keeps identical bit
/// positions across multiple internal operations scheduled together, which
/// matters when the same function body is reused with argument operands of
/// different concrete widths.
#[derive(Debug, Clone, Default)]
pub struct Function {
    name: String,
    graph: OpGraph,
    groups: Vec<Vec<NodeId>>,
    summaries: Vec<String>,
}

impl Function {
    /// An empty function.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// The function's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of bit positions with at least one atomic unit.
    pub fn num_positions(&self) -> usize {
        self.groups.len()
    }

    /// Number of operations grouped at one bit position.
    pub fn unit_size(&self, position: usize) -> usize {
        self.groups.get(position).map_or(0, |group| group.len())
    }

    /// Absorb a statement: its graph is merged in and its root operations
    /// are bucketed into this function's per-position atomic units.
    pub fn push(&mut self, statement: &dyn Statement) -> &mut Self {
        for (graph, roots) in statement.parts() {
            let (cell_off, node_off) = self.graph.merge(graph.clone());
            for (at, root) in roots.iter().enumerate() {
                if let OperandRef::Node(id) = OpGraph::remap(*root, cell_off, node_off) {
                    if self.groups.len() <= at {
                        self.groups.resize(at + 1, Vec::new());
                    }
                    self.groups[at].push(id);
                }
            }
        }
        self.summaries.push(statement.render(false));
        self
    }

    /// The function's signature-style rendering.
    pub fn declaration(&self) -> String {
        format!("{}({})", self.name, self.summaries.join(", "))
    }

    /// Decode a named operand's value in one solved sample.
    pub fn decode(&self, name: &str, sample_id: usize) -> Option<u64> {
        expr::decode_named(&self.graph, name, sample_id)
    }
}

impl Statement for Function {
    fn compile_into(&self, compiler: &mut QuboCompiler) -> TypeResult<()> {
        for group in &self.groups {
            for id in group {
                compiler.compile(&self.graph, &[OperandRef::Node(*id)])?;
            }
        }
        Ok(())
    }

    fn render(&self, decomposed: bool) -> String {
        if decomposed {
            expr::decompose(&self.graph)
        } else {
            self.declaration()
        }
    }

    fn apply(&mut self, samples: &SampleSet) {
        expr::apply_samples(&mut self.graph, samples);
    }

    fn solutions(&self) -> Vec<String> {
        (0..expr::solution_count(&self.graph))
            .map(|id| expr::solution_string(&self.graph, id))
            .collect()
    }

    fn reset(&mut self) {
        self.graph.clear_solutions();
    }

    fn parts(&self) -> Vec<(&OpGraph, Vec<OperandRef>)> {
        let roots = self
            .groups
            .iter()
            .flatten()
            .map(|id| OperandRef::Node(*id))
            .collect();
        vec![(&self.graph, roots)]
    }

    fn renumber_aux(&mut self, start: u32) -> u32 {
        self.graph.renumber_aux(start)
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.declaration())
    }
}
