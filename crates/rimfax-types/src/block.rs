//! Statements and blocks.

use std::fmt;

use rimfax_anneal::Sampler;
use rimfax_compile::{QuboCompiler, SampleSet};
use rimfax_ir::{OpGraph, OperandRef};

use crate::assign::Assignment;
use crate::error::TypeResult;
use crate::expr::{self, BitExpr, NumExpr};

/// A compilable statement: an expression, an assignment, a block, or a
/// function.
///
/// Statements compile into a shared [`QuboCompiler`], so several of them
/// accumulate into one objective; solving writes sampled values back onto
/// the statement's cells, keyed by sample id.
pub trait Statement {
    /// Lower this statement into the compiler's objective.
    fn compile_into(&self, compiler: &mut QuboCompiler) -> TypeResult<()>;

    /// Render; `decomposed` expands to one clause per bit-level operation.
    fn render(&self, decomposed: bool) -> String;

    /// The explicit apply-solution step: store each sample's values onto
    /// the statement's leaf cells.
    fn apply(&mut self, samples: &SampleSet);

    /// Rendered solutions, one string per stored sample.
    fn solutions(&self) -> Vec<String>;

    /// Clear stored solutions, keeping the operation graph.
    fn reset(&mut self);

    /// The statement's graphs with their compile roots, for per-bit
    /// regrouping by [`Function`](crate::Function).
    fn parts(&self) -> Vec<(&OpGraph, Vec<OperandRef>)>;

    /// Re-number auxiliary cells from `start`, returning the next free
    /// sequence number. Containers call this on pushed statements so that
    /// jointly-compiled graphs never share auxiliary identifiers.
    fn renumber_aux(&mut self, start: u32) -> u32;

    /// Compile (finalized), sample, and apply the result.
    fn solve_with(&mut self, sampler: &dyn Sampler) -> TypeResult<SampleSet> {
        let mut compiler = QuboCompiler::new();
        self.compile_into(&mut compiler)?;
        let samples = sampler.sample(compiler.qubo(), 1)?;
        self.apply(&samples);
        Ok(samples)
    }
}

macro_rules! statement_for_expr {
    ($ty:ty) => {
        impl Statement for $ty {
            fn compile_into(&self, compiler: &mut QuboCompiler) -> TypeResult<()> {
                compiler.compile(&self.core.graph, &self.core.roots())?;
                Ok(())
            }

            fn render(&self, decomposed: bool) -> String {
                if decomposed {
                    expr::decompose(&self.core.graph)
                } else {
                    self.core.summary.clone()
                }
            }

            fn apply(&mut self, samples: &SampleSet) {
                expr::apply_samples(&mut self.core.graph, samples);
            }

            fn solutions(&self) -> Vec<String> {
                (0..expr::solution_count(&self.core.graph))
                    .map(|id| expr::solution_string(&self.core.graph, id))
                    .collect()
            }

            fn reset(&mut self) {
                self.core.graph.clear_solutions();
            }

            fn parts(&self) -> Vec<(&OpGraph, Vec<OperandRef>)> {
                vec![(&self.core.graph, self.core.roots())]
            }

            fn renumber_aux(&mut self, start: u32) -> u32 {
                self.core.graph.renumber_aux(start)
            }
        }
    };
}

statement_for_expr!(BitExpr);
statement_for_expr!(NumExpr);
statement_for_expr!(Assignment);

/// An ordered sequence of statements compiled jointly into one objective.
#[derive(Default)]
pub struct Block {
    statements: Vec<Box<dyn Statement>>,
    next_aux: u32,
}

impl Block {
    /// An empty block.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a statement, re-numbering its auxiliary cells so they stay
    /// distinct from every other statement's in the shared objective.
    pub fn push(&mut self, statement: impl Statement + 'static) -> &mut Self {
        let mut statement = statement;
        self.next_aux = statement.renumber_aux(self.next_aux);
        self.statements.push(Box::new(statement));
        self
    }

    /// Number of statements.
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Whether the block is empty.
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

impl Statement for Block {
    fn compile_into(&self, compiler: &mut QuboCompiler) -> TypeResult<()> {
        for statement in &self.statements {
            statement.compile_into(compiler)?;
        }
        Ok(())
    }

    fn render(&self, decomposed: bool) -> String {
        let rendered: Vec<String> = self
            .statements
            .iter()
            .map(|s| s.render(decomposed))
            .collect();
        rendered.join(if decomposed { " " } else { "\n" })
    }

    fn apply(&mut self, samples: &SampleSet) {
        for statement in &mut self.statements {
            statement.apply(samples);
        }
    }

    fn solutions(&self) -> Vec<String> {
        let per_statement: Vec<Vec<String>> =
            self.statements.iter().map(|s| s.solutions()).collect();
        let count = per_statement.iter().map(|s| s.len()).max().unwrap_or(0);
        (0..count)
            .map(|id| {
                per_statement
                    .iter()
                    .filter_map(|s| s.get(id))
                    .cloned()
                    .collect::<Vec<_>>()
                    .join("; ")
            })
            .collect()
    }

    fn reset(&mut self) {
        for statement in &mut self.statements {
            statement.reset();
        }
    }

    fn parts(&self) -> Vec<(&OpGraph, Vec<OperandRef>)> {
        self.statements
            .iter()
            .flat_map(|s| s.parts())
            .collect()
    }

    fn renumber_aux(&mut self, start: u32) -> u32 {
        let mut next = start;
        for statement in &mut self.statements {
            next = statement.renumber_aux(next);
        }
        self.next_aux = next;
        next
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render(false))
    }
}
