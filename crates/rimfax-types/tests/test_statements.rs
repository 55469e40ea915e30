//! Blocks, functions, solution decoding and reset, end to end.

use rimfax_anneal::ExhaustiveSampler;
use rimfax_compile::QuboCompiler;
use rimfax_types::{Bit, Block, Function, Statement, Unsigned};

#[test]
fn test_block_solves_joint_constraints() {
    // Two statements over the shared bit b: a & b == 1 and b | c == 1
    // compiled jointly. Pinning the outputs forces a = b = 1.
    let a = Bit::new("a");
    let b = Bit::new("b");
    let c = Bit::new("c");
    let mut and_out = Bit::with_value("t", 1);
    let mut or_out = Bit::with_value("u", 1);

    let mut block = Block::new();
    block.push(and_out.assign(&a & &b).unwrap());
    block.push(or_out.assign(&b | &c).unwrap());

    let samples = block.solve_with(&ExhaustiveSampler::new()).unwrap();
    assert_eq!(samples.lowest_energy(), Some(0.0));
    assert!(!samples.is_empty());
    for sample in samples.iter() {
        assert_eq!(sample.bit("a"), Some(1));
        assert_eq!(sample.bit("b"), Some(1));
    }
}

#[test]
fn test_block_auxiliaries_stay_distinct() {
    // Two unrelated AND expressions in one block: their auxiliary outputs
    // must not collapse into one variable.
    let a = Bit::new("a");
    let b = Bit::new("b");
    let c = Bit::new("c");
    let d = Bit::new("d");

    let mut block = Block::new();
    block.push(&a & &b).push(&c & &d);

    let mut compiler = QuboCompiler::new();
    block.compile_into(&mut compiler).unwrap();
    // 4 inputs + 2 distinct gate outputs.
    assert_eq!(compiler.qubo().variables().len(), 6);
}

#[test]
fn test_statement_solutions_render_and_reset() {
    let x = Unsigned::new("x", 2);
    let y = Unsigned::with_value("y", 2);
    let mut expr = x.equal(&y);
    let samples = expr.solve_with(&ExhaustiveSampler::new()).unwrap();
    assert_eq!(samples.len(), 1);

    let rendered = expr.solutions();
    assert_eq!(rendered.len(), 1);
    assert!(rendered[0].contains("x/2b:10/"), "got: {}", rendered[0]);

    expr.reset();
    assert!(expr.solutions().is_empty());
}

#[test]
fn test_assignment_renders_compact_and_decomposed() {
    let x = Unsigned::new("x", 1);
    let y = Unsigned::new("y", 1);
    let mut sum = Unsigned::new("S", 2);
    let assignment = sum.assign(&x + &y).unwrap();
    assert_eq!(assignment.render(false), "S = (x + y)");
    let decomposed = assignment.render(true);
    // One clause per synthesized bit-level operation, ';'-terminated.
    assert!(decomposed.contains("S0 = x0 + y0"), "got: {decomposed}");
    assert!(decomposed.ends_with(';'), "got: {decomposed}");
}

#[test]
fn test_function_atomic_groups_solve() {
    // A function groups the per-bit operations of its statements and
    // compiles them position by position into the same objective.
    let x = Unsigned::new("x", 2);
    let y = Unsigned::new("y", 2);
    let mut sum = Unsigned::with_value("S", 4);

    let mut f = Function::new("adder");
    f.push(&sum.assign(&x + &y).unwrap());
    assert_eq!(f.num_positions(), 3);

    let samples = f.solve_with(&ExhaustiveSampler::new()).unwrap();
    assert_eq!(samples.lowest_energy(), Some(0.0));
    for id in 0..samples.len() {
        let x = f.decode("x", id).unwrap();
        let y = f.decode("y", id).unwrap();
        assert_eq!(x + y, 4);
    }
}
