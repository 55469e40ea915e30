//! Gate truth tables, end to end: compile, sample exhaustively, decode.

use rimfax_anneal::ExhaustiveSampler;
use rimfax_types::{Bit, BitExpr, Statement};

/// Solve a two-input gate over unknown bits and check that the ground
/// samples reproduce the truth table exactly: one sample per input pair,
/// each with the correct output.
fn assert_truth_table(mut expr: BitExpr, truth: impl Fn(u64, u64) -> u64) {
    let samples = expr.solve_with(&ExhaustiveSampler::new()).unwrap();
    assert_eq!(samples.len(), 4, "one ground state per input pair");
    assert_eq!(samples.lowest_energy(), Some(0.0));
    let mut seen = Vec::new();
    for id in 0..samples.len() {
        let a = expr.decode("a", id).unwrap();
        let b = expr.decode("b", id).unwrap();
        let out = expr.solved(id).unwrap();
        assert_eq!(out, truth(a, b), "inputs a={a} b={b}");
        seen.push((a, b));
    }
    seen.sort_unstable();
    assert_eq!(seen, vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
}

#[test]
fn test_and_table() {
    let a = Bit::new("a");
    let b = Bit::new("b");
    assert_truth_table(&a & &b, |a, b| a & b);
}

#[test]
fn test_or_table() {
    let a = Bit::new("a");
    let b = Bit::new("b");
    assert_truth_table(&a | &b, |a, b| a | b);
}

#[test]
fn test_xor_table() {
    let a = Bit::new("a");
    let b = Bit::new("b");
    assert_truth_table(&a ^ &b, |a, b| a ^ b);
}

#[test]
fn test_nand_table() {
    let a = Bit::new("a");
    let b = Bit::new("b");
    assert_truth_table(a.nand(&b), |a, b| 1 - (a & b));
}

#[test]
fn test_nor_table() {
    let a = Bit::new("a");
    let b = Bit::new("b");
    assert_truth_table(a.nor(&b), |a, b| 1 - (a | b));
}

#[test]
fn test_xnor_table() {
    let a = Bit::new("a");
    let b = Bit::new("b");
    assert_truth_table(a.xnor(&b), |a, b| 1 - (a ^ b));
}

#[test]
fn test_not() {
    let a = Bit::new("a");
    let mut expr = !&a;
    let samples = expr.solve_with(&ExhaustiveSampler::new()).unwrap();
    assert_eq!(samples.len(), 2);
    for id in 0..samples.len() {
        let a = expr.decode("a", id).unwrap();
        let inverted = expr.decode("~a", id).unwrap();
        assert_eq!(inverted, 1 - a);
    }
}

#[test]
fn test_bit_comparisons() {
    let a = Bit::new("a");
    let b = Bit::new("b");

    let mut less = a.less(&b);
    let samples = less.solve_with(&ExhaustiveSampler::new()).unwrap();
    for id in 0..samples.len() {
        assert!(less.decode("a", id).unwrap() < less.decode("b", id).unwrap());
    }

    let mut ge = a.greater_equal(&b);
    let samples = ge.solve_with(&ExhaustiveSampler::new()).unwrap();
    assert_eq!(samples.len(), 3);
    for id in 0..samples.len() {
        assert!(ge.decode("a", id).unwrap() >= ge.decode("b", id).unwrap());
    }
}

#[test]
fn test_chained_expression_solves() {
    // (a & b) | c == every ground state satisfies the composite formula.
    let a = Bit::new("a");
    let b = Bit::new("b");
    let c = Bit::new("c");
    let mut expr = (&a & &b) | &c;
    let samples = expr.solve_with(&ExhaustiveSampler::new()).unwrap();
    assert_eq!(samples.len(), 8, "all input combinations are satisfiable");
    for id in 0..samples.len() {
        let a = expr.decode("a", id).unwrap();
        let b = expr.decode("b", id).unwrap();
        let c = expr.decode("c", id).unwrap();
        assert_eq!(expr.solved(id).unwrap(), (a & b) | c);
    }
}
