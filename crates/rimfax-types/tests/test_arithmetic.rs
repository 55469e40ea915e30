//! Arithmetic synthesis, end to end.

use proptest::prelude::*;

use rimfax_anneal::ExhaustiveSampler;
use rimfax_types::{Operand, Statement, Unsigned};

fn bit_len(value: u64) -> usize {
    (64 - value.leading_zeros() as usize).max(1)
}

proptest! {
    /// Concrete additions fold during construction: no solver involved,
    /// the ladder itself must produce the sum at a fitted width.
    #[test]
    fn prop_addition_folds_to_sum(
        (m, a) in (1usize..=8).prop_flat_map(|m| (Just(m), 0u64..(1 << m))),
        (n, b) in (1usize..=8).prop_flat_map(|n| (Just(n), 0u64..(1 << n))),
    ) {
        let mut x = Unsigned::new("x", m);
        x.set_value(a);
        let mut y = Unsigned::new("y", n);
        y.set_value(b);

        let expr = &x + &y;
        prop_assert_eq!(expr.value(), Some(a + b));
        prop_assert!(expr.width() <= m.max(n) + 1);
        prop_assert!(expr.width() >= bit_len(a + b).min(m.max(n)));
    }

    /// Concrete multiplications fold the partial-product matrix.
    #[test]
    fn prop_multiplication_folds_to_product(
        a in 0u64..32,
        b in 0u64..32,
    ) {
        let x = Unsigned::with_value("x", a);
        let y = Unsigned::with_value("y", b);
        prop_assert_eq!((&x * &y).value(), Some(a * b));
    }
}

#[test]
fn test_addition_solves_for_unknowns() {
    // a + b == 5 over 2-bit unknowns: exactly (2,3) and (3,2).
    let a = Unsigned::new("a", 2);
    let b = Unsigned::new("b", 2);
    let mut sum = Unsigned::with_value("S", 5);
    let mut assignment = sum.assign(&a + &b).unwrap();
    let samples = assignment.solve_with(&ExhaustiveSampler::new()).unwrap();
    assert_eq!(samples.lowest_energy(), Some(0.0));
    let mut pairs = Vec::new();
    for id in 0..samples.len() {
        let a = assignment.decode_operand("a", id).unwrap();
        let b = assignment.decode_operand("b", id).unwrap();
        assert_eq!(a + b, 5);
        pairs.push((a, b));
    }
    pairs.sort_unstable();
    assert_eq!(pairs, vec![(2, 3), (3, 2)]);
}

#[test]
fn test_three_way_addition_with_constant() {
    // A = a + b + c + 1 with A pinned to 21: every low-energy sample
    // decodes to operands satisfying the equation exactly.
    let a = Unsigned::new("a", 4);
    let b = Unsigned::new("b", 2);
    let c = Unsigned::new("c", 2);
    let one = Unsigned::with_value("_1", 1);
    let mut total = Unsigned::with_value("A", 21);

    let mut assignment = total.assign(&a + &b + &c + &one).unwrap();
    let samples = assignment.solve_with(&ExhaustiveSampler::new()).unwrap();
    assert_eq!(samples.lowest_energy(), Some(0.0));
    assert!(!samples.is_empty());
    for id in 0..samples.len() {
        let a = assignment.decode_operand("a", id).unwrap();
        let b = assignment.decode_operand("b", id).unwrap();
        let c = assignment.decode_operand("c", id).unwrap();
        assert_eq!(a + b + c + 1, 21, "sample {id}: a={a} b={b} c={c}");
    }
    // (a, b, c) with b, c <= 3 and a <= 15: b + c must be at least 5.
    assert_eq!(samples.len(), 3);
}

#[test]
fn test_subtraction_solves() {
    let x = Unsigned::with_value("x", 7);
    let y = Unsigned::with_value("y", 5);
    let mut expr = &x - &y;
    let samples = expr.solve_with(&ExhaustiveSampler::new()).unwrap();
    assert_eq!(samples.lowest_energy(), Some(0.0));
    assert_eq!(samples.len(), 1);
    assert_eq!(expr.solved(0), Some(2));
}

#[test]
fn test_subtraction_assigned_decodes_by_name() {
    let x = Unsigned::with_value("x", 12);
    let y = Unsigned::with_value("y", 5);
    let mut diff = Unsigned::new("D", 1);
    let mut assignment = diff.assign(&x - &y).unwrap();
    assert_eq!(diff.width(), 4);
    let samples = assignment.solve_with(&ExhaustiveSampler::new()).unwrap();
    assert_eq!(samples.len(), 1);
    assert_eq!(assignment.decode(0), Some(7));
}

#[test]
fn test_division_solves() {
    let x = Unsigned::with_value("x", 6);
    let y = Unsigned::with_value("y", 2);
    let mut quotient = Unsigned::new("Q", 1);
    let mut assignment = quotient.assign(&x / &y).unwrap();
    let samples = assignment.solve_with(&ExhaustiveSampler::new()).unwrap();
    assert_eq!(samples.lowest_energy(), Some(0.0));
    for id in 0..samples.len() {
        assert_eq!(assignment.decode(id).unwrap() * 2, 6);
    }
}

#[test]
fn test_multiplication_solves_factorization() {
    // p * q == 6 over 2-bit unknowns: the ground samples are exactly the
    // factorizations 2*3 and 3*2. N is pre-sized to the product width so
    // its top bit stays pinned to zero.
    let p = Unsigned::new("p", 2);
    let q = Unsigned::new("q", 2);
    let mut n = Unsigned::with_value("N", 6);
    n.resize_with(4, rimfax_ir::BitValue::Zero);
    let mut assignment = n.assign(&p * &q).unwrap();
    let samples = assignment.solve_with(&ExhaustiveSampler::new()).unwrap();
    assert_eq!(samples.lowest_energy(), Some(0.0));
    let mut pairs = Vec::new();
    for id in 0..samples.len() {
        let p = assignment.decode_operand("p", id).unwrap();
        let q = assignment.decode_operand("q", id).unwrap();
        assert_eq!(p * q, 6);
        pairs.push((p, q));
    }
    pairs.sort_unstable();
    pairs.dedup();
    assert_eq!(pairs, vec![(2, 3), (3, 2)]);
}

#[test]
fn test_order_comparisons_solve() {
    let x = Unsigned::new("x", 2);
    let y = Unsigned::with_value("y", 1);

    let mut gt = x.greater(&y);
    let samples = gt.solve_with(&ExhaustiveSampler::new()).unwrap();
    assert_eq!(samples.lowest_energy(), Some(0.0));
    let mut seen = Vec::new();
    for id in 0..samples.len() {
        let x = gt.decode("x", id).unwrap();
        assert!(x > 1);
        seen.push(x);
    }
    seen.sort_unstable();
    seen.dedup();
    assert_eq!(seen, vec![2, 3]);

    let mut le = x.less_equal(&y);
    let samples = le.solve_with(&ExhaustiveSampler::new()).unwrap();
    for id in 0..samples.len() {
        assert!(le.decode("x", id).unwrap() <= 1);
    }
}

#[test]
fn test_equality_comparisons_solve() {
    let x = Unsigned::new("x", 2);
    let y = Unsigned::with_value("y", 2);

    let mut eq = x.equal(&y);
    let samples = eq.solve_with(&ExhaustiveSampler::new()).unwrap();
    assert_eq!(samples.len(), 1);
    assert_eq!(eq.decode("x", 0), Some(2));

    let mut ne = x.not_equal(&y);
    let samples = ne.solve_with(&ExhaustiveSampler::new()).unwrap();
    assert_eq!(samples.lowest_energy(), Some(0.0));
    let mut seen = Vec::new();
    for id in 0..samples.len() {
        let x = ne.decode("x", id).unwrap();
        assert_ne!(x, 2);
        seen.push(x);
    }
    seen.sort_unstable();
    seen.dedup();
    assert_eq!(seen, vec![0, 1, 3]);
}

#[test]
fn test_shifted_operand_arithmetic() {
    let x = Unsigned::with_value("x", 3);
    let shifted = &x << 2;
    let y = Unsigned::with_value("y", 1);
    assert_eq!((&shifted + &y).value(), Some(13));
}
