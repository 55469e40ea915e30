//! Ripple-carry synthesis over bit columns.
//!
//! The column-reduction engine serves every addition-shaped synthesis:
//! two-operand addition, chaining a further operand onto an existing ladder
//! (where half-adder→full-adder fusion bounds the node count to one per bit
//! position), and the multiplication partial-product matrix. A column holds
//! the operand bits contributing to one output position; carries produced
//! while reducing a column flow into the next one.

use tracing::trace;

use crate::error::IrResult;
use crate::graph::OpGraph;
use crate::node::{OperandRef, OperatorKind};
use crate::value::BitValue;

/// Synthesize `l + r` and return the result bits, LSB first.
///
/// Per position: both bits and no pending carry → a 2-input `Xor`
/// (half adder); both bits plus a carry → a 3-input full adder; a single
/// bit with no carry passes through unchanged; a single bit plus a carry →
/// `Xor`; no bits with a pending carry → the carry itself becomes the
/// final output bit. The top position is dropped when nothing real lands
/// there, so the result width is the minimum that holds a real bit.
pub fn add(g: &mut OpGraph, l: &[OperandRef], r: &[OperandRef]) -> IrResult<Vec<OperandRef>> {
    let width = l.len().max(r.len());
    let mut columns = vec![Vec::new(); width];
    for (at, column) in columns.iter_mut().enumerate() {
        if let Some(bit) = l.get(at) {
            column.push(*bit);
        }
        if let Some(bit) = r.get(at) {
            column.push(*bit);
        }
    }
    reduce_columns(g, columns)
}

/// Synthesize `l * r` via the partial-product matrix and return the result
/// bits, LSB first.
///
/// Each partial product `And(l_i, r_j)` lands in column `i + j`; columns
/// are then reduced with the fusion entry point, so chained sums inside a
/// column stay at one node per reduction step.
pub fn multiply(g: &mut OpGraph, l: &[OperandRef], r: &[OperandRef]) -> IrResult<Vec<OperandRef>> {
    if l.is_empty() || r.is_empty() {
        return Ok(vec![]);
    }
    let mut columns = vec![Vec::new(); l.len() + r.len()];
    for (i, lbit) in l.iter().enumerate() {
        for (j, rbit) in r.iter().enumerate() {
            let product = g.add_gate(OperatorKind::And, vec![*lbit, *rbit])?;
            g.bind_fresh_output(product)?;
            columns[i + j].push(OperandRef::Node(product));
        }
    }
    reduce_columns(g, columns)
}

/// Reduce per-position columns into output bits, rippling carries upward.
pub fn reduce_columns(
    g: &mut OpGraph,
    columns: Vec<Vec<OperandRef>>,
) -> IrResult<Vec<OperandRef>> {
    let mut bits = Vec::with_capacity(columns.len() + 1);
    let mut pending: Vec<OperandRef> = Vec::new();
    let mut at = 0usize;
    while at < columns.len() || !pending.is_empty() {
        let mut items = columns.get(at).cloned().unwrap_or_default();
        items.append(&mut pending);
        trace!(column = at, items = items.len(), "reducing column");
        match items.len() {
            0 => {
                // A hole below occupied columns keeps its position as a
                // constant zero; a hole at the top ends the number.
                let occupied_above = columns
                    .get(at + 1..)
                    .is_some_and(|rest| rest.iter().any(|c| !c.is_empty()));
                if occupied_above {
                    let zero = g.aux_value_cell("0", BitValue::Zero);
                    bits.push(OperandRef::Cell(zero));
                }
            }
            1 => bits.push(items[0]),
            _ => {
                let mut acc = items[0];
                let mut next = 1;
                while next < items.len() {
                    let (id, fused) = if next == 1 && items.len() == 3 {
                        let fusion = g.xor_adder(&items)?;
                        next = 3;
                        fusion
                    } else {
                        let fusion = g.xor_adder(&[acc, items[next]])?;
                        next += 1;
                        fusion
                    };
                    if g.node(id).output.is_none() {
                        g.bind_fresh_output(id)?;
                    }
                    if !fused {
                        let carry = g
                            .node(id)
                            .carry
                            .expect("additions always own a carry companion");
                        pending.push(OperandRef::Node(carry));
                    }
                    acc = OperandRef::Node(id);
                }
                bits.push(acc);
            }
        }
        at += 1;
    }
    // Width fitting: a top position holding only a pass-through zero or a
    // carry that already folded to zero is not a real result bit.
    while bits.len() > 1 {
        let top = *bits.last().expect("bits is non-empty");
        let dead = match top {
            OperandRef::Cell(id) => {
                g.cell(id).is_aux() && g.cell(id).value() == BitValue::Zero
            }
            OperandRef::Node(id) => {
                g.node(id).kind == OperatorKind::Carry && g.value_of(top) == BitValue::Zero
            }
        };
        if !dead {
            break;
        }
        bits.pop();
    }
    Ok(bits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::OperandRef;

    fn capture(g: &mut OpGraph, name: &str, value: u64, width: usize) -> Vec<OperandRef> {
        (0..width)
            .map(|at| {
                let bit = BitValue::from_bit(((value >> at) & 1) as u8);
                OperandRef::Cell(g.named_cell(name, Some(at as u32), bit))
            })
            .collect()
    }

    fn decode(g: &OpGraph, bits: &[OperandRef]) -> Option<u64> {
        let mut value = 0u64;
        for (at, bit) in bits.iter().enumerate() {
            value |= u64::from(g.value_of(*bit).bit()?) << at;
        }
        Some(value)
    }

    #[test]
    fn test_add_folds_concrete_operands() {
        for (a, aw, b, bw) in [(1u64, 1, 1u64, 1), (5, 3, 3, 2), (7, 3, 7, 3), (12, 4, 1, 1)] {
            let mut g = OpGraph::new();
            let l = capture(&mut g, "a", a, aw);
            let r = capture(&mut g, "b", b, bw);
            let bits = add(&mut g, &l, &r).unwrap();
            assert_eq!(decode(&g, &bits), Some(a + b), "{a} + {b}");
        }
    }

    fn capture_unknown(g: &mut OpGraph, name: &str, width: usize) -> Vec<OperandRef> {
        (0..width)
            .map(|at| {
                OperandRef::Cell(g.named_cell(name, Some(at as u32), BitValue::Unknown))
            })
            .collect()
    }

    #[test]
    fn test_add_width_fitting() {
        // 1-bit + 1-bit of unknowns keeps the carry position.
        let mut g = OpGraph::new();
        let l = capture_unknown(&mut g, "a", 1);
        let r = capture_unknown(&mut g, "b", 1);
        let bits = add(&mut g, &l, &r).unwrap();
        assert_eq!(bits.len(), 2);

        // A carry that folded to zero is pared back off the top.
        let mut g = OpGraph::new();
        let l = capture(&mut g, "a", 1, 1);
        let r = capture(&mut g, "b", 0, 1);
        let bits = add(&mut g, &l, &r).unwrap();
        assert_eq!(bits.len(), 1);
        assert_eq!(decode(&g, &bits), Some(1));

        // Adding a zero-width operand passes the other side through.
        let mut g = OpGraph::new();
        let l = capture(&mut g, "a", 9, 4);
        let bits = add(&mut g, &l, &[]).unwrap();
        assert_eq!(bits.len(), 4);
        assert_eq!(decode(&g, &bits), Some(9));
    }

    #[test]
    fn test_chained_add_uses_fusion() {
        // a + b + c over 1-bit operands: the chained ladder promotes the
        // half adder in place, so one node serves the whole bit position.
        let mut g = OpGraph::new();
        let a = capture(&mut g, "a", 1, 1);
        let b = capture(&mut g, "b", 1, 1);
        let c = capture(&mut g, "c", 1, 1);
        let partial = add(&mut g, &a, &b).unwrap();
        let nodes_before = g.num_nodes();
        let bits = add(&mut g, &partial, &c).unwrap();
        // Promotion, not layering: no new sum node at bit 0.
        assert_eq!(g.num_nodes(), nodes_before);
        assert_eq!(decode(&g, &bits), Some(3));
    }

    #[test]
    fn test_chained_add_values() {
        for (a, b, c) in [(3u64, 3, 3), (1, 2, 3), (7, 1, 5), (0, 0, 1)] {
            let mut g = OpGraph::new();
            let aw = capture(&mut g, "a", a, 3);
            let bw = capture(&mut g, "b", b, 3);
            let cw = capture(&mut g, "c", c, 3);
            let partial = add(&mut g, &aw, &bw).unwrap();
            let bits = add(&mut g, &partial, &cw).unwrap();
            assert_eq!(decode(&g, &bits), Some(a + b + c), "{a} + {b} + {c}");
        }
    }

    #[test]
    fn test_multiply_folds_concrete_operands() {
        for (a, aw, b, bw) in [(3u64, 2, 3u64, 2), (5, 3, 6, 3), (7, 3, 0, 1), (15, 4, 9, 4)] {
            let mut g = OpGraph::new();
            let l = capture(&mut g, "a", a, aw);
            let r = capture(&mut g, "b", b, bw);
            let bits = multiply(&mut g, &l, &r).unwrap();
            assert_eq!(decode(&g, &bits), Some(a * b), "{a} * {b}");
        }
    }

    proptest::proptest! {
        #[test]
        fn prop_ladder_folds_concrete_sums(a in 0u64..256, b in 0u64..256) {
            let mut g = OpGraph::new();
            let l = capture(&mut g, "a", a, 8);
            let r = capture(&mut g, "b", b, 8);
            let bits = add(&mut g, &l, &r).unwrap();
            proptest::prop_assert_eq!(decode(&g, &bits), Some(a + b));
        }

        #[test]
        fn prop_ladder_folds_concrete_products(a in 0u64..64, b in 0u64..64) {
            let mut g = OpGraph::new();
            let l = capture(&mut g, "a", a, 6);
            let r = capture(&mut g, "b", b, 6);
            let bits = multiply(&mut g, &l, &r).unwrap();
            proptest::prop_assert_eq!(decode(&g, &bits), Some(a * b));
        }
    }

    #[test]
    fn test_final_carry_becomes_top_bit() {
        let mut g = OpGraph::new();
        let l = capture(&mut g, "a", 1, 1);
        let r = capture(&mut g, "b", 1, 1);
        let bits = add(&mut g, &l, &r).unwrap();
        let top = bits.last().unwrap();
        match top {
            OperandRef::Node(id) => assert_eq!(g.node(*id).kind, OperatorKind::Carry),
            OperandRef::Cell(_) => panic!("top bit should be the pending carry"),
        }
        assert_eq!(decode(&g, &bits), Some(2));
    }
}
