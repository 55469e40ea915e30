//! Benchmarks for objective compilation
//!
//! Run with: cargo bench -p rimfax-compile

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use rimfax_compile::QuboCompiler;
use rimfax_ir::{BitValue, OpGraph, OperandRef, ladder};

fn adder_graph(width: usize) -> (OpGraph, Vec<OperandRef>) {
    let mut g = OpGraph::new();
    let l: Vec<OperandRef> = (0..width)
        .map(|at| OperandRef::Cell(g.named_cell("a", Some(at as u32), BitValue::Unknown)))
        .collect();
    let r: Vec<OperandRef> = (0..width)
        .map(|at| OperandRef::Cell(g.named_cell("b", Some(at as u32), BitValue::Unknown)))
        .collect();
    let bits = ladder::add(&mut g, &l, &r).expect("ladder synthesis");
    (g, bits)
}

/// Benchmark ripple-carry ladder synthesis
fn bench_ladder_synthesis(c: &mut Criterion) {
    let mut group = c.benchmark_group("ladder_synthesis");

    for width in &[4usize, 8, 16, 32] {
        group.bench_with_input(BenchmarkId::new("add", width), width, |b, &w| {
            b.iter(|| adder_graph(black_box(w)));
        });
    }

    group.finish();
}

/// Benchmark lowering an adder graph to an objective
fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile");

    for width in &[4usize, 8, 16, 32] {
        let (g, bits) = adder_graph(*width);
        group.bench_with_input(BenchmarkId::new("finalized", width), width, |b, _| {
            b.iter(|| {
                let mut compiler = QuboCompiler::new();
                compiler.compile(black_box(&g), black_box(&bits)).unwrap();
                compiler.into_qubo()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_ladder_synthesis, bench_compile);
criterion_main!(benches);
