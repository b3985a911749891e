//! Benchmarks: line diff strategies and the full comparison pipeline.
//!
//! Run with: cargo bench --bench compare

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use sidediff::algo::{Algorithm, diff};
use sidediff::{CompareOptions, Interrupt, MemorySource, compare};

// ── Data generators ──

/// Source-like text: nested blocks with repeated braces and blank lines.
fn gen_source(lines: usize, seed: usize) -> String {
    let mut out = String::new();
    for i in 0..lines {
        match i % 8 {
            0 => out.push_str(&format!("fn item_{i}(x: u32) -> u32 {{\n")),
            1..=5 => out.push_str(&format!("    let v{} = x * {} + {};\n", i % 8, (i * seed) % 13, i % 5)),
            6 => out.push_str("}\n"),
            _ => out.push('\n'),
        }
    }
    out
}

/// Hashed sequences with heavy duplication.
fn gen_keys(len: usize, modulo: u64, salt: u64) -> Vec<u64> {
    (0..len as u64).map(|i| (i * salt + i / 7) % modulo).collect()
}

fn bench_algorithms(c: &mut Criterion) {
    let mut group = c.benchmark_group("line_diff");
    for &len in &[1_000usize, 10_000] {
        let a = gen_keys(len, 64, 3);
        let b = gen_keys(len, 64, 5);
        group.throughput(Throughput::Elements((len * 2) as u64));
        for algorithm in [Algorithm::Myers, Algorithm::FastMyers, Algorithm::Histogram] {
            group.bench_with_input(
                BenchmarkId::new(format!("{algorithm:?}"), len),
                &(&a, &b),
                |bench, (a, b)| {
                    let (a, b) = (a.as_slice(), b.as_slice());
                    bench.iter(|| diff(algorithm, black_box(a), black_box(b), 512, &Interrupt::never()));
                },
            );
        }
    }
    group.finish();
}

fn bench_compare(c: &mut Criterion) {
    let mut group = c.benchmark_group("compare");
    for &lines in &[500usize, 5_000] {
        let a = MemorySource::new(gen_source(lines, 3));
        let b = MemorySource::new(gen_source(lines, 7));
        group.throughput(Throughput::Elements((lines * 2) as u64));

        group.bench_with_input(BenchmarkId::new("default", lines), &lines, |bench, _| {
            let opts = CompareOptions::default();
            bench.iter(|| compare(black_box(&a), black_box(&b), &opts));
        });
        group.bench_with_input(BenchmarkId::new("char_diffs", lines), &lines, |bench, _| {
            let opts = CompareOptions::default().with_char_diffs(true);
            bench.iter(|| compare(black_box(&a), black_box(&b), &opts));
        });
        group.bench_with_input(BenchmarkId::new("serial", lines), &lines, |bench, _| {
            let opts = CompareOptions::default().with_max_workers(1);
            bench.iter(|| compare(black_box(&a), black_box(&b), &opts));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_algorithms, bench_compare);
criterion_main!(benches);
