//! Benchmarks for mode lookup and backend dispatch.
//!
//! Measures the cost of reading the cached mode and of constructing host
//! arrays and tables through the context compared with building the
//! `nalgebra` matrix directly.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gpuswap_core::{detect::StaticDetector, prelude::*};

fn cpu_context() -> ComputeContext {
    ComputeContext::builder()
        .detector(StaticDetector::unavailable())
        .env_vars(Vec::<(String, String)>::new())
        .build()
}

fn bench_mode_lookup(c: &mut Criterion) {
    let ctx = cpu_context();
    ctx.mode();

    c.bench_function("cached_mode", |b| b.iter(|| black_box(ctx.gpu_mode())));
    c.bench_function("array_library", |b| {
        b.iter(|| black_box(ctx.array_library()))
    });
}

fn bench_array_creation(c: &mut Criterion) {
    let ctx = cpu_context();
    let mut group = c.benchmark_group("array_creation");

    for n in [16, 256, 4096] {
        let values: Vec<f64> = (0..n * n).map(|i| i as f64).collect();

        group.bench_with_input(BenchmarkId::new("context", n), &n, |b, &n| {
            b.iter(|| {
                ctx.create_array(values.clone(), &ArrayOptions::with_shape(n, n))
                    .map(black_box)
            })
        });

        group.bench_with_input(BenchmarkId::new("direct", n), &n, |b, &n| {
            b.iter(|| black_box(HostMatrix::from_row_slice(n, n, &values)))
        });
    }

    group.finish();
}

fn bench_table_records(c: &mut Criterion) {
    let ctx = cpu_context();
    let mut group = c.benchmark_group("table_records");

    for rows in [1_000, 100_000] {
        let records: Vec<Vec<f64>> = (0..rows)
            .map(|r| (0..8).map(|c| (r * 8 + c) as f64).collect())
            .collect();
        let names: Vec<String> = (0..8).map(|c| format!("c{}", c)).collect();

        group.bench_with_input(BenchmarkId::from_parameter(rows), &rows, |b, _| {
            b.iter(|| {
                ctx.create_table(
                    TableInput::records(names.clone(), records.clone()),
                    &TableOptions::default(),
                )
                .map(black_box)
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_mode_lookup,
    bench_array_creation,
    bench_table_records
);
criterion_main!(benches);
