//! Benchmarks for the MT inversion engine.
use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mt1d_inversion::{invert, InversionParams};

fn bench_invert_default(c: &mut Criterion) {
    c.bench_function("invert_default_three_block", |b| {
        b.iter(|| {
            let params = InversionParams::default();
            let _actual = black_box(invert(params));
        });
    });
}

fn bench_invert_scaling_with_model_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("invert_scaling_with_model_size");
    for &m in &[10usize, 40, 80] {
        group.throughput(Throughput::Elements(m as u64));
        group.bench_with_input(BenchmarkId::from_parameter(m), &m, |b, &m| {
            b.iter(|| {
                let params = InversionParams {
                    m,
                    n_freq: 31,
                    max_iter: 20,
                    ..InversionParams::default()
                };
                let _actual = black_box(invert(params));
            });
        });
    }
    group.finish();
}

fn bench_invert_single_iteration(c: &mut Criterion) {
    c.bench_function("invert_single_iteration", |b| {
        b.iter(|| {
            let params = InversionParams {
                m: 40,
                n_freq: 61,
                max_iter: 1,
                ..InversionParams::default()
            };
            let _actual = black_box(invert(params));
        });
    });
}

criterion_group!(
    benches,
    bench_invert_default,
    bench_invert_scaling_with_model_size,
    bench_invert_single_iteration,
);
criterion_main!(benches);
