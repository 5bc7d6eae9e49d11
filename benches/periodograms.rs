//! Benchmarks for periodogram estimators and partitioned dispatch.

use std::sync::Arc;

use anofox_periodogram::core::{FrequencyGrid, GridSpec, TimeSeries};
use anofox_periodogram::diagnostics::NullSink;
use anofox_periodogram::dispatch::{estimate, PeriodogramConfig};
use anofox_periodogram::estimators::{
    Bls, Clean, Estimator, Gls, Kepler, MultiHarmonicAov, Pdm, Scargle,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn generate_irregular_sine(n: usize, freq: f64) -> TimeSeries {
    let times: Vec<f64> = (0..n)
        .map(|i| i as f64 + 0.4 * ((i * 7 % 13) as f64 / 13.0))
        .collect();
    let values = times
        .iter()
        .map(|t| (2.0 * std::f64::consts::PI * freq * t).sin() + 0.1 * (t * 0.37).cos())
        .collect();
    TimeSeries::new(times, values).unwrap().centered()
}

fn bench_estimators(c: &mut Criterion) {
    let mut group = c.benchmark_group("estimators");
    let grid = FrequencyGrid::new(0.01, 0.5, 0.001).unwrap();

    for size in [100, 500, 1000].iter() {
        let series = generate_irregular_sine(*size, 0.1);

        group.bench_with_input(BenchmarkId::new("Scargle", size), size, |b, _| {
            let estimator = Scargle::default();
            b.iter(|| estimator.compute(black_box(&series), &grid))
        });

        group.bench_with_input(BenchmarkId::new("Gls", size), size, |b, _| {
            let estimator = Gls::new();
            b.iter(|| estimator.compute(black_box(&series), &grid))
        });

        group.bench_with_input(BenchmarkId::new("AoV", size), size, |b, _| {
            let estimator = MultiHarmonicAov::new(2);
            b.iter(|| estimator.compute(black_box(&series), &grid))
        });

        group.bench_with_input(BenchmarkId::new("Pdm", size), size, |b, _| {
            let estimator = Pdm::default();
            b.iter(|| estimator.compute(black_box(&series), &grid))
        });

        group.bench_with_input(BenchmarkId::new("Bls", size), size, |b, _| {
            let estimator = Bls::default();
            b.iter(|| estimator.compute(black_box(&series), &grid))
        });
    }

    group.finish();
}

fn bench_expensive_estimators(c: &mut Criterion) {
    let mut group = c.benchmark_group("expensive_estimators");
    group.sample_size(10);

    let series = generate_irregular_sine(200, 0.1);
    let grid = FrequencyGrid::new(0.0, 0.5, 0.005).unwrap();

    group.bench_function("Clean", |b| {
        let estimator = Clean::default();
        b.iter(|| estimator.compute(black_box(&series), &grid))
    });

    group.bench_function("Kepler", |b| {
        let estimator = Kepler::new().with_offsets(0.0, 330.0, 30.0);
        b.iter(|| estimator.compute(black_box(&series), &grid))
    });

    group.finish();
}

fn bench_partitioning(c: &mut Criterion) {
    let mut group = c.benchmark_group("partitioned_gls");

    let series = generate_irregular_sine(1000, 0.1);
    for threads in [1, 2, 4, 8].iter() {
        let config = PeriodogramConfig::new()
            .with_grid(GridSpec::new(0.0, 0.5, 0.0002))
            .with_threads(*threads)
            .with_diagnostics(Arc::new(NullSink));

        group.bench_with_input(BenchmarkId::new("threads", threads), threads, |b, _| {
            b.iter(|| estimate(&Gls::new(), black_box(&series), &config))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_estimators,
    bench_expensive_estimators,
    bench_partitioning
);
criterion_main!(benches);
