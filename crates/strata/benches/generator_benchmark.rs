//! Benchmark for generator queries on the reference terrain.
//!
//! Cold queries build a fresh generator, so every layer computes; warm
//! queries hit the feature cache.
//!
//! Run with: cargo bench --package strata --bench generator_benchmark

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use strata::TerrainConfig;

const REFERENCE: &str = include_str!("../data/terrain.toml");

fn benchmark_cold_elevation(c: &mut Criterion) {
    let config = TerrainConfig::from_toml_str(REFERENCE).unwrap();
    let mut group = c.benchmark_group("cold_query");
    group.sample_size(10);

    group.bench_function("elevation", |b| {
        b.iter(|| {
            let generator = config.build_generator().unwrap();
            black_box(generator.evaluate("elevation", 0, 0).unwrap())
        });
    });

    group.bench_function("vegetation", |b| {
        b.iter(|| {
            let generator = config.build_generator().unwrap();
            black_box(generator.evaluate("vegetation", 0, 0).unwrap())
        });
    });

    group.finish();
}

fn benchmark_warm_query(c: &mut Criterion) {
    let generator = TerrainConfig::from_toml_str(REFERENCE)
        .unwrap()
        .build_generator()
        .unwrap();
    generator.evaluate("vegetation", 0, 0).unwrap();

    c.bench_function("warm_query_vegetation", |b| {
        b.iter(|| black_box(generator.evaluate(black_box("vegetation"), 0, 0).unwrap()));
    });
}

criterion_group!(benches, benchmark_cold_elevation, benchmark_warm_query);
criterion_main!(benches);
