//! Benchmark for noise kernel throughput.
//!
//! TARGET: one 129x129 chunk of any kernel in well under a millisecond
//!
//! Run with: cargo bench --package strata_procedural --bench noise_benchmark

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use strata_core::ChunkCoord;
use strata_procedural::{
    combine_seed, CellEdgeNoise, CellularNoise, DistanceMetric, GradientNoise, LatticeNoise,
    NoiseKernel,
};

const CHUNK: usize = 129;

fn benchmark_combine_seed(c: &mut Criterion) {
    c.bench_function("combine_seed", |b| {
        let mut x = 0i32;
        b.iter(|| {
            x = x.wrapping_add(1);
            black_box(combine_seed(black_box(x), black_box(-x), 42))
        });
    });
}

fn benchmark_kernel(c: &mut Criterion, name: &str, kernel: &dyn NoiseKernel) {
    let mut group = c.benchmark_group(name);
    group.throughput(Throughput::Elements((CHUNK * CHUNK) as u64));

    group.bench_function("chunk_129", |b| {
        let mut x = 0i32;
        b.iter(|| {
            x += 1;
            black_box(kernel.generate(ChunkCoord::new(x, -x), CHUNK, CHUNK, 42))
        });
    });

    group.finish();
}

fn benchmark_kernels(c: &mut Criterion) {
    benchmark_kernel(c, "lattice", &LatticeNoise::new(1.0));
    benchmark_kernel(c, "gradient", &GradientNoise::new(32));
    benchmark_kernel(c, "cellular", &CellularNoise::new(32));
    benchmark_kernel(
        c,
        "cell_edges_wavy",
        &CellEdgeNoise {
            metric: DistanceMetric::Wavy {
                frequency: 6.0,
                amplitude: 2.0,
                max_amplitude_distance: 16.0,
            },
            ..CellEdgeNoise::default()
        },
    );
}

criterion_group!(benches, benchmark_combine_seed, benchmark_kernels);
criterion_main!(benches);
