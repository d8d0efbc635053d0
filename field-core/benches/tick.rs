//! Benchmarks for per-frame field evaluation.
//!
//! Run with: `cargo bench -p field-core`

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use field_core::{ParameterUpdate, ParticleField, SharedParameters};
use rand::{SeedableRng, rngs::StdRng};

fn params(count: usize) -> SharedParameters {
    SharedParameters::new(900.0, 20.0, 0.4, 30.0, 0.02, count, 10.0, 10.0).unwrap()
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");

    for count in [6_000usize, 100_000] {
        for (label, threshold) in [("serial", usize::MAX), ("parallel", 0)] {
            let mut field =
                ParticleField::with_rng(params(count), StdRng::seed_from_u64(0)).unwrap();
            field.set_parallel_threshold(threshold);

            group.bench_with_input(BenchmarkId::new(label, count), &count, |b, _| {
                b.iter(|| black_box(field.tick().len()))
            });
        }
    }

    group.finish();
}

fn bench_regenerate(c: &mut Criterion) {
    let mut field = ParticleField::with_rng(params(6_000), StdRng::seed_from_u64(0)).unwrap();
    let mut flip = false;

    c.bench_function("regenerate_6000", |b| {
        b.iter(|| {
            flip = !flip;
            let count = if flip { 6_000 } else { 6_001 };
            black_box(
                field
                    .set_parameters(&ParameterUpdate::new().particle_count(count))
                    .unwrap(),
            )
        })
    });
}

criterion_group!(benches, bench_tick, bench_regenerate);
criterion_main!(benches);
