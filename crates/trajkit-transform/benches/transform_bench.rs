//! Criterion benchmarks for trajkit-transform: normalization and augmentation.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use trajkit_batch::TrajectoryBatch;
use trajkit_transform::{normalize, random_rotate, reverse, swap_xy, TurningAugment};

fn make_batch(n: usize, n_steps: usize) -> TrajectoryBatch {
    let data: Vec<f64> = (0..n * n_steps * 2)
        .map(|i| (i as f64 * 0.37).sin() * 50.0 + (i % 7) as f64)
        .collect();
    TrajectoryBatch::new(data, n, n_steps).unwrap()
}

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");
    for &n in &[1024usize, 16384] {
        let batch = make_batch(n, 20);
        group.bench_with_input(BenchmarkId::new("fit_and_apply", n), &batch, |b, batch| {
            b.iter(|| normalize(batch, None).unwrap());
        });
    }
    group.finish();
}

fn bench_augment(c: &mut Criterion) {
    let batch = make_batch(8192, 20);

    c.bench_function("reverse_concat_8192x20", |b| {
        b.iter(|| reverse(&batch, true));
    });
    c.bench_function("swap_xy_8192x20", |b| {
        b.iter(|| swap_xy(&batch).unwrap());
    });
    c.bench_function("random_rotate_8192x20", |b| {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        b.iter(|| random_rotate(&batch, None, &mut rng).unwrap());
    });
    c.bench_function("augment_turning_8192x20_p0.5", |b| {
        let config = TurningAugment::default().with_proportion(0.5);
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        b.iter(|| config.apply(&batch, &mut rng).unwrap());
    });
}

criterion_group!(benches, bench_normalize, bench_augment);
criterion_main!(benches);
