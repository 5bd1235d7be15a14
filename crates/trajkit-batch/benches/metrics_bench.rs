//! Criterion benchmarks for trajkit-batch: ADE/FDE and velocity derivation.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use trajkit_batch::{ade, fde, process_velocity, velocity, TrajectoryBatch};

fn make_batch(n: usize, n_steps: usize, offset: f64) -> TrajectoryBatch {
    let data: Vec<f64> = (0..n * n_steps * 2)
        .map(|i| (i as f64 * 0.01).sin() + offset)
        .collect();
    TrajectoryBatch::new(data, n, n_steps).unwrap()
}

fn bench_metrics(c: &mut Criterion) {
    let mut group = c.benchmark_group("displacement");

    for &n in &[256usize, 4096, 32768] {
        let pred = make_batch(n, 12, 0.0);
        let gt = make_batch(n, 12, 0.5);
        group.bench_with_input(BenchmarkId::new("ade", n), &(&pred, &gt), |b, (p, g)| {
            b.iter(|| ade(p, g).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("fde", n), &(&pred, &gt), |b, (p, g)| {
            b.iter(|| fde(p, g).unwrap());
        });
    }

    group.finish();
}

fn bench_velocity(c: &mut Criterion) {
    let obs = make_batch(4096, 8, 0.0);
    let pred = make_batch(4096, 12, 0.0);

    c.bench_function("velocity_4096x20", |b| {
        let full = obs.concat_steps(&pred).unwrap();
        b.iter(|| velocity(&full).unwrap());
    });
    c.bench_function("process_velocity_4096x8+12", |b| {
        b.iter(|| process_velocity(&obs, &pred).unwrap());
    });
}

criterion_group!(benches, bench_metrics, bench_velocity);
criterion_main!(benches);
