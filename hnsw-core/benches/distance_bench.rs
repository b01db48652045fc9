use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hnsw_core::squared_euclidean;

fn random_vector(dim: usize, seed: u64) -> Vec<f32> {
    (0..dim)
        .map(|i| {
            let x = (i as u64).wrapping_mul(2654435761).wrapping_add(seed);
            ((x % 10_000) as f32) / 10_000.0
        })
        .collect()
}

fn bench_squared_euclidean(c: &mut Criterion) {
    let mut group = c.benchmark_group("squared_euclidean");
    for &dim in &[32usize, 128, 384, 768, 1536] {
        let a = random_vector(dim, 1);
        let b = random_vector(dim, 2);
        group.bench_with_input(BenchmarkId::from_parameter(dim), &dim, |bencher, _| {
            bencher.iter(|| squared_euclidean(black_box(&a), black_box(&b)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_squared_euclidean);
criterion_main!(benches);
