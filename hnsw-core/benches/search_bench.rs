use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hnsw_core::HnswIndex;

fn dataset(n: usize, dim: usize) -> Vec<f32> {
    (0..n * dim)
        .map(|i| {
            let x = (i as u64).wrapping_mul(2654435761);
            ((x % 10_000) as f32) / 10_000.0
        })
        .collect()
}

fn bench_search(c: &mut Criterion) {
    let dim = 128;
    let n = 20_000;
    let base = dataset(n, dim);
    let query = dataset(1, dim);

    let mut group = c.benchmark_group("search_ef");
    group.sample_size(10);
    for &ef in &[50usize, 100, 200, 400] {
        group.bench_with_input(BenchmarkId::from_parameter(ef), &ef, |bencher, &ef| {
            let mut scoped = HnswIndex::new();
            scoped.set_parameters(16, 200, ef).unwrap();
            scoped.build(dim, &base).unwrap();
            let mut out = [0u64; 10];
            bencher.iter(|| scoped.search(black_box(&query), &mut out).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_search);
criterion_main!(benches);
