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

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    group.sample_size(10);
    for &n in &[1_000usize, 10_000] {
        let dim = 128;
        let base = dataset(n, dim);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |bencher, _| {
            bencher.iter(|| {
                let mut index = HnswIndex::new();
                index.build(dim, black_box(&base)).unwrap();
                index
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build);
criterion_main!(benches);
