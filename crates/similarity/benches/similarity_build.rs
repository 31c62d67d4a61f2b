//! Benchmarks for the similarity matrix build
//!
//! Run with: cargo bench --package similarity
//!
//! Uses synthetic sparse vectors shaped like real tag documents
//! (a few dozen terms out of a 5000-term vocabulary).

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pipeline::FeatureVector;
use similarity::SimilarityBuilder;

const VOCABULARY: usize = 5000;
const TERMS_PER_ITEM: u32 = 40;

fn synthetic_vectors(n: usize) -> Vec<FeatureVector> {
    // Deterministic LCG so runs are comparable
    let mut state: u64 = 0x2545_F491_4F6C_DD1D;
    let mut next = move || {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (state >> 33) as u32
    };

    (0..n)
        .map(|_| {
            let counts: Vec<(u32, u32)> = (0..TERMS_PER_ITEM)
                .map(|_| (next() % VOCABULARY as u32, 1 + next() % 3))
                .collect();
            FeatureVector::from_counts(VOCABULARY, counts)
        })
        .collect()
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("similarity_build");
    group.sample_size(10);

    for n in [500usize, 2000] {
        let vectors = synthetic_vectors(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &vectors, |b, vectors| {
            let builder = SimilarityBuilder::new();
            b.iter(|| {
                let matrix = builder.build(black_box(vectors)).unwrap();
                black_box(matrix)
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build);
criterion_main!(benches);
