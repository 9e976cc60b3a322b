// Recommendation benchmarks over a random catalog
// Catalog sizes stay small: the similarity matrix is N x N.
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gamerec_core::{
    ArtifactParts, ArtifactSnapshot, ColumnScale, FeatureSchema, FeatureTable, Mode, Recommender,
    ScalerParams, Vector, Vocabulary,
};
use rand::prelude::*;
use std::sync::Arc;

const NUMERIC: usize = 5;
const ONE_HOT: usize = 64;

fn random_catalog(n: usize) -> Recommender {
    let mut rng = rand::rng();
    let numeric: Vec<String> = (0..NUMERIC).map(|i| format!("n{i}")).collect();
    let scaler = ScalerParams::new(numeric.iter().map(|c| ColumnScale::new(c, 0.0, 1.0)).collect());
    let vocabulary = Vocabulary::new((0..ONE_HOT).map(|i| format!("cat_{i}")).collect());
    let schema = FeatureSchema::new(numeric, vec!["cat".into()]);

    let rows: Vec<Vec<f32>> = (0..n)
        .map(|_| {
            let mut row: Vec<f32> = (0..NUMERIC).map(|_| rng.random_range(0.0f32..1.0)).collect();
            row.extend((0..ONE_HOT).map(|_| if rng.random_bool(0.05) { 1.0 } else { 0.0 }));
            row
        })
        .collect();
    let names = (0..n).map(|i| format!("item {i}")).collect();
    let table = FeatureTable::from_rows(&rows).unwrap();

    let parts = ArtifactParts::derive(schema, scaler, vocabulary, names, table);
    Recommender::new(Arc::new(ArtifactSnapshot::new(parts).unwrap()))
}

fn benchmark_by_name(c: &mut Criterion) {
    let mut group = c.benchmark_group("by_name");

    for size in [500, 2_000].iter() {
        let recommender = random_catalog(*size);
        for mode in [Mode::Distance, Mode::Similarity] {
            group.bench_with_input(BenchmarkId::new(mode.to_string(), size), size, |b, _| {
                b.iter(|| {
                    let results = recommender.recommend_by_name(black_box("item 42"), mode, 10);
                    black_box(results)
                });
            });
        }
    }

    group.finish();
}

fn benchmark_by_vector(c: &mut Criterion) {
    let mut group = c.benchmark_group("by_vector");
    let recommender = random_catalog(2_000);
    let query = Vector::new(vec![0.5; NUMERIC + ONE_HOT]);

    for mode in [Mode::Distance, Mode::Similarity] {
        group.bench_function(mode.to_string(), |b| {
            b.iter(|| black_box(recommender.recommend_by_vector(black_box(&query), mode, 10)));
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_by_name, benchmark_by_vector);
criterion_main!(benches);
