//! Benchmarks for fitting and ranking
//!
//! Run with: cargo bench --package pipeline
//!
//! Uses a synthetic catalog so the bench runs without data files.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use data_loader::{LanguageTable, MovieRecord};
use pipeline::{FittedCatalog, QueryProfile, RecommendationEngine};
use std::sync::Arc;

const GENRES: [&str; 8] = [
    "Action", "Adventure", "Comedy", "Drama", "Fantasy", "Horror", "Romance", "Thriller",
];
const LANGUAGES: [&str; 3] = ["en", "fr", "ja"];

fn synthetic_catalog(size: u32) -> Vec<MovieRecord> {
    (0..size)
        .map(|i| {
            let genres = [
                GENRES[(i % 8) as usize],
                GENRES[((i / 8) % 8) as usize],
            ];
            MovieRecord::new(
                i + 1,
                &genres,
                1990 + (i % 30) as u16,
                80 + (i % 90) as u16,
                (i % 100) as f32 / 10.0,
                LANGUAGES[(i % 3) as usize],
                i % 50 == 0,
            )
        })
        .collect()
}

fn query() -> QueryProfile {
    QueryProfile {
        genres: vec!["Action".to_string(), "Thriller".to_string()],
        release_year: 2010,
        runtime: 120.0,
        vote_average: 7.5,
        language: "English".to_string(),
        adult: false,
    }
}

fn bench_fit(c: &mut Criterion) {
    let movies = synthetic_catalog(50_000);

    c.bench_function("fit_catalog_50k", |b| {
        b.iter(|| {
            let fitted = FittedCatalog::fit(black_box(&movies)).unwrap();
            black_box(fitted)
        })
    });
}

fn bench_recommend(c: &mut Criterion) {
    let movies = synthetic_catalog(50_000);
    let model = FittedCatalog::fit(&movies).unwrap().into_shared();
    let languages: LanguageTable = [("en", "english"), ("fr", "french"), ("ja", "japanese")]
        .into_iter()
        .collect();
    let engine = RecommendationEngine::new(model, Arc::new(languages));
    let query = query();

    c.bench_function("recommend_top5_50k", |b| {
        b.iter(|| {
            let ids = engine.recommend(black_box(&query), black_box(5)).unwrap();
            black_box(ids)
        })
    });
}

criterion_group!(benches, bench_fit, bench_recommend);
criterion_main!(benches);
