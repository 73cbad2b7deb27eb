//! Recommendation engine: rank catalog rows against one query.
//!
//! ## Algorithm
//! 1. Validate the query and K
//! 2. Encode the query with the catalog's own encoder
//! 3. Resolve the language name to a code (`Unknown` matches nothing)
//! 4. Keep rows with exactly the query's release year and language
//! 5. Score survivors by cosine similarity
//! 6. Stable sort by similarity, descending; ties keep catalog order
//! 7. Return the first K
//!
//! The engine never mutates its state, so one instance (or its clones) can
//! serve any number of concurrent requests.

use crate::catalog::FittedCatalog;
use crate::error::{RecommendError, Result};
use crate::filter_pipeline::FilterPipeline;
use crate::query::{LanguageCode, QueryProfile, ResolvedQuery};
use crate::similarity::cosine_similarity;
use data_loader::{LanguageTable, MovieId};
use rayon::prelude::*;
use std::sync::Arc;
use tracing::{debug, instrument};

/// A recommended movie and its similarity to the query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredMovie {
    pub movie_id: MovieId,
    pub similarity: f32,
}

#[derive(Clone)]
pub struct RecommendationEngine {
    model: Arc<FittedCatalog>,
    languages: Arc<LanguageTable>,
    filters: Arc<FilterPipeline>,
}

impl RecommendationEngine {
    /// Create an engine over a fitted catalog with the exact-match filters
    pub fn new(model: Arc<FittedCatalog>, languages: Arc<LanguageTable>) -> Self {
        Self::with_filters(model, languages, FilterPipeline::exact_match())
    }

    /// Create an engine with a custom filter pipeline
    pub fn with_filters(
        model: Arc<FittedCatalog>,
        languages: Arc<LanguageTable>,
        filters: FilterPipeline,
    ) -> Self {
        Self {
            model,
            languages,
            filters: Arc::new(filters),
        }
    }

    pub fn model(&self) -> &FittedCatalog {
        &self.model
    }

    pub fn languages(&self) -> &LanguageTable {
        &self.languages
    }

    /// Top-K movie identifiers for `query`, best first.
    ///
    /// An empty result is a valid answer: it means no catalog row shares the
    /// query's year and language.
    pub fn recommend(&self, query: &QueryProfile, k: usize) -> Result<Vec<MovieId>> {
        Ok(self
            .rank(query, k)?
            .into_iter()
            .map(|scored| scored.movie_id)
            .collect())
    }

    /// Like [`recommend`](Self::recommend) but keeps the similarity scores
    #[instrument(skip(self, query), fields(year = query.release_year, language = %query.language))]
    pub fn rank(&self, query: &QueryProfile, k: usize) -> Result<Vec<ScoredMovie>> {
        if k == 0 {
            return Err(RecommendError::InvalidQuery(
                "k must be at least 1".to_string(),
            ));
        }
        let resolved = self.resolve(query)?;
        let matrix = self.model.matrix();

        let rows = self.filters.apply(matrix, &resolved)?;
        if rows.is_empty() {
            debug!("No catalog rows match the query filters");
            return Ok(Vec::new());
        }

        // Order-preserving collect, so the stable sort below breaks ties by
        // catalog row order.
        let mut scored: Vec<(usize, f32)> = rows
            .par_iter()
            .map(|&row| (row, cosine_similarity(&resolved.vector, matrix.row(row))))
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);

        debug!("Ranked {} candidates, returning {}", rows.len(), scored.len());
        let ids = matrix.movie_ids();
        Ok(scored
            .into_iter()
            .map(|(row, similarity)| ScoredMovie {
                movie_id: ids[row],
                similarity,
            })
            .collect())
    }

    /// Validate, encode and resolve a query against this engine's catalog
    pub fn resolve(&self, query: &QueryProfile) -> Result<ResolvedQuery> {
        query.validate()?;

        let encoder = self.model.encoder();
        let matrix = self.model.matrix();
        if matrix.encoder_id() != encoder.id() {
            return Err(RecommendError::EncoderMismatch {
                expected: matrix.encoder_id().to_string(),
                found: encoder.id().to_string(),
            });
        }

        let vector = encoder.encode(&query.feature_input());
        if vector.len() != matrix.width() {
            return Err(RecommendError::EncoderMismatch {
                expected: format!("{} columns", matrix.width()),
                found: format!("{} columns", vector.len()),
            });
        }

        Ok(ResolvedQuery {
            vector,
            release_year: query.release_year,
            language: LanguageCode::resolve(&query.language, &self.languages),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::MovieRecord;

    fn engine(movies: &[MovieRecord]) -> RecommendationEngine {
        let model = FittedCatalog::fit(movies).unwrap().into_shared();
        let languages: LanguageTable = [("en", "english"), ("fr", "french")].into_iter().collect();
        RecommendationEngine::new(model, Arc::new(languages))
    }

    fn query(genres: &[&str], year: u16) -> QueryProfile {
        QueryProfile {
            genres: genres.iter().map(|g| g.to_string()).collect(),
            release_year: year,
            runtime: 120.0,
            vote_average: 7.5,
            language: "English".to_string(),
            adult: false,
        }
    }

    #[test]
    fn test_k_caps_at_survivors() {
        let engine = engine(&[
            MovieRecord::new(1, &["Action"], 2010, 120, 7.5, "en", false),
            MovieRecord::new(2, &["Drama"], 2010, 100, 6.0, "en", false),
            MovieRecord::new(3, &["Comedy"], 2010, 95, 6.5, "en", false),
            MovieRecord::new(4, &["Action"], 2012, 120, 7.5, "en", false),
        ]);

        let ids = engine.recommend(&query(&["Action"], 2010), 5).unwrap();
        assert_eq!(ids.len(), 3);
        assert_eq!(ids[0], 1);
    }

    #[test]
    fn test_k_truncates() {
        let engine = engine(&[
            MovieRecord::new(1, &["Action"], 2010, 120, 7.5, "en", false),
            MovieRecord::new(2, &["Drama"], 2010, 100, 6.0, "en", false),
            MovieRecord::new(3, &["Comedy"], 2010, 95, 6.5, "en", false),
        ]);
        assert_eq!(engine.recommend(&query(&["Action"], 2010), 1).unwrap(), vec![1]);
    }

    #[test]
    fn test_zero_k_is_invalid() {
        let engine = engine(&[MovieRecord::new(1, &["Action"], 2010, 120, 7.5, "en", false)]);
        let err = engine.recommend(&query(&["Action"], 2010), 0).unwrap_err();
        assert!(matches!(err, RecommendError::InvalidQuery(_)));
    }

    #[test]
    fn test_invalid_query_values() {
        let engine = engine(&[MovieRecord::new(1, &["Action"], 2010, 120, 7.5, "en", false)]);
        let mut q = query(&["Action"], 2010);
        q.vote_average = f32::NAN;
        assert!(matches!(
            engine.recommend(&q, 5),
            Err(RecommendError::InvalidQuery(_))
        ));
    }

    #[test]
    fn test_ties_keep_catalog_order() {
        // Identical rows score identically
        let engine = engine(&[
            MovieRecord::new(30, &["Drama"], 2010, 100, 6.0, "en", false),
            MovieRecord::new(10, &["Action"], 2010, 110, 7.0, "en", false),
            MovieRecord::new(20, &["Action"], 2010, 110, 7.0, "en", false),
            MovieRecord::new(5, &["Action"], 2010, 110, 7.0, "en", false),
        ]);

        let ranked = engine.rank(&query(&["Action"], 2010), 5).unwrap();
        let ids: Vec<MovieId> = ranked.iter().map(|s| s.movie_id).collect();
        assert_eq!(ids, vec![10, 20, 5, 30]);
        assert_eq!(ranked[0].similarity, ranked[1].similarity);
        assert_eq!(ranked[1].similarity, ranked[2].similarity);
    }

    #[test]
    fn test_exact_filters_beat_similarity() {
        let engine = engine(&[
            // Perfect matches on everything except year or language
            MovieRecord::new(1, &["Action"], 2011, 120, 7.5, "en", false),
            MovieRecord::new(2, &["Action"], 2010, 120, 7.5, "fr", false),
            // Poor match that passes the filters
            MovieRecord::new(3, &["Drama"], 2010, 80, 3.0, "en", false),
        ]);

        let ids = engine.recommend(&query(&["Action"], 2010), 5).unwrap();
        assert_eq!(ids, vec![3]);
    }

    #[test]
    fn test_unknown_language_returns_empty() {
        let engine = engine(&[MovieRecord::new(1, &["Action"], 2010, 120, 7.5, "en", false)]);
        let mut q = query(&["Action"], 2010);
        q.language = "Klingon".to_string();

        assert!(engine.recommend(&q, 5).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_genres_are_ignored() {
        let engine = engine(&[
            MovieRecord::new(1, &["Action"], 2010, 120, 7.5, "en", false),
            MovieRecord::new(2, &["Drama"], 2010, 120, 7.5, "en", false),
        ]);

        let ids = engine.recommend(&query(&["Action", "Space Opera"], 2010), 5).unwrap();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_resolved_vector_matches_catalog_width() {
        let engine = engine(&[
            MovieRecord::new(1, &["Action", "Crime"], 2010, 120, 7.5, "en", false),
            MovieRecord::new(2, &["Drama"], 2010, 100, 6.0, "en", false),
        ]);

        let resolved = engine.resolve(&query(&["Action"], 2010)).unwrap();
        assert_eq!(resolved.vector.len(), engine.model().matrix().width());
        assert_eq!(resolved.vector.len(), 3 + 3);
    }

    struct ForeignRowFilter;

    impl crate::traits::Filter for ForeignRowFilter {
        fn name(&self) -> &str {
            "ForeignRow"
        }

        fn apply(
            &self,
            _rows: Vec<usize>,
            matrix: &crate::catalog::CatalogMatrix,
            _query: &ResolvedQuery,
        ) -> Result<Vec<usize>> {
            Ok(vec![matrix.len() + 10])
        }
    }

    #[test]
    fn test_custom_filter_with_bad_rows_errors() {
        let model = FittedCatalog::fit(&[MovieRecord::new(1, &["Action"], 2010, 120, 7.5, "en", false)])
            .unwrap()
            .into_shared();
        let languages: LanguageTable = [("en", "english")].into_iter().collect();
        let engine = RecommendationEngine::with_filters(
            model,
            Arc::new(languages),
            FilterPipeline::new().add_filter(ForeignRowFilter),
        );

        let err = engine.recommend(&query(&["Action"], 2010), 3).unwrap_err();
        assert!(matches!(err, RecommendError::InvalidFilterOutput { .. }));
    }
}
