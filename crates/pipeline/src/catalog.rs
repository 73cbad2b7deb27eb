//! Catalog matrix construction and the fitted-catalog bundle.
//!
//! The matrix is row-major; row `i` is catalog movie `i`. The id, year and
//! language vectors are index-aligned with the rows and are only ever built
//! together.

use crate::error::{RecommendError, Result};
use crate::features::{EncoderId, FeatureEncoder, FeatureInput, missing};
use data_loader::{MovieId, MovieRecord};
use rayon::prelude::*;
use std::sync::Arc;
use tracing::{info, instrument};

/// One encoded row plus its filter attributes
struct EncodedRow {
    vector: Vec<f32>,
    movie_id: MovieId,
    release_year: u16,
    language: String,
}

/// Encoded feature vectors for every catalog movie.
#[derive(Debug, Clone)]
pub struct CatalogMatrix {
    encoder_id: EncoderId,
    width: usize,
    values: Vec<f32>,
    movie_ids: Vec<MovieId>,
    release_years: Vec<u16>,
    languages: Vec<String>,
}

impl CatalogMatrix {
    /// Encode every row with `encoder`, preserving input order.
    ///
    /// A row missing any required field rejects the whole catalog, so the
    /// index-aligned vectors can never fall out of step.
    #[instrument(skip_all, fields(rows = movies.len(), encoder = %encoder.id()))]
    pub fn build(movies: &[MovieRecord], encoder: &FeatureEncoder) -> Result<Self> {
        let rows = movies
            .par_iter()
            .map(|movie| encode_row(movie, encoder))
            .collect::<Result<Vec<EncodedRow>>>()?;

        let width = encoder.width();
        let mut matrix = Self {
            encoder_id: encoder.id(),
            width,
            values: Vec::with_capacity(rows.len() * width),
            movie_ids: Vec::with_capacity(rows.len()),
            release_years: Vec::with_capacity(rows.len()),
            languages: Vec::with_capacity(rows.len()),
        };
        for row in rows {
            matrix.values.extend_from_slice(&row.vector);
            matrix.movie_ids.push(row.movie_id);
            matrix.release_years.push(row.release_year);
            matrix.languages.push(row.language);
        }

        info!("Built catalog matrix: {} rows x {} columns", matrix.len(), width);
        Ok(matrix)
    }

    /// Id of the encoder this matrix was built with
    pub fn encoder_id(&self) -> EncoderId {
        self.encoder_id
    }

    /// Number of columns per row
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn len(&self) -> usize {
        self.movie_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movie_ids.is_empty()
    }

    /// Feature vector of row `idx`
    pub fn row(&self, idx: usize) -> &[f32] {
        let start = idx * self.width;
        &self.values[start..start + self.width]
    }

    pub fn movie_ids(&self) -> &[MovieId] {
        &self.movie_ids
    }

    pub fn release_years(&self) -> &[u16] {
        &self.release_years
    }

    pub fn languages(&self) -> &[String] {
        &self.languages
    }
}

fn encode_row(movie: &MovieRecord, encoder: &FeatureEncoder) -> Result<EncodedRow> {
    let input = FeatureInput::from_record(movie)?;
    let release_year = movie
        .release_year
        .ok_or_else(|| missing(movie, "release_year"))?;
    let language = movie
        .language
        .clone()
        .filter(|code| !code.is_empty())
        .ok_or_else(|| missing(movie, "language"))?;

    Ok(EncodedRow {
        vector: encoder.encode(&input),
        movie_id: movie.id,
        release_year,
        language,
    })
}

/// An encoder and the catalog matrix built from it, as one unit.
///
/// Construction is the only place the two are paired, and every constructor
/// checks they belong together. Built once, then shared read-only.
#[derive(Debug, Clone)]
pub struct FittedCatalog {
    encoder: FeatureEncoder,
    matrix: CatalogMatrix,
}

impl FittedCatalog {
    /// Fit a fresh encoder on `movies` and build the matrix with it
    pub fn fit(movies: &[MovieRecord]) -> Result<Self> {
        let encoder = FeatureEncoder::fit(movies)?;
        Self::with_encoder(movies, encoder)
    }

    /// Build the matrix with an existing (e.g. persisted) encoder
    pub fn with_encoder(movies: &[MovieRecord], encoder: FeatureEncoder) -> Result<Self> {
        encoder.check()?;
        let matrix = CatalogMatrix::build(movies, &encoder)?;
        Ok(Self { encoder, matrix })
    }

    /// Pair a matrix with an encoder, failing if the matrix was built by a
    /// different encoder or has a different width.
    pub fn from_parts(encoder: FeatureEncoder, matrix: CatalogMatrix) -> Result<Self> {
        if matrix.encoder_id() != encoder.id() {
            return Err(RecommendError::EncoderMismatch {
                expected: encoder.id().to_string(),
                found: matrix.encoder_id().to_string(),
            });
        }
        if matrix.width() != encoder.width() {
            return Err(RecommendError::EncoderMismatch {
                expected: format!("{} columns", encoder.width()),
                found: format!("{} columns", matrix.width()),
            });
        }
        Ok(Self { encoder, matrix })
    }

    pub fn encoder(&self) -> &FeatureEncoder {
        &self.encoder
    }

    pub fn matrix(&self) -> &CatalogMatrix {
        &self.matrix
    }

    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<MovieRecord> {
        vec![
            MovieRecord::new(11, &["Action"], 2010, 120, 7.5, "en", false),
            MovieRecord::new(7, &["Drama"], 2011, 95, 6.1, "fr", false),
            MovieRecord::new(42, &["Comedy", "Drama"], 2010, 101, 5.2, "en", false),
        ]
    }

    #[test]
    fn test_build_preserves_order_and_alignment() {
        let movies = catalog();
        let encoder = FeatureEncoder::fit(&movies).unwrap();
        let matrix = CatalogMatrix::build(&movies, &encoder).unwrap();

        assert_eq!(matrix.len(), 3);
        assert_eq!(matrix.movie_ids(), &[11, 7, 42]);
        assert_eq!(matrix.release_years(), &[2010, 2011, 2010]);
        assert_eq!(matrix.languages(), &["en", "fr", "en"]);

        for (idx, movie) in movies.iter().enumerate() {
            let expected = encoder.encode(&FeatureInput::from_record(movie).unwrap());
            assert_eq!(matrix.row(idx), expected.as_slice());
        }
    }

    #[test]
    fn test_build_rejects_missing_language() {
        let mut movies = catalog();
        movies[2].language = None;
        let encoder = FeatureEncoder::fit(&movies).unwrap();

        let err = CatalogMatrix::build(&movies, &encoder).unwrap_err();
        assert_eq!(
            err,
            RecommendError::Encoding {
                movie_id: 42,
                reason: "missing language".to_string(),
            }
        );
    }

    #[test]
    fn test_build_rejects_missing_year() {
        let mut movies = catalog();
        movies[0].release_year = None;

        let err = FittedCatalog::fit(&movies).unwrap_err();
        assert!(matches!(err, RecommendError::Encoding { movie_id: 11, .. }));
    }

    #[test]
    fn test_fitted_catalog_binds_encoder() {
        let fitted = FittedCatalog::fit(&catalog()).unwrap();
        assert_eq!(fitted.matrix().encoder_id(), fitted.encoder().id());
        assert_eq!(fitted.matrix().width(), fitted.encoder().width());
    }

    #[test]
    fn test_from_parts_rejects_foreign_matrix() {
        let movies = catalog();
        let encoder_a = FeatureEncoder::fit(&movies).unwrap();
        let encoder_b = FeatureEncoder::fit(&movies).unwrap();
        let matrix = CatalogMatrix::build(&movies, &encoder_a).unwrap();

        let err = FittedCatalog::from_parts(encoder_b, matrix.clone()).unwrap_err();
        assert!(matches!(err, RecommendError::EncoderMismatch { .. }));

        assert!(FittedCatalog::from_parts(encoder_a, matrix).is_ok());
    }

    #[test]
    fn test_with_encoder_reuses_persisted_id() {
        let movies = catalog();
        let encoder = FeatureEncoder::fit(&movies).unwrap();
        let id = encoder.id();

        let fitted = FittedCatalog::with_encoder(&movies, encoder).unwrap();
        assert_eq!(fitted.matrix().encoder_id(), id);
    }
}
