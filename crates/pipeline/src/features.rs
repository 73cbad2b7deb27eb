//! Feature encoding shared by the catalog and by every query.
//!
//! ## Layout
//! ```text
//! [ z(runtime), z(vote_average), adult, genre_0 .. genre_{V-1} ]
//! ```
//! where `z` is the fitted standardizer and `V` the vocabulary size. Both the
//! catalog matrix and query vectors go through [`FeatureEncoder::encode`], so
//! the column order cannot drift between the two.

use crate::error::{RecommendError, Result};
use crate::scaler::{NUMERIC_COLUMNS, StandardScaler};
use crate::vocabulary::GenreVocabulary;
use data_loader::MovieRecord;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, instrument};
use uuid::Uuid;

/// Width of the numeric segment: two standardized columns plus the adult flag
pub const NUMERIC_WIDTH: usize = NUMERIC_COLUMNS + 1;

/// Identity of one fitted encoder.
///
/// Minted at fit time and stamped on every catalog matrix built from the
/// encoder, so a matrix can always tell which encoder it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncoderId(Uuid);

impl EncoderId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EncoderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EncoderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Raw attributes of one movie or query, ready to encode
#[derive(Debug, Clone, Copy)]
pub struct FeatureInput<'a> {
    pub runtime: f32,
    pub vote_average: f32,
    pub adult: bool,
    pub genres: &'a [String],
}

impl<'a> FeatureInput<'a> {
    /// Pull the encodable attributes out of a catalog row.
    ///
    /// Fails with `Encoding` when runtime or vote average is missing or not finite.
    pub fn from_record(movie: &'a MovieRecord) -> Result<Self> {
        let runtime = movie.runtime.ok_or_else(|| missing(movie, "runtime"))?;
        let vote_average = movie
            .vote_average
            .ok_or_else(|| missing(movie, "vote_average"))?;
        if !vote_average.is_finite() {
            return Err(RecommendError::Encoding {
                movie_id: movie.id,
                reason: format!("vote_average is not finite: {}", vote_average),
            });
        }

        Ok(Self {
            runtime: runtime as f32,
            vote_average,
            adult: movie.adult,
            genres: &movie.genres,
        })
    }
}

pub(crate) fn missing(movie: &MovieRecord, field: &str) -> RecommendError {
    RecommendError::Encoding {
        movie_id: movie.id,
        reason: format!("missing {}", field),
    }
}

/// Fitted standardizer plus genre vocabulary.
///
/// Immutable once fitted; share it behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureEncoder {
    id: EncoderId,
    scaler: StandardScaler,
    vocabulary: GenreVocabulary,
}

impl FeatureEncoder {
    /// Fit on the full catalog.
    ///
    /// ## Algorithm
    /// 1. Reject an empty catalog (the standard deviation is undefined)
    /// 2. Extract runtime and vote average from every row
    /// 3. Fit mean / population std per column
    /// 4. Collect the sorted distinct genre labels
    #[instrument(skip_all, fields(rows = movies.len()))]
    pub fn fit(movies: &[MovieRecord]) -> Result<Self> {
        if movies.is_empty() {
            return Err(RecommendError::InsufficientData(
                "cannot fit the feature encoder on an empty catalog".to_string(),
            ));
        }

        let samples = movies
            .iter()
            .map(|movie| {
                FeatureInput::from_record(movie)
                    .map(|input| [input.runtime, input.vote_average])
            })
            .collect::<Result<Vec<_>>>()?;

        let scaler = StandardScaler::fit(&samples)?;
        let vocabulary = GenreVocabulary::fit(movies.iter().map(|m| &m.genres));
        let encoder = Self::from_parts(EncoderId::new(), scaler, vocabulary);

        debug!(
            "Fitted encoder {}: mean={:?} std={:?} vocabulary={}",
            encoder.id,
            encoder.scaler.mean(),
            encoder.scaler.std(),
            encoder.vocabulary.len()
        );
        Ok(encoder)
    }

    pub fn from_parts(id: EncoderId, scaler: StandardScaler, vocabulary: GenreVocabulary) -> Self {
        Self {
            id,
            scaler,
            vocabulary,
        }
    }

    pub fn id(&self) -> EncoderId {
        self.id
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    pub fn vocabulary(&self) -> &GenreVocabulary {
        &self.vocabulary
    }

    /// Total vector width: `3 + V`
    pub fn width(&self) -> usize {
        NUMERIC_WIDTH + self.vocabulary.len()
    }

    /// Standardized runtime and vote average followed by the adult flag
    pub fn encode_numeric(&self, runtime: f32, vote_average: f32, adult: bool) -> [f32; NUMERIC_WIDTH] {
        let [runtime, vote_average] = self.scaler.transform([runtime, vote_average]);
        [runtime, vote_average, if adult { 1.0 } else { 0.0 }]
    }

    /// `V`-wide multi-hot vector; unknown genres contribute nothing
    pub fn encode_genres<S: AsRef<str>>(&self, genres: &[S]) -> Vec<f32> {
        self.vocabulary.encode(genres)
    }

    /// Encode one movie or query into the full feature layout
    pub fn encode(&self, input: &FeatureInput<'_>) -> Vec<f32> {
        let mut vector = vec![0.0; self.width()];
        vector[..NUMERIC_WIDTH].copy_from_slice(&self.encode_numeric(
            input.runtime,
            input.vote_average,
            input.adult,
        ));
        self.vocabulary
            .encode_into(input.genres, &mut vector[NUMERIC_WIDTH..]);
        vector
    }

    /// Sanity check for encoders that came from outside the process
    pub fn check(&self) -> Result<()> {
        self.scaler.check()
    }
}
