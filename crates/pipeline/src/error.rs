//! Error taxonomy for fitting, encoding and ranking.
//!
//! All variants are local, synchronous failures. Retrying the same call on the
//! same input always fails the same way.

use data_loader::MovieId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecommendError {
    /// Fitting was attempted on an empty catalog
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// A catalog row is missing a required field or holds an unusable value
    #[error("Cannot encode movie {movie_id}: {reason}")]
    Encoding { movie_id: MovieId, reason: String },

    /// The query profile or K is malformed
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Encoder and catalog matrix do not belong together
    #[error("Encoder mismatch: expected {expected}, found {found}")]
    EncoderMismatch { expected: String, found: String },

    /// A filter returned rows that are not an ascending subset of its input
    #[error("Filter {filter} returned invalid rows: {reason}")]
    InvalidFilterOutput { filter: String, reason: String },
}

pub type Result<T> = std::result::Result<T, RecommendError>;
