//! Content-based movie matching: feature encoding, filtering and ranking.
//!
//! This crate provides:
//! - FeatureEncoder: standardized numeric columns + multi-hot genres
//! - CatalogMatrix / FittedCatalog: the encoded catalog, bound to its encoder
//! - Filter trait and the exact-match FilterPipeline
//! - RecommendationEngine: cosine-similarity ranking of filtered rows
//!
//! Nothing in here touches the network or the filesystem. Callers load the
//! catalog, hand it over as plain records, and share the fitted result.
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{FittedCatalog, QueryProfile, RecommendationEngine};
//! use std::sync::Arc;
//!
//! let model = FittedCatalog::fit(catalog.movies())?.into_shared();
//! let engine = RecommendationEngine::new(model, Arc::new(languages));
//!
//! let ids = engine.recommend(&query, 5)?;
//! ```

pub mod catalog;
pub mod engine;
pub mod error;
pub mod features;
pub mod filter_pipeline;
pub mod filters;
pub mod query;
pub mod scaler;
pub mod similarity;
pub mod traits;
pub mod vocabulary;

// Re-export main types
pub use catalog::{CatalogMatrix, FittedCatalog};
pub use engine::{RecommendationEngine, ScoredMovie};
pub use error::{RecommendError, Result};
pub use features::{EncoderId, FeatureEncoder, FeatureInput, NUMERIC_WIDTH};
pub use filter_pipeline::FilterPipeline;
pub use query::{DEFAULT_TOP_K, LanguageCode, QueryProfile, ResolvedQuery};
pub use scaler::StandardScaler;
pub use similarity::cosine_similarity;
pub use traits::Filter;
pub use vocabulary::GenreVocabulary;
