//! HTTP client for the remote movie-metadata service.
//!
//! This crate turns recommended movie identifiers into display details:
//! - One `GET /movie/{id}` per identifier, with a request timeout
//! - Genre ids and language codes mapped through the local catalog tables
//! - Batches fetched concurrently; a failed lookup never fails the batch
//!
//! It also lists movies the catalog may not hold: the weekly trending list,
//! filtered discovery and title search, walking result pages up to a limit.

pub mod client;
pub mod details;
pub mod error;
pub mod listing;
#[cfg(feature = "test-util")]
pub mod test_util;

pub use client::{DEFAULT_API_URL, DEFAULT_TIMEOUT, MetadataClient, MetadataConfig};
pub use details::{
    MovieCard, MovieDetails, TmdbGenre, TmdbListItem, TmdbMovie, TmdbPage, UNKNOWN_LANGUAGE,
};
pub use error::{MetadataError, Result};
pub use listing::{
    DEFAULT_LIST_LIMIT, DiscoverFilter, DiscoverSort, MAX_LIST_LIMIT, PAGE_SIZE, TRENDING_LIMIT,
};
