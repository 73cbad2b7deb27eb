//! Core traits for the candidate filtering stage.
//!
//! This module defines the Filter trait that allows composable,
//! extensible exact-match filters to be applied to catalog rows before
//! similarity ranking.

use crate::catalog::CatalogMatrix;
use crate::error::Result;
use crate::query::ResolvedQuery;

/// Core trait for filtering candidate rows.
///
/// All filters must implement this trait to be used in the FilterPipeline.
///
/// ## Design Note
/// - `Send + Sync` allows one pipeline to serve concurrent requests
/// - Candidates are catalog row indices; a filter must return a subset of its
///   input in the same ascending order, since ranking ties fall back to
///   catalog order. `FilterPipeline` rejects any other output.
pub trait Filter: Send + Sync {
    /// Returns the name of this filter (for logging/debugging)
    fn name(&self) -> &str;

    /// Apply this filter to a set of candidate rows.
    ///
    /// # Arguments
    /// * `rows` - Row indices into `matrix` (takes ownership)
    /// * `matrix` - The catalog matrix with its filter attributes
    /// * `query` - The resolved query
    fn apply(
        &self,
        rows: Vec<usize>,
        matrix: &CatalogMatrix,
        query: &ResolvedQuery,
    ) -> Result<Vec<usize>>;
}
