//! Filter on exact release year.

use crate::catalog::CatalogMatrix;
use crate::error::Result;
use crate::query::ResolvedQuery;
use crate::traits::Filter;

/// Keeps rows released in exactly the query's year.
///
/// A movie one year off is dropped no matter how similar it is.
pub struct ReleaseYearFilter;

impl Filter for ReleaseYearFilter {
    fn name(&self) -> &str {
        "ReleaseYearFilter"
    }

    fn apply(
        &self,
        rows: Vec<usize>,
        matrix: &CatalogMatrix,
        query: &ResolvedQuery,
    ) -> Result<Vec<usize>> {
        let years = matrix.release_years();
        Ok(rows
            .into_iter()
            .filter(|&row| years[row] == query.release_year)
            .collect())
    }
}
