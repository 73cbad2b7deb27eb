//! Filter on exact language code.

use crate::catalog::CatalogMatrix;
use crate::error::Result;
use crate::query::ResolvedQuery;
use crate::traits::Filter;

/// Keeps rows whose language code equals the query's resolved code.
///
/// An unresolved query language matches nothing.
pub struct LanguageFilter;

impl Filter for LanguageFilter {
    fn name(&self) -> &str {
        "LanguageFilter"
    }

    fn apply(
        &self,
        rows: Vec<usize>,
        matrix: &CatalogMatrix,
        query: &ResolvedQuery,
    ) -> Result<Vec<usize>> {
        let languages = matrix.languages();
        Ok(rows
            .into_iter()
            .filter(|&row| query.language.matches(&languages[row]))
            .collect())
    }
}
