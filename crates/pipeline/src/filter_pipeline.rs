//! The FilterPipeline orchestrates multiple filters.
//!
//! This module provides the main FilterPipeline struct that chains
//! multiple filters together using the builder pattern.

use crate::catalog::CatalogMatrix;
use crate::error::{RecommendError, Result};
use crate::filters::{LanguageFilter, ReleaseYearFilter};
use crate::query::ResolvedQuery;
use crate::traits::Filter;
use tracing;

/// Chains multiple filters together into a processing pipeline.
///
/// ## Usage
/// ```ignore
/// let pipeline = FilterPipeline::new()
///     .add_filter(ReleaseYearFilter)
///     .add_filter(LanguageFilter);
///
/// let rows = pipeline.apply(matrix, &query)?;
/// ```
pub struct FilterPipeline {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterPipeline {
    /// Create a new empty FilterPipeline.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// The exact-match pipeline used for recommendations: year, then language
    pub fn exact_match() -> Self {
        Self::new()
            .add_filter(ReleaseYearFilter)
            .add_filter(LanguageFilter)
    }

    /// Add a filter to the pipeline (builder pattern).
    pub fn add_filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Run every filter in sequence, starting from all catalog rows.
    ///
    /// Each filter must return an ascending subset of the rows it was given,
    /// so ranking can index the matrix and keep catalog order on ties.
    /// Stops early once no rows are left.
    pub fn apply(&self, matrix: &CatalogMatrix, query: &ResolvedQuery) -> Result<Vec<usize>> {
        let mut current: Vec<usize> = (0..matrix.len()).collect();
        for filter in &self.filters {
            if current.is_empty() {
                break;
            }
            tracing::debug!(
                "Applying filter: {} (input count: {})",
                filter.name(),
                current.len()
            );
            let output = filter.apply(current.clone(), matrix, query)?;
            check_output(filter.name(), &current, &output)?;
            current = output;
            tracing::debug!(
                "Filter applied: {} (output count: {})",
                filter.name(),
                current.len()
            );
        }
        Ok(current)
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

/// Verify `output` is strictly ascending and every row came from `input`
fn check_output(filter: &str, input: &[usize], output: &[usize]) -> Result<()> {
    let invalid = |reason: String| RecommendError::InvalidFilterOutput {
        filter: filter.to_string(),
        reason,
    };

    if let Some(pair) = output.windows(2).find(|w| w[0] >= w[1]) {
        return Err(invalid(format!(
            "row {} follows row {}, rows must be strictly ascending",
            pair[1], pair[0]
        )));
    }

    // Both sides are ascending, so one forward scan over the input suffices
    let mut remaining = input.iter();
    for &row in output {
        if !remaining.any(|&r| r == row) {
            return Err(invalid(format!("row {} was not in its input", row)));
        }
    }
    Ok(())
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FittedCatalog;
    use crate::query::LanguageCode;
    use data_loader::MovieRecord;

    fn fitted() -> FittedCatalog {
        FittedCatalog::fit(&[
            MovieRecord::new(1, &["Action"], 2010, 120, 7.0, "en", false),
            MovieRecord::new(2, &["Action"], 2011, 120, 7.0, "en", false),
            MovieRecord::new(3, &["Action"], 2010, 120, 7.0, "fr", false),
            MovieRecord::new(4, &["Drama"], 2010, 100, 6.0, "en", false),
        ])
        .unwrap()
    }

    fn query(year: u16, language: &str) -> ResolvedQuery {
        ResolvedQuery {
            vector: vec![0.0; 5],
            release_year: year,
            language: LanguageCode::Known(language.to_string()),
        }
    }

    #[test]
    fn test_empty_pipeline() {
        let fitted = fitted();
        let rows = FilterPipeline::new()
            .apply(fitted.matrix(), &query(2010, "en"))
            .unwrap();
        assert_eq!(rows, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_single_filter() {
        let fitted = fitted();
        let pipeline = FilterPipeline::new().add_filter(ReleaseYearFilter);

        let rows = pipeline.apply(fitted.matrix(), &query(2011, "fr")).unwrap();
        assert_eq!(rows, vec![1]);
    }

    #[test]
    fn test_exact_match_pipeline() {
        let fitted = fitted();
        let pipeline = FilterPipeline::exact_match();
        assert_eq!(pipeline.len(), 2);

        let rows = pipeline.apply(fitted.matrix(), &query(2010, "en")).unwrap();
        assert_eq!(rows, vec![0, 3]);

        let rows = pipeline.apply(fitted.matrix(), &query(1990, "en")).unwrap();
        assert!(rows.is_empty());
    }

    struct ReversingFilter;

    impl Filter for ReversingFilter {
        fn name(&self) -> &str {
            "Reversing"
        }

        fn apply(&self, mut rows: Vec<usize>, _: &CatalogMatrix, _: &ResolvedQuery) -> Result<Vec<usize>> {
            rows.reverse();
            Ok(rows)
        }
    }

    struct OutOfRangeFilter;

    impl Filter for OutOfRangeFilter {
        fn name(&self) -> &str {
            "OutOfRange"
        }

        fn apply(&self, mut rows: Vec<usize>, matrix: &CatalogMatrix, _: &ResolvedQuery) -> Result<Vec<usize>> {
            rows.push(matrix.len());
            Ok(rows)
        }
    }

    #[test]
    fn test_reordering_filter_rejected() {
        let fitted = fitted();
        let pipeline = FilterPipeline::new().add_filter(ReversingFilter);

        let err = pipeline.apply(fitted.matrix(), &query(2010, "en")).unwrap_err();
        assert!(matches!(
            err,
            RecommendError::InvalidFilterOutput { ref filter, .. } if filter == "Reversing"
        ));
    }

    #[test]
    fn test_out_of_range_row_rejected() {
        let fitted = fitted();
        let pipeline = FilterPipeline::new().add_filter(OutOfRangeFilter);

        let err = pipeline.apply(fitted.matrix(), &query(2010, "en")).unwrap_err();
        assert!(matches!(err, RecommendError::InvalidFilterOutput { .. }));
    }

    #[test]
    fn test_filter_cannot_restore_dropped_rows() {
        let fitted = fitted();
        let pipeline = FilterPipeline::new()
            .add_filter(ReleaseYearFilter)
            .add_filter(OutOfRangeFilter);

        // Year 2011 keeps only row 1; the second filter appends row 4
        let err = pipeline.apply(fitted.matrix(), &query(2011, "en")).unwrap_err();
        assert!(matches!(err, RecommendError::InvalidFilterOutput { .. }));
    }
}
