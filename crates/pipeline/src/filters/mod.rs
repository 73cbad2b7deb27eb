//! Filter implementations for the candidate pipeline.
//!
//! Both filters are exact-match: a row survives only if its attribute
//! equals the query's.

pub mod language;
pub mod release_year;

// Re-export for convenience
pub use language::LanguageFilter;
pub use release_year::ReleaseYearFilter;
