//! Filters and limits for the list endpoints.

use data_loader::GenreId;

use crate::error::{MetadataError, Result};

/// Trending keeps the top of the weekly list only
pub const TRENDING_LIMIT: usize = 10;
/// Default number of results for discover and search
pub const DEFAULT_LIST_LIMIT: usize = 10;
/// Largest number of results discover and search will collect
pub const MAX_LIST_LIMIT: usize = 100;
/// Results per page on the list endpoints
pub const PAGE_SIZE: usize = 20;
pub const MIN_RELEASE_YEAR: u16 = 1900;

/// Ordering of discover results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiscoverSort {
    /// Newest releases first, never past today
    #[default]
    Latest,
    Popularity,
}

impl DiscoverSort {
    pub(crate) fn sort_by(self) -> &'static str {
        match self {
            DiscoverSort::Latest => "release_date.desc",
            DiscoverSort::Popularity => "popularity.desc",
        }
    }
}

/// Criteria for `MetadataClient::discover`. Unset fields don't filter.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoverFilter {
    /// Movies must carry all of these genres
    pub genres: Vec<GenreId>,
    pub release_year: Option<u16>,
    pub min_vote: Option<f32>,
    pub sort: DiscoverSort,
    /// Language display name, resolved through the language table
    pub language: Option<String>,
    pub limit: usize,
}

impl Default for DiscoverFilter {
    fn default() -> Self {
        Self {
            genres: Vec::new(),
            release_year: None,
            min_vote: None,
            sort: DiscoverSort::default(),
            language: None,
            limit: DEFAULT_LIST_LIMIT,
        }
    }
}

impl DiscoverFilter {
    pub(crate) fn validate(&self) -> Result<()> {
        check_limit(self.limit)?;
        if let Some(year) = self.release_year.filter(|&y| y < MIN_RELEASE_YEAR) {
            return Err(MetadataError::InvalidInput(format!(
                "release year {} is before {}",
                year, MIN_RELEASE_YEAR
            )));
        }
        if let Some(vote) = self.min_vote.filter(|v| !(0.0..=10.0).contains(v)) {
            return Err(MetadataError::InvalidInput(format!(
                "minimum vote {} is outside 0..=10",
                vote
            )));
        }
        Ok(())
    }
}

pub(crate) fn check_limit(limit: usize) -> Result<()> {
    if (1..=MAX_LIST_LIMIT).contains(&limit) {
        Ok(())
    } else {
        Err(MetadataError::InvalidInput(format!(
            "limit {} is outside 1..={}",
            limit, MAX_LIST_LIMIT
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_is_valid() {
        let filter = DiscoverFilter::default();
        assert_eq!(filter.sort, DiscoverSort::Latest);
        assert_eq!(filter.limit, DEFAULT_LIST_LIMIT);
        assert!(filter.validate().is_ok());
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        for filter in [
            DiscoverFilter { limit: 0, ..Default::default() },
            DiscoverFilter { limit: 101, ..Default::default() },
            DiscoverFilter { release_year: Some(1850), ..Default::default() },
            DiscoverFilter { min_vote: Some(10.5), ..Default::default() },
        ] {
            assert!(matches!(filter.validate(), Err(MetadataError::InvalidInput(_))));
        }
    }

    #[test]
    fn test_sort_parameter() {
        assert_eq!(DiscoverSort::Latest.sort_by(), "release_date.desc");
        assert_eq!(DiscoverSort::Popularity.sort_by(), "popularity.desc");
    }
}
