//! User query profile and its resolved, ready-to-filter form.

use crate::error::{RecommendError, Result};
use crate::features::FeatureInput;
use data_loader::LanguageTable;
use serde::{Deserialize, Serialize};

/// Number of results returned when the caller doesn't ask for a specific K
pub const DEFAULT_TOP_K: usize = 5;

/// What the user is looking for. Supplied per request, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryProfile {
    /// Any subset of genre labels; labels the encoder has never seen are ignored
    #[serde(default)]
    pub genres: Vec<String>,
    pub release_year: u16,
    /// Runtime in minutes
    pub runtime: f32,
    pub vote_average: f32,
    /// Human-readable language name, e.g. "English"
    pub language: String,
    #[serde(default)]
    pub adult: bool,
}

impl QueryProfile {
    /// Reject values the encoder cannot turn into a meaningful vector
    pub fn validate(&self) -> Result<()> {
        if !self.runtime.is_finite() || self.runtime < 0.0 {
            return Err(RecommendError::InvalidQuery(format!(
                "runtime must be a non-negative number, got {}",
                self.runtime
            )));
        }
        if !self.vote_average.is_finite() || !(0.0..=10.0).contains(&self.vote_average) {
            return Err(RecommendError::InvalidQuery(format!(
                "vote_average must be between 0 and 10, got {}",
                self.vote_average
            )));
        }
        Ok(())
    }

    pub fn feature_input(&self) -> FeatureInput<'_> {
        FeatureInput {
            runtime: self.runtime,
            vote_average: self.vote_average,
            adult: self.adult,
            genres: &self.genres,
        }
    }
}

/// Language filter value after name lookup.
///
/// `Unknown` is the sentinel for names missing from the lookup table and
/// never matches a catalog row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguageCode {
    Known(String),
    Unknown,
}

impl LanguageCode {
    pub fn resolve(name: &str, languages: &LanguageTable) -> Self {
        match languages.code_for_name(name) {
            Some(code) => LanguageCode::Known(code.to_string()),
            None => LanguageCode::Unknown,
        }
    }

    /// Exact match against a catalog row's language code
    pub fn matches(&self, code: &str) -> bool {
        match self {
            LanguageCode::Known(known) => known == code,
            LanguageCode::Unknown => false,
        }
    }
}

/// A validated query with its vector and filter values resolved
#[derive(Debug, Clone)]
pub struct ResolvedQuery {
    pub vector: Vec<f32>,
    pub release_year: u16,
    pub language: LanguageCode,
}
