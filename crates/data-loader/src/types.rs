//! Core domain types for the movie catalog.
//!
//! This module defines the records handed to the recommendation core and the
//! two small lookup tables (languages, genre details) that surround it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// =============================================================================
// Type Aliases
// =============================================================================

/// Unique identifier for a movie (the remote metadata service's id)
pub type MovieId = u32;

/// Identifier of a genre in the genre details table
pub type GenreId = u32;

// =============================================================================
// Movie-related Types
// =============================================================================

/// One row of the movie catalog.
///
/// Numeric attributes and the language are optional because the source
/// files have holes in them. The catalog matrix builder refuses to encode a
/// record that is missing any of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord {
    pub id: MovieId,
    /// Genre labels, may be empty
    pub genres: Vec<String>,
    pub release_year: Option<u16>,
    /// Runtime in minutes
    pub runtime: Option<u16>,
    /// Average vote on a 0-10 scale
    pub vote_average: Option<f32>,
    /// Short language code, e.g. "en"
    pub language: Option<String>,
    pub adult: bool,
}

impl MovieRecord {
    /// Creates a fully populated record
    pub fn new(
        id: MovieId,
        genres: &[&str],
        release_year: u16,
        runtime: u16,
        vote_average: f32,
        language: &str,
        adult: bool,
    ) -> Self {
        Self {
            id,
            genres: genres.iter().map(|g| g.to_string()).collect(),
            release_year: Some(release_year),
            runtime: Some(runtime),
            vote_average: Some(vote_average),
            language: Some(language.to_string()),
            adult,
        }
    }
}

// =============================================================================
// Lookup Tables
// =============================================================================

/// A language as listed in `language_codes.csv`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    pub code: String,
    pub name: String,
}

/// Bidirectional mapping between human-readable language names and codes.
///
/// Name lookups are case-insensitive and ignore surrounding whitespace.
#[derive(Debug, Clone, Default)]
pub struct LanguageTable {
    entries: Vec<Language>,
    by_name: HashMap<String, usize>,
    by_code: HashMap<String, usize>,
}

impl LanguageTable {
    pub fn new(entries: Vec<Language>) -> Self {
        let mut by_name = HashMap::new();
        let mut by_code = HashMap::new();
        for (idx, language) in entries.iter().enumerate() {
            // First occurrence wins for both keys
            by_name.entry(normalize_name(&language.name)).or_insert(idx);
            by_code.entry(language.code.clone()).or_insert(idx);
        }
        Self {
            entries,
            by_name,
            by_code,
        }
    }

    /// Resolve a language name ("English", " english ") to its code ("en")
    pub fn code_for_name(&self, name: &str) -> Option<&str> {
        self.by_name
            .get(&normalize_name(name))
            .map(|&idx| self.entries[idx].code.as_str())
    }

    /// Resolve a language code to its display name
    pub fn name_for_code(&self, code: &str) -> Option<&str> {
        self.by_code
            .get(code)
            .map(|&idx| self.entries[idx].name.as_str())
    }

    /// All languages in file order
    pub fn entries(&self) -> &[Language] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(&'static str, &'static str)> for LanguageTable {
    /// Build from `(code, name)` pairs
    fn from_iter<I: IntoIterator<Item = (&'static str, &'static str)>>(iter: I) -> Self {
        Self::new(
            iter.into_iter()
                .map(|(code, name)| Language {
                    code: code.to_string(),
                    name: name.to_string(),
                })
                .collect(),
        )
    }
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// A genre as listed in `genres_details.csv`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreDetails {
    pub id: GenreId,
    pub name: String,
}

/// Genre id to name mapping, used for the category listing and to translate
/// genre ids returned by the metadata service.
#[derive(Debug, Clone, Default)]
pub struct GenreTable {
    entries: Vec<GenreDetails>,
    by_id: HashMap<GenreId, usize>,
    by_name: HashMap<String, usize>,
}

impl GenreTable {
    pub fn new(entries: Vec<GenreDetails>) -> Self {
        let mut by_id = HashMap::new();
        let mut by_name = HashMap::new();
        for (idx, genre) in entries.iter().enumerate() {
            by_id.entry(genre.id).or_insert(idx);
            by_name.entry(normalize_name(&genre.name)).or_insert(idx);
        }
        Self {
            entries,
            by_id,
            by_name,
        }
    }

    pub fn name_for_id(&self, id: GenreId) -> Option<&str> {
        self.by_id.get(&id).map(|&idx| self.entries[idx].name.as_str())
    }

    /// Resolve a genre name, ignoring case and surrounding whitespace
    pub fn id_for_name(&self, name: &str) -> Option<GenreId> {
        self.by_name
            .get(&normalize_name(name))
            .map(|&idx| self.entries[idx].id)
    }

    pub fn entries(&self) -> &[GenreDetails] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// Catalog - ordered movie records plus lookup tables
// =============================================================================

/// The loaded catalog.
///
/// `movies` keeps file order: that order becomes the row order of the catalog
/// matrix, so it is never re-sorted after loading.
#[derive(Debug, Default)]
pub struct Catalog {
    pub(crate) movies: Vec<MovieRecord>,
    pub(crate) positions: HashMap<MovieId, usize>,
    pub(crate) languages: LanguageTable,
    pub(crate) genres: GenreTable,
}

impl Catalog {
    /// Creates a new, empty Catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog from already parsed parts, rejecting duplicate ids
    pub fn from_parts(
        movies: Vec<MovieRecord>,
        languages: LanguageTable,
        genres: GenreTable,
    ) -> crate::Result<Self> {
        let mut catalog = Self {
            movies: Vec::with_capacity(movies.len()),
            positions: HashMap::with_capacity(movies.len()),
            languages,
            genres,
        };
        for movie in movies {
            catalog.insert_movie(movie)?;
        }
        catalog.validate()?;
        Ok(catalog)
    }

    /// Append a movie, keeping insertion order
    pub fn insert_movie(&mut self, movie: MovieRecord) -> crate::Result<()> {
        if self.positions.contains_key(&movie.id) {
            return Err(crate::DataLoadError::DuplicateId { id: movie.id });
        }
        self.positions.insert(movie.id, self.movies.len());
        self.movies.push(movie);
        Ok(())
    }

    /// All movies in catalog order
    pub fn movies(&self) -> &[MovieRecord] {
        &self.movies
    }

    /// Get a movie by ID
    pub fn get_movie(&self, id: MovieId) -> Option<&MovieRecord> {
        self.positions.get(&id).map(|&idx| &self.movies[idx])
    }

    pub fn languages(&self) -> &LanguageTable {
        &self.languages
    }

    pub fn genres(&self) -> &GenreTable {
        &self.genres
    }

    /// Split into owned parts so each can be shared independently
    pub fn into_parts(self) -> (Vec<MovieRecord>, LanguageTable, GenreTable) {
        (self.movies, self.languages, self.genres)
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }
}
