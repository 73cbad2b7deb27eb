//! Movie payloads as returned by the metadata service, and their mapping to
//! catalog vocabulary.
//!
//! `/movie/{id}` returns full details with genre objects. The list endpoints
//! (trending, discover, search) return pages of shorter items with bare
//! genre ids, which become [`MovieCard`]s.

use data_loader::{GenreId, GenreTable, LanguageTable, MovieId};
use serde::{Deserialize, Serialize};

/// Language name used when the service reports a code we don't know
pub const UNKNOWN_LANGUAGE: &str = "Unknown";

/// Raw `/movie/{id}` payload. Only the fields we surface are read.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovie {
    pub id: MovieId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub genres: Vec<TmdbGenre>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub runtime: Option<u16>,
    #[serde(default)]
    pub vote_average: Option<f32>,
    #[serde(default)]
    pub original_language: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbGenre {
    pub id: GenreId,
}

/// Display details attached to a recommended movie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDetails {
    pub movie_id: MovieId,
    pub title: String,
    pub overview: String,
    pub genres: Vec<String>,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    pub runtime: Option<u16>,
    pub vote_average: Option<f32>,
    pub language: String,
}

impl MovieDetails {
    /// Map a raw payload through the local genre and language tables.
    ///
    /// Genre ids missing from the genre table are dropped. A language code
    /// missing from the language table becomes [`UNKNOWN_LANGUAGE`].
    pub fn from_tmdb(raw: TmdbMovie, languages: &LanguageTable, genres: &GenreTable) -> Self {
        Self {
            movie_id: raw.id,
            title: raw.title.unwrap_or_default(),
            overview: raw.overview.unwrap_or_default(),
            genres: genre_names(raw.genres.iter().map(|genre| genre.id), genres),
            poster_path: raw.poster_path,
            release_date: raw.release_date,
            runtime: raw.runtime,
            vote_average: raw.vote_average,
            language: language_name(raw.original_language.as_deref(), languages),
        }
    }
}

/// One item of a list page
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbListItem {
    pub id: MovieId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<GenreId>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub original_language: Option<String>,
}

/// One page of a list endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbPage {
    #[serde(default)]
    pub results: Vec<TmdbListItem>,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub total_pages: u32,
}

/// Short listing entry for trending, discover and search results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieCard {
    pub movie_id: MovieId,
    pub title: String,
    pub genres: Vec<String>,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    pub language: String,
}

impl MovieCard {
    /// Same mapping rules as [`MovieDetails::from_tmdb`]
    pub fn from_tmdb(raw: TmdbListItem, languages: &LanguageTable, genres: &GenreTable) -> Self {
        Self {
            movie_id: raw.id,
            title: raw.title.unwrap_or_default(),
            genres: genre_names(raw.genre_ids.iter().copied(), genres),
            poster_path: raw.poster_path,
            release_date: raw.release_date,
            language: language_name(raw.original_language.as_deref(), languages),
        }
    }
}

fn genre_names(ids: impl Iterator<Item = GenreId>, genres: &GenreTable) -> Vec<String> {
    ids.filter_map(|id| genres.name_for_id(id))
        .map(str::to_string)
        .collect()
}

fn language_name(code: Option<&str>, languages: &LanguageTable) -> String {
    code.and_then(|code| languages.name_for_code(code))
        .unwrap_or(UNKNOWN_LANGUAGE)
        .to_string()
}
