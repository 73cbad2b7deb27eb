//! Catalog loading and validation.
//!
//! Parses the three data files in parallel and assembles a [`Catalog`] whose
//! movie order is the file order.

use crate::error::{DataLoadError, Result};
use crate::parser;
use crate::types::*;
use std::path::Path;
use tracing::info;

pub const MOVIES_FILE: &str = "movies.csv";
pub const LANGUAGES_FILE: &str = "language_codes.csv";
pub const GENRES_FILE: &str = "genres_details.csv";

impl Catalog {
    /// Load the catalog from a data directory
    ///
    /// Steps:
    /// 1. Parse movies, languages and genre details (in parallel)
    /// 2. Insert movies in file order, rejecting duplicate ids
    /// 3. Validate value ranges
    pub fn load_from_dir(data_dir: &Path) -> Result<Self> {
        info!("Loading movie catalog from {:?}", data_dir);

        let movies_path = data_dir.join(MOVIES_FILE);
        let languages_path = data_dir.join(LANGUAGES_FILE);
        let genres_path = data_dir.join(GENRES_FILE);

        let ((movies, languages), genres) = rayon::join(
            || {
                rayon::join(
                    || parser::parse_movies(&movies_path),
                    || parser::parse_languages(&languages_path),
                )
            },
            || parser::parse_genre_details(&genres_path),
        );

        let catalog = Catalog::from_parts(movies?, languages?, genres?)?;

        info!(
            "Loaded {} movies, {} languages, {} genres",
            catalog.len(),
            catalog.languages.len(),
            catalog.genres.len()
        );
        Ok(catalog)
    }

    /// Validate data integrity
    ///
    /// Checks that every present vote average lies in 0-10. Missing values are
    /// left for the feature encoder to reject, since that is where they matter.
    pub fn validate(&self) -> Result<()> {
        for movie in &self.movies {
            if let Some(vote) = movie.vote_average
                && !(0.0..=10.0).contains(&vote)
            {
                return Err(DataLoadError::InvalidValue {
                    field: format!("vote_average (movie {})", movie.id),
                    value: vote.to_string(),
                });
            }
        }
        Ok(())
    }
}
