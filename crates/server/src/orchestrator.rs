//! # Recommendation Orchestrator
//!
//! This module coordinates one recommendation request:
//! 1. Rank the catalog against the query (CPU-bound, off the async runtime)
//! 2. Fetch display details for the returned movies concurrently
//! 3. Return the ranked movies with whatever details could be fetched
//!
//! It also owns service startup: loading the catalog, fitting or loading the
//! encoder, and connecting the metadata client. Trending, discover and search
//! listings go straight to the metadata client.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use serde::Serialize;
use tracing::{info, instrument};

use data_loader::{Catalog, GenreDetails, GenreId, GenreTable, Language, MovieId};
use metadata_client::{DiscoverFilter, MetadataClient, MovieCard, MovieDetails};
use pipeline::{FittedCatalog, QueryProfile, RecommendationEngine, ScoredMovie};

use crate::bootstrap::{fit_or_load, load_catalog};
use crate::config::ServiceConfig;

/// Final recommendation returned to the caller
#[derive(Debug, Clone, Serialize)]
pub struct MovieRecommendation {
    pub movie_id: MovieId,
    pub similarity: f32,
    /// `None` when enrichment is disabled or the lookup failed
    pub details: Option<MovieDetails>,
}

/// Main orchestrator shared by every request handler
#[derive(Clone)]
pub struct RecommendationOrchestrator {
    engine: RecommendationEngine,
    genres: Arc<GenreTable>,
    metadata: Option<MetadataClient>,
    default_limit: usize,
}

impl RecommendationOrchestrator {
    pub fn new(
        engine: RecommendationEngine,
        genres: Arc<GenreTable>,
        metadata: Option<MetadataClient>,
    ) -> Self {
        Self {
            engine,
            genres,
            metadata,
            default_limit: pipeline::DEFAULT_TOP_K,
        }
    }

    pub fn with_default_limit(mut self, limit: usize) -> Self {
        self.default_limit = limit;
        self
    }

    /// Build the whole service from configuration.
    ///
    /// Loads the catalog, fits or loads the encoder, builds the catalog
    /// matrix once, and connects the metadata client when an API key is set.
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let catalog = load_catalog(&config.data_dir)?;
        Self::from_catalog(catalog, config)
    }

    /// Build the service from an already loaded catalog
    pub fn from_catalog(catalog: Catalog, config: &ServiceConfig) -> Result<Self> {
        let (fitted, source) = fit_or_load(catalog.movies(), &config.artifact_path())?;
        info!(
            "Catalog matrix ready: {} rows x {} columns ({:?} encoder {})",
            fitted.matrix().len(),
            fitted.matrix().width(),
            source,
            fitted.encoder().id()
        );

        let (_, languages, genres) = catalog.into_parts();
        let languages = Arc::new(languages);
        let genres = Arc::new(genres);

        let metadata = match config.metadata_config() {
            Some(metadata_config) => Some(
                MetadataClient::new(metadata_config, languages.clone(), genres.clone())
                    .context("Failed to create metadata client")?,
            ),
            None => {
                info!("TMDB_API_KEY not set, recommendations will not be enriched");
                None
            }
        };

        let engine = RecommendationEngine::new(Arc::new(fitted), languages);
        Ok(Self::new(engine, genres, metadata).with_default_limit(config.default_top_k))
    }

    pub fn engine(&self) -> &RecommendationEngine {
        &self.engine
    }

    pub fn model(&self) -> &FittedCatalog {
        self.engine.model()
    }

    pub fn default_limit(&self) -> usize {
        self.default_limit
    }

    /// Every language the catalog knows, in file order
    pub fn languages(&self) -> &[Language] {
        self.engine.languages().entries()
    }

    /// Every category (genre) the catalog knows, in file order
    pub fn categories(&self) -> &[GenreDetails] {
        self.genres.entries()
    }

    /// Resolve category names to genre ids, ignoring case
    pub fn genre_ids(&self, names: &[String]) -> Result<Vec<GenreId>> {
        names
            .iter()
            .map(|name| match self.genres.id_for_name(name) {
                Some(id) => Ok(id),
                None => bail!("Unknown category '{}'", name.trim()),
            })
            .collect()
    }

    fn metadata(&self) -> Result<&MetadataClient> {
        self.metadata
            .as_ref()
            .context("Metadata service is not configured, set TMDB_API_KEY")
    }

    /// This week's trending movies from the metadata service
    pub async fn trending(&self) -> Result<Vec<MovieCard>> {
        Ok(self.metadata()?.trending().await?)
    }

    /// Filtered listing from the metadata service. Errors keep their
    /// [`metadata_client::MetadataError`] for callers to downcast.
    #[instrument(skip(self, filter), fields(limit = filter.limit))]
    pub async fn discover(&self, filter: DiscoverFilter) -> Result<Vec<MovieCard>> {
        let cards = self.metadata()?.discover(&filter).await?;
        info!("Discovered {} movies", cards.len());
        Ok(cards)
    }

    /// Title search on the metadata service; `limit` falls back to the
    /// configured default
    pub async fn search(&self, query: &str, limit: Option<usize>) -> Result<Vec<MovieCard>> {
        let limit = limit.unwrap_or(self.default_limit);
        let cards = self.metadata()?.search(query, limit).await?;
        info!(query, "Search returned {} movies", cards.len());
        Ok(cards)
    }

    /// Main entry point: rank the catalog for `query` and enrich the result.
    ///
    /// `limit` falls back to the configured default when `None`. Pipeline
    /// errors (invalid query, encoder mismatch) are returned with their
    /// [`pipeline::RecommendError`] intact for callers to downcast.
    #[instrument(skip(self, query), fields(year = query.release_year, language = %query.language))]
    pub async fn get_recommendations(
        &self,
        query: QueryProfile,
        limit: Option<usize>,
    ) -> Result<Vec<MovieRecommendation>> {
        let start_time = Instant::now();
        let limit = limit.unwrap_or(self.default_limit);

        let ranked = self.rank(query, limit).await?;
        info!("Ranked {} movies", ranked.len());

        let recommendations = self.enrich(ranked).await;
        info!(
            "Returning {} recommendations in {:.2?}",
            recommendations.len(),
            start_time.elapsed()
        );
        Ok(recommendations)
    }

    /// Run the engine on the blocking pool
    async fn rank(&self, query: QueryProfile, limit: usize) -> Result<Vec<ScoredMovie>> {
        let engine = self.engine.clone();
        let ranked = tokio::task::spawn_blocking(move || engine.rank(&query, limit))
            .await
            .context("Recommendation task panicked")??;
        Ok(ranked)
    }

    /// Attach details to every ranked movie, keeping rank order
    async fn enrich(&self, ranked: Vec<ScoredMovie>) -> Vec<MovieRecommendation> {
        let Some(metadata) = &self.metadata else {
            return ranked
                .into_iter()
                .map(|scored| MovieRecommendation {
                    movie_id: scored.movie_id,
                    similarity: scored.similarity,
                    details: None,
                })
                .collect();
        };

        let ids: Vec<MovieId> = ranked.iter().map(|scored| scored.movie_id).collect();
        let details = metadata.movie_details_batch(&ids).await;

        ranked
            .into_iter()
            .zip(details)
            .map(|(scored, (_, details))| MovieRecommendation {
                movie_id: scored.movie_id,
                similarity: scored.similarity,
                details,
            })
            .collect()
    }
}
