use std::sync::Arc;
use std::time::Duration;

use data_loader::{GenreTable, LanguageTable, MovieId};
use reqwest::{Client as HttpClient, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::details::{MovieCard, MovieDetails, TmdbMovie, TmdbPage};
use crate::error::{MetadataError, Result};
use crate::listing::{DiscoverFilter, DiscoverSort, PAGE_SIZE, TRENDING_LIMIT, check_limit};

pub const DEFAULT_API_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection settings for the metadata service
#[derive(Debug, Clone)]
pub struct MetadataConfig {
    pub api_key: String,
    pub api_url: String,
    pub timeout: Duration,
}

impl MetadataConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_url: DEFAULT_API_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Client for the remote movie-metadata service.
///
/// Cheap to clone: the HTTP connection pool and lookup tables are shared.
#[derive(Clone)]
pub struct MetadataClient {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    languages: Arc<LanguageTable>,
    genres: Arc<GenreTable>,
}

impl MetadataClient {
    pub fn new(
        config: MetadataConfig,
        languages: Arc<LanguageTable>,
        genres: Arc<GenreTable>,
    ) -> Result<Self> {
        let http_client = HttpClient::builder()
            .timeout(config.timeout)
            .build()
            .map_err(MetadataError::ClientBuild)?;

        let api_url = config.api_url.trim_end_matches('/').to_string();
        info!(api_url = %api_url, timeout = ?config.timeout, "Metadata client ready");

        Ok(Self {
            http_client,
            api_key: config.api_key,
            api_url,
            languages,
            genres,
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// GET `{api_url}{path}` and decode the JSON body. `Ok(None)` on 404.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        resource: &str,
        params: &[(&str, String)],
    ) -> Result<Option<T>> {
        let url = format!("{}{}", self.api_url, path);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str()), ("language", "en-US")])
            .query(params)
            .send()
            .await
            .map_err(|source| MetadataError::Transport {
                resource: resource.to_string(),
                source,
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(MetadataError::UnexpectedStatus {
                resource: resource.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .json()
            .await
            .map(Some)
            .map_err(|e| MetadataError::InvalidResponse {
                resource: resource.to_string(),
                reason: e.to_string(),
            })
    }

    /// Walk pages of a list endpoint until `limit` cards are collected or the
    /// service runs out of pages
    async fn collect_pages(
        &self,
        path: &str,
        resource: &str,
        params: Vec<(&str, String)>,
        limit: usize,
    ) -> Result<Vec<MovieCard>> {
        let pages_needed = limit.div_ceil(PAGE_SIZE) as u32;
        let mut cards = Vec::with_capacity(limit);

        for page in 1..=pages_needed {
            let mut page_params = params.clone();
            page_params.push(("page", page.to_string()));

            let Some(body) = self
                .get_json::<TmdbPage>(path, resource, &page_params)
                .await?
            else {
                break;
            };
            let exhausted = body.results.is_empty() || body.total_pages <= page;

            let wanted = limit - cards.len();
            cards.extend(
                body.results
                    .into_iter()
                    .take(wanted)
                    .map(|item| MovieCard::from_tmdb(item, &self.languages, &self.genres)),
            );
            if exhausted || cards.len() >= limit {
                break;
            }
        }

        debug!(resource, results = cards.len(), "List request completed");
        Ok(cards)
    }

    /// Fetch details for one movie. `Ok(None)` when the service doesn't know
    /// the identifier.
    pub async fn movie_details(&self, movie_id: MovieId) -> Result<Option<MovieDetails>> {
        debug!(movie_id, "Fetching movie details");
        let resource = format!("movie {}", movie_id);

        let raw: Option<TmdbMovie> = self
            .get_json(&format!("/movie/{}", movie_id), &resource, &[])
            .await?;
        if raw.is_none() {
            debug!(movie_id, "Movie not known to metadata service");
        }

        Ok(raw.map(|raw| MovieDetails::from_tmdb(raw, &self.languages, &self.genres)))
    }

    /// This week's trending movies, top [`TRENDING_LIMIT`]
    pub async fn trending(&self) -> Result<Vec<MovieCard>> {
        let page: Option<TmdbPage> = self
            .get_json("/trending/movie/week", "trending movies", &[])
            .await?;

        Ok(page
            .map(|page| page.results)
            .unwrap_or_default()
            .into_iter()
            .take(TRENDING_LIMIT)
            .map(|item| MovieCard::from_tmdb(item, &self.languages, &self.genres))
            .collect())
    }

    /// Browse the service's catalog by genre, year, vote and language.
    ///
    /// The language is given by display name and must be in the language
    /// table, otherwise [`MetadataError::UnknownLanguage`] is returned before
    /// any request is made.
    pub async fn discover(&self, filter: &DiscoverFilter) -> Result<Vec<MovieCard>> {
        filter.validate()?;

        let language_code = match &filter.language {
            Some(name) => Some(
                self.languages
                    .code_for_name(name)
                    .ok_or_else(|| MetadataError::UnknownLanguage(name.trim().to_string()))?
                    .to_string(),
            ),
            None => None,
        };

        let mut params = vec![("sort_by", filter.sort.sort_by().to_string())];
        if filter.sort == DiscoverSort::Latest {
            let today = chrono::Local::now().date_naive();
            params.push(("primary_release_date.lte", today.format("%Y-%m-%d").to_string()));
        }
        if !filter.genres.is_empty() {
            let ids: Vec<String> = filter.genres.iter().map(|id| id.to_string()).collect();
            params.push(("with_genres", ids.join(",")));
        }
        if let Some(year) = filter.release_year {
            params.push(("primary_release_year", year.to_string()));
        }
        if let Some(vote) = filter.min_vote {
            params.push(("vote_average.gte", vote.to_string()));
        }
        if let Some(code) = language_code {
            params.push(("with_original_language", code));
        }

        self.collect_pages("/discover/movie", "discover", params, filter.limit)
            .await
    }

    /// Search movies by title, up to `limit` results
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<MovieCard>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(MetadataError::InvalidInput(
                "search query cannot be empty".to_string(),
            ));
        }
        check_limit(limit)?;

        let params = vec![
            ("query", query.to_string()),
            ("include_adult", "false".to_string()),
        ];
        self.collect_pages("/search/movie", "search", params, limit)
            .await
    }

    /// Fetch details for many movies concurrently.
    ///
    /// The result lines up with `movie_ids`. A failed lookup is logged and
    /// yields `None` for that identifier instead of failing the batch.
    pub async fn movie_details_batch(
        &self,
        movie_ids: &[MovieId],
    ) -> Vec<(MovieId, Option<MovieDetails>)> {
        let handles: Vec<_> = movie_ids
            .iter()
            .map(|&movie_id| {
                let client = self.clone();
                tokio::spawn(async move { client.movie_details(movie_id).await })
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for (&movie_id, handle) in movie_ids.iter().zip(handles) {
            let details = match handle.await {
                Ok(Ok(details)) => details,
                Ok(Err(e)) => {
                    warn!(movie_id, error = %e, "Metadata lookup failed");
                    None
                }
                Err(e) => {
                    warn!(movie_id, error = %e, "Metadata lookup task failed");
                    None
                }
            };
            results.push((movie_id, details));
        }
        results
    }
}
