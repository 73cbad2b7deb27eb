use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result, anyhow, bail};
use metadata_client::{DEFAULT_API_URL, MetadataConfig};
use serde::Deserialize;

/// Default file name of the encoder artifact inside the data directory
pub const ARTIFACT_FILE: &str = "encoder.json";

/// Service configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    /// Directory holding movies.csv, language_codes.csv and genres_details.csv
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Encoder artifact path; `<data_dir>/encoder.json` when unset
    #[serde(default)]
    pub encoder_artifact: Option<PathBuf>,

    /// Metadata service API key; enrichment is disabled without one
    #[serde(default)]
    pub tmdb_api_key: Option<String>,

    /// Metadata service base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Per-request timeout for metadata lookups
    #[serde(default = "default_metadata_timeout_secs")]
    pub metadata_timeout_secs: u64,

    /// Number of recommendations when the caller doesn't ask for a count
    #[serde(default = "default_top_k")]
    pub default_top_k: usize,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_tmdb_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_metadata_timeout_secs() -> u64 {
    5
}

fn default_top_k() -> usize {
    pipeline::DEFAULT_TOP_K
}

impl ServiceConfig {
    /// Load configuration from environment variables (and `.env` if present)
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Load configuration from explicit key/value pairs
    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config = envy::from_iter::<_, ServiceConfig>(vars)
            .map_err(|e| anyhow!("Failed to load config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.default_top_k == 0 {
            bail!("DEFAULT_TOP_K must be at least 1");
        }
        if self.metadata_timeout_secs == 0 {
            bail!("METADATA_TIMEOUT_SECS must be at least 1");
        }
        Ok(())
    }

    pub fn artifact_path(&self) -> PathBuf {
        self.encoder_artifact
            .clone()
            .unwrap_or_else(|| self.data_dir.join(ARTIFACT_FILE))
    }

    /// Metadata client settings, or `None` when no API key is configured
    pub fn metadata_config(&self) -> Option<MetadataConfig> {
        let api_key = self.tmdb_api_key.as_deref().map(str::trim)?;
        if api_key.is_empty() {
            return None;
        }
        Some(
            MetadataConfig::new(api_key)
                .with_api_url(self.tmdb_api_url.clone())
                .with_timeout(Duration::from_secs(self.metadata_timeout_secs)),
        )
    }
}
