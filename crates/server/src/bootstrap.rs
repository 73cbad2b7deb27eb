//! Startup: load the catalog, fit or load the encoder, build the matrix once.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use data_loader::{Catalog, MovieRecord};
use pipeline::{FeatureEncoder, FittedCatalog};
use tracing::info;

use crate::artifact::{load_encoder, save_encoder};

/// Where the encoder of a freshly built catalog came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncoderSource {
    Loaded,
    Fitted,
}

/// Load and validate the three catalog files under `data_dir`
pub fn load_catalog(data_dir: &Path) -> Result<Catalog> {
    let start = Instant::now();
    let catalog = Catalog::load_from_dir(data_dir)
        .with_context(|| format!("Failed to load catalog from {}", data_dir.display()))?;
    info!(
        "Loaded {} movies, {} languages, {} categories in {:.2?}",
        catalog.len(),
        catalog.languages().len(),
        catalog.genres().len(),
        start.elapsed()
    );
    Ok(catalog)
}

/// Fit a new encoder on `movies`, persist it, and build the catalog matrix
pub fn fit_and_save(movies: &[MovieRecord], artifact: &Path) -> Result<FittedCatalog> {
    let fitted = FittedCatalog::fit(movies).context("Failed to fit encoder on catalog")?;
    save_encoder(artifact, fitted.encoder()).context("Failed to save encoder artifact")?;
    Ok(fitted)
}

/// Reuse the persisted encoder when `artifact` exists, otherwise fit one
/// and persist it
pub fn fit_or_load(movies: &[MovieRecord], artifact: &Path) -> Result<(FittedCatalog, EncoderSource)> {
    if artifact.exists() {
        let encoder: FeatureEncoder =
            load_encoder(artifact).context("Failed to load encoder artifact")?;
        let fitted = FittedCatalog::with_encoder(movies, encoder)
            .context("Failed to build catalog matrix from persisted encoder")?;
        info!(
            encoder_id = %fitted.encoder().id(),
            width = fitted.matrix().width(),
            "Built catalog matrix from persisted encoder"
        );
        return Ok((fitted, EncoderSource::Loaded));
    }

    info!(path = %artifact.display(), "No encoder artifact, fitting a new encoder");
    let fitted = fit_and_save(movies, artifact)?;
    Ok((fitted, EncoderSource::Fitted))
}
