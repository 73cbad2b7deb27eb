//! Persisted encoder artifact.
//!
//! The fitted encoder is written as JSON so a restarted service encodes
//! queries exactly like the catalog it was fitted on:
//!
//! ```json
//! { "format_version": 1,
//!   "encoder": { "id": "...", "scaler": { "mean": [..], "std": [..] },
//!                "vocabulary": ["Action", "Adventure", ...] } }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use pipeline::{FeatureEncoder, RecommendError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
pub struct EncoderArtifact {
    pub format_version: u32,
    pub encoder: FeatureEncoder,
}

#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed encoder artifact: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported artifact format version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("Inconsistent encoder in artifact: {0}")]
    Invalid(#[from] RecommendError),
}

/// Write `encoder` to `path`, creating parent directories as needed
pub fn save_encoder(path: &Path, encoder: &FeatureEncoder) -> Result<(), ArtifactError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| ArtifactError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let artifact = EncoderArtifact {
        format_version: ARTIFACT_FORMAT_VERSION,
        encoder: encoder.clone(),
    };
    let json = serde_json::to_string_pretty(&artifact)?;
    fs::write(path, json).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    info!(path = %path.display(), encoder_id = %encoder.id(), "Saved encoder artifact");
    Ok(())
}

/// Read an encoder from `path`, rejecting unknown format versions and
/// internally inconsistent encoders
pub fn load_encoder(path: &Path) -> Result<FeatureEncoder, ArtifactError> {
    let json = fs::read_to_string(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let artifact: EncoderArtifact = serde_json::from_str(&json)?;
    if artifact.format_version != ARTIFACT_FORMAT_VERSION {
        return Err(ArtifactError::UnsupportedVersion {
            found: artifact.format_version,
            expected: ARTIFACT_FORMAT_VERSION,
        });
    }
    artifact.encoder.check()?;

    info!(
        path = %path.display(),
        encoder_id = %artifact.encoder.id(),
        "Loaded encoder artifact"
    );
    Ok(artifact.encoder)
}
