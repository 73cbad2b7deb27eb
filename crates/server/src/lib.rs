//! Server crate for the reel-match recommendation service.
//!
//! This crate wires the pieces together: environment configuration, the
//! persisted encoder artifact, startup (fit or load), and the orchestrator
//! that serves recommendation requests.

pub mod artifact;
pub mod bootstrap;
pub mod config;
pub mod orchestrator;

pub use artifact::{
    ARTIFACT_FORMAT_VERSION, ArtifactError, EncoderArtifact, load_encoder, save_encoder,
};
pub use bootstrap::{EncoderSource, fit_and_save, fit_or_load, load_catalog};
pub use config::ServiceConfig;
pub use orchestrator::{MovieRecommendation, RecommendationOrchestrator};
