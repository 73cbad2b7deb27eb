//! Simple harness for the recommendation orchestrator.
//!
//! Builds the service from the environment and runs one sample query end to
//! end, printing the ranked movies with their details.

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pipeline::QueryProfile;
use server::{RecommendationOrchestrator, ServiceConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,server=debug,pipeline=debug")),
        )
        .init();

    info!("Starting reel-match server harness");

    let config = ServiceConfig::from_env()?;
    info!("Loading catalog from {}", config.data_dir.display());
    let orchestrator = tokio::task::spawn_blocking(move || {
        RecommendationOrchestrator::from_config(&config)
    })
    .await??;
    info!(
        "Service ready: {} languages, {} categories",
        orchestrator.languages().len(),
        orchestrator.categories().len()
    );

    let query = QueryProfile {
        genres: vec!["Action".to_string(), "Adventure".to_string()],
        release_year: 2010,
        runtime: 120.0,
        vote_average: 7.5,
        language: "English".to_string(),
        adult: false,
    };

    info!(
        "Getting recommendations for {:?} ({}, {})",
        query.genres, query.release_year, query.language
    );
    let recommendations = orchestrator.get_recommendations(query, None).await?;

    info!("Received {} recommendations:", recommendations.len());
    for (i, rec) in recommendations.iter().enumerate() {
        match &rec.details {
            Some(details) => {
                info!(
                    "{}. {} [{}] - Similarity: {:.3}",
                    i + 1,
                    details.title,
                    rec.movie_id,
                    rec.similarity
                );
                info!("   Genres: {}", details.genres.join(", "));
                info!(
                    "   Released: {} | Language: {}",
                    details.release_date.as_deref().unwrap_or("????"),
                    details.language
                );
            }
            None => info!(
                "{}. Movie {} - Similarity: {:.3}",
                i + 1,
                rec.movie_id,
                rec.similarity
            ),
        }
    }

    Ok(())
}
