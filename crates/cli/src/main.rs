use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use data_loader::{Catalog, MovieRecord};
use metadata_client::{DiscoverFilter, DiscoverSort, MovieCard, DEFAULT_LIST_LIMIT};
use pipeline::QueryProfile;
use rand::Rng;
use server::{
    fit_and_save, load_catalog, MovieRecommendation, RecommendationOrchestrator, ServiceConfig,
};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// reel-match - Content-based movie matching
#[derive(Parser)]
#[command(name = "reel-match")]
#[command(about = "Recommend movies by similarity to a preference profile", long_about = None)]
struct Cli {
    /// Directory holding movies.csv, language_codes.csv and genres_details.csv
    /// (overrides DATA_DIR)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Encoder artifact path (overrides ENCODER_ARTIFACT)
    #[arg(short, long)]
    artifact: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit a new encoder on the catalog and save it
    Fit,

    /// Recommend movies for a preference profile
    Recommend {
        /// Preferred genres, comma separated (e.g. Action,Adventure)
        #[arg(long, value_delimiter = ',')]
        genres: Vec<String>,

        /// Release year; only movies from exactly this year are returned
        #[arg(long)]
        year: u16,

        /// Preferred runtime in minutes
        #[arg(long)]
        runtime: f32,

        /// Preferred vote average (0-10)
        #[arg(long)]
        vote: f32,

        /// Language name (e.g. English); only movies in this language are returned
        #[arg(long)]
        language: String,

        /// Prefer adult titles
        #[arg(long)]
        adult: bool,

        /// Number of recommendations (defaults to DEFAULT_TOP_K)
        #[arg(long)]
        limit: Option<usize>,

        /// Fetch title, overview and genres from the metadata service
        #[arg(long)]
        details: bool,
    },

    /// List the languages the catalog knows
    Languages,

    /// List the categories (genres) the catalog knows
    Categories,

    /// Show this week's trending movies (needs TMDB_API_KEY)
    Trending,

    /// Browse the metadata service by genre, year, vote and language
    /// (needs TMDB_API_KEY)
    Discover {
        /// Categories every result must have, comma separated
        #[arg(long, value_delimiter = ',')]
        genres: Vec<String>,

        /// Primary release year
        #[arg(long)]
        year: Option<u16>,

        /// Minimum vote average (0-10)
        #[arg(long)]
        min_vote: Option<f32>,

        /// Result order
        #[arg(long, value_enum, default_value_t = SortOrder::Latest)]
        sort: SortOrder,

        /// Original language name (e.g. French)
        #[arg(long)]
        language: Option<String>,

        /// Number of results (1-100)
        #[arg(long, default_value_t = DEFAULT_LIST_LIMIT)]
        limit: usize,
    },

    /// Search movies by title (needs TMDB_API_KEY)
    Search {
        /// Title to look for
        query: String,

        /// Number of results (1-100)
        #[arg(long, default_value_t = DEFAULT_LIST_LIMIT)]
        limit: usize,
    },

    /// Run benchmark to test performance
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "1000")]
        requests: usize,

        /// Number of concurrent requests
        #[arg(long, default_value = "10")]
        concurrent: usize,

        /// Recommendations per request
        #[arg(long, default_value = "5")]
        limit: usize,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum SortOrder {
    /// Newest releases first
    Latest,
    /// Most popular first
    Popularity,
}

impl From<SortOrder> for DiscoverSort {
    fn from(order: SortOrder) -> Self {
        match order {
            SortOrder::Latest => DiscoverSort::Latest,
            SortOrder::Popularity => DiscoverSort::Popularity,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = ServiceConfig::from_env()?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(artifact) = cli.artifact {
        config.encoder_artifact = Some(artifact);
    }

    // Load catalog (this may take a moment)
    println!("Loading catalog from {}...", config.data_dir.display());
    let start = Instant::now();
    let catalog = load_catalog(&config.data_dir)?;
    println!(
        "{} Loaded {} movies in {:?}",
        "✓".green(),
        catalog.len(),
        start.elapsed()
    );

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Fit => handle_fit(catalog, &config)?,
        Commands::Recommend {
            genres,
            year,
            runtime,
            vote,
            language,
            adult,
            limit,
            details,
        } => {
            let query = QueryProfile {
                genres,
                release_year: year,
                runtime,
                vote_average: vote,
                language,
                adult,
            };
            if !details {
                config.tmdb_api_key = None;
            }
            handle_recommend(catalog, &config, query, limit).await?
        }
        Commands::Languages => handle_languages(&catalog),
        Commands::Categories => handle_categories(&catalog),
        Commands::Trending => {
            let orchestrator = RecommendationOrchestrator::from_catalog(catalog, &config)?;
            print_cards("Trending this week:", &orchestrator.trending().await?);
        }
        Commands::Discover {
            genres,
            year,
            min_vote,
            sort,
            language,
            limit,
        } => {
            let orchestrator = RecommendationOrchestrator::from_catalog(catalog, &config)?;
            let filter = DiscoverFilter {
                genres: orchestrator.genre_ids(&genres)?,
                release_year: year,
                min_vote,
                sort: sort.into(),
                language,
                limit,
            };
            print_cards("Discovered movies:", &orchestrator.discover(filter).await?);
        }
        Commands::Search { query, limit } => {
            let orchestrator = RecommendationOrchestrator::from_catalog(catalog, &config)?;
            let cards = orchestrator.search(&query, Some(limit)).await?;
            print_cards(&format!("Results for \"{}\":", query), &cards);
        }
        Commands::Benchmark {
            requests,
            concurrent,
            limit,
        } => {
            config.tmdb_api_key = None;
            handle_benchmark(catalog, &config, requests, concurrent, limit).await?
        }
    }

    Ok(())
}

/// Handle the 'fit' command
fn handle_fit(catalog: Catalog, config: &ServiceConfig) -> Result<()> {
    let artifact = config.artifact_path();
    let start = Instant::now();
    let fitted = fit_and_save(catalog.movies(), &artifact)?;

    println!(
        "{} Fitted encoder {} in {:?}",
        "✓".green(),
        fitted.encoder().id().to_string().bold(),
        start.elapsed()
    );
    println!(
        "{}Vocabulary: {} genres",
        "• ".cyan(),
        fitted.encoder().vocabulary().len()
    );
    println!(
        "{}Matrix: {} rows x {} columns",
        "• ".cyan(),
        fitted.matrix().len(),
        fitted.matrix().width()
    );
    println!("{}Saved to {}", "• ".cyan(), artifact.display());
    Ok(())
}

/// Handle the 'recommend' command
async fn handle_recommend(
    catalog: Catalog,
    config: &ServiceConfig,
    query: QueryProfile,
    limit: Option<usize>,
) -> Result<()> {
    let orchestrator = RecommendationOrchestrator::from_catalog(catalog, config)?;
    let recommendations = orchestrator.get_recommendations(query, limit).await?;

    if recommendations.is_empty() {
        println!(
            "{}",
            "No movies match that release year and language.".yellow()
        );
        return Ok(());
    }
    print_recommendations(&recommendations);
    Ok(())
}

/// Handle the 'languages' command
fn handle_languages(catalog: &Catalog) {
    println!("{}", "Languages:".bold().blue());
    for language in catalog.languages().entries() {
        println!("  {} {}", language.code.green(), language.name);
    }
}

/// Handle the 'categories' command
fn handle_categories(catalog: &Catalog) {
    println!("{}", "Categories:".bold().blue());
    for genre in catalog.genres().entries() {
        println!("  {:>6} {}", genre.id.to_string().green(), genre.name);
    }
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    catalog: Catalog,
    config: &ServiceConfig,
    requests: usize,
    concurrent: usize,
    limit: usize,
) -> Result<()> {
    if requests == 0 || concurrent == 0 {
        bail!("--requests and --concurrent must be at least 1");
    }

    // Queries are drawn from the catalog itself so most of them hit a
    // non-empty year/language bucket
    let queries = sample_queries(&catalog, requests, &mut rand::rng());
    if queries.is_empty() {
        bail!("Catalog has no complete movie records to build queries from");
    }
    let orchestrator = RecommendationOrchestrator::from_catalog(catalog, config)?;

    let wall = Instant::now();
    let mut timings = Vec::with_capacity(queries.len());
    let mut returned = 0usize;
    let mut queries = queries.into_iter();
    loop {
        let batch: Vec<QueryProfile> = queries.by_ref().take(concurrent).collect();
        if batch.is_empty() {
            break;
        }

        let mut handles = Vec::with_capacity(batch.len());
        for query in batch {
            let orchestrator = orchestrator.clone();
            handles.push(tokio::spawn(async move {
                let start = Instant::now();
                let recs = orchestrator.get_recommendations(query, Some(limit)).await?;
                Ok::<_, anyhow::Error>((start.elapsed(), recs.len()))
            }));
        }
        for handle in handles {
            let (elapsed, count) = handle.await.context("Benchmark task panicked")??;
            timings.push(elapsed);
            returned += count;
        }
    }
    let wall_time = wall.elapsed();

    timings.sort();
    let total: Duration = timings.iter().sum();
    let avg_latency = total / timings.len() as u32;
    let throughput = timings.len() as f64 / wall_time.as_secs_f64();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Requests: {} ({} concurrent)", timings.len(), concurrent);
    println!(
        "Average results per request: {:.2}",
        returned as f64 / timings.len() as f64
    );
    println!("Total time: {:?}", wall_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(&timings, 0.50));
    println!("P95 latency: {:?}", percentile(&timings, 0.95));
    println!("P99 latency: {:?}", percentile(&timings, 0.99));
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

/// Build `count` queries from randomly chosen complete catalog records
fn sample_queries<R: Rng>(catalog: &Catalog, count: usize, rng: &mut R) -> Vec<QueryProfile> {
    let complete: Vec<&MovieRecord> = catalog
        .movies()
        .iter()
        .filter(|m| {
            m.release_year.is_some()
                && m.runtime.is_some()
                && m.vote_average.is_some()
                && m.language.is_some()
        })
        .collect();
    if complete.is_empty() {
        return Vec::new();
    }

    (0..count)
        .filter_map(|_| {
            let movie = complete[rng.random_range(0..complete.len())];
            let code = movie.language.as_deref()?;
            let language = catalog
                .languages()
                .name_for_code(code)
                .unwrap_or(code)
                .to_string();
            Some(QueryProfile {
                genres: movie.genres.clone(),
                release_year: movie.release_year?,
                runtime: f32::from(movie.runtime?),
                vote_average: movie.vote_average?,
                language,
                adult: movie.adult,
            })
        })
        .collect()
}

/// Nearest-rank percentile of sorted timings
fn percentile(sorted: &[Duration], p: f64) -> Duration {
    if sorted.is_empty() {
        return Duration::ZERO;
    }
    let rank = (p * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}

/// Helper function to format and print recommendations
fn print_recommendations(recommendations: &[MovieRecommendation]) {
    println!("{}", "Movie Recommendations:".bold().blue());
    for (i, rec) in recommendations.iter().enumerate() {
        let rank = (i + 1).to_string().green();
        match &rec.details {
            Some(details) => {
                println!(
                    "{}. {} ({}) [{}] - Similarity: {:.3}",
                    rank,
                    details.title.bold(),
                    details.release_date.as_deref().unwrap_or("????"),
                    details.genres.join(", "),
                    rec.similarity
                );
                println!(
                    "   {}Language: {} | Runtime: {} min | Votes: {}",
                    "• ".cyan(),
                    details.language,
                    details
                        .runtime
                        .map(|r| r.to_string())
                        .unwrap_or_else(|| "?".to_string()),
                    details
                        .vote_average
                        .map(|v| format!("{:.1}", v))
                        .unwrap_or_else(|| "?".to_string())
                );
                if !details.overview.is_empty() {
                    println!("   {}", details.overview);
                }
            }
            None => println!(
                "{}. Movie {} - Similarity: {:.3}",
                rank, rec.movie_id, rec.similarity
            ),
        }
    }
}

/// Print a listing from the metadata service
fn print_cards(title: &str, cards: &[MovieCard]) {
    if cards.is_empty() {
        println!("{}", "No movies found.".yellow());
        return;
    }
    println!("{}", title.bold().blue());
    for (i, card) in cards.iter().enumerate() {
        println!(
            "{}. {} ({}) [{}] - {}",
            (i + 1).to_string().green(),
            card.title.bold(),
            card.release_date.as_deref().unwrap_or("????"),
            card.genres.join(", "),
            card.language
        );
    }
}
