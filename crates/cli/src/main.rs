use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use pipeline::StopWords;
use recommender::{
    ArtifactStore, BuildSummary, EngineBuilder, EngineConfig, Recommendation, Recommender,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::info;

/// movie-recs - content-based movie recommendations
#[derive(Parser)]
#[command(name = "movie-recs")]
#[command(about = "Recommend movies with similar overview, genres, keywords, cast and director", long_about = None)]
struct Cli {
    /// Directory holding vectorizer.json, items.json and similarity.bin
    #[arg(short, long, global = true)]
    artifacts_dir: Option<PathBuf>,

    /// TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build artifacts from a JSON-lines corpus
    Build {
        /// Corpus file, one movie per line
        #[arg(long)]
        corpus: PathBuf,

        /// Fit a new vocabulary even if one is saved
        #[arg(long)]
        refit: bool,

        /// Override [vectorizer] max_features
        #[arg(long)]
        max_features: Option<usize>,

        /// Override [vectorizer] stop_words: "english", "none", or a term list like "sequel" or "a,b,c"
        #[arg(long)]
        stop_words: Option<StopWords>,
    },

    /// Get movies similar to a title
    Recommend {
        /// Exact title (case-insensitive)
        #[arg(long)]
        title: String,

        /// Number of recommendations to return
        #[arg(long)]
        top_n: Option<usize>,
    },

    /// Search for movies by title
    Search {
        /// Title fragment (case-insensitive substring match)
        #[arg(long)]
        title: String,
    },

    /// Run concurrent queries to measure latency
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "1000")]
        requests: usize,

        /// Number of requests in flight at once
        #[arg(long, default_value = "10")]
        concurrent: usize,

        /// Per-request deadline
        #[arg(long, default_value = "100")]
        timeout_ms: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = EngineConfig::load_or_default(cli.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(dir) = cli.artifacts_dir {
        config.paths.artifacts_dir = dir;
    }
    let store = ArtifactStore::new(&config.paths.artifacts_dir);

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Build {
            corpus,
            refit,
            max_features,
            stop_words,
        } => {
            if let Some(max_features) = max_features {
                config.vectorizer.max_features = max_features;
            }
            if let Some(stop_words) = stop_words {
                config.vectorizer.stop_words = stop_words;
            }
            config.validate().context("Invalid configuration")?;
            handle_build(config, &store, &corpus, refit)?
        }
        Commands::Recommend { title, top_n } => {
            let top_n = top_n.unwrap_or(config.recommend.top_n_recommendations);
            handle_recommend(&store, &title, top_n)?
        }
        Commands::Search { title } => handle_search(&store, &title)?,
        Commands::Benchmark {
            requests,
            concurrent,
            timeout_ms,
        } => {
            let top_n = config.recommend.top_n_recommendations;
            handle_benchmark(&store, requests, concurrent, timeout_ms, top_n).await?
        }
    }

    Ok(())
}

fn load_recommender(store: &ArtifactStore) -> Result<Recommender> {
    let start = Instant::now();
    let recommender = Recommender::load(store).with_context(|| {
        format!(
            "Failed to load artifacts from {} (run `movie-recs build` first)",
            store.dir().display()
        )
    })?;
    println!(
        "{} Loaded {} movies (snapshot {}) in {:?}",
        "✓".green(),
        recommender.len(),
        recommender.snapshot_id(),
        start.elapsed()
    );
    Ok(recommender)
}

/// Handle the 'build' command
fn handle_build(config: EngineConfig, store: &ArtifactStore, corpus: &Path, refit: bool) -> Result<()> {
    let top_n = config.recommend.top_n_recommendations;
    println!("Building artifacts from {}...", corpus.display());

    let summary = EngineBuilder::new(config).build_and_save(corpus, store, refit)?;
    print_summary(&summary, store);

    // Sample output for the first title, as a smoke test of the new set
    let recommender = Recommender::load(store)?;
    if let Some(first) = recommender.items().first() {
        let title = first.title.clone();
        println!();
        println!("{}", format!("Sample: movies similar to '{}'", title).bold().blue());
        print_recommendations(&recommender.recommend(&title, top_n));
    }
    Ok(())
}

/// Handle the 'recommend' command
fn handle_recommend(store: &ArtifactStore, title: &str, top_n: usize) -> Result<()> {
    let recommender = load_recommender(store)?;
    let recommendations = recommender.recommend(title, top_n);

    if recommendations.is_empty() {
        println!("{} No movie titled '{}'", "✗".red(), title);
        let hits = recommender.search(title);
        if !hits.is_empty() {
            println!("Did you mean:");
            for hit in hits.iter().take(5) {
                println!("  - {}", hit.title);
            }
        }
        return Ok(());
    }

    println!("{}", format!("Movies similar to '{}':", title).bold().blue());
    print_recommendations(&recommendations);
    Ok(())
}

/// Handle the 'search' command
fn handle_search(store: &ArtifactStore, title: &str) -> Result<()> {
    let recommender = load_recommender(store)?;
    let hits = recommender.search(title);

    println!("{}", format!("Search results for '{}':", title).bold().blue());
    if hits.is_empty() {
        println!("  (none)");
    }
    for hit in hits.iter().take(20) {
        println!("{}: {}", hit.item_id, hit.title);
    }
    if hits.len() > 20 {
        println!("  ... and {} more", hits.len() - 20);
    }
    Ok(())
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    store: &ArtifactStore,
    requests: usize,
    concurrent: usize,
    timeout_ms: u64,
    top_n: usize,
) -> Result<()> {
    if requests == 0 || concurrent == 0 {
        bail!("--requests and --concurrent must be positive");
    }
    let recommender = Arc::new(load_recommender(store)?);
    if recommender.is_empty() {
        bail!("No movies to query");
    }

    // Random titles from the loaded set
    let titles: Vec<String> = (0..requests)
        .map(|_| {
            let row = rand::random_range(0..recommender.len());
            recommender.items()[row].title.clone()
        })
        .collect();

    let limit = Arc::new(Semaphore::new(concurrent));
    let deadline = Duration::from_millis(timeout_ms);
    let wall_clock = Instant::now();

    // Use tokio::spawn to make concurrent requests
    let mut handles = Vec::with_capacity(requests);
    for title in titles {
        let recommender = Arc::clone(&recommender);
        let limit = Arc::clone(&limit);
        handles.push(tokio::spawn(timed_query(
            recommender,
            title,
            top_n,
            limit,
            deadline,
        )));
    }

    // Wait for all tasks to complete and collect timings
    let mut timings = Vec::with_capacity(requests);
    let mut timed_out = 0usize;
    for handle in handles {
        match handle.await?? {
            Some(elapsed) => timings.push(elapsed),
            None => timed_out += 1,
        }
    }
    let total_time = wall_clock.elapsed();
    info!("Benchmark finished: {} ok, {} timed out", timings.len(), timed_out);

    println!("{}", "Benchmark results:".bold().blue());
    println!("Requests: {} ({} concurrent)", requests, concurrent);
    println!("Timed out (> {:?}): {}", deadline, timed_out);
    println!("Total time: {:?}", total_time);
    if timings.is_empty() {
        println!("{} Every request timed out", "✗".red());
        return Ok(());
    }

    timings.sort();
    let sum: Duration = timings.iter().sum();
    let avg_latency = sum / timings.len() as u32;
    let percentile = |p: f64| {
        let idx = ((timings.len() as f64 * p) as usize).min(timings.len() - 1);
        timings[idx]
    };
    let throughput = timings.len() as f64 / total_time.as_secs_f64();

    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

/// Run one query under the concurrency limit.
///
/// Returns `None` when the query missed its deadline.
async fn timed_query(
    recommender: Arc<Recommender>,
    title: String,
    top_n: usize,
    limit: Arc<Semaphore>,
    deadline: Duration,
) -> Result<Option<Duration>> {
    let _permit = limit
        .acquire_owned()
        .await
        .context("Benchmark semaphore closed")?;
    let start = Instant::now();
    let query = tokio::task::spawn_blocking(move || recommender.recommend(&title, top_n));
    match tokio::time::timeout(deadline, query).await {
        Ok(result) => {
            result.context("Query task panicked")?;
            Ok(Some(start.elapsed()))
        }
        Err(_) => Ok(None),
    }
}

fn print_summary(summary: &BuildSummary, store: &ArtifactStore) {
    println!(
        "{} Built snapshot {} in {:.2?}",
        "✓".green(),
        summary.snapshot_id,
        summary.elapsed
    );
    println!("{}Movies: {}", "• ".green(), summary.items);
    println!(
        "{}Vocabulary: {} terms ({})",
        "• ".green(),
        summary.vocabulary,
        if summary.reused_vocabulary { "reused" } else { "fitted" }
    );
    if summary.ignored_vectorizer_config {
        println!(
            "{}Vectorizer settings differ from the saved vocabulary and were ignored; pass --refit to apply them",
            "• ".yellow()
        );
    }
    if summary.skipped_records > 0 {
        println!("{}Skipped records: {}", "• ".yellow(), summary.skipped_records);
    }
    let mut issues: Vec<_> = summary.issues.iter().collect();
    issues.sort_by_key(|(stage, _)| stage.to_string());
    for (stage, count) in issues {
        println!("{}Recovered {} issues: {}", "• ".yellow(), stage, count);
    }
    println!("{}Artifacts: {}", "• ".cyan(), store.dir().display());
}

/// Helper function to format and print recommendations
fn print_recommendations(recommendations: &[Recommendation]) {
    if recommendations.is_empty() {
        println!("  (none)");
    }
    for (idx, rec) in recommendations.iter().enumerate() {
        println!(
            "{}. {} [id {}] - Score: {:.3}",
            (idx + 1).to_string().green(),
            rec.title,
            rec.item_id,
            rec.score
        );
    }
}
