//! rustscival - SciVal topic exports from the command line
//!
//! ## Usage
//!
//! ```bash
//! export SCIVAL_COOKIE='SCSessionID=...; ...'
//! rustscival papers 12345 --output papers.csv
//! rustscival topics 12345 --output topics.csv
//! rustscival cache clear
//! ```

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rustscival::{
    ClientOptions, ExportTable, RelatedPapers, RelatedTopics, ResponseCache, RetrievalOptions,
    ScivalClient,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding the SciVal session cookie
const COOKIE_ENV: &str = "SCIVAL_COOKIE";

/// Environment variable overriding the cache directory
const CACHE_DIR_ENV: &str = "SCIVAL_CACHE_DIR";

// ============================================================================
// CLI Definition
// ============================================================================

/// SciVal topic exports - related publications and related topics
#[derive(Parser)]
#[command(name = "rustscival")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch all publications related to a topic
    Papers(ExportArgs),

    /// Fetch the 50 topics related to a topic
    Topics(ExportArgs),

    /// Manage the response cache
    Cache {
        /// Cache directory (default: platform cache dir, or $SCIVAL_CACHE_DIR)
        #[arg(long)]
        cache_dir: Option<PathBuf>,

        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Args)]
struct ExportArgs {
    /// SciVal topic ID
    topic_id: String,

    /// Session cookie (default: $SCIVAL_COOKIE)
    #[arg(long)]
    cookie: Option<String>,

    /// Write the table to this CSV file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Cache directory (default: platform cache dir, or $SCIVAL_CACHE_DIR)
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Do not read or write the response cache
    #[arg(long)]
    no_cache: bool,

    /// Ignore cached pages and fetch again
    #[arg(long)]
    refresh: bool,

    /// Hide progress output
    #[arg(short, long)]
    quiet: bool,

    /// SciVal base URL
    #[arg(long)]
    base_url: Option<String>,

    /// Proxy URL (e.g., http://127.0.0.1:7890)
    #[arg(long)]
    proxy: Option<String>,
}

#[derive(Subcommand)]
enum CacheAction {
    /// Show cache directory
    Path,
    /// Remove all cached pages
    Clear,
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Papers(args) => run_papers(args).await,
        Commands::Topics(args) => run_topics(args).await,
        Commands::Cache { cache_dir, action } => handle_cache(cache_dir, action),
    }
}

// ============================================================================
// Exports
// ============================================================================

async fn run_papers(args: ExportArgs) -> Result<()> {
    let (client, options) = build_retrieval(&args)?;

    let papers = RelatedPapers::retrieve(&client, &args.topic_id, &options)
        .await
        .with_context(|| format!("Failed to retrieve publications for topic {}", args.topic_id))?;

    info!(pages = papers.pages, "{}", papers);
    report(&papers.info, &papers.data, args.output.as_deref())
}

async fn run_topics(args: ExportArgs) -> Result<()> {
    let (client, options) = build_retrieval(&args)?;

    let topics = RelatedTopics::retrieve(&client, &args.topic_id, &options)
        .await
        .with_context(|| format!("Failed to retrieve related topics for topic {}", args.topic_id))?;

    info!("{}", topics);
    report(&topics.info, &topics.data, args.output.as_deref())
}

/// Build the client and retrieval options from command line arguments
fn build_retrieval(args: &ExportArgs) -> Result<(ScivalClient, RetrievalOptions)> {
    let cookie = match &args.cookie {
        Some(cookie) => cookie.clone(),
        None => std::env::var(COOKIE_ENV)
            .with_context(|| format!("No cookie given: pass --cookie or set {}", COOKIE_ENV))?,
    };

    let client_options = ClientOptions {
        base_url: args.base_url.clone(),
        proxy: args.proxy.clone(),
        ..Default::default()
    };
    let client = ScivalClient::with_options(cookie, &client_options)?;

    let cache = if args.no_cache {
        None
    } else {
        Some(open_cache(args.cache_dir.clone())?)
    };

    let options = RetrievalOptions {
        show_progress: !args.quiet,
        cache,
        force_refresh: args.refresh,
    };

    Ok((client, options))
}

/// Print metadata as JSON and save or summarise the table
fn report<T: Serialize>(info: &T, table: &ExportTable, output: Option<&Path>) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(info)?);

    match output {
        Some(path) => {
            table
                .write_csv(path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Saved {} rows to {}", table.len(), path.display());
        }
        None => println!("Retrieved {} rows (use --output to save them)", table.len()),
    }

    Ok(())
}

// ============================================================================
// Cache Management
// ============================================================================

fn open_cache(cache_dir: Option<PathBuf>) -> Result<ResponseCache> {
    let root = match cache_dir.or_else(|| std::env::var_os(CACHE_DIR_ENV).map(PathBuf::from)) {
        Some(dir) => dir,
        None => ResponseCache::default_root()?,
    };
    Ok(ResponseCache::new(root))
}

fn handle_cache(cache_dir: Option<PathBuf>, action: CacheAction) -> Result<()> {
    let cache = open_cache(cache_dir)?;

    match action {
        CacheAction::Path => {
            println!("Cache directory: {:?}", cache.path());
        }
        CacheAction::Clear => {
            cache.clear()?;
            println!("Cache cleared.");
        }
    }

    Ok(())
}
