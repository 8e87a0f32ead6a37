//! dealscope CLI - scrape, query, and serve product listings.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use dealscope::{Config, FileCache, HttpFetcher, SearchOptions, Searcher};

/// Dealscope - e-commerce listing scraper and query API
#[derive(Parser)]
#[command(name = "dealscope")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server
    Serve(ServeArgs),

    /// Run a one-off search from the command line
    Search(SearchArgs),
}

#[derive(Parser)]
struct ServeArgs {
    /// Address to bind the API server to
    #[arg(short, long, default_value = "0.0.0.0:8000")]
    bind: String,
}

#[derive(Parser)]
struct SearchArgs {
    /// Search query
    query: String,

    /// Maximum number of results to display (1-100)
    #[arg(short, long, default_value = "20")]
    limit: usize,

    /// Drop products rated below this value (0-5)
    #[arg(short, long, default_value = "0.0")]
    min_rating: f64,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = Config::from_env();
    let searcher = Arc::new(build_searcher(&config));

    match cli.command {
        Commands::Serve(args) => {
            dealscope::api::serve(searcher, &args.bind).await?;
            Ok(())
        }
        Commands::Search(args) => run_search(searcher, args).await,
    }
}

fn build_searcher(config: &Config) -> Searcher {
    let fetcher = Arc::new(HttpFetcher::new(
        &config.base_url,
        &config.user_agent,
        Duration::from_secs(config.fetch_timeout_secs),
    ));
    let cache = Arc::new(FileCache::new(&config.cache_dir, config.cache_ttl_hours));
    Searcher::new(config, fetcher, cache)
}

async fn run_search(searcher: Arc<Searcher>, args: SearchArgs) -> Result<()> {
    let options = SearchOptions {
        limit: args.limit,
        min_rating: args.min_rating,
    };

    let result = searcher.search(&args.query, options).await?;

    match args.format {
        OutputFormat::Text => {
            let origin = if result.cached { "cache" } else { "scrape" };
            println!(
                "\nResults for \"{}\" ({} products, from {}):\n",
                result.query,
                result.count(),
                origin
            );

            for (i, product) in result.products.iter().enumerate() {
                println!("{}. {}", i + 1, product.title);
                match product.price {
                    Some(price) => println!("   Price: {:.2}", price),
                    None => println!("   Price: -"),
                }
                match product.rating {
                    Some(rating) => println!("   Rating: {:.1}/5", rating),
                    None => println!("   Rating: -"),
                }
                println!("   URL: {}", product.url);
                println!();
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}
