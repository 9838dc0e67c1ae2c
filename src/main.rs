use anyhow::{Context, Result};
use careers_search::{JobSearch, SearchConfig, SearchError};
use clap::Parser;
use std::fs::OpenOptions;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "careers-search")]
#[command(about = "Search a careers site with a natural-language query")]
struct Cli {
    /// Free-text query, e.g. "Internships in Bangalore for pursuing degree"
    #[arg(required = true)]
    query: Vec<String>,

    /// YAML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Use the language-model interpreter when OPENAI_API_KEY is available
    #[arg(long)]
    llm: bool,

    /// Only print the detected filters and search URL
    #[arg(long)]
    no_fetch: bool,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Write JSON logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn init_logging(log_file: Option<&PathBuf>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("careers_search=info"));

    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?;

            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(file)
                        .with_current_span(false)
                        .with_span_list(false),
                )
                .with(filter)
                .init();
        }
        None => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr))
                .with(filter)
                .init();
        }
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<SearchConfig> {
    let config = match &cli.config {
        Some(path) => SearchConfig::from_file(path)?,
        None => SearchConfig::default(),
    };
    let config = config.apply_env().context("Invalid environment configuration")?;

    if !cli.llm {
        return Ok(config.without_llm());
    }
    if config.delegate_settings().is_none() {
        warn!("LLM mode requested but OPENAI_API_KEY not found. Using heuristic parser instead.");
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.log_file.as_ref())?;

    let config = load_config(&cli)?;
    let search = JobSearch::from_config(&config)?;
    let query = cli.query.join(" ");

    info!("Searching for: {}", query);

    if cli.no_fetch {
        let plan = search.plan(&query).await;
        if cli.json {
            let output = serde_json::json!({ "filters": plan.filters, "url": plan.url.as_str() });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("Filters: {}", serde_json::to_string(&plan.filters)?);
            println!("Search URL: {}", plan.url);
        }
        return Ok(());
    }

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    let results = match search.search_with_cancel(&query, &cancel).await {
        Ok(results) => results,
        Err(SearchError::Cancelled) => {
            eprintln!("Search cancelled.");
            return Ok(());
        }
        Err(e) => return Err(e).context("Search failed"),
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    println!("Filters: {}", serde_json::to_string(&results.filters)?);
    println!("Search URL: {}", results.url);

    if results.listings.is_empty() {
        println!("No results found. Try different keywords or open the search URL directly.");
        return Ok(());
    }

    println!("Found {} result(s)\n", results.listings.len());
    for listing in &results.listings {
        println!("{}", listing.title);
        if !listing.location.is_empty() {
            println!("  Location: {}", listing.location);
        }
        if !listing.snippet.is_empty() {
            println!("  {}", listing.snippet);
        }
        println!("  {}\n", listing.link);
    }

    Ok(())
}
