use clap::Parser;
use event_scraper::apis::ScrapeWindow;
use event_scraper::config::Config;
use event_scraper::constants::get_supported_apis;
use event_scraper::error::ScraperError;
use event_scraper::infra::http_client::ReqwestFetcher;
use event_scraper::logging;
use event_scraper::pipeline::Pipeline;
use event_scraper::registry::SourceRegistry;
use event_scraper::storage::JsonCatalogStore;
use std::env::VarError;
use std::path::PathBuf;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "event_scraper")]
#[command(about = "Scrapes event listings into a deduplicated JSON catalog")]
#[command(version = "0.1.0")]
struct Cli {
    /// Number of days ahead to scrape
    #[arg(long, default_value_t = 30)]
    days: u32,

    /// Catalog file name inside the data directory
    #[arg(long, default_value = "events.json")]
    output: String,

    /// Directory holding the catalog
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// TOML config file (falls back to $SCRAPER_CONFIG, then built-in defaults)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Sources to run (comma-separated). Available: sapporo, tokyo
    #[arg(long)]
    sources: Option<String>,

    /// Directory for rolling log files
    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,
}

fn load_config(cli_path: Option<PathBuf>) -> anyhow::Result<Config> {
    let path = match cli_path {
        Some(path) => Some(path),
        None => match std::env::var("SCRAPER_CONFIG") {
            Ok(value) => Some(PathBuf::from(value)),
            Err(VarError::NotPresent) => None,
            Err(e) => return Err(ScraperError::from(e).into()),
        },
    };
    match path {
        Some(path) => {
            info!("Loading config from {}", path.display());
            Ok(Config::load(&path)?)
        }
        None => Ok(Config::default()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    logging::init_logging(&cli.log_dir);

    println!("=== Event scraping started ===");
    println!("Days: {}", cli.days);
    println!("Output file: {}", cli.output);
    println!("Data directory: {}", cli.data_dir.display());

    let config = load_config(cli.config)?;
    let registry = match &cli.sources {
        Some(list) => {
            let names: Vec<&str> = list.split(',').map(str::trim).collect();
            SourceRegistry::from_names(&names, &config)?
        }
        None => SourceRegistry::from_config(&config)?,
    };
    if registry.is_empty() {
        warn!(
            "No known sources selected (available: {}); the catalog will only be re-saved",
            get_supported_apis().join(", ")
        );
    }

    let fetcher = ReqwestFetcher::new(&config.fetch)?;
    let store = JsonCatalogStore::new(&cli.data_dir);
    let window = ScrapeWindow::from_today(cli.days);

    let pipeline = Pipeline::new(&registry, &fetcher, &store);
    let result = match pipeline.run(&window, &cli.output).await {
        Ok(result) => result,
        Err(e) => {
            error!("Scraping failed: {}", e);
            return Err(e.into());
        }
    };

    println!("\n📊 Results:");
    for (source, count) in &result.per_source {
        println!("   {}: {} events", source, count);
    }
    println!("   Scraped: {}", result.total_events);
    println!("   Added: {}", result.accepted_events);
    println!("   Duplicates: {}", result.duplicate_events);
    println!("   Catalog size: {}", result.catalog_size);
    println!("✅ Saved to {}", result.output_file.display());
    Ok(())
}
