use adoption_acquire::{listing, output};
use adoption_cli::args::CommonArgs;
use adoption_model::Category;
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

/// Scrape a paginated adoption listing and save the animals to CSV.
#[derive(Parser)]
#[command(name = "animal_list_scraper", version = adoption_cli::VERSION)]
struct Cli {
    /// Listing URL to start from (e.g., https://dogcat.com.ua/adoption?animal=2)
    url: String,

    /// Output CSV path
    #[arg(short, long, default_value = "./data/cats/data.csv")]
    output: PathBuf,

    /// Category to record on every row: dog or cat (inferred from the URL when omitted)
    #[arg(long)]
    category: Option<Category>,

    #[command(flatten)]
    common: CommonArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_path = cli.common.init_logging(env!("CARGO_BIN_NAME"))?;
    tracing::debug!(path = %log_path.display(), "Logging to file");

    tracing::info!(url = %cli.url, "Starting to scrape animal data");
    let fetcher = cli.common.fetcher()?;
    let rows = listing::scrape_listings(&fetcher, &cli.url, cli.category).await?;

    if rows.is_empty() {
        tracing::warn!("No animal data found. Exiting.");
        return Ok(());
    }

    output::write_listing_csv(&cli.output, &rows)?;
    Ok(())
}
