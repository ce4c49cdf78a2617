use adoption_acquire::pool::DEFAULT_CONCURRENCY;
use adoption_acquire::{extract, output};
use adoption_cli::args::CommonArgs;
use anyhow::Result;
use clap::Parser;
use std::num::NonZeroUsize;
use std::path::PathBuf;

/// Fetch every profile listed in a CSV and write the extracted records as JSON.
#[derive(Parser)]
#[command(name = "adoption_profiles_scraper", version = adoption_cli::VERSION)]
struct Cli {
    /// Listing CSV with at least pet_id and link columns
    csv_path: PathBuf,

    /// Output JSON path
    #[arg(short, long, default_value = "./data/cats/adoption_profiles.json")]
    output: PathBuf,

    /// Number of simultaneous requests
    #[arg(short = 'n', long, default_value_t = DEFAULT_CONCURRENCY)]
    concurrency: NonZeroUsize,

    #[command(flatten)]
    common: CommonArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.common.init_logging(env!("CARGO_BIN_NAME"))?;

    tracing::info!(csv = %cli.csv_path.display(), "Starting profile extraction");
    let rows = extract::read_listing_csv(&cli.csv_path)?;
    let fetcher = cli.common.fetcher()?;

    let report = extract::extract_profiles(fetcher, rows, cli.concurrency).await;
    output::write_profiles_json(&cli.output, &report.records)?;
    report.summary.log();

    Ok(())
}
