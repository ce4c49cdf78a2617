use adoption_acquire::photos::{self, DownloadOptions};
use adoption_acquire::pool::DEFAULT_CONCURRENCY;
use adoption_cli::args::CommonArgs;
use anyhow::Result;
use clap::Parser;
use std::num::NonZeroUsize;
use std::path::PathBuf;

/// Download the photos of every profile in a JSON file, one directory per animal.
#[derive(Parser)]
#[command(name = "adoption_photos_downloader", version = adoption_cli::VERSION)]
struct Cli {
    /// Profiles JSON written by adoption_profiles_scraper
    json_path: PathBuf,

    /// Number of simultaneous downloads, across all profiles
    #[arg(short = 'n', long, default_value_t = DEFAULT_CONCURRENCY)]
    concurrency: NonZeroUsize,

    /// Output directory (default: "photos" next to the JSON file)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Re-download photos that already exist on disk
    #[arg(long)]
    overwrite: bool,

    #[command(flatten)]
    common: CommonArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.common.init_logging(env!("CARGO_BIN_NAME"))?;

    let records = photos::read_profiles_json(&cli.json_path)?;
    let output_dir = cli
        .output_dir
        .unwrap_or_else(|| photos::default_output_dir(&cli.json_path));
    tracing::info!(
        json = %cli.json_path.display(),
        output_dir = %output_dir.display(),
        "Starting photo download"
    );

    let jobs = photos::plan_downloads(&records, &output_dir);
    let options = DownloadOptions {
        limit: cli.concurrency,
        skip_existing: !cli.overwrite,
    };
    let summary = photos::download_photos(cli.common.fetcher()?, jobs, options).await;
    summary.log();

    Ok(())
}
