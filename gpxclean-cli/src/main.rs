use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod clean;
mod reader;
mod writer;

/// Normalize GPX tracks and fill in elevations from SRTM tiles
#[derive(Parser)]
#[command(name = "gpxclean")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// GPX file to clean
    input: PathBuf,

    /// Author to record in the output, as NAME;EMAIL;LINK
    #[arg(short, long, value_name = "NAME;EMAIL;LINK")]
    author: Option<String>,

    /// Directory containing .hgt files; elevations are left as-is without it
    #[arg(short = 'e', long, env = "GPXCLEAN_SRTM_DIR", value_name = "SRTM_DIR")]
    srtm_dir: Option<PathBuf>,

    /// Directory the cleaned tracks are written to
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gpxclean=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let author = cli.author.as_deref().map(clean::parse_author);

    clean::run(
        &cli.input,
        author.as_ref(),
        cli.srtm_dir
            .as_deref()
            .filter(|dir| !dir.as_os_str().is_empty()),
        &cli.output_dir,
    )
}
