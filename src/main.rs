//! CLI entry point for the single-file fetcher.

use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};
use update_downloader::{DownloadConfig, Downloader};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    // Logs go to stderr so stdout stays clean for downloaded bytes.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    let config = DownloadConfig::with_timeouts(args.connect_timeout, args.read_timeout);
    let downloader = Downloader::with_config(config);

    match &args.output {
        Some(path) => {
            let bar = progress_bar(args.quiet);
            let progress = bar.clone();
            downloader
                .download_to_file(&args.url, path, move |percent| {
                    progress.set_position(u64::from(percent));
                })
                .await
                .with_context(|| format!("failed to download {}", args.url))?;
            bar.finish_and_clear();
            info!(path = %path.display(), "Download complete");
        }
        None => {
            let bytes = downloader
                .download_to_memory(&args.url)
                .await
                .with_context(|| format!("failed to download {}", args.url))?;
            let mut stdout = io::stdout().lock();
            stdout.write_all(&bytes)?;
            stdout.flush()?;
            debug!(bytes = bytes.len(), "wrote response to stdout");
        }
    }

    Ok(())
}

fn progress_bar(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::with_template("{bar:40} {pos:>3}%")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar
}
