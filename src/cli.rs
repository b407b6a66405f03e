//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use update_downloader::download::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};

/// Fetch a single file over HTTP, retrying once with a lower-cased URL.
///
/// With --output the resource is streamed to disk with a progress bar;
/// without it the bytes are fetched into memory and written to stdout.
#[derive(Parser, Debug)]
#[command(name = "fetch")]
#[command(author, version, about)]
pub struct Args {
    /// URL of the resource to download
    pub url: String,

    /// Write the resource to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Connect timeout in seconds (1-300)
    #[arg(long, default_value_t = CONNECT_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..=300))]
    pub connect_timeout: u64,

    /// Total request timeout in seconds (1-86400)
    #[arg(long, default_value_t = READ_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..=86_400))]
    pub read_timeout: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_url_only_uses_defaults() {
        let args = Args::try_parse_from(["fetch", "https://example.com/RELEASES"]).unwrap();
        assert_eq!(args.url, "https://example.com/RELEASES");
        assert!(args.output.is_none());
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
        assert_eq!(args.connect_timeout, 30);
        assert_eq!(args.read_timeout, 300);
    }

    #[test]
    fn test_cli_output_flag_sets_path() {
        let args =
            Args::try_parse_from(["fetch", "https://example.com/a.nupkg", "-o", "a.nupkg"])
                .unwrap();
        assert_eq!(args.output, Some(PathBuf::from("a.nupkg")));
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let args = Args::try_parse_from(["fetch", "u", "-vv"]).unwrap();
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_cli_missing_url_is_error() {
        let result = Args::try_parse_from(["fetch"]);
        assert_eq!(
            result.unwrap_err().kind(),
            clap::error::ErrorKind::MissingRequiredArgument
        );
    }

    #[test]
    fn test_cli_zero_timeout_rejected() {
        let result = Args::try_parse_from(["fetch", "u", "--connect-timeout", "0"]);
        assert!(result.is_err());
    }
}
