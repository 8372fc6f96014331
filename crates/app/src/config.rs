//! Configuration for the bits-decoder application.
//!
//! Handles parsing command-line arguments and resolving defaults
//! (including a time-based seed that is printed so runs are reproducible).
//!
//! # Philosophy
//!
//! The tool should work with ZERO arguments: with no input given it
//! generates a random transmission and decodes that.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use bits_decoder_core::decoder::DEFAULT_MAX_DEPTH;
use bits_decoder_core::{DecoderConfig, Error};
use clap::{ArgAction, Parser, ValueEnum};

/// Command-line arguments.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "bits-decoder",
    about = "Decode and evaluate hex-encoded transmission packets",
    version
)]
pub struct Cli {
    /// Input file; its first line is the transmission
    #[arg(long = "in", value_name = "PATH", conflicts_with_all = ["hex", "generate"])]
    pub input_file: Option<PathBuf>,

    /// Transmission given inline
    #[arg(long, value_name = "HEX", conflicts_with = "generate")]
    pub hex: Option<String>,

    /// Generate a random transmission
    #[arg(long)]
    pub generate: bool,

    /// Seed for --generate (default: time-based)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Nesting depth of generated trees
    #[arg(long, default_value_t = 4)]
    pub max_depth: usize,

    /// Which result to print
    #[arg(long, value_enum, default_value_t = Query::Both)]
    pub query: Query,

    /// Decoder nesting limit
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    pub depth_limit: usize,

    /// Print the decoded packet tree
    #[arg(long)]
    pub print_tree: bool,

    /// Print decode metrics
    #[arg(long)]
    pub print_metrics: bool,

    /// Print resolved configuration
    #[arg(long)]
    pub print_config: bool,

    /// More logging (repeatable)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Result selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Query {
    VersionSum,
    Value,
    Both,
}

/// Where the transmission comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    File(PathBuf),
    Hex(String),
    Generate { seed: u64, max_depth: usize },
}

/// Complete configuration for a run.
#[derive(Debug, Clone)]
pub struct Config {
    pub source: Source,
    pub query: Query,
    pub decoder: DecoderConfig,
    pub print_tree: bool,
    pub print_metrics: bool,
    pub print_config: bool,
    /// Default `env_logger` filter, overridden by RUST_LOG
    pub log_filter: &'static str,
}

impl Config {
    /// Resolve arguments into a run configuration.
    pub fn from_cli(cli: Cli) -> Result<Self, Error> {
        if cli.depth_limit == 0 {
            return Err(Error::Config("--depth-limit must be at least 1".to_string()));
        }

        let source = match (cli.input_file, cli.hex) {
            (Some(path), _) => Source::File(path),
            (None, Some(hex)) => Source::Hex(hex),
            (None, None) => Source::Generate {
                seed: cli.seed.unwrap_or_else(time_seed),
                max_depth: cli.max_depth,
            },
        };

        let log_filter = match (cli.quiet, cli.verbose) {
            (true, _) => "error",
            (false, 0) => "warn",
            (false, 1) => "info",
            (false, 2) => "debug",
            (false, _) => "trace",
        };

        Ok(Config {
            source,
            query: cli.query,
            decoder: DecoderConfig {
                max_depth: cli.depth_limit,
            },
            print_tree: cli.print_tree,
            print_metrics: cli.print_metrics,
            print_config: cli.print_config,
            log_filter,
        })
    }

    /// Print the configuration in human-readable form.
    pub fn print(&self) {
        println!("=== Configuration ===");
        match &self.source {
            Source::File(path) => println!("Input file: {}", path.display()),
            Source::Hex(hex) => println!("Inline hex: {} digits", hex.len()),
            Source::Generate { seed, max_depth } => {
                println!("Generated: seed {} (max depth {})", seed, max_depth)
            }
        }
        println!("Query: {:?}", self.query);
        println!("Depth limit: {}", self.decoder.max_depth);
        println!("Log filter: {}", self.log_filter);
        println!();
    }
}

fn time_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("bits-decoder").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_zero_args_generates() {
        let config = Config::from_cli(parse(&[])).unwrap();
        assert!(matches!(config.source, Source::Generate { max_depth: 4, .. }));
        assert_eq!(config.query, Query::Both);
        assert_eq!(config.decoder.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.log_filter, "warn");
    }

    #[test]
    fn test_explicit_seed() {
        let config = Config::from_cli(parse(&["--generate", "--seed", "42"])).unwrap();
        assert_eq!(
            config.source,
            Source::Generate {
                seed: 42,
                max_depth: 4
            }
        );
    }

    #[test]
    fn test_inline_hex_and_query() {
        let config =
            Config::from_cli(parse(&["--hex", "D2FE28", "--query", "version-sum"])).unwrap();
        assert_eq!(config.source, Source::Hex("D2FE28".to_string()));
        assert_eq!(config.query, Query::VersionSum);
    }

    #[test]
    fn test_sources_conflict() {
        let args = ["bits-decoder", "--in", "input.txt", "--hex", "D2FE28"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_verbosity() {
        assert_eq!(Config::from_cli(parse(&["-vv"])).unwrap().log_filter, "debug");
        assert_eq!(Config::from_cli(parse(&["-q"])).unwrap().log_filter, "error");
    }

    #[test]
    fn test_zero_depth_limit_rejected() {
        assert!(Config::from_cli(parse(&["--depth-limit", "0"])).is_err());
    }
}
