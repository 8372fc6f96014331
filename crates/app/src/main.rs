//! bits-decoder: decode a hex transmission and report its version sum
//! and evaluated value.

mod config;
mod input_gen;

use std::path::Path;
use std::process::ExitCode;

use bits_decoder_core::{evaluate, version_sum, Decoder, Error, Result, Transmission};
use clap::Parser;
use log::{error, info};

use crate::config::{Cli, Config, Query, Source};

fn main() -> ExitCode {
    let config = match Config::from_cli(Cli::parse()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.log_filter))
        .init();

    if config.print_config {
        config.print();
    }

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("decode failed: {}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config) -> Result<()> {
    let transmission = load_transmission(&config.source)?;
    info!(
        "transmission: {} hex digits ({} bits)",
        transmission.hex_len(),
        transmission.bit_len()
    );

    let decoder = Decoder::new(config.decoder);
    let (packet, metrics) = decoder.decode_with_metrics(&transmission)?;

    if config.print_tree {
        println!("{}", packet);
    }

    if matches!(config.query, Query::VersionSum | Query::Both) {
        println!("version sum: {}", version_sum(&packet));
    }
    if matches!(config.query, Query::Value | Query::Both) {
        println!("value: {}", evaluate(&packet)?);
    }

    if config.print_metrics {
        metrics.print_summary();
    }

    Ok(())
}

fn load_transmission(source: &Source) -> Result<Transmission> {
    match source {
        Source::File(path) => Transmission::from_hex(&read_first_line(path)?),
        Source::Hex(hex) => Transmission::from_hex(hex.trim_end()),
        Source::Generate { seed, max_depth } => {
            let transmission = input_gen::generate_transmission(*seed, *max_depth)?;
            println!("generated (seed {}): {}", seed, transmission);
            Ok(transmission)
        }
    }
}

/// Raw-input loader: the first line of the file, line ending trimmed.
fn read_first_line(path: &Path) -> Result<String> {
    let content = std::fs::read_to_string(path)?;
    let line = content
        .lines()
        .next()
        .ok_or_else(|| Error::Config(format!("{} is empty", path.display())))?;
    Ok(line.trim_end().to_string())
}
