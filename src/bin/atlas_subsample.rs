//! Export atlas subsamples for redistribution.

use atlas_subsample::config::Config;
use atlas_subsample::orchestrate::run;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use std::path::Path;
use std::process::ExitCode;

const CONFIG_FILE: &str = "subsample.yml";

/// Subsample full single-cell atlases into redistributable matrix files.
#[derive(Parser)]
#[command(name = "atlas-subsample")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Restrict processing to this dataset (repeatable)
    #[arg(long = "dataset")]
    dataset: Vec<String>,

    /// Rewrite subsample files even when they already exist
    #[arg(long)]
    overwrite: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let config = if Path::new(CONFIG_FILE).is_file() {
        match Config::from_yaml_file(CONFIG_FILE) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("Failed to read {}: {}", CONFIG_FILE, err);
                return ExitCode::FAILURE;
            }
        }
    } else {
        Config::default()
    };

    let filter: Option<HashSet<String>> = if cli.dataset.is_empty() {
        None
    } else {
        Some(cli.dataset.into_iter().collect())
    };

    match run(
        &config,
        filter.as_ref(),
        cli.overwrite,
        StdRng::from_entropy(),
    ) {
        Ok(summary) if summary.all_succeeded() => ExitCode::SUCCESS,
        Ok(summary) => {
            eprintln!(
                "{} of {} pairs failed",
                summary.failures.len(),
                summary.processed + summary.failures.len()
            );
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("Fatal: {}", err);
            ExitCode::FAILURE
        }
    }
}
