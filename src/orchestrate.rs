//! Run orchestration: discover pairs and drive the subsampler across them.

use crate::config::Config;
use crate::data::MetadataStore;
use crate::discover::discover_datasets;
use crate::error::{AtlasError, Result};
use crate::filter::VariantRegistry;
use crate::subsample::Subsampler;
use log::error;
use rand::Rng;
use std::collections::HashSet;

/// One dataset/tissue pair that failed, with its error.
#[derive(Debug)]
pub struct PairFailure {
    pub dataset: String,
    pub tissue: Option<String>,
    pub error: AtlasError,
}

/// Outcome of a run across all discovered pairs.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Pairs that completed (including idempotent skips).
    pub processed: usize,
    /// Pairs that failed; the rest of the run still completed.
    pub failures: Vec<PairFailure>,
}

impl RunSummary {
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Subsample every discovered dataset/tissue pair, sequentially.
///
/// A malformed metadata store or an unreadable data directory is fatal for
/// the whole run. An error on one pair is recorded and logged, and the
/// remaining pairs still run; there are no retries. Each pair only ever
/// writes its own output files, so a failed pair cannot corrupt another's.
pub fn run<R: Rng>(
    config: &Config,
    dataset_filter: Option<&HashSet<String>>,
    overwrite: bool,
    rng: R,
) -> Result<RunSummary> {
    let metadata = MetadataStore::load(&config.metadata_path)?;
    let registry = VariantRegistry::builtin();
    let entries = discover_datasets(&config.data_dir)?;

    let mut sampler = Subsampler::new(config, &metadata, &registry, rng);
    let mut summary = RunSummary::default();

    for entry in entries {
        if let Some(filter) = dataset_filter {
            if !filter.contains(&entry.name) {
                continue;
            }
        }
        for tissue in &entry.tissues {
            match sampler.process_dataset(&entry.name, tissue.as_deref(), overwrite) {
                Ok(()) => summary.processed += 1,
                Err(err) => {
                    match tissue {
                        None => error!("{} failed: {}", entry.name, err),
                        Some(t) => error!("{} ({}) failed: {}", entry.name, t, err),
                    }
                    summary.failures.push(PairFailure {
                        dataset: entry.name.clone(),
                        tissue: tissue.clone(),
                        error: err,
                    });
                }
            }
        }
    }
    Ok(summary)
}
