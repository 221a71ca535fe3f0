//! Run configuration: directory layout and subsampling bounds.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Configuration for one export run.
///
/// Paths are resolved relative to the working directory. The defaults match
/// the conventional atlas layout: full matrices under `data_full/<dataset>/`,
/// subsamples written to `data/subsamples/`, dataset metadata in
/// `atlas_metadata.yml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root directory holding one subdirectory per dataset.
    pub data_dir: PathBuf,
    /// Flat output directory for subsample matrix files.
    pub output_dir: PathBuf,
    /// YAML file mapping dataset names to descriptive attributes.
    pub metadata_path: PathBuf,
    /// Maximum number of cells retained per cell type.
    pub cells_per_type: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data_full"),
            output_dir: PathBuf::from("data/subsamples"),
            metadata_path: PathBuf::from("atlas_metadata.yml"),
            cells_per_type: 20,
        }
    }
}

impl Config {
    /// Load a configuration from a YAML file.
    ///
    /// Missing keys fall back to their defaults.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let config = serde_yaml::from_reader(BufReader::new(file))?;
        Ok(config)
    }
}
