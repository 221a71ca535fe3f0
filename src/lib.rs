//! Atlas subsample exporter
//!
//! This library reduces full single-cell atlas matrices to small,
//! redistributable subsamples: a bounded number of cells per cell type,
//! CPM-normalized, written as one matrix file per export variant.
//!
//! # Overview
//!
//! The library is organized into composable modules:
//!
//! - **config**: Run configuration (directory layout, per-type cap)
//! - **data**: Matrix container, metadata store, typed file attributes
//! - **discover**: Enumeration of dataset/tissue pairs on disk
//! - **filter**: Feature masking and export-variant predicates
//! - **normalize**: Counts-per-million column normalization
//! - **subsample**: Per-cell-type quotas and the subsampler
//! - **orchestrate**: Sequential processing of all discovered pairs
//!
//! # Example
//!
//! ```no_run
//! use atlas_subsample::prelude::*;
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let config = Config::default();
//! let summary = run(&config, None, false, StdRng::from_entropy()).unwrap();
//! assert!(summary.all_succeeded());
//! ```

pub mod config;
pub mod data;
pub mod discover;
pub mod error;
pub mod filter;
pub mod normalize;
pub mod orchestrate;
pub mod subsample;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::data::{AttrValue, FileAttrs, MatrixFile, MetadataStore};
    pub use crate::discover::{discover_datasets, DatasetEntry};
    pub use crate::error::{AtlasError, Result};
    pub use crate::filter::{ExportVariant, FeatureMask, LabelPredicate, VariantRegistry};
    pub use crate::normalize::{normalize_cpm, CPM_SCALE};
    pub use crate::orchestrate::{run, PairFailure, RunSummary};
    pub use crate::subsample::{count_cell_types, total_quota, Subsampler, TypeCount};
}
