//! Normalization of subsampled expression columns.

pub mod cpm;

pub use cpm::{normalize_cpm, CPM_SCALE};
