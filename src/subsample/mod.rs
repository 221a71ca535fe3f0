//! Per-cell-type quota computation and the subsampler itself.

pub mod quota;
pub mod sampler;

pub use quota::{count_cell_types, total_quota, TypeCount};
pub use sampler::{Subsample, Subsampler};
