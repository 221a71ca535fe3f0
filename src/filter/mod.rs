//! Filtering primitives: feature masking and export-variant predicates.

pub mod features;
pub mod variants;

pub use features::{FeatureMask, EXCLUDED_FEATURES, SPIKE_IN_PREFIX};
pub use variants::{ExportVariant, LabelPredicate, VariantRegistry};
