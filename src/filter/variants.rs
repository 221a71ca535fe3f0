//! Export variants: named filtered views of a subsampled matrix.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Predicate over a cell-type label deciding membership in a variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LabelPredicate {
    /// Identity: every label passes.
    All,
    /// Drop cells whose label contains the given substring.
    ExcludeSubstring(String),
}

impl LabelPredicate {
    /// Whether a cell with this label belongs to the variant.
    pub fn keeps(&self, label: &str) -> bool {
        match self {
            LabelPredicate::All => true,
            LabelPredicate::ExcludeSubstring(needle) => !label.contains(needle.as_str()),
        }
    }
}

/// A named export of the subsampled matrix.
///
/// The default variant has an empty name and the identity predicate; its
/// output file carries the bare dataset name. Non-default variants append
/// `_{name}` to the output stem and metadata key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportVariant {
    pub name: String,
    pub predicate: LabelPredicate,
}

impl ExportVariant {
    fn default_variant() -> Self {
        Self {
            name: String::new(),
            predicate: LabelPredicate::All,
        }
    }

    /// Whether this is the unfiltered default export.
    pub fn is_default(&self) -> bool {
        self.name.is_empty()
    }

    /// Metadata key / output stem for this variant of a dataset.
    pub fn meta_name(&self, dataset: &str) -> String {
        if self.is_default() {
            dataset.to_string()
        } else {
            format!("{}_{}", dataset, self.name)
        }
    }
}

/// Registry mapping dataset names to their extra export variants.
///
/// Every dataset always gets the default variant; the registry only stores
/// the dataset-specific additions.
#[derive(Debug, Clone, Default)]
pub struct VariantRegistry {
    custom: HashMap<String, Vec<ExportVariant>>,
}

impl VariantRegistry {
    /// Registry with no custom variants.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in per-dataset variant table.
    ///
    /// Darmanis 2015 mixes adult and fetal brain; the `nofetal` export drops
    /// the fetal cell classes.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(
            "Darmanis_2015",
            ExportVariant {
                name: "nofetal".to_string(),
                predicate: LabelPredicate::ExcludeSubstring("fetal".to_string()),
            },
        );
        registry
    }

    /// Add a custom variant for a dataset.
    pub fn register(&mut self, dataset: &str, variant: ExportVariant) {
        self.custom
            .entry(dataset.to_string())
            .or_default()
            .push(variant);
    }

    /// All variants for a dataset: the default first, then any customs.
    pub fn variants_for(&self, dataset: &str) -> Vec<ExportVariant> {
        let mut variants = vec![ExportVariant::default_variant()];
        if let Some(custom) = self.custom.get(dataset) {
            variants.extend(custom.iter().cloned());
        }
        variants
    }
}
