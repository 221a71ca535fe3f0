//! Feature masking: drop spike-in controls and QC bookkeeping rows.

/// Quality-control bookkeeping rows emitted by alignment pipelines.
pub const EXCLUDED_FEATURES: [&str; 5] = [
    "too_low_aQual",
    "alignment_not_unique",
    "ambiguous",
    "no_feature",
    "not_aligned",
];

/// Prefix of ERCC spike-in control features.
pub const SPIKE_IN_PREFIX: &str = "ERCC-";

/// Boolean mask over a matrix's feature rows, derived once per dataset.
///
/// A feature is retained iff its name is not in [`EXCLUDED_FEATURES`], does
/// not start with [`SPIKE_IN_PREFIX`], and does not start with `_`.
#[derive(Debug, Clone)]
pub struct FeatureMask {
    keep: Vec<bool>,
    n_kept: usize,
}

impl FeatureMask {
    /// Derive the mask from the full matrix's gene names.
    pub fn new(gene_names: &[String]) -> Self {
        let keep: Vec<bool> = gene_names.iter().map(|name| retain(name)).collect();
        let n_kept = keep.iter().filter(|&&k| k).count();
        Self { keep, n_kept }
    }

    /// Number of retained features.
    #[inline]
    pub fn n_kept(&self) -> usize {
        self.n_kept
    }

    /// Length of the underlying full feature axis.
    #[inline]
    pub fn len(&self) -> usize {
        self.keep.len()
    }

    /// Whether the mask covers no features at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keep.is_empty()
    }

    /// The retained subset of `names`, in original order.
    pub fn apply(&self, names: &[String]) -> Vec<String> {
        names
            .iter()
            .zip(&self.keep)
            .filter(|(_, &k)| k)
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Old row index → new row index for retained rows, `None` for dropped.
    pub fn remap(&self) -> Vec<Option<usize>> {
        let mut next = 0;
        self.keep
            .iter()
            .map(|&k| {
                if k {
                    let idx = next;
                    next += 1;
                    Some(idx)
                } else {
                    None
                }
            })
            .collect()
    }
}

fn retain(name: &str) -> bool {
    !EXCLUDED_FEATURES.contains(&name)
        && !name.starts_with(SPIKE_IN_PREFIX)
        && !name.starts_with('_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_exclusion_rules() {
        let genes = names(&[
            "Actb",
            "too_low_aQual",
            "ERCC-00042",
            "_total",
            "no_feature",
            "Gapdh",
        ]);
        let mask = FeatureMask::new(&genes);
        assert_eq!(mask.n_kept(), 2);
        assert_eq!(mask.apply(&genes), names(&["Actb", "Gapdh"]));
    }

    #[test]
    fn test_keeps_ordinary_underscored_suffixes() {
        // Underscores only matter as a prefix.
        let genes = names(&["Hoxa_1", "ambiguous_gene"]);
        let mask = FeatureMask::new(&genes);
        assert_eq!(mask.n_kept(), 2);
    }

    #[test]
    fn test_remap_is_dense_over_retained() {
        let genes = names(&["Actb", "ERCC-1", "Gapdh", "_skip", "Ins1"]);
        let mask = FeatureMask::new(&genes);
        assert_eq!(
            mask.remap(),
            vec![Some(0), None, Some(1), None, Some(2)]
        );
        assert_eq!(mask.len(), 5);
        assert_eq!(mask.n_kept(), 3);
    }
}
