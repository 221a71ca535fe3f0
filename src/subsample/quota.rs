//! Per-cell-type subsampling quotas.

use std::collections::HashMap;

/// Cell-type occupancy in the full matrix and its subsampling quota.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeCount {
    /// Cell-type label.
    pub label: String,
    /// Number of cells with this label in the full matrix.
    pub count: usize,
    /// Number of cells to retain: `min(count, cap)`.
    pub quota: usize,
}

/// Count cell types from the per-cell label array, capping quotas at `cap`.
///
/// Types appear in the order their label first occurs in the matrix, which
/// fixes the column grouping of the assembled subsample.
pub fn count_cell_types(labels: &[String], cap: usize) -> Vec<TypeCount> {
    let mut order: Vec<TypeCount> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for label in labels {
        match index.get(label.as_str()) {
            Some(&i) => order[i].count += 1,
            None => {
                index.insert(label.as_str(), order.len());
                order.push(TypeCount {
                    label: label.clone(),
                    count: 1,
                    quota: 0,
                });
            }
        }
    }
    for tc in &mut order {
        tc.quota = tc.count.min(cap);
    }
    order
}

/// Total number of subsampled cells across all types.
pub fn total_quota(counts: &[TypeCount]) -> usize {
    counts.iter().map(|tc| tc.quota).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_first_appearance_order() {
        let labels = labels(&["B", "A", "B", "C", "A", "B"]);
        let counts = count_cell_types(&labels, 20);
        let order: Vec<&str> = counts.iter().map(|tc| tc.label.as_str()).collect();
        assert_eq!(order, vec!["B", "A", "C"]);
        assert_eq!(counts[0].count, 3);
        assert_eq!(counts[1].count, 2);
        assert_eq!(counts[2].count, 1);
    }

    #[test]
    fn test_quota_capped() {
        let mut raw = vec!["A"; 5];
        raw.extend(vec!["B"; 30]);
        let counts = count_cell_types(&labels(&raw), 20);

        assert_eq!(counts[0].quota, 5);
        assert_eq!(counts[1].quota, 20);
        assert_eq!(total_quota(&counts), 25);
    }

    #[test]
    fn test_empty_labels() {
        let counts = count_cell_types(&[], 20);
        assert!(counts.is_empty());
        assert_eq!(total_quota(&counts), 0);
    }
}
