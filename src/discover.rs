//! Discovery of dataset/tissue pairs from the full-data directory layout.

use crate::error::Result;
use std::fs;
use std::path::Path;

/// One discovered dataset and the tissues it splits into.
///
/// `None` in `tissues` denotes a single whole-organism file with no tissue
/// split (`dataset.cmx`); `Some(t)` corresponds to `dataset_<t>.cmx`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetEntry {
    pub name: String,
    pub tissues: Vec<Option<String>>,
}

/// Enumerate datasets under `data_dir`, one subdirectory per dataset.
///
/// Subdirectories without any matching matrix file are skipped. Entries and
/// tissues are sorted by name so a run visits pairs in a stable order.
pub fn discover_datasets(data_dir: &Path) -> Result<Vec<DatasetEntry>> {
    let mut entries = Vec::new();

    for dir_entry in fs::read_dir(data_dir)? {
        let dir_entry = dir_entry?;
        if !dir_entry.file_type()?.is_dir() {
            continue;
        }
        let name = dir_entry.file_name().to_string_lossy().into_owned();

        let mut tissues = Vec::new();
        for file_entry in fs::read_dir(dir_entry.path())? {
            let file_name = file_entry?.file_name();
            if let Some(tissue) = parse_matrix_filename(&file_name.to_string_lossy()) {
                tissues.push(tissue);
            }
        }
        if tissues.is_empty() {
            continue;
        }
        tissues.sort();
        entries.push(DatasetEntry { name, tissues });
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// Tissue token for a matrix filename, or `None` if the file is not one.
///
/// `dataset.cmx` → `Some(None)`; `dataset_<tissue>.cmx` → `Some(Some(tissue))`
/// where the tissue is everything after the first underscore in the stem.
fn parse_matrix_filename(file_name: &str) -> Option<Option<String>> {
    let stem = file_name.strip_suffix(".cmx")?;
    if stem == "dataset" {
        return Some(None);
    }
    let tissue = stem.strip_prefix("dataset_")?;
    if tissue.is_empty() {
        return None;
    }
    Some(Some(tissue.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use tempfile::tempdir;

    #[test]
    fn test_parse_matrix_filename() {
        assert_eq!(parse_matrix_filename("dataset.cmx"), Some(None));
        assert_eq!(
            parse_matrix_filename("dataset_Lung.cmx"),
            Some(Some("Lung".to_string()))
        );
        // Tissue tokens may themselves contain underscores.
        assert_eq!(
            parse_matrix_filename("dataset_Large_intestine.cmx"),
            Some(Some("Large_intestine".to_string()))
        );
        assert_eq!(parse_matrix_filename("readme.txt"), None);
        assert_eq!(parse_matrix_filename("dataset_.cmx"), None);
        assert_eq!(parse_matrix_filename("metadata.cmx"), None);
    }

    #[test]
    fn test_discover_layout() {
        let dir = tempdir().unwrap();
        let whole = dir.path().join("Darmanis_2015");
        fs::create_dir(&whole).unwrap();
        File::create(whole.join("dataset.cmx")).unwrap();

        let split = dir.path().join("TabulaMuris_2018");
        fs::create_dir(&split).unwrap();
        File::create(split.join("dataset_Lung.cmx")).unwrap();
        File::create(split.join("dataset_Heart.cmx")).unwrap();
        File::create(split.join("notes.txt")).unwrap();

        // Ignored: empty directory and a stray file at the root.
        fs::create_dir(dir.path().join("Empty_2019")).unwrap();
        File::create(dir.path().join("stray.cmx")).unwrap();

        let entries = discover_datasets(dir.path()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "Darmanis_2015");
        assert_eq!(entries[0].tissues, vec![None]);
        assert_eq!(entries[1].name, "TabulaMuris_2018");
        assert_eq!(
            entries[1].tissues,
            vec![Some("Heart".to_string()), Some("Lung".to_string())]
        );
    }
}
