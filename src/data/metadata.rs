//! Dataset metadata store backed by a single YAML file.

use crate::data::attrs::FileAttrs;
use crate::error::Result;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Descriptive attributes per dataset, loaded once per run.
///
/// Keys are dataset names, optionally suffixed with an export-variant name
/// (`{dataset}_{variant}`). Missing keys yield an empty attribute mapping
/// rather than an error; a file that cannot be parsed is fatal for the run.
#[derive(Debug, Clone, Default)]
pub struct MetadataStore {
    entries: BTreeMap<String, FileAttrs>,
}

impl MetadataStore {
    /// Load the store from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let entries = serde_yaml::from_reader(BufReader::new(file))?;
        Ok(Self { entries })
    }

    /// Attributes for a dataset (or dataset_variant) key; empty if absent.
    pub fn get(&self, key: &str) -> FileAttrs {
        self.entries.get(key).cloned().unwrap_or_default()
    }

    /// Number of entries in the store.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::attrs::AttrValue;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_store(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_lookup() {
        let file = write_store(
            "Darmanis_2015:\n  Source: GEO\n  Accession: GSE67835\nTabulaMuris_2018:\n  Cells: 100000\n",
        );
        let store = MetadataStore::load(file.path()).unwrap();
        assert_eq!(store.len(), 2);

        let attrs = store.get("Darmanis_2015");
        assert_eq!(attrs.get("Source"), Some(&AttrValue::Text("GEO".into())));
        assert_eq!(
            store.get("TabulaMuris_2018").get("Cells"),
            Some(&AttrValue::Count(100000))
        );
    }

    #[test]
    fn test_missing_key_is_empty() {
        let file = write_store("Darmanis_2015:\n  Source: GEO\n");
        let store = MetadataStore::load(file.path()).unwrap();
        assert!(store.get("Unknown_2020").is_empty());
    }

    #[test]
    fn test_malformed_is_fatal() {
        let file = write_store("Darmanis_2015: [unclosed\n  nope: {\n");
        assert!(MetadataStore::load(file.path()).is_err());
    }
}
