//! The subsampler: bounded random per-cell-type subsamples of one dataset.

use crate::config::Config;
use crate::data::{AttrValue, MatrixFile, MetadataStore, EXTENSION};
use crate::error::Result;
use crate::filter::{ExportVariant, FeatureMask, VariantRegistry};
use crate::normalize::normalize_cpm;
use crate::subsample::quota::{count_cell_types, total_quota};
use log::{debug, info};
use nalgebra::DMatrix;
use rand::seq::SliceRandom;
use rand::Rng;
use std::fs;
use std::path::PathBuf;

/// The assembled subsample of one full matrix, before variant filtering.
#[derive(Debug, Clone)]
pub struct Subsample {
    /// Normalized layer: retained features × subsampled cells.
    pub matrix: DMatrix<f32>,
    /// Retained gene names.
    pub gene_names: Vec<String>,
    /// Synthesized `{cellType}_{rank}` name per subsampled cell.
    pub cell_names: Vec<String>,
    /// Cell-type label per subsampled cell, grouped by type.
    pub cell_types: Vec<String>,
    /// Total cell count of the full matrix before subsampling.
    pub n_cells_full: usize,
}

/// Transforms one full matrix into per-variant subsample files.
///
/// The randomness source is injected so tests can seed the permutation;
/// production runs draw from entropy and are intentionally unseeded.
pub struct Subsampler<'a, R: Rng> {
    config: &'a Config,
    metadata: &'a MetadataStore,
    variants: &'a VariantRegistry,
    rng: R,
}

impl<'a, R: Rng> Subsampler<'a, R> {
    pub fn new(
        config: &'a Config,
        metadata: &'a MetadataStore,
        variants: &'a VariantRegistry,
        rng: R,
    ) -> Self {
        Self {
            config,
            metadata,
            variants,
            rng,
        }
    }

    /// Subsample one dataset/tissue pair and write all its export variants.
    ///
    /// When every variant file already exists and `overwrite` is false the
    /// call returns without reading or writing anything. If any variant file
    /// is missing, all variants are re-derived and rewritten, so the output
    /// set for a pair is never a mix of stale and fresh files.
    pub fn process_dataset(
        &mut self,
        name: &str,
        tissue: Option<&str>,
        overwrite: bool,
    ) -> Result<()> {
        info!("{}", name);
        match tissue {
            None => info!("Check output files"),
            Some(t) => info!("{}: check output files", t),
        }

        let outputs: Vec<(ExportVariant, PathBuf)> = self
            .variants
            .variants_for(name)
            .into_iter()
            .map(|variant| {
                let path = self.output_path(&variant.meta_name(name), tissue);
                (variant, path)
            })
            .collect();

        if !overwrite && outputs.iter().all(|(_, path)| path.is_file()) {
            info!("Exists already, skipping");
            return Ok(());
        }

        match tissue {
            None => info!("Read data and subsample by cell type"),
            Some(t) => info!("{}: read data and subsample by cell type", t),
        }
        // Scoped so the full matrix is dropped before any output write.
        let subsample = {
            let full = MatrixFile::read(self.full_matrix_path(name, tissue))?;
            self.assemble(&full)?
        };

        fs::create_dir_all(&self.config.output_dir)?;
        for (variant, path) in &outputs {
            if variant.is_default() {
                info!("Export data");
            } else {
                info!("Export data, {}", variant.name);
            }

            let mut attrs = self.metadata.get(&variant.meta_name(name));
            attrs.insert(
                "Number of cells".to_string(),
                AttrValue::Count(subsample.n_cells_full as u64),
            );
            if let Some(t) = tissue {
                attrs.insert("Tissue".to_string(), AttrValue::Text(t.to_string()));
            }

            let kept: Vec<usize> = subsample
                .cell_types
                .iter()
                .enumerate()
                .filter(|(_, label)| variant.predicate.keeps(label))
                .map(|(i, _)| i)
                .collect();

            let filtered_matrix;
            let filtered_names;
            let filtered_types;
            let (layer, cell_names, cell_types): (&DMatrix<f32>, &[String], &[String]) =
                if kept.len() == subsample.cell_types.len() {
                    (
                        &subsample.matrix,
                        &subsample.cell_names,
                        &subsample.cell_types,
                    )
                } else {
                    filtered_matrix = subsample.matrix.select_columns(kept.iter());
                    filtered_names = select(&subsample.cell_names, &kept);
                    filtered_types = select(&subsample.cell_types, &kept);
                    (&filtered_matrix, &filtered_names, &filtered_types)
                };

            MatrixFile::create(
                path,
                layer,
                &subsample.gene_names,
                &[("CellName", cell_names), ("CellType", cell_types)],
                &attrs,
            )?;
        }
        Ok(())
    }

    /// Build the bounded, normalized, type-grouped subsample of a full matrix.
    fn assemble(&mut self, full: &MatrixFile) -> Result<Subsample> {
        let labels = full.col_attr("cellType")?;
        let mask = FeatureMask::new(full.gene_names());
        let remap = mask.remap();
        let n_kept = mask.n_kept();

        let counts = count_cell_types(labels, self.config.cells_per_type);
        let n_total = total_quota(&counts);

        let mut matrix = DMatrix::<f32>::zeros(n_kept, n_total);
        let mut cell_names = Vec::with_capacity(n_total);
        let mut cell_types = Vec::with_capacity(n_total);

        let mut offset = 0;
        for tc in &counts {
            debug!("Cell type: {}", tc.label);

            let mut indices: Vec<usize> = labels
                .iter()
                .enumerate()
                .filter(|(_, label)| **label == tc.label)
                .map(|(i, _)| i)
                .collect();

            // Random subset, restored to ascending source order so any
            // positional structure within a cell type survives.
            indices.shuffle(&mut self.rng);
            indices.truncate(tc.quota);
            indices.sort_unstable();

            let mut block = full.slice_columns(&indices, &remap, n_kept);
            normalize_cpm(&mut block);

            matrix
                .view_mut((0, offset), (n_kept, tc.quota))
                .copy_from(&block);
            for rank in 1..=tc.quota {
                cell_names.push(format!("{}_{}", tc.label, rank));
                cell_types.push(tc.label.clone());
            }
            offset += tc.quota;
        }

        Ok(Subsample {
            matrix,
            gene_names: mask.apply(full.gene_names()),
            cell_names,
            cell_types,
            n_cells_full: labels.len(),
        })
    }

    fn full_matrix_path(&self, name: &str, tissue: Option<&str>) -> PathBuf {
        let file_name = match tissue {
            None => format!("dataset.{}", EXTENSION),
            Some(t) => format!("dataset_{}.{}", t, EXTENSION),
        };
        self.config.data_dir.join(name).join(file_name)
    }

    fn output_path(&self, meta_name: &str, tissue: Option<&str>) -> PathBuf {
        let file_name = match tissue {
            None => format!("{}.{}", meta_name, EXTENSION),
            Some(t) => format!("{}_{}.{}", meta_name, t, EXTENSION),
        };
        self.config.output_dir.join(file_name)
    }
}

fn select(values: &[String], indices: &[usize]) -> Vec<String> {
    indices.iter().map(|&i| values[i].clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::FileAttrs;
    use crate::error::AtlasError;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tempfile::{tempdir, TempDir};

    /// Full matrix with 4 genes (one ERCC spike-in) and labeled cells.
    fn write_full_matrix(dir: &TempDir, name: &str, labels: &[&str]) -> Config {
        let config = Config {
            data_dir: dir.path().join("data_full"),
            output_dir: dir.path().join("data/subsamples"),
            metadata_path: dir.path().join("atlas_metadata.yml"),
            cells_per_type: 20,
        };
        let dataset_dir = config.data_dir.join(name);
        fs::create_dir_all(&dataset_dir).unwrap();

        let n = labels.len();
        let genes = vec![
            "Actb".to_string(),
            "ERCC-00042".to_string(),
            "Gapdh".to_string(),
            "Ins1".to_string(),
        ];
        let mut matrix = DMatrix::<f32>::zeros(4, n);
        for col in 0..n {
            for row in 0..4 {
                matrix[(row, col)] = (row + col + 1) as f32;
            }
        }
        let types: Vec<String> = labels.iter().map(|s| s.to_string()).collect();
        MatrixFile::create(
            dataset_dir.join("dataset.cmx"),
            &matrix,
            &genes,
            &[("cellType", &types)],
            &FileAttrs::new(),
        )
        .unwrap();
        config
    }

    fn process(config: &Config, name: &str, overwrite: bool) -> Result<()> {
        let metadata = MetadataStore::default();
        let variants = VariantRegistry::builtin();
        let rng = StdRng::seed_from_u64(7);
        let mut sampler = Subsampler::new(config, &metadata, &variants, rng);
        sampler.process_dataset(name, None, overwrite)
    }

    #[test]
    fn test_quotas_and_normalization() {
        let dir = tempdir().unwrap();
        let mut labels = vec!["neuron"; 3];
        labels.extend(vec!["astrocyte"; 25]);
        let config = write_full_matrix(&dir, "Brain_2020", &labels);

        process(&config, "Brain_2020", false).unwrap();

        let out = MatrixFile::read(config.output_dir.join("Brain_2020.cmx")).unwrap();
        // Spike-in row dropped, quota bound applied.
        assert_eq!(out.n_genes(), 3);
        assert_eq!(out.n_cells(), 3 + 20);
        assert_eq!(
            out.file_attrs().get("Number of cells"),
            Some(&AttrValue::Count(28))
        );

        let types = out.col_attr("CellType").unwrap();
        assert!(types[..3].iter().all(|t| t == "neuron"));
        assert!(types[3..].iter().all(|t| t == "astrocyte"));
        let names = out.col_attr("CellName").unwrap();
        assert_eq!(names[0], "neuron_1");
        assert_eq!(names[3], "astrocyte_1");
        assert_eq!(names[22], "astrocyte_20");

        let remap: Vec<Option<usize>> = (0..3).map(Some).collect();
        let all: Vec<usize> = (0..out.n_cells()).collect();
        let layer = out.slice_columns(&all, &remap, 3);
        for col in layer.column_iter() {
            let total: f32 = col.iter().sum();
            assert_relative_eq!(total, 1_000_000.0, max_relative = 1e-4);
        }
    }

    #[test]
    fn test_skip_without_overwrite() {
        let dir = tempdir().unwrap();
        let config = write_full_matrix(&dir, "Brain_2020", &["neuron", "neuron", "glia"]);

        process(&config, "Brain_2020", false).unwrap();
        let out_path = config.output_dir.join("Brain_2020.cmx");
        let first = fs::read(&out_path).unwrap();

        // Full matrix removed: the skip path must not try to read it.
        fs::remove_file(config.data_dir.join("Brain_2020/dataset.cmx")).unwrap();
        process(&config, "Brain_2020", false).unwrap();
        assert_eq!(fs::read(&out_path).unwrap(), first);
    }

    #[test]
    fn test_missing_matrix_is_fatal_for_pair() {
        let dir = tempdir().unwrap();
        let config = Config {
            data_dir: dir.path().join("data_full"),
            output_dir: dir.path().join("data/subsamples"),
            metadata_path: dir.path().join("atlas_metadata.yml"),
            cells_per_type: 20,
        };
        let result = process(&config, "Absent_2020", false);
        assert!(matches!(result, Err(AtlasError::MissingMatrix { .. })));
    }

    #[test]
    fn test_missing_cell_type_attr() {
        let dir = tempdir().unwrap();
        let config = write_full_matrix(&dir, "Brain_2020", &["neuron"]);
        // Rewrite the full matrix without a cellType attribute.
        let path = config.data_dir.join("Brain_2020/dataset.cmx");
        let matrix = DMatrix::<f32>::zeros(1, 1);
        let genes = vec!["Actb".to_string()];
        let other = vec!["x".to_string()];
        MatrixFile::create(
            &path,
            &matrix,
            &genes,
            &[("barcode", &other)],
            &FileAttrs::new(),
        )
        .unwrap();

        let result = process(&config, "Brain_2020", false);
        assert!(matches!(
            result,
            Err(AtlasError::MissingAttribute { name, .. }) if name == "cellType"
        ));
    }
}
