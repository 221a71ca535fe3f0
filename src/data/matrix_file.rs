//! Columnar matrix container for atlas expression data.
//!
//! A `.cmx` file stores one numeric layer (genes × cells) together with
//! file-level attributes and per-cell column attributes:
//!
//! ```text
//! #cmx<TAB>1                        magic and format version
//! #attr<TAB>key<TAB>value           zero or more file attributes
//! #colattr<TAB>name<TAB>v1<TAB>...  one line per column attribute
//! gene<TAB>v1<TAB>v2<TAB>...        one body line per feature
//! ```
//!
//! The whole file is read into memory; the layer is held sparse (CSC) so
//! that arbitrary column subsets can be sliced out cheaply. Writes are
//! atomic: the file is staged under a temporary name and renamed into place.

use crate::data::attrs::{AttrValue, FileAttrs};
use crate::error::{AtlasError, Result};
use nalgebra::DMatrix;
use sprs::{CsMat, TriMat};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// File extension for matrix containers.
pub const EXTENSION: &str = "cmx";

const MAGIC_LINE: &str = "#cmx\t1";
const ATTR_PREFIX: &str = "#attr\t";
const COL_ATTR_PREFIX: &str = "#colattr\t";

/// An expression matrix read into memory: genes × cells.
#[derive(Debug, Clone)]
pub struct MatrixFile {
    path: PathBuf,
    /// Numeric layer in CSC layout (outer dimension = cells).
    data: CsMat<f64>,
    /// Row attribute: one gene identifier per feature.
    gene_names: Vec<String>,
    /// Column attributes, one value per cell.
    col_attrs: BTreeMap<String, Vec<String>>,
    /// File-level attributes.
    file_attrs: FileAttrs,
}

fn malformed(path: &Path, reason: impl Into<String>) -> AtlasError {
    AtlasError::MalformedMatrix {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

impl MatrixFile {
    /// Read a matrix file entirely into memory.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(AtlasError::MissingMatrix {
                path: path.to_path_buf(),
            });
        }

        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut lines = reader.lines();

        let magic = lines
            .next()
            .ok_or_else(|| malformed(path, "empty file"))??;
        if magic != MAGIC_LINE {
            return Err(malformed(path, "bad magic line"));
        }

        let mut file_attrs = FileAttrs::new();
        let mut col_attrs: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut gene_names: Vec<String> = Vec::new();
        let mut triplets: Vec<(usize, usize, f64)> = Vec::new();
        let mut n_cells: Option<usize> = None;

        for line_result in lines {
            let line = line_result?;
            if line.is_empty() {
                continue;
            }

            if let Some(rest) = line.strip_prefix(ATTR_PREFIX) {
                let (key, value) = rest
                    .split_once('\t')
                    .ok_or_else(|| malformed(path, "attribute line without value"))?;
                file_attrs.insert(key.to_string(), AttrValue::parse(value));
                continue;
            }

            if let Some(rest) = line.strip_prefix(COL_ATTR_PREFIX) {
                let mut fields = rest.split('\t');
                let name = fields
                    .next()
                    .ok_or_else(|| malformed(path, "column attribute without name"))?;
                let values: Vec<String> = fields.map(str::to_string).collect();
                match n_cells {
                    None => n_cells = Some(values.len()),
                    Some(n) if n != values.len() => {
                        return Err(AtlasError::DimensionMismatch {
                            expected: n,
                            actual: values.len(),
                        });
                    }
                    Some(_) => {}
                }
                col_attrs.insert(name.to_string(), values);
                continue;
            }

            // Body row: gene name followed by one value per cell.
            let row = gene_names.len();
            let mut fields = line.split('\t');
            let gene = fields
                .next()
                .ok_or_else(|| malformed(path, "body line without gene name"))?;
            gene_names.push(gene.to_string());

            let mut width = 0;
            for (col, raw) in fields.enumerate() {
                let value: f64 = raw.trim().parse().map_err(|_| AtlasError::InvalidValue {
                    value: raw.to_string(),
                    row,
                    col,
                })?;
                if value != 0.0 {
                    triplets.push((row, col, value));
                }
                width += 1;
            }
            match n_cells {
                None => n_cells = Some(width),
                Some(n) if n != width => {
                    return Err(AtlasError::DimensionMismatch {
                        expected: n,
                        actual: width,
                    });
                }
                Some(_) => {}
            }
        }

        if col_attrs.is_empty() {
            return Err(malformed(path, "no column attributes"));
        }
        let n_cells = n_cells.unwrap_or(0);
        if gene_names.is_empty() {
            return Err(AtlasError::EmptyData(format!(
                "no features in {}",
                path.display()
            )));
        }

        let mut tri_mat = TriMat::new((gene_names.len(), n_cells));
        for (row, col, value) in triplets {
            tri_mat.add_triplet(row, col, value);
        }

        Ok(Self {
            path: path.to_path_buf(),
            data: tri_mat.to_csc(),
            gene_names,
            col_attrs,
            file_attrs,
        })
    }

    /// Number of features (rows).
    #[inline]
    pub fn n_genes(&self) -> usize {
        self.data.rows()
    }

    /// Number of cells (columns).
    #[inline]
    pub fn n_cells(&self) -> usize {
        self.data.cols()
    }

    /// Gene identifiers, one per row.
    #[inline]
    pub fn gene_names(&self) -> &[String] {
        &self.gene_names
    }

    /// File-level attributes.
    #[inline]
    pub fn file_attrs(&self) -> &FileAttrs {
        &self.file_attrs
    }

    /// A column attribute by name, one value per cell.
    pub fn col_attr(&self, name: &str) -> Result<&[String]> {
        self.col_attrs
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| AtlasError::MissingAttribute {
                name: name.to_string(),
                path: self.path.clone(),
            })
    }

    /// Slice out the given columns, keeping only remapped rows, as dense f32.
    ///
    /// `row_remap[old_row]` gives the destination row for retained features
    /// and `None` for dropped ones; `n_kept` is the number of retained rows.
    /// Columns appear in the order given by `cols`.
    pub fn slice_columns(
        &self,
        cols: &[usize],
        row_remap: &[Option<usize>],
        n_kept: usize,
    ) -> DMatrix<f32> {
        debug_assert_eq!(row_remap.len(), self.n_genes());
        let mut block = DMatrix::<f32>::zeros(n_kept, cols.len());
        for (dst, &src) in cols.iter().enumerate() {
            if let Some(col_vec) = self.data.outer_view(src) {
                for (row, &value) in col_vec.iter() {
                    if let Some(kept) = row_remap[row] {
                        block[(kept, dst)] = value as f32;
                    }
                }
            }
        }
        block
    }

    /// Create a matrix file from a dense layer plus attributes.
    ///
    /// The file is written to a temporary sibling and renamed into place, so
    /// a partially written output is never observable under the final name.
    pub fn create<P: AsRef<Path>>(
        path: P,
        matrix: &DMatrix<f32>,
        gene_names: &[String],
        col_attrs: &[(&str, &[String])],
        file_attrs: &FileAttrs,
    ) -> Result<()> {
        let path = path.as_ref();
        if gene_names.len() != matrix.nrows() {
            return Err(AtlasError::DimensionMismatch {
                expected: matrix.nrows(),
                actual: gene_names.len(),
            });
        }
        for (_, values) in col_attrs {
            if values.len() != matrix.ncols() {
                return Err(AtlasError::DimensionMismatch {
                    expected: matrix.ncols(),
                    actual: values.len(),
                });
            }
        }

        let tmp_path = staging_path(path);
        {
            let file = File::create(&tmp_path)?;
            let mut writer = BufWriter::new(file);

            writeln!(writer, "{}", MAGIC_LINE)?;
            for (key, value) in file_attrs {
                writeln!(writer, "#attr\t{}\t{}", key, value)?;
            }
            for (name, values) in col_attrs {
                write!(writer, "#colattr\t{}", name)?;
                for value in values.iter() {
                    write!(writer, "\t{}", value)?;
                }
                writeln!(writer)?;
            }
            for (row, gene) in gene_names.iter().enumerate() {
                write!(writer, "{}", gene)?;
                for col in 0..matrix.ncols() {
                    write!(writer, "\t{}", matrix[(row, col)])?;
                }
                writeln!(writer)?;
            }
            writer.flush()?;
        }
        fs::rename(&tmp_path, path)?;
        Ok(())
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
