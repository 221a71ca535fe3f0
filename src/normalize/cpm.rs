//! Counts-per-million normalization of expression columns.

use nalgebra::DMatrix;

/// Scale factor: each cell's counts sum to one million after normalization.
pub const CPM_SCALE: f32 = 1_000_000.0;

/// Normalize each column in place so its values sum to [`CPM_SCALE`].
///
/// A column summing to zero yields non-finite values; no check is performed
/// and the values propagate into the output as-is.
pub fn normalize_cpm(matrix: &mut DMatrix<f32>) {
    for mut col in matrix.column_iter_mut() {
        let total: f32 = col.iter().sum();
        let factor = CPM_SCALE / total;
        for value in col.iter_mut() {
            *value *= factor;
        }
    }
}
