use crate::{kernels, Error, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Row-major dense matrix with contiguous storage
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl Matrix {
    pub fn new(rows: usize, cols: usize, data: Vec<f32>) -> Result<Self> {
        if rows.checked_mul(cols) != Some(data.len()) {
            return Err(Error::mismatch(format!(
                "matrix of {rows}x{cols} cannot hold {} values",
                data.len()
            )));
        }
        Ok(Self { rows, cols, data })
    }

    /// Build from equal-length rows
    pub fn from_rows(rows: &[Vec<f32>]) -> Result<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(Error::mismatch(format!(
                    "row {i} has {} columns, expected {cols}",
                    row.len()
                )));
            }
            data.extend_from_slice(row);
        }
        Ok(Self { rows: rows.len(), cols, data })
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn row(&self, idx: usize) -> &[f32] {
        let start = idx * self.cols;
        &self.data[start..start + self.cols]
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[row * self.cols + col]
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[f32]> + '_ {
        (0..self.rows).map(move |idx| self.row(idx))
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub(crate) fn first_non_finite(&self) -> Option<(usize, usize)> {
        self.data
            .iter()
            .position(|x| !x.is_finite())
            .map(|pos| (pos / self.cols.max(1), pos % self.cols.max(1)))
    }
}

/// Stored feature rows, index-aligned with the catalog names (N x D)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct FeatureTable(Matrix);

impl FeatureTable {
    pub fn new(matrix: Matrix) -> Self {
        Self(matrix)
    }

    pub fn from_rows(rows: &[Vec<f32>]) -> Result<Self> {
        Matrix::from_rows(rows).map(Self)
    }

    /// Number of catalog items
    #[inline]
    pub fn len(&self) -> usize {
        self.0.rows()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.rows() == 0
    }

    /// Width of the feature space
    #[inline]
    pub fn dim(&self) -> usize {
        self.0.cols()
    }

    #[inline]
    pub fn row(&self, idx: usize) -> &[f32] {
        self.0.row(idx)
    }

    pub fn matrix(&self) -> &Matrix {
        &self.0
    }
}

/// Precomputed all-pairs cosine similarity (N x N)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct SimilarityMatrix(Matrix);

impl SimilarityMatrix {
    pub fn new(matrix: Matrix) -> Self {
        Self(matrix)
    }

    /// Compute every pairwise cosine similarity of the stored rows
    pub fn from_feature_table(table: &FeatureTable) -> Self {
        let n = table.len();
        let mut data = vec![0.0f32; n * n];
        if n > 0 {
            data.par_chunks_mut(n).enumerate().for_each(|(i, out)| {
                let a = table.row(i);
                for (j, slot) in out.iter_mut().enumerate() {
                    *slot = kernels::cosine(a, table.row(j));
                }
            });
        }
        Self(Matrix { rows: n, cols: n, data })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.rows()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.rows() == 0
    }

    /// Similarities of item `idx` against every catalog item
    #[inline]
    pub fn row(&self, idx: usize) -> &[f32] {
        self.0.row(idx)
    }

    pub fn matrix(&self) -> &Matrix {
        &self.0
    }

    /// First (i, j) pair whose mirrored entries differ by more than `tolerance`
    pub(crate) fn asymmetry(&self, tolerance: f32) -> Option<(usize, usize)> {
        let n = self.len();
        (0..n).find_map(|i| {
            ((i + 1)..n)
                .find(|&j| (self.0.get(i, j) - self.0.get(j, i)).abs() > tolerance)
                .map(|j| (i, j))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_shape_checked() {
        assert!(Matrix::new(2, 2, vec![0.0; 4]).is_ok());
        assert!(matches!(
            Matrix::new(2, 3, vec![0.0; 4]),
            Err(Error::ArtifactMismatch(_))
        ));
        assert!(FeatureTable::from_rows(&[vec![1.0, 2.0], vec![3.0]]).is_err());
    }

    #[test]
    fn test_rows() {
        let table = FeatureTable::from_rows(&[vec![0.0, 0.0], vec![1.0, 1.0], vec![5.0, 5.0]]).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.dim(), 2);
        assert_eq!(table.row(2), &[5.0, 5.0]);
        assert_eq!(table.matrix().iter_rows().count(), 3);
    }

    #[test]
    fn test_similarity_from_table() {
        let table = FeatureTable::from_rows(&[vec![1.0, 0.0], vec![2.0, 0.0], vec![0.0, 1.0]]).unwrap();
        let sim = SimilarityMatrix::from_feature_table(&table);
        assert_eq!(sim.len(), 3);
        assert!((sim.row(0)[1] - 1.0).abs() < 1e-6);
        assert!(sim.row(0)[2].abs() < 1e-6);
        assert!(sim.asymmetry(1e-6).is_none());
    }

    #[test]
    fn test_asymmetry_detected() {
        let m = Matrix::new(2, 2, vec![1.0, 0.5, 0.1, 1.0]).unwrap();
        assert_eq!(SimilarityMatrix::new(m).asymmetry(1e-5), Some((0, 1)));
    }

    #[test]
    fn test_non_finite_position() {
        let m = Matrix::new(2, 2, vec![1.0, 0.5, f32::NAN, 1.0]).unwrap();
        assert_eq!(m.first_non_finite(), Some((1, 0)));
    }
}
