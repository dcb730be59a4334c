use ndarray::{Array1, Array2};
use sprs::{CsMat, TriMat};

use crate::error::ModelError;

/// Compressed sparse column matrix of coefficients
pub type SparseMatrix = CsMat<f64>;

/// All-zero CSC block of the given shape
pub fn zeros(nrows: usize, ncols: usize) -> SparseMatrix {
    TriMat::<f64>::new((nrows, ncols)).to_csc()
}

/// Build a CSC block from `(row, col, value)` triplets. Duplicate positions
/// are summed and exact zeros are skipped.
pub fn from_triplets(
    nrows: usize,
    ncols: usize,
    triplets: impl IntoIterator<Item = (usize, usize, f64)>,
) -> Result<SparseMatrix, ModelError> {
    let mut tri = TriMat::new((nrows, ncols));
    for (row, col, value) in triplets {
        if row >= nrows || col >= ncols {
            return Err(ModelError::EntryOutOfBounds {
                row,
                col,
                shape: (nrows, ncols),
            });
        }
        if value != 0.0 {
            tri.add_triplet(row, col, value);
        }
    }
    Ok(tri.to_csc())
}

pub fn from_dense(dense: &Array2<f64>) -> SparseMatrix {
    let mut tri = TriMat::new(dense.dim());
    for ((row, col), &value) in dense.indexed_iter() {
        if value != 0.0 {
            tri.add_triplet(row, col, value);
        }
    }
    tri.to_csc()
}

/// Stored entries as `(row, col, value)`
pub fn triplets(m: &SparseMatrix) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
    m.iter().map(|(&value, (row, col))| (row, col, value))
}

pub fn column_sums(m: &SparseMatrix) -> Array1<f64> {
    let mut sums = Array1::zeros(m.cols());
    for (_, col, value) in triplets(m) {
        sums[col] += value;
    }
    sums
}

/// Place blocks side by side. All blocks must have the same row count.
pub fn hstack(blocks: &[SparseMatrix]) -> Result<SparseMatrix, ModelError> {
    let Some(first) = blocks.first() else {
        return Ok(zeros(0, 0));
    };
    if let Some(bad) = blocks.iter().find(|b| b.rows() != first.rows()) {
        return Err(ModelError::ShapeMismatch {
            left: first.shape(),
            right: bad.shape(),
        });
    }
    let views: Vec<_> = blocks.iter().map(|b| b.view()).collect();
    Ok(sprs::hstack(&views).to_csc())
}

/// Stack blocks top to bottom. All blocks must have the same column count.
pub fn vstack(blocks: &[SparseMatrix]) -> Result<SparseMatrix, ModelError> {
    let Some(first) = blocks.first() else {
        return Ok(zeros(0, 0));
    };
    if let Some(bad) = blocks.iter().find(|b| b.cols() != first.cols()) {
        return Err(ModelError::ShapeMismatch {
            left: first.shape(),
            right: bad.shape(),
        });
    }
    let views: Vec<_> = blocks.iter().map(|b| b.view()).collect();
    Ok(sprs::vstack(&views).to_csc())
}
