use ndarray::{Array1, Array2, Axis};

use crate::sparse::{self, SparseMatrix};

/// A coefficient block, either dense or sparse.
///
/// Used both for user-supplied coefficients (`A * x`) and for the per-variable
/// fragments a constraint accumulates.
#[derive(Debug, Clone, PartialEq)]
pub enum LpMatrix {
    Dense(Array2<f64>),
    Sparse(SparseMatrix),
}

impl LpMatrix {
    /// One-row block holding `values`
    pub fn row(values: Array1<f64>) -> Self {
        LpMatrix::Dense(values.insert_axis(Axis(0)))
    }

    /// One-row block filled with `value`
    pub fn filled_row(value: f64, n: usize) -> Self {
        LpMatrix::Dense(Array2::from_elem((1, n), value))
    }

    /// Square block with `value` on the diagonal
    pub fn diagonal(value: f64, n: usize) -> Self {
        LpMatrix::Dense(Array2::eye(n) * value)
    }

    pub fn shape(&self) -> (usize, usize) {
        match self {
            LpMatrix::Dense(m) => m.dim(),
            LpMatrix::Sparse(m) => m.shape(),
        }
    }

    pub fn nrows(&self) -> usize {
        self.shape().0
    }

    pub fn ncols(&self) -> usize {
        self.shape().1
    }

    pub fn scaled(&self, by: f64) -> Self {
        match self {
            LpMatrix::Dense(m) => LpMatrix::Dense(m * by),
            LpMatrix::Sparse(m) => LpMatrix::Sparse(m.map(|v| v * by)),
        }
    }

    /// Non-zero entries as `(row, col, value)`
    pub fn triplets(&self) -> Vec<(usize, usize, f64)> {
        match self {
            LpMatrix::Dense(m) => m
                .indexed_iter()
                .filter(|(_, v)| **v != 0.0)
                .map(|((r, c), v)| (r, c, *v))
                .collect(),
            LpMatrix::Sparse(m) => sparse::triplets(m).filter(|(_, _, v)| *v != 0.0).collect(),
        }
    }

    pub fn to_dense(&self) -> Array2<f64> {
        match self {
            LpMatrix::Dense(m) => m.clone(),
            LpMatrix::Sparse(m) => m.to_dense(),
        }
    }

    pub fn to_sparse(&self) -> SparseMatrix {
        match self {
            LpMatrix::Dense(m) => sparse::from_dense(m),
            LpMatrix::Sparse(m) => m.clone(),
        }
    }

    pub fn column_sums(&self) -> Array1<f64> {
        match self {
            LpMatrix::Dense(m) => m.sum_axis(Axis(0)),
            LpMatrix::Sparse(m) => sparse::column_sums(m),
        }
    }
}

impl From<Array2<f64>> for LpMatrix {
    fn from(m: Array2<f64>) -> Self {
        LpMatrix::Dense(m)
    }
}

impl From<SparseMatrix> for LpMatrix {
    fn from(m: SparseMatrix) -> Self {
        LpMatrix::Sparse(m)
    }
}
