//! Sparse linear systems, one row per cell.

use std::collections::BTreeMap;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use thiserror::Error;

use crate::kernels::norm2;

/// Added to residual normalization so an all-zero system is converged.
const SMALL: f64 = 1e-20;

/// Errors that can occur when building a linear system.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SystemError {
    #[error("matrix has {rows} rows but the source has {len} entries")]
    SourceLength { rows: usize, len: usize },
}

/// A square matrix in compressed sparse row format.
///
/// Column indices are sorted within each row and every row stores its
/// diagonal entry, even when the entry is zero.
#[derive(Debug, Clone, PartialEq)]
pub struct CsrMatrix {
    row_ptr: Vec<usize>,
    col_idx: Vec<usize>,
    values: Vec<f64>,
    diag_idx: Vec<usize>,
}

impl CsrMatrix {
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.diag_idx.len()
    }

    /// Returns the number of stored entries.
    #[must_use]
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Returns the `(column, value)` pairs of a row.
    pub fn row(&self, row: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let range = self.row_ptr[row]..self.row_ptr[row + 1];
        self.col_idx[range.clone()]
            .iter()
            .copied()
            .zip(self.values[range].iter().copied())
    }

    /// Returns the value at `(row, col)`, or zero if it is not stored.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        let range = self.row_ptr[row]..self.row_ptr[row + 1];
        self.col_idx[range.clone()]
            .binary_search(&col)
            .map_or(0.0, |i| self.values[range.start + i])
    }

    #[must_use]
    pub fn diagonal_value(&self, row: usize) -> f64 {
        self.values[self.diag_idx[row]]
    }

    #[must_use]
    pub fn diagonal(&self) -> Vec<f64> {
        self.diag_idx.iter().map(|&i| self.values[i]).collect()
    }

    /// Adds `value` to the diagonal entry of `row`.
    pub fn add_to_diagonal(&mut self, row: usize, value: f64) {
        self.values[self.diag_idx[row]] += value;
    }

    /// Scales the diagonal entry of `row`.
    pub fn scale_diagonal(&mut self, row: usize, factor: f64) {
        self.values[self.diag_idx[row]] *= factor;
    }

    /// Computes `y = A x`.
    ///
    /// # Panics
    ///
    /// Panics if `x` or `y` does not have one entry per row.
    pub fn mul_vec(&self, x: &[f64], y: &mut [f64]) {
        assert_eq!(x.len(), self.n_rows(), "x must have one entry per row");
        assert_eq!(y.len(), self.n_rows(), "y must have one entry per row");
        self.fill_rows(x, y);
    }

    #[cfg(feature = "parallel")]
    fn fill_rows(&self, x: &[f64], y: &mut [f64]) {
        y.par_iter_mut()
            .enumerate()
            .for_each(|(row, y)| *y = self.row_dot(row, x));
    }

    #[cfg(not(feature = "parallel"))]
    fn fill_rows(&self, x: &[f64], y: &mut [f64]) {
        for (row, y) in y.iter_mut().enumerate() {
            *y = self.row_dot(row, x);
        }
    }

    /// Returns the dot product of a row with `x`.
    #[must_use]
    pub fn row_dot(&self, row: usize, x: &[f64]) -> f64 {
        self.row(row).map(|(col, value)| value * x[col]).sum()
    }
}

/// Accumulates matrix entries and builds a [`CsrMatrix`].
#[derive(Debug, Clone)]
pub struct CsrBuilder {
    rows: Vec<BTreeMap<usize, f64>>,
}

impl CsrBuilder {
    /// Creates a builder for an `n` by `n` matrix.
    #[must_use]
    pub fn new(n: usize) -> Self {
        Self {
            rows: vec![BTreeMap::new(); n],
        }
    }

    /// Adds `value` to the entry at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if the entry is outside the matrix.
    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        let n = self.rows.len();
        assert!(row < n && col < n, "entry ({row}, {col}) is outside a {n}x{n} matrix");
        *self.rows[row].entry(col).or_insert(0.0) += value;
    }

    /// Builds the matrix, inserting explicit zero diagonals where needed.
    #[must_use]
    pub fn build(self) -> CsrMatrix {
        let n = self.rows.len();
        let nnz = self.rows.iter().map(BTreeMap::len).sum::<usize>() + n;
        let mut row_ptr = Vec::with_capacity(n + 1);
        let mut col_idx = Vec::with_capacity(nnz);
        let mut values = Vec::with_capacity(nnz);
        let mut diag_idx = Vec::with_capacity(n);

        row_ptr.push(0);
        for (row, mut entries) in self.rows.into_iter().enumerate() {
            entries.entry(row).or_insert(0.0);
            for (col, value) in entries {
                if col == row {
                    diag_idx.push(col_idx.len());
                }
                col_idx.push(col);
                values.push(value);
            }
            row_ptr.push(col_idx.len());
        }

        CsrMatrix {
            row_ptr,
            col_idx,
            values,
            diag_idx,
        }
    }
}

/// A matrix and right-hand side describing `A x = b`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearSystem {
    matrix: CsrMatrix,
    source: Vec<f64>,
}

impl LinearSystem {
    /// Creates a linear system.
    ///
    /// # Errors
    ///
    /// Returns an error if the source does not have one entry per row.
    pub fn new(matrix: CsrMatrix, source: Vec<f64>) -> Result<Self, SystemError> {
        if source.len() != matrix.n_rows() {
            return Err(SystemError::SourceLength {
                rows: matrix.n_rows(),
                len: source.len(),
            });
        }
        Ok(Self { matrix, source })
    }

    /// Creates a system with a zero right-hand side.
    #[must_use]
    pub fn homogeneous(matrix: CsrMatrix) -> Self {
        let source = vec![0.0; matrix.n_rows()];
        Self { matrix, source }
    }

    #[must_use]
    pub fn matrix(&self) -> &CsrMatrix {
        &self.matrix
    }

    #[must_use]
    pub fn source(&self) -> &[f64] {
        &self.source
    }

    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.source.len()
    }

    #[must_use]
    pub fn diagonal(&self, row: usize) -> f64 {
        self.matrix.diagonal_value(row)
    }

    pub fn add_to_diagonal(&mut self, row: usize, value: f64) {
        self.matrix.add_to_diagonal(row, value);
    }

    pub fn scale_diagonal(&mut self, row: usize, factor: f64) {
        self.matrix.scale_diagonal(row, factor);
    }

    pub fn add_source(&mut self, row: usize, value: f64) {
        self.source[row] += value;
    }

    /// Returns `b - A x`.
    #[must_use]
    pub fn residual(&self, x: &[f64]) -> Vec<f64> {
        let mut ax = vec![0.0; self.n_rows()];
        self.matrix.mul_vec(x, &mut ax);
        self.source.iter().zip(ax).map(|(b, ax)| b - ax).collect()
    }

    /// Returns the residual normalization for an initial guess `x0`,
    /// `‖b‖ + ‖A x0‖ + 1e-20`.
    #[must_use]
    pub fn normalization(&self, x0: &[f64]) -> f64 {
        let mut ax = vec![0.0; self.n_rows()];
        self.matrix.mul_vec(x0, &mut ax);
        norm2(&self.source) + norm2(&ax) + SMALL
    }

    /// Returns `‖b - A x‖` divided by `normalization`, as computed by
    /// [`LinearSystem::normalization`].
    #[must_use]
    pub fn normalized_residual(&self, x: &[f64], normalization: f64) -> f64 {
        norm2(&self.residual(x)) / normalization
    }
}
