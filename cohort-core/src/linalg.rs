//! Dense symmetric eigen-decomposition helpers.
//!
//! Both the spectral embeddings and the sparsifier's effective resistances
//! are derived from the eigen-decomposition of a symmetric matrix. The
//! helpers here order eigenpairs deterministically and build the
//! Moore-Penrose pseudoinverse of positive semi-definite matrices by
//! discarding eigenvalues below a relative tolerance, which removes the
//! all-ones kernel of each connected component of a Laplacian.

use std::cmp::Ordering;

use nalgebra::{DMatrix, SymmetricEigen};

/// Upper bound on QR sweeps before the solver is declared non-convergent.
const MAX_EIGEN_ITERATIONS: usize = 10_000;

/// Errors raised by the dense linear-algebra helpers.
#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum LinalgError {
    /// The symmetric eigen solver did not converge.
    #[error("symmetric eigen-decomposition of a {dimension}x{dimension} matrix did not converge")]
    NoConvergence {
        /// Order of the matrix that failed to decompose.
        dimension: usize,
    },
    /// The input matrix contained NaN or infinite entries.
    #[error("matrix contains non-finite entries")]
    NonFinite,
}

/// Eigenpairs of a symmetric matrix sorted by ascending eigenvalue.
///
/// Column `i` of `vectors` is the unit eigenvector for `values[i]`.
#[derive(Clone, Debug)]
pub(crate) struct SortedEigen {
    pub(crate) values: Vec<f64>,
    pub(crate) vectors: DMatrix<f64>,
}

impl SortedEigen {
    /// Decomposes `matrix`, which must be symmetric.
    pub(crate) fn of_symmetric(matrix: DMatrix<f64>) -> Result<Self, LinalgError> {
        if matrix.iter().any(|value| !value.is_finite()) {
            return Err(LinalgError::NonFinite);
        }
        let dimension = matrix.nrows();
        if dimension == 0 {
            return Ok(Self {
                values: Vec::new(),
                vectors: DMatrix::zeros(0, 0),
            });
        }

        let eigen = SymmetricEigen::try_new(matrix, f64::EPSILON, MAX_EIGEN_ITERATIONS)
            .ok_or(LinalgError::NoConvergence { dimension })?;

        let mut order: Vec<usize> = (0..dimension).collect();
        order.sort_by(|&left, &right| {
            eigen.eigenvalues[left]
                .partial_cmp(&eigen.eigenvalues[right])
                .unwrap_or(Ordering::Equal)
                .then_with(|| left.cmp(&right))
        });

        let values = order.iter().map(|&index| eigen.eigenvalues[index]).collect();
        let vectors = eigen.eigenvectors.select_columns(order.iter());
        Ok(Self { values, vectors })
    }

    /// Order of the decomposed matrix.
    pub(crate) fn dimension(&self) -> usize {
        self.values.len()
    }

    /// Columns for the `count` smallest eigenvalues, smallest first.
    pub(crate) fn smallest(&self, count: usize) -> DMatrix<f64> {
        let count = count.min(self.dimension());
        self.vectors.columns(0, count).into_owned()
    }

    /// Columns for the `count` largest eigenvalues, largest first.
    pub(crate) fn largest(&self, count: usize) -> DMatrix<f64> {
        let dimension = self.dimension();
        let count = count.min(dimension);
        self.vectors
            .select_columns((dimension - count..dimension).rev().collect::<Vec<_>>().iter())
    }
}

/// Computes the pseudoinverse of a symmetric positive semi-definite matrix.
///
/// Eigenvalues whose magnitude falls below `n · ε · max|λ|` are treated as
/// zero, so the result inverts the matrix on its range and vanishes on its
/// null space.
#[expect(
    clippy::cast_precision_loss,
    clippy::float_arithmetic,
    reason = "pseudoinverse reconstruction requires floating-point arithmetic."
)]
pub(crate) fn psd_pseudoinverse(matrix: DMatrix<f64>) -> Result<DMatrix<f64>, LinalgError> {
    let dimension = matrix.nrows();
    let eigen = SortedEigen::of_symmetric(matrix)?;
    let largest = eigen
        .values
        .iter()
        .fold(0.0_f64, |acc, value| acc.max(value.abs()));
    let tolerance = dimension as f64 * f64::EPSILON * largest;

    let mut inverse = DMatrix::<f64>::zeros(dimension, dimension);
    for (index, &value) in eigen.values.iter().enumerate() {
        if value <= tolerance {
            continue;
        }
        let column = eigen.vectors.column(index);
        inverse += (column * column.transpose()) / value;
    }
    Ok(inverse)
}
