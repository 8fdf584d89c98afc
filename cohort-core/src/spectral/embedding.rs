//! Spectral embeddings of a graph's nodes.
//!
//! Two embeddings are produced, each with one row per node in
//! [`Graph::node_order`] and one column per requested dimension:
//!
//! - the adjacency embedding keeps the eigenvectors of `A` with the largest
//!   eigenvalues;
//! - the Laplacian embedding keeps the eigenvectors of the normalised
//!   Laplacian with the smallest eigenvalues and rescales every row to unit
//!   length.
//!
//! Eigenvectors for repeated eigenvalues are only defined up to rotation
//! within their eigenspace. Both clustering back-ends work on Euclidean
//! distances between rows, which that rotation preserves.

use nalgebra::DMatrix;
use tracing::debug;

use crate::{
    graph::Graph,
    linalg::{LinalgError, SortedEigen},
};

/// Embeds nodes using the top `dimensions` eigenvectors of the adjacency matrix.
pub(crate) fn adjacency_embedding(
    graph: &Graph,
    dimensions: usize,
) -> Result<DMatrix<f64>, LinalgError> {
    let eigen = SortedEigen::of_symmetric(graph.adjacency_matrix())?;
    log_gap("adjacency", &eigen, eigen.dimension().saturating_sub(dimensions));
    Ok(eigen.largest(dimensions))
}

/// Embeds nodes using the bottom `dimensions` eigenvectors of the normalised
/// Laplacian, with each row rescaled to unit norm.
pub(crate) fn laplacian_embedding(
    graph: &Graph,
    dimensions: usize,
) -> Result<DMatrix<f64>, LinalgError> {
    let eigen = SortedEigen::of_symmetric(graph.normalized_laplacian_matrix())?;
    log_gap("laplacian", &eigen, dimensions);
    let mut embedding = eigen.smallest(dimensions);
    normalize_rows(&mut embedding);
    Ok(embedding)
}

#[expect(
    clippy::float_arithmetic,
    reason = "row normalisation requires floating-point arithmetic."
)]
fn normalize_rows(embedding: &mut DMatrix<f64>) {
    for mut row in embedding.row_iter_mut() {
        let norm = row.norm();
        if norm > f64::EPSILON {
            row /= norm;
        }
    }
}

#[expect(
    clippy::float_arithmetic,
    reason = "eigen gap is a floating-point difference."
)]
fn log_gap(matrix: &'static str, eigen: &SortedEigen, split: usize) {
    if split == 0 || split >= eigen.dimension() {
        return;
    }
    let gap = eigen.values[split] - eigen.values[split - 1];
    debug!(matrix, split, gap, "spectral eigen gap");
}
