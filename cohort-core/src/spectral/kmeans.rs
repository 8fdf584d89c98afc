//! Centroid-based clustering with k-means++ seeding and Lloyd iterations.
//!
//! Each restart seeds centroids with k-means++ (first centroid uniform,
//! subsequent centroids drawn with probability proportional to the squared
//! distance to the nearest chosen centroid), then alternates assignment and
//! centroid updates until every centroid moves less than the tolerance or the
//! iteration cap is reached. The restart with the lowest inertia wins; ties
//! keep the earlier restart.
//!
//! A cluster left empty by an assignment step is repaired by moving it the
//! point farthest from its centroid out of the largest cluster, so `k`
//! non-empty clusters are returned whenever there are at least `k` points.

use rand::{Rng, distributions::WeightedIndex, prelude::Distribution};
use tracing::{debug, warn};

/// Parameters controlling [`cluster`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct KMeansParams {
    pub(crate) restarts: usize,
    pub(crate) max_iterations: usize,
    pub(crate) tolerance: f64,
}

struct Fit {
    labels: Vec<usize>,
    inertia: f64,
    iterations: usize,
}

#[expect(
    clippy::float_arithmetic,
    reason = "squared Euclidean distance requires floating-point arithmetic."
)]
fn squared_distance(left: &[f64], right: &[f64]) -> f64 {
    left.iter()
        .zip(right)
        .map(|(a, b)| {
            let diff = a - b;
            diff * diff
        })
        .sum()
}

fn nearest(point: &[f64], centroids: &[Vec<f64>]) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (index, centroid) in centroids.iter().enumerate() {
        let distance = squared_distance(point, centroid);
        if distance < best.1 {
            best = (index, distance);
        }
    }
    best
}

fn seed_centroids<R: Rng + ?Sized>(points: &[Vec<f64>], k: usize, rng: &mut R) -> Vec<Vec<f64>> {
    let mut centroids = Vec::with_capacity(k);
    centroids.push(points[rng.gen_range(0..points.len())].clone());

    while centroids.len() < k {
        let weights: Vec<f64> = points
            .iter()
            .map(|point| nearest(point, &centroids).1)
            .collect();
        // All points coincide with a centroid: any choice is as good as another.
        let index = match WeightedIndex::new(&weights) {
            Ok(distribution) => distribution.sample(rng),
            Err(_) => rng.gen_range(0..points.len()),
        };
        centroids.push(points[index].clone());
    }
    centroids
}

#[expect(
    clippy::cast_precision_loss,
    clippy::float_arithmetic,
    reason = "centroid means require floating-point arithmetic."
)]
fn update_centroids(points: &[Vec<f64>], labels: &[usize], k: usize, dims: usize) -> Vec<Vec<f64>> {
    let mut sums = vec![vec![0.0_f64; dims]; k];
    let mut counts = vec![0_usize; k];
    for (point, &label) in points.iter().zip(labels) {
        counts[label] += 1;
        for (sum, value) in sums[label].iter_mut().zip(point) {
            *sum += value;
        }
    }
    for (sum, &count) in sums.iter_mut().zip(&counts) {
        if count > 0 {
            let scale = (count as f64).recip();
            for value in sum.iter_mut() {
                *value *= scale;
            }
        }
    }
    sums
}

/// Moves points into empty clusters. Returns how many clusters were reseeded.
fn repair_empty_clusters(points: &[Vec<f64>], labels: &mut [usize], centroids: &[Vec<f64>]) -> usize {
    let k = centroids.len();
    let mut repaired = 0;
    loop {
        let mut counts = vec![0_usize; k];
        for &label in labels.iter() {
            counts[label] += 1;
        }
        let Some(empty) = counts.iter().position(|&count| count == 0) else {
            return repaired;
        };
        let Some((donor, _)) = counts
            .iter()
            .enumerate()
            .filter(|&(_, &count)| count > 1)
            .max_by_key(|&(index, &count)| (count, std::cmp::Reverse(index)))
        else {
            return repaired;
        };
        let farthest = labels
            .iter()
            .enumerate()
            .filter(|&(_, &label)| label == donor)
            .map(|(index, _)| (index, squared_distance(&points[index], &centroids[donor])))
            .fold(None, |best: Option<(usize, f64)>, candidate| match best {
                Some(current) if current.1 >= candidate.1 => Some(current),
                _ => Some(candidate),
            });
        let Some((point, _)) = farthest else {
            return repaired;
        };
        labels[point] = empty;
        repaired += 1;
    }
}

fn lloyd<R: Rng + ?Sized>(points: &[Vec<f64>], k: usize, params: KMeansParams, rng: &mut R) -> Fit {
    let dims = points.first().map_or(0, Vec::len);
    let mut centroids = seed_centroids(points, k, rng);
    let mut labels = vec![0_usize; points.len()];
    let tolerance = params.tolerance * params.tolerance;
    let mut iterations = 0;

    while iterations < params.max_iterations {
        iterations += 1;
        for (label, point) in labels.iter_mut().zip(points) {
            *label = nearest(point, &centroids).0;
        }
        let repaired = repair_empty_clusters(points, &mut labels, &centroids);
        if repaired > 0 {
            warn!(repaired, "k-means reseeded empty clusters");
        }
        let updated = update_centroids(points, &labels, k, dims);
        let converged = centroids
            .iter()
            .zip(&updated)
            .all(|(old, new)| squared_distance(old, new) <= tolerance);
        centroids = updated;
        if converged && repaired == 0 {
            break;
        }
    }

    let inertia = points
        .iter()
        .zip(&labels)
        .map(|(point, &label)| squared_distance(point, &centroids[label]))
        .sum();
    Fit {
        labels,
        inertia,
        iterations,
    }
}

/// Clusters `points` into `k` groups, returning one label in `0..k` per point.
///
/// Callers guarantee `1 <= k <= points.len()` and `params.restarts >= 1`.
pub(crate) fn cluster<R: Rng + ?Sized>(
    points: &[Vec<f64>],
    k: usize,
    params: KMeansParams,
    rng: &mut R,
) -> Vec<usize> {
    let mut best: Option<Fit> = None;
    for restart in 0..params.restarts.max(1) {
        let fit = lloyd(points, k, params, rng);
        debug!(restart, inertia = fit.inertia, iterations = fit.iterations, "k-means restart");
        if best
            .as_ref()
            .is_none_or(|current| fit.inertia < current.inertia)
        {
            best = Some(fit);
        }
    }
    best.map(|fit| fit.labels).unwrap_or_default()
}
