//! Agglomerative (bottom-up hierarchical) clustering of embedded points.
//!
//! Every point starts in its own cluster. The two closest clusters are merged
//! repeatedly until `k` remain, with inter-cluster distances updated by the
//! Lance–Williams recurrence for the chosen [`Linkage`]. Ties between equally
//! close pairs resolve to the lexicographically smallest pair of cluster
//! slots, so the result is deterministic.
//!
//! Cluster membership is tracked with a union-find over point indices.

use nalgebra::DMatrix;

/// Inter-cluster distance used when merging.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Linkage {
    /// Distance between the closest members.
    Single,
    /// Distance between the farthest members.
    Complete,
    /// Mean pairwise distance between members (UPGMA).
    #[default]
    Average,
}

#[derive(Clone, Debug)]
struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    fn find(&mut self, mut node: usize) -> usize {
        let mut root = node;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        while self.parent[node] != node {
            let parent = self.parent[node];
            self.parent[node] = root;
            node = parent;
        }
        root
    }

    fn union(&mut self, left: usize, right: usize) {
        let mut left = self.find(left);
        let mut right = self.find(right);
        if left == right {
            return;
        }
        if self.rank[left] < self.rank[right] {
            std::mem::swap(&mut left, &mut right);
        }
        self.parent[right] = left;
        if self.rank[left] == self.rank[right] {
            self.rank[left] = self.rank[left].saturating_add(1);
        }
    }
}

#[expect(
    clippy::float_arithmetic,
    reason = "Euclidean distances require floating-point arithmetic."
)]
fn pairwise_distances(points: &DMatrix<f64>) -> Vec<Vec<f64>> {
    let n = points.nrows();
    let mut distances = vec![vec![0.0_f64; n]; n];
    for left in 0..n {
        for right in (left + 1)..n {
            let distance = (points.row(left) - points.row(right)).norm();
            distances[left][right] = distance;
            distances[right][left] = distance;
        }
    }
    distances
}

#[expect(
    clippy::cast_precision_loss,
    clippy::float_arithmetic,
    reason = "Lance-Williams updates require floating-point arithmetic."
)]
fn merged_distance(
    linkage: Linkage,
    to_left: f64,
    to_right: f64,
    left_size: usize,
    right_size: usize,
) -> f64 {
    match linkage {
        Linkage::Single => to_left.min(to_right),
        Linkage::Complete => to_left.max(to_right),
        Linkage::Average => {
            let left_weight = left_size as f64;
            let right_weight = right_size as f64;
            (left_weight * to_left + right_weight * to_right) / (left_weight + right_weight)
        }
    }
}

fn closest_pair(distances: &[Vec<f64>], active: &[bool]) -> Option<(usize, usize)> {
    let mut best: Option<(usize, usize, f64)> = None;
    for (left, row) in distances.iter().enumerate() {
        if !active[left] {
            continue;
        }
        for (right, &distance) in row.iter().enumerate().skip(left + 1) {
            if !active[right] {
                continue;
            }
            if best.is_none_or(|(_, _, current)| distance < current) {
                best = Some((left, right, distance));
            }
        }
    }
    best.map(|(left, right, _)| (left, right))
}

/// Clusters the rows of `points` into `k` groups.
///
/// Returns one label in `0..k` per row. Labels are numbered by the smallest
/// row index each cluster contains. Callers guarantee `1 <= k <= rows`.
pub(crate) fn cluster(points: &DMatrix<f64>, k: usize, linkage: Linkage) -> Vec<usize> {
    let n = points.nrows();
    let mut distances = pairwise_distances(points);
    let mut active = vec![true; n];
    let mut sizes = vec![1_usize; n];
    let mut members = DisjointSet::new(n);
    let mut remaining = n;

    while remaining > k {
        let Some((left, right)) = closest_pair(&distances, &active) else {
            break;
        };
        for other in 0..n {
            if !active[other] || other == left || other == right {
                continue;
            }
            let updated = merged_distance(
                linkage,
                distances[left][other],
                distances[right][other],
                sizes[left],
                sizes[right],
            );
            distances[left][other] = updated;
            distances[other][left] = updated;
        }
        sizes[left] += sizes[right];
        active[right] = false;
        members.union(left, right);
        remaining -= 1;
    }

    let mut label_of_root = vec![None; n];
    let mut next_label = 0;
    (0..n)
        .map(|point| {
            let root = members.find(point);
            *label_of_root[root].get_or_insert_with(|| {
                let label = next_label;
                next_label += 1;
                label
            })
        })
        .collect()
}
