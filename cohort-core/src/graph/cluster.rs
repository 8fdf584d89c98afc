//! Node sets used for planted clusters and recovered partitions.

use std::collections::{BTreeSet, btree_set};

use super::NodeId;

/// A set of node identifiers.
///
/// Planted clusters and recovered partitions share this type. Ordering of a
/// list of clusters carries no meaning for recovered partitions; use
/// [`crate::align`] to pair them with ground truth.
///
/// # Examples
/// ```
/// use cohort_core::{Cluster, NodeId};
///
/// let left: Cluster = (0..4).map(NodeId::new).collect();
/// let right: Cluster = (2..6).map(NodeId::new).collect();
/// assert_eq!(left.overlap(&right), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Cluster(BTreeSet<NodeId>);

impl Cluster {
    /// Creates an empty cluster.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a node, returning `true` when it was newly added.
    pub fn insert(&mut self, node: NodeId) -> bool {
        self.0.insert(node)
    }

    /// Returns `true` when the node is a member.
    #[must_use]
    pub fn contains(&self, node: NodeId) -> bool {
        self.0.contains(&node)
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when the cluster has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over members in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.0.iter().copied()
    }

    /// Size of the intersection with `other`.
    #[must_use]
    pub fn overlap(&self, other: &Self) -> usize {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        small.0.iter().filter(|node| large.0.contains(node)).count()
    }
}

impl FromIterator<NodeId> for Cluster {
    fn from_iter<I: IntoIterator<Item = NodeId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<NodeId> for Cluster {
    fn extend<I: IntoIterator<Item = NodeId>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl IntoIterator for Cluster {
    type Item = NodeId;
    type IntoIter = btree_set::IntoIter<NodeId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Cluster {
    type Item = NodeId;
    type IntoIter = std::iter::Copied<btree_set::Iter<'a, NodeId>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter().copied()
    }
}
