//! Append-only record of which node absorbed which.

use std::collections::{BTreeMap, btree_map};

use crate::graph::NodeId;

/// Maps every absorbed node to the node it was merged into.
///
/// Entries are never overwritten. A survivor may itself be absorbed later,
/// so [`resolve`](Self::resolve) follows the chain to the node that is still
/// present in the contracted graph.
///
/// # Examples
/// ```
/// use cohort_core::{IdentityMap, NodeId};
///
/// let mut map = IdentityMap::new();
/// assert!(map.record(NodeId::new(5), NodeId::new(3)));
/// assert!(map.record(NodeId::new(3), NodeId::new(0)));
/// assert!(!map.record(NodeId::new(5), NodeId::new(1)));
///
/// assert_eq!(map.survivor_of(NodeId::new(5)), Some(NodeId::new(3)));
/// assert_eq!(map.resolve(NodeId::new(5)), NodeId::new(0));
/// assert_eq!(map.resolve(NodeId::new(9)), NodeId::new(9));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct IdentityMap {
    survivors: BTreeMap<NodeId, NodeId>,
}

impl IdentityMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `absorbed` was merged into `survivor`.
    ///
    /// Returns `false` and leaves the map unchanged when `absorbed` already
    /// has a recorded survivor or the two are equal.
    pub fn record(&mut self, absorbed: NodeId, survivor: NodeId) -> bool {
        if absorbed == survivor {
            return false;
        }
        match self.survivors.entry(absorbed) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(survivor);
                true
            }
            btree_map::Entry::Occupied(_) => false,
        }
    }

    /// Direct survivor recorded for `absorbed`, if any.
    #[must_use]
    pub fn survivor_of(&self, absorbed: NodeId) -> Option<NodeId> {
        self.survivors.get(&absorbed).copied()
    }

    /// Follows recorded merges from `node` to its final survivor.
    ///
    /// Nodes that were never absorbed resolve to themselves. The walk is
    /// bounded by the map size, so a malformed cyclic map still terminates.
    #[must_use]
    pub fn resolve(&self, node: NodeId) -> NodeId {
        let mut current = node;
        for _ in 0..=self.survivors.len() {
            match self.survivors.get(&current) {
                Some(&next) => current = next,
                None => break,
            }
        }
        current
    }

    /// Returns `true` when `node` was absorbed by another node.
    #[must_use]
    pub fn is_absorbed(&self, node: NodeId) -> bool {
        self.survivors.contains_key(&node)
    }

    /// Number of recorded merges.
    #[must_use]
    pub fn len(&self) -> usize {
        self.survivors.len()
    }

    /// Returns `true` when no merges have been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.survivors.is_empty()
    }

    /// Iterates over `(absorbed, survivor)` pairs by ascending absorbed id.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (NodeId, NodeId)> + '_ {
        self.survivors
            .iter()
            .map(|(&absorbed, &survivor)| (absorbed, survivor))
    }
}
