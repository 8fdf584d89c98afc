//! In-memory undirected graph model shared by every stage of the pipeline.
//!
//! Nodes are opaque [`NodeId`] keys held in ascending order. Edges are stored
//! once in canonical `(min, max)` form together with a weight that records
//! how many times the connection was observed (parallel edges collapse into
//! a heavier edge). Self-loops are never stored.
//!
//! Dense matrix views ([`Graph::adjacency_matrix`],
//! [`Graph::laplacian_matrix`], [`Graph::normalized_laplacian_matrix`]) index
//! rows and columns by the ascending node order returned from
//! [`Graph::node_order`].

mod cluster;

use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    fmt,
};

use nalgebra::DMatrix;

pub use self::cluster::Cluster;

/// Opaque identifier for a graph node.
///
/// # Examples
/// ```
/// use cohort_core::NodeId;
///
/// let id = NodeId::new(4);
/// assert_eq!(id.get(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct NodeId(u64);

impl NodeId {
    /// Creates a node identifier.
    #[rustfmt::skip]
    #[must_use]
    pub const fn new(id: u64) -> Self { Self(id) }

    /// Returns the underlying numeric identifier.
    #[rustfmt::skip]
    #[must_use]
    pub const fn get(self) -> u64 { self.0 }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for NodeId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Errors raised while mutating a [`Graph`].
#[derive(Clone, Debug, thiserror::Error, PartialEq)]
#[non_exhaustive]
pub enum GraphError {
    /// Both endpoints of the edge were the same node.
    #[error("self-loop on node {node} is not permitted")]
    SelfLoop {
        /// Node that was used as both endpoints.
        node: NodeId,
    },
    /// The edge weight was not a finite, strictly positive value.
    #[error("edge ({left}, {right}) has invalid weight {weight}")]
    InvalidWeight {
        /// First endpoint as supplied.
        left: NodeId,
        /// Second endpoint as supplied.
        right: NodeId,
        /// Offending weight.
        weight: f64,
    },
    /// An operation referenced a node that is not present.
    #[error("node {node} is not present in the graph")]
    UnknownNode {
        /// Missing node.
        node: NodeId,
    },
}

impl GraphError {
    /// Returns a stable, machine-readable error code for the variant.
    #[must_use]
    pub const fn code(&self) -> GraphErrorCode {
        match self {
            Self::SelfLoop { .. } => GraphErrorCode::SelfLoop,
            Self::InvalidWeight { .. } => GraphErrorCode::InvalidWeight,
            Self::UnknownNode { .. } => GraphErrorCode::UnknownNode,
        }
    }
}

/// Machine-readable error codes for [`GraphError`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum GraphErrorCode {
    /// Both endpoints of the edge were the same node.
    SelfLoop,
    /// The edge weight was not finite and positive.
    InvalidWeight,
    /// An operation referenced a missing node.
    UnknownNode,
}

impl GraphErrorCode {
    /// Returns the symbolic identifier for logging surfaces.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SelfLoop => "GRAPH_SELF_LOOP",
            Self::InvalidWeight => "GRAPH_INVALID_WEIGHT",
            Self::UnknownNode => "GRAPH_UNKNOWN_NODE",
        }
    }
}

/// Payload attached to an undirected edge.
///
/// The weight counts observed connections. The heuristic tag is carried for
/// callers that ingest labelled data and is ignored by the spectral stages.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Edge {
    weight: f64,
    heuristic: Option<u8>,
}

impl Edge {
    /// Creates an edge payload with the given weight and no heuristic tag.
    #[must_use]
    pub const fn with_weight(weight: f64) -> Self {
        Self {
            weight,
            heuristic: None,
        }
    }

    /// Attaches a heuristic tag to the payload.
    #[must_use]
    pub const fn tagged(mut self, heuristic: u8) -> Self {
        self.heuristic = Some(heuristic);
        self
    }

    /// Returns the edge weight.
    #[rustfmt::skip]
    #[must_use]
    pub const fn weight(&self) -> f64 { self.weight }

    /// Returns the heuristic tag, if any.
    #[rustfmt::skip]
    #[must_use]
    pub const fn heuristic(&self) -> Option<u8> { self.heuristic }

    #[expect(
        clippy::float_arithmetic,
        reason = "parallel edges accumulate multiplicity as weight"
    )]
    fn absorb(&mut self, other: Self) {
        self.weight += other.weight;
        if self.heuristic.is_none() {
            self.heuristic = other.heuristic;
        }
    }
}

impl Default for Edge {
    fn default() -> Self {
        Self::with_weight(1.0)
    }
}

/// Undirected, weighted graph owned by a single experiment trial.
///
/// # Examples
/// ```
/// use cohort_core::{Graph, NodeId};
///
/// let mut graph = Graph::with_nodes((0..3).map(NodeId::new));
/// graph.add_edge(NodeId::new(0), NodeId::new(1))?;
/// graph.add_edge(NodeId::new(1), NodeId::new(2))?;
/// assert_eq!(graph.node_count(), 3);
/// assert_eq!(graph.edge_count(), 2);
/// # Ok::<(), cohort_core::GraphError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Graph {
    nodes: BTreeSet<NodeId>,
    #[cfg_attr(feature = "serde", serde(with = "edge_list"))]
    edges: BTreeMap<(NodeId, NodeId), Edge>,
}

const fn canonical(left: NodeId, right: NodeId) -> (NodeId, NodeId) {
    if left.0 <= right.0 {
        (left, right)
    } else {
        (right, left)
    }
}

impl Graph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a graph containing the given isolated nodes.
    #[must_use]
    pub fn with_nodes<I: IntoIterator<Item = NodeId>>(nodes: I) -> Self {
        Self {
            nodes: nodes.into_iter().collect(),
            edges: BTreeMap::new(),
        }
    }

    /// Inserts a node, returning `true` when it was not already present.
    pub fn add_node(&mut self, node: NodeId) -> bool {
        self.nodes.insert(node)
    }

    /// Adds one observation of the undirected edge `{left, right}`.
    ///
    /// Missing endpoints are inserted. Adding an existing edge increases its
    /// weight by one.
    ///
    /// # Errors
    /// Returns [`GraphError::SelfLoop`] when `left == right`.
    pub fn add_edge(&mut self, left: NodeId, right: NodeId) -> Result<(), GraphError> {
        self.add_weighted_edge(left, right, Edge::default())
    }

    /// Adds an edge with an explicit payload, merging into any existing edge.
    ///
    /// # Errors
    /// Returns [`GraphError::SelfLoop`] when `left == right` and
    /// [`GraphError::InvalidWeight`] when the weight is not finite and
    /// strictly positive.
    pub fn add_weighted_edge(
        &mut self,
        left: NodeId,
        right: NodeId,
        edge: Edge,
    ) -> Result<(), GraphError> {
        if left == right {
            return Err(GraphError::SelfLoop { node: left });
        }
        if !edge.weight.is_finite() || edge.weight <= 0.0 {
            return Err(GraphError::InvalidWeight {
                left,
                right,
                weight: edge.weight,
            });
        }
        self.nodes.insert(left);
        self.nodes.insert(right);
        self.edges
            .entry(canonical(left, right))
            .and_modify(|existing| existing.absorb(edge))
            .or_insert(edge);
        Ok(())
    }

    /// Removes the edge `{left, right}`, returning its payload if present.
    pub fn remove_edge(&mut self, left: NodeId, right: NodeId) -> Option<Edge> {
        self.edges.remove(&canonical(left, right))
    }

    /// Returns the payload of the edge `{left, right}`, if present.
    #[must_use]
    pub fn edge(&self, left: NodeId, right: NodeId) -> Option<&Edge> {
        self.edges.get(&canonical(left, right))
    }

    /// Returns `true` when the node is present.
    #[must_use]
    pub fn contains_node(&self, node: NodeId) -> bool {
        self.nodes.contains(&node)
    }

    /// Returns `true` when the edge `{left, right}` is present.
    #[must_use]
    pub fn contains_edge(&self, left: NodeId, right: NodeId) -> bool {
        self.edges.contains_key(&canonical(left, right))
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of distinct undirected edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Iterates over nodes in ascending order.
    pub fn nodes(&self) -> impl ExactSizeIterator<Item = NodeId> + '_ {
        self.nodes.iter().copied()
    }

    /// Iterates over edges as `(smaller, larger, payload)` in ascending order.
    pub fn edges(&self) -> impl ExactSizeIterator<Item = (NodeId, NodeId, &Edge)> + '_ {
        self.edges
            .iter()
            .map(|(&(left, right), edge)| (left, right, edge))
    }

    /// Returns the node order used for matrix rows and columns.
    #[must_use]
    pub fn node_order(&self) -> Vec<NodeId> {
        self.nodes.iter().copied().collect()
    }

    /// Merges `absorbed` into `survivor`.
    ///
    /// Every edge incident to `absorbed` is redirected to `survivor`; the
    /// edge between the two is dropped rather than turned into a self-loop,
    /// and redirected edges that collide with existing survivor edges add
    /// their weights. `absorbed` is removed from the node set.
    pub(crate) fn merge_nodes(
        &mut self,
        survivor: NodeId,
        absorbed: NodeId,
    ) -> Result<(), GraphError> {
        if survivor == absorbed {
            return Err(GraphError::SelfLoop { node: survivor });
        }
        for node in [survivor, absorbed] {
            if !self.nodes.contains(&node) {
                return Err(GraphError::UnknownNode { node });
            }
        }

        let incident: Vec<(NodeId, NodeId)> = self
            .edges
            .keys()
            .filter(|&&(left, right)| left == absorbed || right == absorbed)
            .copied()
            .collect();

        for key in incident {
            let Some(edge) = self.edges.remove(&key) else {
                continue;
            };
            let other = if key.0 == absorbed { key.1 } else { key.0 };
            if other == survivor {
                continue;
            }
            self.edges
                .entry(canonical(survivor, other))
                .and_modify(|existing| existing.absorb(edge))
                .or_insert(edge);
        }

        self.nodes.remove(&absorbed);
        Ok(())
    }

    fn positions(&self) -> HashMap<NodeId, usize> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, &node)| (node, index))
            .collect()
    }

    /// Builds the dense symmetric adjacency matrix `A`.
    ///
    /// `A[i, j]` holds the weight of the edge between the `i`-th and `j`-th
    /// nodes of [`Self::node_order`]; the diagonal is zero.
    #[must_use]
    pub fn adjacency_matrix(&self) -> DMatrix<f64> {
        let n = self.nodes.len();
        let positions = self.positions();
        let mut adjacency = DMatrix::<f64>::zeros(n, n);
        for (&(left, right), edge) in &self.edges {
            if let (Some(&i), Some(&j)) = (positions.get(&left), positions.get(&right)) {
                adjacency[(i, j)] = edge.weight;
                adjacency[(j, i)] = edge.weight;
            }
        }
        adjacency
    }

    /// Builds the combinatorial Laplacian `L = D - A`.
    ///
    /// Every row of the result sums to zero.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "Laplacian construction requires floating-point arithmetic."
    )]
    pub fn laplacian_matrix(&self) -> DMatrix<f64> {
        let adjacency = self.adjacency_matrix();
        let degrees = adjacency.column_sum();
        let mut laplacian = -adjacency;
        for (index, degree) in degrees.iter().enumerate() {
            laplacian[(index, index)] = *degree;
        }
        laplacian
    }

    /// Builds the symmetric normalised Laplacian `I - D^-1/2 A D^-1/2`.
    ///
    /// Isolated nodes receive a zero row, so each connected component,
    /// including singletons, contributes one zero eigenvalue.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "normalised Laplacian construction requires floating-point arithmetic."
    )]
    pub fn normalized_laplacian_matrix(&self) -> DMatrix<f64> {
        let adjacency = self.adjacency_matrix();
        let n = adjacency.nrows();
        let inv_sqrt: Vec<f64> = adjacency
            .column_sum()
            .iter()
            .map(|&degree| {
                if degree > 0.0 {
                    degree.sqrt().recip()
                } else {
                    0.0
                }
            })
            .collect();

        DMatrix::from_fn(n, n, |i, j| {
            let scaled = inv_sqrt[i] * adjacency[(i, j)] * inv_sqrt[j];
            if i == j && inv_sqrt[i] > 0.0 {
                1.0 - scaled
            } else {
                -scaled
            }
        })
    }
}

#[cfg(feature = "serde")]
mod edge_list {
    //! Serialises the edge map as a flat list since JSON maps need string keys.

    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::{Edge, NodeId};

    type EdgeMap = BTreeMap<(NodeId, NodeId), Edge>;

    pub(super) fn serialize<S: Serializer>(edges: &EdgeMap, serializer: S) -> Result<S::Ok, S::Error> {
        let list: Vec<(NodeId, NodeId, Edge)> = edges
            .iter()
            .map(|(&(left, right), &edge)| (left, right, edge))
            .collect();
        list.serialize(serializer)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<EdgeMap, D::Error> {
        let list = Vec::<(NodeId, NodeId, Edge)>::deserialize(deserializer)?;
        Ok(list
            .into_iter()
            .map(|(left, right, edge)| (super::canonical(left, right), edge))
            .collect())
    }
}
