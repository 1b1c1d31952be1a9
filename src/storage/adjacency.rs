//! Adjacency-list social graph
//!
//! Undirected, unweighted, append-only. Every node owns an ordered neighbor list;
//! adding edge `(a, b)` appends `b` to `a`'s list and `a` to `b`'s list.
//!
//! ```text
//! create_node("Charlie")  -> 0
//! create_node("Charles")  -> 1
//! create_node("Bob")      -> 2
//! add_edge(0, 1); add_edge(0, 2)
//!
//! adjacency:
//!   0: [1, 2]
//!   1: [0]
//!   2: [0]
//! edges: [(0, 1), (0, 2)]
//! ```
//!
//! Duplicate edges are kept (no dedup) and a self-loop `(a, a)` makes `a` its own
//! neighbor twice, so local degree always equals the adjacency list length.

use crate::error::{GraphError, Result};
use std::fmt;
use tracing::debug;

/// Node identifier (zero-indexed, assigned sequentially)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Position of this node in the graph's node table
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[allow(clippy::cast_possible_truncation)] // Graphs >4B nodes not supported
    pub(crate) const fn from_index(idx: usize) -> Self {
        Self(idx as u32)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Undirected social graph backed by per-node adjacency lists
///
/// Nodes and edges are never removed. Once populated, the graph is meant to be
/// shared read-only with [`Traversal`](crate::Traversal) and
/// [`CommunityAssigner`](crate::CommunityAssigner).
///
/// # Example
///
/// ```
/// use social_graph::{NodeId, SocialGraph};
///
/// let mut graph = SocialGraph::new();
/// let charlie = graph.create_node("Charlie");
/// let bob = graph.create_node("Bob");
/// graph.add_edge(charlie, bob).unwrap();
///
/// assert_eq!(graph.neighbors(charlie).unwrap(), &[bob]);
/// assert_eq!(graph.local_degree(bob).unwrap(), 1);
/// assert_eq!(graph.total_edges(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SocialGraph {
    /// Node names, indexed by `NodeId`
    names: Vec<String>,

    /// Neighbor lists in insertion order, indexed by `NodeId`
    /// Invariant: `adjacency.len() == names.len()`
    adjacency: Vec<Vec<NodeId>>,

    /// Edges in insertion order, one entry per `add_edge` call
    edges: Vec<(NodeId, NodeId)>,
}

impl SocialGraph {
    /// Create new empty graph
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from node names and an edge list
    ///
    /// Node `i` of `names` receives `NodeId(i)`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidNode`] if an edge references an id outside
    /// `0..names.len()`. No partially built graph is returned.
    pub fn from_edge_list<I, S>(names: I, edges: &[(NodeId, NodeId)]) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut graph = Self::new();
        for name in names {
            graph.create_node(name);
        }
        for &(a, b) in edges {
            graph.add_edge(a, b)?;
        }
        Ok(graph)
    }

    /// Append a node and return its id
    ///
    /// Names need not be unique.
    pub fn create_node(&mut self, name: impl Into<String>) -> NodeId {
        let id = NodeId::from_index(self.names.len());
        let name = name.into();

        debug!(node = %id, name = %name, "created node");

        self.names.push(name);
        self.adjacency.push(Vec::new());
        id
    }

    /// Add an undirected edge between two existing nodes
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidNode`] if either endpoint is unknown; the
    /// graph is unchanged in that case.
    pub fn add_edge(&mut self, a: NodeId, b: NodeId) -> Result<()> {
        self.check(a)?;
        self.check(b)?;

        self.adjacency[a.index()].push(b);
        self.adjacency[b.index()].push(a);
        self.edges.push((a, b));

        debug!(from = %a, to = %b, total_edges = self.edges.len(), "added edge");
        Ok(())
    }

    /// Neighbors of a node, in insertion order
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidNode`] if the node is unknown.
    pub fn neighbors(&self, node: NodeId) -> Result<&[NodeId]> {
        self.check(node)?;
        Ok(&self.adjacency[node.index()])
    }

    /// Length of the node's adjacency list (multi-edges and self-loops included)
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidNode`] if the node is unknown.
    pub fn local_degree(&self, node: NodeId) -> Result<usize> {
        self.neighbors(node).map(<[NodeId]>::len)
    }

    /// Sum of all local degrees (twice the edge count)
    #[must_use]
    pub fn degree_sum(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum()
    }

    /// Mean local degree over all nodes
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::EmptyGraph`] if the graph has no nodes.
    #[allow(clippy::cast_precision_loss)] // Degree sums >2^52 unlikely
    pub fn average_degree(&self) -> Result<f64> {
        if self.is_empty() {
            return Err(GraphError::EmptyGraph);
        }
        Ok(self.degree_sum() as f64 / self.node_count() as f64)
    }

    /// Number of `add_edge` calls that succeeded
    #[must_use]
    pub fn total_edges(&self) -> usize {
        self.edges.len()
    }

    /// Number of nodes
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.names.len()
    }

    /// True if no node has been created
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// True if the id names a node of this graph
    #[must_use]
    pub fn contains(&self, node: NodeId) -> bool {
        node.index() < self.names.len()
    }

    /// Name of a node
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidNode`] if the node is unknown.
    pub fn name(&self, node: NodeId) -> Result<&str> {
        self.check(node)?;
        Ok(&self.names[node.index()])
    }

    /// First node (lowest id) carrying `name`
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownName`] if no node has that name.
    pub fn node_by_name(&self, name: &str) -> Result<NodeId> {
        self.nodes()
            .find(|(_, candidate)| *candidate == name)
            .map(|(id, _)| id)
            .ok_or_else(|| GraphError::UnknownName(name.to_string()))
    }

    /// Iterate over `(id, name)` pairs in id order
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &str)> + '_ {
        self.names
            .iter()
            .enumerate()
            .map(|(idx, name)| (NodeId::from_index(idx), name.as_str()))
    }

    /// Iterate over inserted edges in insertion order (each undirected edge once)
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.edges.iter().copied()
    }

    /// Iterate over `(id, neighbors)` pairs in id order
    pub fn adjacency(&self) -> impl Iterator<Item = (NodeId, &[NodeId])> + '_ {
        self.adjacency
            .iter()
            .enumerate()
            .map(|(idx, neighbors)| (NodeId::from_index(idx), neighbors.as_slice()))
    }

    fn check(&self, node: NodeId) -> Result<()> {
        if self.contains(node) {
            Ok(())
        } else {
            Err(GraphError::InvalidNode(node))
        }
    }
}
