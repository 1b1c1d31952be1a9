//! Breadth-first shortest paths and closeness (BFS, `path_to`, closeness report)
//!
//! Based on Ligra (Shun & Blelloch, `PPoPP` 2013) frontier-based traversal patterns,
//! specialised to a single fixed source over an unweighted, undirected graph.
//!
//! A [`Traversal`] is computed once, eagerly, from a snapshot of the graph and is
//! never recomputed. It is source-fixed: after new nodes or edges are added the
//! caller must build a fresh one. [`TraversalCache`] does this on its own when it
//! sees the graph has grown.

use crate::error::{GraphError, Result};
use crate::storage::{NodeId, SocialGraph};
use std::collections::hash_map::Entry;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use tracing::debug;

/// BFS distance from the traversal source
///
/// Ordered so that every `Hops(_)` sorts before `Unreachable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Distance {
    /// Number of edges on a shortest path
    Hops(u32),
    /// No path from the source
    Unreachable,
}

impl Distance {
    /// Hop count, if reachable
    #[must_use]
    pub const fn hops(self) -> Option<u32> {
        match self {
            Self::Hops(hops) => Some(hops),
            Self::Unreachable => None,
        }
    }

    /// True for `Hops(_)`
    #[must_use]
    pub const fn is_reachable(self) -> bool {
        matches!(self, Self::Hops(_))
    }
}

impl From<Option<u32>> for Distance {
    fn from(hops: Option<u32>) -> Self {
        hops.map_or(Self::Unreachable, Self::Hops)
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hops(hops) => write!(f, "{hops}"),
            Self::Unreachable => f.write_str("unreachable"),
        }
    }
}

/// Single-source BFS result: distance and predecessor per node
///
/// # Example
///
/// ```
/// use social_graph::{Distance, NodeId, SocialGraph, Traversal};
///
/// let graph = SocialGraph::from_edge_list(
///     ["a", "b", "c", "d"],
///     &[(NodeId(0), NodeId(1)), (NodeId(1), NodeId(2))],
/// )
/// .unwrap();
///
/// let bfs = Traversal::new(&graph, NodeId(0)).unwrap();
/// assert_eq!(bfs.distance_to(NodeId(2)).unwrap(), Distance::Hops(2));
/// assert_eq!(bfs.path_to(NodeId(2)).unwrap(), vec![NodeId(0), NodeId(1), NodeId(2)]);
/// assert!(!bfs.has_path_to(NodeId(3)).unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct Traversal {
    source: NodeId,

    /// `None` = unreached. Length: node count at construction time
    distance: Vec<Option<u32>>,

    /// First-discovered predecessor on a shortest path. Length: node count
    predecessor: Vec<Option<NodeId>>,
}

impl Traversal {
    /// Run BFS from `source` over the current state of `graph`
    ///
    /// Neighbors are visited in adjacency insertion order, so among several
    /// shortest paths the first-discovered predecessor wins.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidNode`] if `source` is not in the graph.
    pub fn new(graph: &SocialGraph, source: NodeId) -> Result<Self> {
        if !graph.contains(source) {
            return Err(GraphError::InvalidNode(source));
        }

        let n = graph.node_count();
        let mut distance = vec![None; n];
        let mut predecessor = vec![None; n];
        let mut queue = VecDeque::new();

        distance[source.index()] = Some(0);
        queue.push_back(source);

        while let Some(current) = queue.pop_front() {
            let next = distance[current.index()].map_or(0, |d| d + 1);

            for &neighbor in graph.neighbors(current)? {
                let slot = &mut distance[neighbor.index()];
                if slot.is_none() {
                    *slot = Some(next);
                    predecessor[neighbor.index()] = Some(current);
                    queue.push_back(neighbor);
                }
            }
        }

        let traversal = Self {
            source,
            distance,
            predecessor,
        };
        debug!(
            source = %source,
            reached = traversal.reachable_count(),
            nodes = n,
            "computed BFS traversal"
        );
        Ok(traversal)
    }

    /// Source node this traversal was computed from
    #[must_use]
    pub const fn source(&self) -> NodeId {
        self.source
    }

    /// Number of nodes in the graph snapshot
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.distance.len()
    }

    /// Number of nodes reached, source included
    #[must_use]
    pub fn reachable_count(&self) -> usize {
        self.distance.iter().filter(|d| d.is_some()).count()
    }

    /// BFS distance from the source to `target`
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidNode`] if `target` was not in the graph snapshot.
    pub fn distance_to(&self, target: NodeId) -> Result<Distance> {
        self.distance
            .get(target.index())
            .map(|&hops| Distance::from(hops))
            .ok_or(GraphError::InvalidNode(target))
    }

    /// True iff `target` was reached
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidNode`] if `target` was not in the graph snapshot.
    pub fn has_path_to(&self, target: NodeId) -> Result<bool> {
        self.distance_to(target).map(Distance::is_reachable)
    }

    /// Shortest path from the source to `target`, both ends included
    ///
    /// The returned vector has `distance + 1` entries; `path_to(source)` is
    /// `[source]`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidNode`] for an unknown target and
    /// [`GraphError::NoPath`] if the target was not reached.
    pub fn path_to(&self, target: NodeId) -> Result<Vec<NodeId>> {
        let Distance::Hops(hops) = self.distance_to(target)? else {
            return Err(GraphError::NoPath {
                from: self.source,
                to: target,
            });
        };

        let mut path = Vec::with_capacity(hops as usize + 1);
        let mut current = target;
        path.push(current);

        // BFS layering guarantees the predecessor chain is acyclic and ends at source
        while let Some(previous) = self.predecessor[current.index()] {
            path.push(previous);
            current = previous;
        }

        path.reverse();
        Ok(path)
    }

    /// Predecessor of `node` on its shortest path, `None` for the source and
    /// unreached nodes
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidNode`] if `node` was not in the graph snapshot.
    pub fn predecessor_of(&self, node: NodeId) -> Result<Option<NodeId>> {
        self.predecessor
            .get(node.index())
            .copied()
            .ok_or(GraphError::InvalidNode(node))
    }

    /// Distance from the source to every other node, in id order
    #[must_use]
    pub fn closeness_report(&self) -> ClosenessReport {
        let entries = self
            .distance
            .iter()
            .enumerate()
            .map(|(idx, &hops)| ClosenessEntry {
                node: NodeId::from_index(idx),
                distance: Distance::from(hops),
            })
            .filter(|entry| entry.node != self.source)
            .collect();

        ClosenessReport {
            source: self.source,
            entries,
        }
    }

    /// Closeness centrality of the source
    ///
    /// Wasserman-Faust form: `(r - 1) / Σd · (r - 1) / (n - 1)`, where `r` counts
    /// the reached nodes (source included) and `Σd` sums their distances. Yields
    /// `0.0` when no other node is reachable.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn closeness_centrality(&self) -> f64 {
        let n = self.distance.len();
        let reached = self.reachable_count();
        let total: u64 = self.distance.iter().flatten().map(|&d| u64::from(d)).sum();

        if reached <= 1 || total == 0 {
            return 0.0;
        }

        let others = (reached - 1) as f64;
        (others / total as f64) * (others / (n - 1) as f64)
    }
}

/// One row of a [`ClosenessReport`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClosenessEntry {
    /// Node the distance refers to
    pub node: NodeId,
    /// Distance from the report's source
    pub distance: Distance,
}

/// Distances from one source to every other node
///
/// Unreached nodes stay in the report as [`Distance::Unreachable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosenessReport {
    source: NodeId,
    entries: Vec<ClosenessEntry>,
}

impl ClosenessReport {
    /// Source of the underlying traversal
    #[must_use]
    pub const fn source(&self) -> NodeId {
        self.source
    }

    /// All entries in id order (source excluded)
    #[must_use]
    pub fn entries(&self) -> &[ClosenessEntry] {
        &self.entries
    }

    /// Distance recorded for `node`, `None` for the source or unknown ids
    #[must_use]
    pub fn get(&self, node: NodeId) -> Option<Distance> {
        self.entries
            .iter()
            .find(|entry| entry.node == node)
            .map(|entry| entry.distance)
    }

    /// Reachable entries, closest first (ties by id)
    #[must_use]
    pub fn ranked(&self) -> Vec<ClosenessEntry> {
        let mut ranked: Vec<_> = self
            .entries
            .iter()
            .copied()
            .filter(|entry| entry.distance.is_reachable())
            .collect();
        ranked.sort_by_key(|entry| (entry.distance, entry.node));
        ranked
    }

    /// Nodes with no path from the source
    pub fn unreachable(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.entries
            .iter()
            .filter(|entry| !entry.distance.is_reachable())
            .map(|entry| entry.node)
    }
}

impl fmt::Display for ClosenessReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "{}: {}", entry.node, entry.distance)?;
        }
        Ok(())
    }
}

/// Caller-owned memo of traversals keyed by source
///
/// Remembers the node and edge counts of the graph it was filled from. The graph
/// is append-only, so a change in either count means it grew and every cached
/// traversal is dropped before the next lookup. One cache serves one graph.
///
/// # Example
///
/// ```
/// use social_graph::{NodeId, SocialGraph, TraversalCache};
///
/// let graph = SocialGraph::from_edge_list(["a", "b"], &[(NodeId(0), NodeId(1))]).unwrap();
/// let mut cache = TraversalCache::new();
///
/// assert!(cache.get_or_compute(&graph, NodeId(0)).unwrap().has_path_to(NodeId(1)).unwrap());
/// assert_eq!(cache.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TraversalCache {
    traversals: HashMap<NodeId, Traversal>,

    /// `(node_count, total_edges)` of the graph the entries were computed on
    shape: Option<(usize, usize)>,
}

impl TraversalCache {
    /// Create empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached traversal for `source`, computing it on first use
    ///
    /// Entries computed before `graph` grew are discarded first.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidNode`] if `source` is not in the graph.
    pub fn get_or_compute(&mut self, graph: &SocialGraph, source: NodeId) -> Result<&Traversal> {
        let shape = (graph.node_count(), graph.total_edges());
        if self.shape != Some(shape) {
            if !self.traversals.is_empty() {
                debug!(
                    stale = self.traversals.len(),
                    nodes = shape.0,
                    edges = shape.1,
                    "graph changed, dropping cached traversals"
                );
            }
            self.traversals.clear();
            self.shape = Some(shape);
        }

        let traversal = match self.traversals.entry(source) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(Traversal::new(graph, source)?),
        };
        Ok(&*traversal)
    }

    /// Cached traversal for `source`, if already computed
    #[must_use]
    pub fn get(&self, source: NodeId) -> Option<&Traversal> {
        self.traversals.get(&source)
    }

    /// Number of cached sources
    #[must_use]
    pub fn len(&self) -> usize {
        self.traversals.len()
    }

    /// True if nothing is cached
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.traversals.is_empty()
    }

    /// Drop every cached traversal
    pub fn clear(&mut self) {
        self.traversals.clear();
        self.shape = None;
    }
}
