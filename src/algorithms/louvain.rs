//! Community detection results and reference Louvain
//!
//! [`CommunityDetectionResult`] is the read-only view handed to presentation code
//! (community index per node, members per community, modularity). It is produced
//! either by the local [`CommunityAssigner`](crate::CommunityAssigner) heuristic or
//! by [`reference_louvain`], the full multi-level method via aprender.
//!
//! # References
//! - Blondel et al. (2008): "Fast unfolding of communities in large networks"
//! - Newman (2006): "Modularity and community structure in networks"

use crate::storage::{NodeId, SocialGraph};
use aprender::graph::Graph as AprenderGraph;
use std::collections::BTreeMap;
use tracing::debug;

/// Community detection result
#[derive(Debug, Clone)]
pub struct CommunityDetectionResult {
    /// Communities, each containing a list of node IDs
    pub communities: Vec<Vec<NodeId>>,

    /// Total number of communities found
    pub num_communities: usize,

    /// Modularity score (quality metric for community structure)
    pub modularity: f64,
}

impl CommunityDetectionResult {
    /// Build a result from node groups, scoring them against `graph`
    ///
    /// Empty groups are dropped. Modularity is `0.0` for a graph without edges.
    #[must_use]
    pub fn from_communities(graph: &SocialGraph, communities: Vec<Vec<NodeId>>) -> Self {
        let communities: Vec<Vec<NodeId>> = communities
            .into_iter()
            .filter(|community| !community.is_empty())
            .collect();

        let modularity = modularity(graph, &communities);
        let num_communities = communities.len();

        Self {
            communities,
            num_communities,
            modularity,
        }
    }

    /// Get the community index for a given node
    ///
    /// Returns None if node not found in any community
    #[must_use]
    pub fn get_community(&self, node: NodeId) -> Option<usize> {
        self.communities
            .iter()
            .position(|community| community.contains(&node))
    }

    /// Get all nodes in a specific community
    #[must_use]
    pub fn get_community_nodes(&self, comm_id: usize) -> Option<&[NodeId]> {
        self.communities.get(comm_id).map(Vec::as_slice)
    }

    /// Get size of a specific community
    #[must_use]
    pub fn community_size(&self, comm_id: usize) -> Option<usize> {
        self.communities.get(comm_id).map(Vec::len)
    }
}

/// Detect communities using the full Louvain algorithm
///
/// Unlike the single-level [`CommunityAssigner`](crate::CommunityAssigner), this
/// aggregates communities into super-nodes and repeats. Every node of the graph
/// is assigned; nodes without edges become singleton communities.
///
/// # Example
///
/// ```ignore
/// # use social_graph::{reference_louvain, NodeId, SocialGraph};
/// let graph = SocialGraph::from_edge_list(
///     ["a", "b", "c"],
///     &[(NodeId(0), NodeId(1)), (NodeId(1), NodeId(2)), (NodeId(2), NodeId(0))],
/// )?;
///
/// let result = reference_louvain(&graph);
/// println!("Found {} communities", result.num_communities);
/// println!("Modularity: {:.3}", result.modularity);
/// ```
#[must_use]
pub fn reference_louvain(graph: &SocialGraph) -> CommunityDetectionResult {
    let n = graph.node_count();
    let mut assigned = vec![false; n];

    let linked = graph.edges().any(|(a, b)| a != b);
    let mut communities: Vec<Vec<NodeId>> = if linked {
        convert_to_aprender(graph)
            .louvain()
            .into_iter()
            .map(|community| {
                community
                    .into_iter()
                    .filter(|&idx| idx < n)
                    .map(NodeId::from_index)
                    .collect()
            })
            .collect()
    } else {
        Vec::new()
    };

    for node in communities.iter().flatten() {
        assigned[node.index()] = true;
    }

    // Isolated and loop-only nodes are invisible to the edge-list conversion
    for idx in (0..n).filter(|&idx| !assigned[idx]) {
        communities.push(vec![NodeId::from_index(idx)]);
    }

    let result = CommunityDetectionResult::from_communities(graph, communities);
    debug!(
        communities = result.num_communities,
        modularity = result.modularity,
        "reference louvain finished"
    );
    result
}

/// Newman modularity of a partition of `graph`
///
/// ```text
/// Q = Σ_C [ L_C / m  -  (D_C / 2m)² ]
///
///   L_C  edges with both endpoints in C (duplicates and self-loops counted)
///   D_C  summed local degree of C's members
///   m    total edge count
/// ```
///
/// Scored against the multigraph as stored, so it agrees with
/// [`CommunityAssigner::modularity_gain`](crate::CommunityAssigner::modularity_gain).
/// Unknown ids are ignored and nodes missing from every community contribute
/// nothing. Returns `0.0` when the graph has no edges.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn modularity(graph: &SocialGraph, communities: &[Vec<NodeId>]) -> f64 {
    let m = graph.total_edges();
    if m == 0 {
        return 0.0;
    }

    let mut label: Vec<Option<usize>> = vec![None; graph.node_count()];
    let mut degree_total = vec![0usize; communities.len()];
    for (comm, members) in communities.iter().enumerate() {
        for &node in members {
            if let Ok(degree) = graph.local_degree(node) {
                label[node.index()] = Some(comm);
                degree_total[comm] += degree;
            }
        }
    }

    let mut internal = vec![0usize; communities.len()];
    for (a, b) in graph.edges() {
        if let (Some(ca), Some(cb)) = (label[a.index()], label[b.index()]) {
            if ca == cb {
                internal[ca] += 1;
            }
        }
    }

    let m = m as f64;
    internal
        .iter()
        .zip(&degree_total)
        .map(|(&links, &degree)| {
            let share = degree as f64 / (2.0 * m);
            links as f64 / m - share * share
        })
        .sum()
}

/// Convert `SocialGraph` to aprender `Graph` format
///
/// aprender keeps one entry per neighbor pair, so parallel edges are merged
/// into a single edge weighted by their multiplicity. Self-loops carry no
/// information for the partition and are dropped.
fn convert_to_aprender(graph: &SocialGraph) -> AprenderGraph {
    let mut weights: BTreeMap<(usize, usize), f64> = BTreeMap::new();
    for (a, b) in graph.edges().filter(|(a, b)| a != b) {
        let key = (a.index().min(b.index()), a.index().max(b.index()));
        *weights.entry(key).or_insert(0.0) += 1.0;
    }

    let edges: Vec<(usize, usize, f64)> = weights
        .into_iter()
        .map(|((a, b), weight)| (a, b, weight))
        .collect();

    // Create undirected graph from edge list
    AprenderGraph::from_weighted_edges(&edges, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangles(bridge: bool) -> SocialGraph {
        let mut edges = vec![
            (NodeId(0), NodeId(1)),
            (NodeId(1), NodeId(2)),
            (NodeId(2), NodeId(0)),
            (NodeId(3), NodeId(4)),
            (NodeId(4), NodeId(5)),
            (NodeId(5), NodeId(3)),
        ];
        if bridge {
            edges.push((NodeId(2), NodeId(3)));
        }
        SocialGraph::from_edge_list(["a", "b", "c", "d", "e", "f"], &edges).unwrap()
    }

    #[test]
    fn test_reference_louvain_empty_graph() {
        let graph = SocialGraph::new();
        let result = reference_louvain(&graph);

        assert_eq!(result.num_communities, 0);
        assert_eq!(result.communities.len(), 0);
        assert!(result.modularity.abs() < f64::EPSILON);
    }

    #[test]
    fn test_reference_louvain_single_triangle() {
        let graph = SocialGraph::from_edge_list(
            ["a", "b", "c"],
            &[(NodeId(0), NodeId(1)), (NodeId(1), NodeId(2)), (NodeId(2), NodeId(0))],
        )
        .unwrap();

        let result = reference_louvain(&graph);

        assert_eq!(
            result.num_communities, 1,
            "Triangle should form 1 community"
        );
        let comm_0 = result.get_community(NodeId(0));
        assert_eq!(comm_0, result.get_community(NodeId(1)));
        assert_eq!(comm_0, result.get_community(NodeId(2)));
    }

    #[test]
    fn test_reference_louvain_disconnected_components() {
        let result = reference_louvain(&triangles(false));

        assert_eq!(
            result.num_communities, 2,
            "Should find 2 communities for 2 disconnected components"
        );
        let comm_0 = result.get_community(NodeId(0));
        let comm_3 = result.get_community(NodeId(3));
        assert!(comm_0.is_some() && comm_3.is_some());
        assert_ne!(comm_0, comm_3);
    }

    #[test]
    fn test_reference_louvain_assigns_isolated_nodes() {
        let mut graph = triangles(true);
        let loner = graph.create_node("loner");

        let result = reference_louvain(&graph);

        let assigned: std::collections::HashSet<_> =
            result.communities.iter().flatten().copied().collect();
        assert_eq!(assigned.len(), 7);
        let loner_comm = result.get_community(loner).unwrap();
        assert_eq!(result.community_size(loner_comm), Some(1));
        assert!(result.modularity > 0.0);
    }

    #[test]
    fn test_modularity_scores() {
        let graph = triangles(false);
        let split = vec![
            vec![NodeId(0), NodeId(1), NodeId(2)],
            vec![NodeId(3), NodeId(4), NodeId(5)],
        ];
        let lumped = vec![(0..6).map(NodeId).collect::<Vec<_>>()];

        assert!(modularity(&graph, &split) > 0.0);
        assert!(modularity(&graph, &split) > modularity(&graph, &lumped));
        assert!(modularity(&SocialGraph::new(), &[]).abs() < f64::EPSILON);
    }

    #[test]
    fn test_modularity_counts_parallel_edges() {
        // 0 = 1 doubled, 1 - 2; m = 3, degrees [2, 3, 1]
        let graph = SocialGraph::from_edge_list(
            ["a", "b", "c"],
            &[(NodeId(0), NodeId(1)), (NodeId(0), NodeId(1)), (NodeId(1), NodeId(2))],
        )
        .unwrap();

        let whole = vec![vec![NodeId(0), NodeId(1), NodeId(2)]];
        assert!(modularity(&graph, &whole).abs() < 1e-12);

        // 2/3 - (5/6)² - (1/6)²
        let pair = vec![vec![NodeId(0), NodeId(1)], vec![NodeId(2)]];
        assert!((modularity(&graph, &pair) - (-1.0 / 18.0)).abs() < 1e-12);

        // -(4 + 9 + 1) / 36
        let singles: Vec<Vec<NodeId>> = (0..3).map(|i| vec![NodeId(i)]).collect();
        assert!((modularity(&graph, &singles) - (-14.0 / 36.0)).abs() < 1e-12);
    }

    #[test]
    fn test_modularity_counts_self_loops() {
        let mut graph = SocialGraph::new();
        let a = graph.create_node("a");
        graph.add_edge(a, a).unwrap();
        assert!(modularity(&graph, &[vec![a]]).abs() < 1e-12);

        // 0 loops, 0 - 1; m = 2, degrees [3, 1]: 1/2 - (3/4)² - (1/4)²
        let b = graph.create_node("b");
        graph.add_edge(a, b).unwrap();
        let q = modularity(&graph, &[vec![a], vec![b]]);
        assert!((q - (-1.0 / 8.0)).abs() < 1e-12);
    }

    #[test]
    fn test_reference_louvain_with_parallel_edges_and_loops() {
        let mut graph = triangles(true);
        graph.add_edge(NodeId(0), NodeId(1)).unwrap();
        graph.add_edge(NodeId(4), NodeId(4)).unwrap();

        let result = reference_louvain(&graph);
        let assigned: std::collections::HashSet<_> =
            result.communities.iter().flatten().copied().collect();
        assert_eq!(assigned.len(), 6);
        assert!((result.modularity - modularity(&graph, &result.communities)).abs() < 1e-12);

        let mut lonely = SocialGraph::new();
        let solo = lonely.create_node("solo");
        lonely.add_edge(solo, solo).unwrap();
        let result = reference_louvain(&lonely);
        assert_eq!(result.communities, vec![vec![solo]]);
        assert!(result.modularity.abs() < 1e-12);
    }

    #[test]
    fn test_community_detection_result_api() {
        let graph = triangles(true);
        let result = CommunityDetectionResult::from_communities(
            &graph,
            vec![
                vec![NodeId(0), NodeId(1), NodeId(2)],
                vec![],
                vec![NodeId(3), NodeId(4), NodeId(5)],
            ],
        );

        assert_eq!(result.num_communities, 2); // empty group dropped
        assert_eq!(result.get_community(NodeId(0)), Some(0));
        assert_eq!(result.get_community(NodeId(3)), Some(1));
        assert_eq!(result.get_community(NodeId(99)), None);

        assert_eq!(
            result.get_community_nodes(1),
            Some(&[NodeId(3), NodeId(4), NodeId(5)] as &[NodeId])
        );
        assert_eq!(result.get_community_nodes(2), None);
        assert_eq!(result.community_size(0), Some(3));
        assert_eq!(result.community_size(2), None);
    }
}
