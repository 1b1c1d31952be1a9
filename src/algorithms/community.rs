//! Greedy local community assignment
//!
//! Single-level local-moving phase of Louvain: every node starts in its own
//! community, then nodes repeatedly join the neighboring community with the best
//! modularity-gain proxy until a full pass makes no move.
//!
//! Gain of inserting node `i` into community `C` (with `i` itself left out of `C`):
//!
//! ```text
//! gain(i, C) = k_i,C / m  -  γ · Σ_C · k_i / (2m²)
//!
//!   k_i,C  neighbors of i assigned to C (self-loops ignored)
//!   Σ_C    summed local degree of C's members
//!   k_i    local degree of i
//!   m      total edge count
//!   γ      resolution
//! ```
//!
//! A node moves only when the best candidate beats both the configured minimum
//! gain and the gain of staying put, so every accepted move strictly increases
//! modularity. Per-community aggregates are recomputed from the assignment on
//! every evaluation; nothing is cached between calls.

use crate::algorithms::louvain::CommunityDetectionResult;
use crate::error::{GraphError, Result};
use crate::storage::{NodeId, SocialGraph};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, trace, warn};

/// Community label
///
/// Labels are node ids at start (`node v` → `CommunityId(v)`), so they are
/// sparse after assignment. Use [`CommunityAssigner::result`] for contiguous
/// indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommunityId(pub u32);

impl From<NodeId> for CommunityId {
    fn from(node: NodeId) -> Self {
        Self(node.0)
    }
}

impl fmt::Display for CommunityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tuning knobs for [`CommunityAssigner`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommunityConfig {
    /// Hard cap on full passes over all nodes
    pub max_passes: usize,

    /// Weight of the degree normalization term (γ)
    pub resolution: f64,

    /// A move needs a gain strictly above this
    pub min_gain: f64,
}

impl Default for CommunityConfig {
    fn default() -> Self {
        Self {
            max_passes: 100,
            resolution: 1.0,
            min_gain: 0.0,
        }
    }
}

impl CommunityConfig {
    /// Set the pass cap
    #[must_use]
    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes;
        self
    }

    /// Set the resolution γ
    #[must_use]
    pub fn with_resolution(mut self, resolution: f64) -> Self {
        self.resolution = resolution;
        self
    }

    /// Set the minimum gain; negative values are clamped to zero
    #[must_use]
    pub fn with_min_gain(mut self, min_gain: f64) -> Self {
        self.min_gain = min_gain.max(0.0);
        self
    }
}

/// Outcome of [`CommunityAssigner::run`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommunityRun {
    /// Full passes performed
    pub passes: usize,

    /// Node moves accepted over all passes
    pub moves: usize,

    /// True if the last pass made no move (fixed point reached)
    pub converged: bool,
}

/// Local community detection over a read-only graph
///
/// Owns its assignment map; not meant to be driven from several callers at once.
///
/// # Example
///
/// ```
/// use social_graph::{CommunityAssigner, NodeId, SocialGraph};
///
/// // Two triangles joined by the edge 2 - 3
/// let graph = SocialGraph::from_edge_list(
///     ["a", "b", "c", "d", "e", "f"],
///     &[
///         (NodeId(0), NodeId(1)), (NodeId(1), NodeId(2)), (NodeId(2), NodeId(0)),
///         (NodeId(3), NodeId(4)), (NodeId(4), NodeId(5)), (NodeId(5), NodeId(3)),
///         (NodeId(2), NodeId(3)),
///     ],
/// )
/// .unwrap();
///
/// let mut assigner = CommunityAssigner::new(&graph);
/// let run = assigner.run().unwrap();
/// assert!(run.converged);
///
/// let result = assigner.result();
/// assert_eq!(result.num_communities, 2);
/// ```
#[derive(Debug, Clone)]
pub struct CommunityAssigner<'g> {
    graph: &'g SocialGraph,
    config: CommunityConfig,

    /// One label per node, indexed by `NodeId`
    assignment: Vec<CommunityId>,
}

impl<'g> CommunityAssigner<'g> {
    /// Create an assigner with default configuration; every node is its own community
    #[must_use]
    pub fn new(graph: &'g SocialGraph) -> Self {
        Self::with_config(graph, CommunityConfig::default())
    }

    /// Create an assigner with explicit configuration
    #[must_use]
    pub fn with_config(graph: &'g SocialGraph, config: CommunityConfig) -> Self {
        let assignment = graph.nodes().map(|(id, _)| CommunityId::from(id)).collect();
        Self {
            graph,
            config,
            assignment,
        }
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &CommunityConfig {
        &self.config
    }

    /// Current label of every node, in id order
    #[must_use]
    pub fn assignment(&self) -> &[CommunityId] {
        &self.assignment
    }

    /// Current label of `node`
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidNode`] if the node is unknown.
    pub fn community_of(&self, node: NodeId) -> Result<CommunityId> {
        self.assignment
            .get(node.index())
            .copied()
            .ok_or(GraphError::InvalidNode(node))
    }

    /// Members of `community`, in id order
    #[must_use]
    pub fn community_members(&self, community: CommunityId) -> Vec<NodeId> {
        self.members(community).collect()
    }

    /// Number of nodes currently labeled `community`
    ///
    /// Unused labels are valid empty communities and report `0`.
    #[must_use]
    pub fn community_size(&self, community: CommunityId) -> usize {
        self.members(community).count()
    }

    /// Modularity-gain proxy for inserting `node` into `community`
    ///
    /// `node` is excluded from the community's degree total, so the score for
    /// its own community is the gain of staying. Higher means a stronger pull;
    /// scores are comparable across communities for the same node.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidNode`] if the node is unknown.
    #[allow(clippy::cast_precision_loss)]
    pub fn modularity_gain(&self, node: NodeId, community: CommunityId) -> Result<f64> {
        let neighbors = self.graph.neighbors(node)?;
        let m = self.graph.total_edges();
        if m == 0 {
            return Ok(0.0);
        }

        let links_in = neighbors
            .iter()
            .filter(|&&neighbor| neighbor != node && self.assignment[neighbor.index()] == community)
            .count();

        let degree_total: usize = self
            .members(community)
            .filter(|&member| member != node)
            .map(|member| self.graph.local_degree(member))
            .sum::<Result<usize>>()?;

        let m = m as f64;
        let k_i = neighbors.len() as f64;

        // Single division over a shared denominator keeps equal-valued gains bit-equal
        let numerator =
            2.0 * m * links_in as f64 - self.config.resolution * degree_total as f64 * k_i;
        Ok(numerator / (2.0 * m * m))
    }

    /// Best community for `node` among its neighbors' communities
    ///
    /// Returns the current community unless some other neighboring community
    /// offers a gain strictly above both `min_gain` and the gain of staying.
    /// Ties go to the candidate met first in adjacency order.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidNode`] if the node is unknown.
    pub fn find_best_community(&self, node: NodeId) -> Result<CommunityId> {
        Ok(self
            .best_move(node)?
            .map_or(self.assignment[node.index()], |(community, _)| community))
    }

    /// Put `node` into `community`
    ///
    /// No aggregate is updated; later gain evaluations read the new assignment.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidNode`] if the node is unknown.
    pub fn move_node(&mut self, node: NodeId, community: CommunityId) -> Result<()> {
        let slot = self
            .assignment
            .get_mut(node.index())
            .ok_or(GraphError::InvalidNode(node))?;
        *slot = community;
        Ok(())
    }

    /// Sweep all nodes in id order until a pass makes no move or the pass cap
    /// is hit
    ///
    /// # Errors
    ///
    /// Propagates [`GraphError::InvalidNode`], which only occurs if the graph
    /// and assignment disagree.
    pub fn run(&mut self) -> Result<CommunityRun> {
        let n = self.assignment.len();
        let mut passes = 0;
        let mut moves = 0;
        let mut converged = false;

        while passes < self.config.max_passes {
            passes += 1;
            let mut pass_moves = 0;

            for idx in 0..n {
                let node = NodeId::from_index(idx);
                if let Some((target, gain)) = self.best_move(node)? {
                    trace!(
                        node = %node,
                        from = %self.assignment[idx],
                        to = %target,
                        gain,
                        "moving node"
                    );
                    self.move_node(node, target)?;
                    pass_moves += 1;
                }
            }

            moves += pass_moves;
            debug!(pass = passes, moves = pass_moves, "community pass finished");

            if pass_moves == 0 {
                converged = true;
                break;
            }
        }

        if converged {
            debug!(passes, moves, "community assignment converged");
        } else {
            warn!(
                passes,
                moves,
                max_passes = self.config.max_passes,
                "community assignment hit pass cap before converging"
            );
        }

        Ok(CommunityRun {
            passes,
            moves,
            converged,
        })
    }

    /// Current assignment as contiguous communities, scored by modularity
    ///
    /// Communities are numbered in order of their lowest member id.
    #[must_use]
    pub fn result(&self) -> CommunityDetectionResult {
        let mut index: HashMap<CommunityId, usize> = HashMap::new();
        let mut communities: Vec<Vec<NodeId>> = Vec::new();

        for (idx, &label) in self.assignment.iter().enumerate() {
            let slot = *index.entry(label).or_insert_with(|| {
                communities.push(Vec::new());
                communities.len() - 1
            });
            communities[slot].push(NodeId::from_index(idx));
        }

        CommunityDetectionResult::from_communities(self.graph, communities)
    }

    /// Winning candidate and its gain, or `None` when staying is best
    fn best_move(&self, node: NodeId) -> Result<Option<(CommunityId, f64)>> {
        let current = self.community_of(node)?;
        let stay = self.modularity_gain(node, current)?;
        let threshold = stay.max(self.config.min_gain);

        let mut best: Option<(CommunityId, f64)> = None;
        let mut seen = Vec::new();

        for &neighbor in self.graph.neighbors(node)? {
            let candidate = self.assignment[neighbor.index()];
            if candidate == current || seen.contains(&candidate) {
                continue;
            }
            seen.push(candidate);

            let gain = self.modularity_gain(node, candidate)?;
            if gain > threshold && best.map_or(true, |(_, best_gain)| gain > best_gain) {
                best = Some((candidate, gain));
            }
        }

        Ok(best)
    }

    fn members(&self, community: CommunityId) -> impl Iterator<Item = NodeId> + '_ {
        self.assignment
            .iter()
            .enumerate()
            .filter(move |(_, &label)| label == community)
            .map(|(idx, _)| NodeId::from_index(idx))
    }
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
    fn test_initial_assignment_is_singletons() {
        let graph = triangles(false);
        let assigner = CommunityAssigner::new(&graph);

        for (idx, &label) in assigner.assignment().iter().enumerate() {
            assert_eq!(label, CommunityId::from(NodeId::from_index(idx)));
        }
        assert_eq!(assigner.assignment().len(), graph.node_count());
    }

    #[test]
    fn test_modularity_gain_values() {
        let graph = triangles(false); // m = 6, every degree 2
        let assigner = CommunityAssigner::new(&graph);

        // One link to a degree-2 community: 1/6 - 2*2/72
        let gain = assigner.modularity_gain(NodeId(0), CommunityId(1)).unwrap();
        assert!((gain - (1.0 / 6.0 - 4.0 / 72.0)).abs() < 1e-12);

        // Staying alone: no links, no degree mass
        let stay = assigner.modularity_gain(NodeId(0), CommunityId(0)).unwrap();
        assert!(stay.abs() < f64::EPSILON);

        // Community in the other triangle: no links, so negative
        let far = assigner.modularity_gain(NodeId(0), CommunityId(4)).unwrap();
        assert!(far < 0.0);

        assert_eq!(
            assigner.modularity_gain(NodeId(42), CommunityId(0)),
            Err(GraphError::InvalidNode(NodeId(42)))
        );
    }

    #[test]
    fn test_resolution_scales_penalty() {
        let graph = triangles(false);
        let strict = CommunityAssigner::with_config(
            &graph,
            CommunityConfig::default().with_resolution(10.0),
        );

        // 1/6 - 10 * 4/72 < 0: no candidate is worth joining
        assert!(strict.modularity_gain(NodeId(0), CommunityId(1)).unwrap() < 0.0);
        assert_eq!(strict.find_best_community(NodeId(0)).unwrap(), CommunityId(0));
    }

    #[test]
    fn test_find_best_community_ties_go_to_first_neighbor() {
        let graph = triangles(false);
        let assigner = CommunityAssigner::new(&graph);

        // Communities 1 and 2 score the same for node 0; 1 comes first in adjacency
        assert_eq!(assigner.find_best_community(NodeId(0)).unwrap(), CommunityId(1));
    }

    #[test]
    fn test_isolated_node_stays_put() {
        let mut graph = triangles(false);
        let loner = graph.create_node("loner");
        let mut assigner = CommunityAssigner::new(&graph);

        assert_eq!(
            assigner.find_best_community(loner).unwrap(),
            CommunityId::from(loner)
        );
        assigner.run().unwrap();
        assert_eq!(assigner.community_of(loner).unwrap(), CommunityId::from(loner));
    }

    #[test]
    fn test_move_node() {
        let graph = triangles(false);
        let mut assigner = CommunityAssigner::new(&graph);

        assigner.move_node(NodeId(0), CommunityId(1)).unwrap();
        assert_eq!(assigner.community_of(NodeId(0)).unwrap(), CommunityId(1));
        assert_eq!(
            assigner.community_members(CommunityId(1)),
            vec![NodeId(0), NodeId(1)]
        );
        assert!(assigner.community_members(CommunityId(0)).is_empty());
        assert_eq!(assigner.community_size(CommunityId(1)), 2);
        assert_eq!(assigner.community_size(CommunityId(0)), 0);
        assert_eq!(assigner.community_size(CommunityId(2)), 1);
        assert_eq!(assigner.community_size(CommunityId(77)), 0);

        assert_eq!(
            assigner.move_node(NodeId(9), CommunityId(1)),
            Err(GraphError::InvalidNode(NodeId(9)))
        );
    }

    #[test]
    fn test_run_two_triangles_with_bridge() {
        let graph = triangles(true);
        let mut assigner = CommunityAssigner::new(&graph);

        let run = assigner.run().unwrap();
        assert!(run.converged);
        assert!(run.moves > 0);

        let a = assigner.community_of(NodeId(0)).unwrap();
        let b = assigner.community_of(NodeId(3)).unwrap();
        assert_ne!(a, b);
        for node in [NodeId(1), NodeId(2)] {
            assert_eq!(assigner.community_of(node).unwrap(), a);
        }
        for node in [NodeId(4), NodeId(5)] {
            assert_eq!(assigner.community_of(node).unwrap(), b);
        }

        let result = assigner.result();
        assert_eq!(assigner.community_size(a), 3);
        assert_eq!(assigner.community_size(b), 3);

        assert_eq!(result.num_communities, 2);
        assert_eq!(result.get_community(NodeId(0)), Some(0));
        assert_eq!(result.get_community(NodeId(5)), Some(1));
        assert!(result.modularity > 0.0);
    }

    #[test]
    fn test_run_is_idempotent_after_convergence() {
        let graph = triangles(true);
        let mut assigner = CommunityAssigner::new(&graph);
        assigner.run().unwrap();
        let settled = assigner.assignment().to_vec();

        let again = assigner.run().unwrap();
        assert_eq!(again.passes, 1);
        assert_eq!(again.moves, 0);
        assert_eq!(assigner.assignment(), settled.as_slice());
    }

    #[test]
    fn test_pass_cap() {
        let graph = triangles(true);
        let mut assigner =
            CommunityAssigner::with_config(&graph, CommunityConfig::default().with_max_passes(1));

        let run = assigner.run().unwrap();
        assert_eq!(run.passes, 1);
        assert!(!run.converged);

        let mut idle =
            CommunityAssigner::with_config(&graph, CommunityConfig::default().with_max_passes(0));
        let run = idle.run().unwrap();
        assert_eq!(run.passes, 0);
        assert_eq!(run.moves, 0);
    }

    #[test]
    fn test_min_gain_blocks_weak_moves() {
        let graph = triangles(false);
        let mut assigner =
            CommunityAssigner::with_config(&graph, CommunityConfig::default().with_min_gain(1.0));

        let run = assigner.run().unwrap();
        assert_eq!(run.moves, 0);
        assert!(run.converged);
        assert_eq!(CommunityConfig::default().with_min_gain(-3.0).min_gain, 0.0);
    }

    #[test]
    fn test_empty_graph() {
        let graph = SocialGraph::new();
        let mut assigner = CommunityAssigner::new(&graph);
        let run = assigner.run().unwrap();

        assert!(run.converged);
        assert_eq!(run.moves, 0);
        assert_eq!(assigner.result().num_communities, 0);
    }
}
