//! Graph structure algorithms: connected components
//!
//! - `connected_components`: Count connected components
//! - `component_labels`: Component index per node
//! - `component_of`: Component index of one node
//! - `same_component`: Reachability check without building a full [`Traversal`](crate::Traversal)
//!
//! # Example
//!
//! ```
//! use social_graph::{connected_components, NodeId, SocialGraph};
//!
//! // Two components: 0 - 1 and 2 - 3
//! let graph = SocialGraph::from_edge_list(
//!     ["a", "b", "c", "d"],
//!     &[(NodeId(0), NodeId(1)), (NodeId(2), NodeId(3))],
//! )
//! .unwrap();
//!
//! assert_eq!(connected_components(&graph), 2);
//! ```

use crate::error::{GraphError, Result};
use crate::storage::{NodeId, SocialGraph};

/// Count the number of connected components in the graph
///
/// Isolated nodes form their own component. An empty graph has zero.
#[must_use]
pub fn connected_components(graph: &SocialGraph) -> usize {
    component_labels(graph)
        .iter()
        .max()
        .map_or(0, |&last| last + 1)
}

/// Component index for every node, in id order
///
/// Components are numbered `0..k` in order of their lowest node id.
#[must_use]
pub fn component_labels(graph: &SocialGraph) -> Vec<usize> {
    let n = graph.node_count();
    let mut labels: Vec<Option<usize>> = vec![None; n];
    let mut next_label = 0;
    let mut stack = Vec::new();

    for start in 0..n {
        if labels[start].is_some() {
            continue;
        }

        labels[start] = Some(next_label);
        stack.push(NodeId::from_index(start));

        while let Some(node) = stack.pop() {
            // Ids come from the graph itself, so lookups cannot fail
            let neighbors = graph.neighbors(node).unwrap_or_default();
            for &neighbor in neighbors {
                if labels[neighbor.index()].is_none() {
                    labels[neighbor.index()] = Some(next_label);
                    stack.push(neighbor);
                }
            }
        }

        next_label += 1;
    }

    labels.into_iter().flatten().collect()
}

/// Component index of `node`, numbered as in [`component_labels`]
///
/// # Errors
///
/// Returns [`GraphError::InvalidNode`] if the node is unknown.
pub fn component_of(graph: &SocialGraph, node: NodeId) -> Result<usize> {
    component_labels(graph)
        .get(node.index())
        .copied()
        .ok_or(GraphError::InvalidNode(node))
}

/// True if `a` and `b` lie in the same component
///
/// # Errors
///
/// Returns [`GraphError::InvalidNode`] if either node is unknown.
pub fn same_component(graph: &SocialGraph, a: NodeId, b: NodeId) -> Result<bool> {
    for node in [a, b] {
        if !graph.contains(node) {
            return Err(GraphError::InvalidNode(node));
        }
    }

    let labels = component_labels(graph);
    Ok(labels[a.index()] == labels[b.index()])
}
