//! Error types for graph construction and queries
//!
//! Every error is a local precondition violation: the in-memory structures are
//! never left half-updated when one is returned.

use crate::NodeId;
use thiserror::Error;

/// Errors raised by [`SocialGraph`](crate::SocialGraph), [`Traversal`](crate::Traversal)
/// and [`CommunityAssigner`](crate::CommunityAssigner).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// The id does not name a node of the graph.
    #[error("node {0} does not exist in the graph")]
    InvalidNode(NodeId),

    /// Average degree is undefined on a graph without nodes.
    #[error("average degree is undefined for a graph with no nodes")]
    EmptyGraph,

    /// The target was not reached from the traversal source.
    #[error("no path from node {from} to node {to}")]
    NoPath {
        /// Traversal source
        from: NodeId,
        /// Requested target
        to: NodeId,
    },

    /// No node carries the requested name.
    #[error("no node named {0:?}")]
    UnknownName(String),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, GraphError>;
