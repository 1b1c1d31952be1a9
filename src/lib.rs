//! social-graph: in-memory social network analytics
//!
//! # Overview
//!
//! social-graph builds an undirected graph of named people, reports degree
//! statistics, finds BFS shortest paths and closeness, and groups people into
//! communities with a greedy local-modularity heuristic.
//!
//! # Quick Start
//!
//! ```
//! use social_graph::{CommunityAssigner, SocialGraph, Traversal};
//!
//! # fn example() -> social_graph::Result<()> {
//! let mut graph = SocialGraph::new();
//! let charlie = graph.create_node("Charlie");
//! let charles = graph.create_node("Charles");
//! let bob = graph.create_node("Bob");
//! graph.add_edge(charlie, charles)?;
//! graph.add_edge(charles, bob)?;
//!
//! assert_eq!(graph.local_degree(charles)?, 2);
//! assert_eq!(graph.total_edges(), 2);
//!
//! // Shortest path, source and target included
//! let bfs = Traversal::new(&graph, charlie)?;
//! assert_eq!(bfs.path_to(bob)?, vec![charlie, charles, bob]);
//!
//! // Community per person
//! let mut communities = CommunityAssigner::new(&graph);
//! communities.run()?;
//! let label = communities.community_of(bob)?;
//! # let _ = label;
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! # Architecture
//!
//! - **Storage**: append-only adjacency lists ([`SocialGraph`])
//! - **Traversal**: compute-once, source-fixed BFS ([`Traversal`], [`TraversalCache`])
//! - **Communities**: local-moving heuristic ([`CommunityAssigner`]) with aprender's
//!   Louvain as a reference ([`reference_louvain`])
//! - **Errors**: [`GraphError`] via thiserror; events via `tracing`

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod algorithms;
pub mod error;
pub mod storage;

// Re-export core types
pub use algorithms::{
    component_labels, component_of, connected_components, modularity, reference_louvain,
    same_component,
    ClosenessEntry, ClosenessReport, CommunityAssigner, CommunityConfig,
    CommunityDetectionResult, CommunityId, CommunityRun, Distance, Traversal, TraversalCache,
};
pub use error::{GraphError, Result};
pub use storage::{NodeId, SocialGraph};
