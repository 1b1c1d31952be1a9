//! Graph algorithms (BFS shortest paths, components, community detection)
//!
//! All algorithms read a [`SocialGraph`](crate::SocialGraph) and keep their own
//! state; none of them mutate the graph.

pub mod community;
pub mod louvain;
pub mod structure;
pub mod traversal;

pub use community::{CommunityAssigner, CommunityConfig, CommunityId, CommunityRun};
pub use louvain::{modularity, reference_louvain, CommunityDetectionResult};
pub use structure::{component_labels, component_of, connected_components, same_component};
pub use traversal::{ClosenessEntry, ClosenessReport, Distance, Traversal, TraversalCache};
