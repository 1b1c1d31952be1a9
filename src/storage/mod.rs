//! Graph storage layer
//!
//! Provides the append-only adjacency-list representation of the social graph.

pub mod adjacency;

pub use adjacency::{NodeId, SocialGraph};
