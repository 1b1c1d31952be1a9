//! Social network walkthrough: degree stats, paths, closeness, communities
//!
//! Run with: `RUST_LOG=social_graph=debug cargo run --example social_network`

use anyhow::{Context, Result};
use social_graph::{reference_louvain, CommunityAssigner, SocialGraph, TraversalCache};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // 1. Build the friendship graph
    let mut graph = SocialGraph::new();
    for name in [
        "Charlie", "Charles", "Bob", "Ally", "James", "Holly", "Worth", "Jerry",
    ] {
        graph.create_node(name);
    }
    for (a, b) in [
        ("Charlie", "Charles"),
        ("Charlie", "Bob"),
        ("Charlie", "Ally"),
        ("Charles", "Bob"),
        ("Charles", "James"),
        ("Bob", "James"),
        ("Ally", "Holly"),
        ("Holly", "Worth"),
        ("Bob", "Jerry"),
    ] {
        let (a, b) = (graph.node_by_name(a)?, graph.node_by_name(b)?);
        graph.add_edge(a, b)?;
    }

    println!("Social Network Analysis\n");
    println!("Total edges: {}", graph.total_edges());
    println!("Average global degree: {:.2}\n", graph.average_degree()?);

    // 2. Communities
    let mut assigner = CommunityAssigner::new(&graph);
    let run = assigner.run()?;
    let communities = assigner.result();
    println!(
        "Local assignment: {} communities after {} passes ({} moves), modularity {:.3}",
        communities.num_communities, run.passes, run.moves, communities.modularity
    );
    let louvain = reference_louvain(&graph);
    println!(
        "Reference Louvain: {} communities, modularity {:.3}\n",
        louvain.num_communities, louvain.modularity
    );

    // 3. Per-person card, like clicking a node in a front end
    let mut traversals = TraversalCache::new();
    for (id, name) in graph.nodes() {
        let bfs = traversals.get_or_compute(&graph, id)?;
        let community = communities
            .get_community(id)
            .context("every node belongs to a community")?;
        let friends: Vec<&str> = graph
            .neighbors(id)?
            .iter()
            .map(|&friend| graph.name(friend))
            .collect::<social_graph::Result<_>>()?;

        println!("Name: {name}  ID: {id}  Community: {}", community + 1);
        println!("  Friends: {}", friends.join(", "));
        println!("  Local degree: {}", graph.local_degree(id)?);
        println!("  Closeness centrality: {:.3}", bfs.closeness_centrality());
    }

    // 4. Path query
    let (source, target) = (graph.node_by_name("Worth")?, graph.node_by_name("James")?);
    let bfs = traversals.get_or_compute(&graph, source)?;
    if bfs.has_path_to(target)? {
        let path: Vec<&str> = bfs
            .path_to(target)?
            .into_iter()
            .map(|id| graph.name(id))
            .collect::<social_graph::Result<_>>()?;
        println!("\nPath to target: {}", path.join(" -> "));
    } else {
        println!("\nNo path to {}", graph.name(target)?);
    }

    Ok(())
}
