// src/rank/queries.rs
use std::cmp::Ordering;

use super::graph::RankGraph;

/// Nodes by descending rank, ties broken by ascending name.
#[must_use]
pub fn get_ranked_nodes(graph: &RankGraph) -> Vec<(String, f64)> {
    let mut ranked: Vec<_> = graph
        .nodes()
        .iter()
        .zip(graph.rank_values())
        .map(|(node, rank)| (node.name.clone(), rank))
        .collect();
    ranked.sort_by(compare_ranked);
    ranked
}

/// The `limit` highest-ranked nodes.
#[must_use]
pub fn get_top_nodes(graph: &RankGraph, limit: usize) -> Vec<(String, f64)> {
    let mut ranked = get_ranked_nodes(graph);
    ranked.truncate(limit);
    ranked
}

/// Nodes with an edge into `name`, sorted by name.
#[must_use]
pub fn get_sources(graph: &RankGraph, name: &str) -> Vec<String> {
    let nodes = graph.nodes();
    let Some(target) = nodes.iter().find(|n| n.name == name) else {
        return Vec::new();
    };
    let mut sources: Vec<String> = target
        .incoming
        .iter()
        .map(|edge| nodes[edge.from].name.clone())
        .collect();
    sources.sort();
    sources.dedup();
    sources
}

fn compare_ranked(a: &(String, f64), b: &(String, f64)) -> Ordering {
    b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0))
}
