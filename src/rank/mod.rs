// src/rank/mod.rs
//! Iterative `PageRank` over a directed graph with double-buffered ranks.

pub mod builder;
pub mod graph;
pub mod pagerank;
pub mod queries;

pub use builder::{BuildReport, Edge};
pub use graph::{NodeRank, Phase, RankGraph, RankOutcome, RankSettings};

use crate::error::Result;
use crate::input::Shard;

/// Everything a finished rank run produces.
#[derive(Debug, Clone)]
pub struct RankRun {
    pub graph: RankGraph,
    pub build: BuildReport,
    pub outcome: RankOutcome,
}

impl RankRun {
    /// Nodes in output order.
    #[must_use]
    pub fn ranked(&self) -> Vec<(String, f64)> {
        queries::get_ranked_nodes(&self.graph)
    }
}

/// Orchestrates graph construction and ranking.
pub struct RankEngine;

impl RankEngine {
    /// Loads edges from `shards`, closes input and iterates to the fixpoint
    /// (or the iteration cap).
    ///
    /// # Errors
    /// Returns error if the graph rejects input or iteration.
    pub fn run(shards: &[Shard], settings: RankSettings) -> Result<RankRun> {
        let (mut graph, build) = builder::build(RankGraph::new(settings), shards)?;
        let outcome = graph.run()?;
        Ok(RankRun {
            graph,
            build,
            outcome,
        })
    }
}
