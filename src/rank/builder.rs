// src/rank/builder.rs
//! Graph construction: edge parsing and loading edges into a `RankGraph`.

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

use super::graph::RankGraph;
use crate::error::Result;
use crate::input::{Record, Shard};

const GROUP_SEPARATOR: char = ';';
const EDGE_SEPARATOR: char = '\t';

/// A directed edge `from -> to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
}

/// Counters gathered while loading edges.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    pub records: usize,
    pub edges: usize,
    pub malformed: usize,
}

/// Parses one `from TAB to` line.
#[must_use]
pub fn parse_edge(line: &str) -> Option<Edge> {
    let (from, to) = line.split_once(EDGE_SEPARATOR)?;
    let (from, to) = (from.trim(), to.trim());
    if from.is_empty() || to.is_empty() || to.contains(EDGE_SEPARATOR) {
        return None;
    }
    Some(Edge {
        from: from.to_string(),
        to: to.to_string(),
    })
}

/// Splits a `;`-joined edge group into edges, counting lines that do not parse.
fn parse_group(record: &Record) -> (Vec<Edge>, usize) {
    let mut edges = Vec::new();
    let mut malformed = 0;
    for line in record.text.split(GROUP_SEPARATOR) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match parse_edge(line) {
            Some(edge) => edges.push(edge),
            None => {
                warn!(record = record.id, line, "Skipping malformed edge");
                malformed += 1;
            }
        }
    }
    (edges, malformed)
}

/// Parses every shard in parallel and adds the edges to `graph` in input
/// order. The graph stays in `Building` so more input can follow.
///
/// # Errors
/// Returns error if the graph no longer accepts edges.
pub fn load_shards(graph: &mut RankGraph, shards: &[Shard]) -> Result<BuildReport> {
    let parsed: Vec<(Vec<Edge>, usize)> = shards
        .par_iter()
        .flat_map_iter(|shard| shard.records.iter().map(parse_group))
        .collect();

    let mut report = BuildReport {
        records: parsed.len(),
        ..BuildReport::default()
    };
    for (edges, malformed) in parsed {
        report.malformed += malformed;
        for edge in edges {
            graph.add_edge(&edge.from, &edge.to)?;
            report.edges += 1;
        }
    }

    debug!(
        records = report.records,
        edges = report.edges,
        malformed = report.malformed,
        "Edges loaded"
    );
    Ok(report)
}

/// Builds a closed graph from shards, ready to run.
///
/// # Errors
/// Returns error if loading fails.
pub fn build(graph: RankGraph, shards: &[Shard]) -> Result<(RankGraph, BuildReport)> {
    let mut graph = graph;
    let report = load_shards(&mut graph, shards)?;
    graph.finish_input()?;
    Ok((graph, report))
}
