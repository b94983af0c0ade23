// src/rank/graph.rs
//! The rank graph and its `Building -> Converging -> Done` lifecycle.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::pagerank;
use crate::config::Config;
use crate::error::{PairRankError, Result};
use crate::numeric;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    /// Accepting edges.
    Building,
    /// Iterating towards the fixpoint.
    Converging,
    /// Every node converged in the same iteration.
    Done,
}

impl Phase {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Building => "building",
            Self::Converging => "converging",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankSettings {
    pub damping_factor: f64,
    pub precision: u32,
    pub max_iterations: usize,
}

impl RankSettings {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            damping_factor: config.rank.damping_factor,
            precision: config.precision,
            max_iterations: config.rank.max_iterations,
        }
    }
}

impl Default for RankSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Edge into a node from node index `from`, weighted `1 / outDegree(from)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncomingEdge {
    pub from: usize,
    pub weight: f64,
}

/// Topology of one node. Ranks live in the graph's rank buffers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    pub name: String,
    pub out_degree: usize,
    pub incoming: Vec<IncomingEdge>,
}

/// Rank state of one node as seen from outside.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeRank {
    pub name: String,
    pub rank: f64,
    pub previous_rank: f64,
    pub converged: bool,
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RankOutcome {
    pub iterations: usize,
    pub converged: bool,
}

#[derive(Debug, Clone)]
pub struct RankGraph {
    settings: RankSettings,
    phase: Phase,
    index: HashMap<String, usize>,
    nodes: Vec<GraphNode>,
    /// Edges buffered until out-degrees are final.
    pending: Vec<(usize, usize)>,
    /// Ranks in `10^-precision` units.
    rank: Vec<u64>,
    previous_rank: Vec<u64>,
    converged: Vec<bool>,
    iterations: usize,
}

impl RankGraph {
    #[must_use]
    pub fn new(settings: RankSettings) -> Self {
        Self {
            settings,
            phase: Phase::Building,
            index: HashMap::new(),
            nodes: Vec::new(),
            pending: Vec::new(),
            rank: Vec::new(),
            previous_rank: Vec::new(),
            converged: Vec::new(),
            iterations: 0,
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn settings(&self) -> &RankSettings {
        &self.settings
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    #[must_use]
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    /// Adds `from -> to`, creating either node on first reference.
    ///
    /// # Errors
    /// Returns error once input has been closed.
    pub fn add_edge(&mut self, from: &str, to: &str) -> Result<()> {
        self.expect_phase(Phase::Building)?;
        let from = self.intern(from);
        let to = self.intern(to);
        self.pending.push((from, to));
        Ok(())
    }

    /// Adds a node that may have no edges at all.
    ///
    /// # Errors
    /// Returns error once input has been closed.
    pub fn add_node(&mut self, name: &str) -> Result<()> {
        self.expect_phase(Phase::Building)?;
        self.intern(name);
        Ok(())
    }

    fn intern(&mut self, name: &str) -> usize {
        if let Some(&id) = self.index.get(name) {
            return id;
        }
        let id = self.nodes.len();
        self.index.insert(name.to_string(), id);
        self.nodes.push(GraphNode {
            name: name.to_string(),
            out_degree: 0,
            incoming: Vec::new(),
        });
        // Rank 0 marks "not yet initialised" until input is closed.
        self.rank.push(0);
        self.previous_rank.push(0);
        self.converged.push(false);
        id
    }

    /// Signals the end of the edge stream: fixes out-degrees and edge weights
    /// and seeds every node with rank `1/N`.
    ///
    /// # Errors
    /// Returns error if input was already closed.
    #[allow(clippy::cast_precision_loss)]
    pub fn finish_input(&mut self) -> Result<()> {
        self.expect_phase(Phase::Building)?;

        for &(from, _) in &self.pending {
            self.nodes[from].out_degree += 1;
        }
        for (from, to) in std::mem::take(&mut self.pending) {
            let weight = 1.0 / self.nodes[from].out_degree as f64;
            self.nodes[to].incoming.push(IncomingEdge { from, weight });
        }

        let initial = pagerank::initial_rank(self.nodes.len(), self.settings.precision);
        self.rank.fill(initial);
        self.previous_rank.fill(0);
        self.converged.fill(false);

        self.phase = if self.nodes.is_empty() {
            Phase::Done
        } else {
            Phase::Converging
        };
        info!(nodes = self.nodes.len(), initial = self.value(initial), "Rank graph built");
        Ok(())
    }

    /// One iteration. Returns true when every node converged, which moves the
    /// graph to `Done`.
    ///
    /// # Errors
    /// Returns error unless the graph is converging.
    pub fn step(&mut self) -> Result<bool> {
        self.expect_phase(Phase::Converging)?;

        // previous_rank is the back buffer: overwritten with the new ranks,
        // then swapped to the front.
        pagerank::recompute_into(
            &self.nodes,
            &self.rank,
            &mut self.previous_rank,
            self.settings.damping_factor,
            self.settings.precision,
        );
        std::mem::swap(&mut self.rank, &mut self.previous_rank);
        self.iterations += 1;

        let mut unconverged = 0;
        for (flag, (now, before)) in self
            .converged
            .iter_mut()
            .zip(self.rank.iter().zip(&self.previous_rank))
        {
            *flag = now == before;
            if !*flag {
                unconverged += 1;
            }
        }

        debug!(iteration = self.iterations, unconverged, "Rank iteration");
        if unconverged == 0 {
            self.phase = Phase::Done;
        }
        Ok(unconverged == 0)
    }

    /// Iterates until every node converges or the iteration cap is hit.
    /// Closes input first if it is still open. Hitting the cap is reported as
    /// a warning; the ranks reached so far stay available.
    ///
    /// Calling it again after the graph is done does no further work and
    /// reports the finished outcome.
    ///
    /// # Errors
    /// Returns error if closing input or an iteration fails.
    pub fn run(&mut self) -> Result<RankOutcome> {
        if self.phase == Phase::Building {
            self.finish_input()?;
        }
        while self.phase == Phase::Converging && self.iterations < self.settings.max_iterations {
            self.step()?;
        }

        let converged = self.phase == Phase::Done;
        if converged {
            info!(iterations = self.iterations, "Ranks converged");
        } else {
            warn!(
                iterations = self.iterations,
                "Ranks did not converge within the iteration cap; emitting best-effort ranks"
            );
        }
        Ok(RankOutcome {
            iterations: self.iterations,
            converged,
        })
    }

    /// Current rank of `name`.
    #[must_use]
    pub fn rank_of(&self, name: &str) -> Option<f64> {
        self.index.get(name).map(|&id| self.value(self.rank[id]))
    }

    #[must_use]
    pub fn node(&self, name: &str) -> Option<NodeRank> {
        self.index.get(name).map(|&id| self.node_rank(id))
    }

    fn node_rank(&self, id: usize) -> NodeRank {
        NodeRank {
            name: self.nodes[id].name.clone(),
            rank: self.value(self.rank[id]),
            previous_rank: self.value(self.previous_rank[id]),
            converged: self.converged[id],
        }
    }

    /// Every node with its rank, in insertion order.
    pub fn node_ranks(&self) -> impl Iterator<Item = NodeRank> + '_ {
        (0..self.nodes.len()).map(|id| self.node_rank(id))
    }

    #[must_use]
    pub fn total_rank(&self) -> f64 {
        self.value(self.rank.iter().sum())
    }

    /// Nodes by descending rank, ties by name.
    #[must_use]
    pub fn ranked(&self) -> Vec<(String, f64)> {
        super::queries::get_ranked_nodes(self)
    }

    /// Ranks in insertion order.
    pub(crate) fn rank_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.rank.iter().map(|&units| self.value(units))
    }

    fn value(&self, units: u64) -> f64 {
        numeric::from_units(units, self.settings.precision)
    }

    fn expect_phase(&self, expected: Phase) -> Result<()> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(PairRankError::InvalidPhase {
                expected: expected.name(),
                actual: self.phase.name(),
            })
        }
    }
}

impl Default for RankGraph {
    fn default() -> Self {
        Self::new(RankSettings::default())
    }
}
