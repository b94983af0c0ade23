// src/cooccur/stripes.rs
//! Stripes strategy: one associative `neighbour -> count` map per term. Order
//! of arrival does not matter because stripes merge additively.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::key::{GroupKey, SENTINEL};
use super::scored::ScoredPair;
use super::{PairQueue, Settings};
use crate::error::{PairRankError, Result};
use crate::input::{tokenize, Record, Shard};
use crate::mapreduce::{
    Emit, HashPartitioner, Job, JobReport, LocalRunner, Mapper, Mergeable, NaturalOrder, Reducer,
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stripe {
    primary: String,
    neighbour_counts: BTreeMap<String, u64>,
}

impl Stripe {
    #[must_use]
    pub fn new(primary: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            neighbour_counts: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn primary(&self) -> &str {
        &self.primary
    }

    pub fn add(&mut self, neighbour: &str, increment: u64) {
        *self.neighbour_counts.entry(neighbour.to_string()).or_default() += increment;
    }

    /// Records one occurrence of `neighbour`, bumping the total as well.
    pub fn observe(&mut self, neighbour: &str) {
        self.add(neighbour, 1);
        self.add(SENTINEL, 1);
    }

    #[must_use]
    pub fn get(&self, neighbour: &str) -> u64 {
        self.neighbour_counts.get(neighbour).copied().unwrap_or(0)
    }

    /// The term's total, held under `SENTINEL`. `None` when absent or zero.
    #[must_use]
    pub fn total(&self) -> Option<u64> {
        self.neighbour_counts.get(SENTINEL).copied().filter(|&t| t > 0)
    }

    /// Observed neighbours with their counts, total excluded.
    pub fn neighbours(&self) -> impl Iterator<Item = (&str, u64)> {
        self.neighbour_counts
            .iter()
            .filter(|(word, _)| word.as_str() != SENTINEL)
            .map(|(word, count)| (word.as_str(), *count))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.neighbour_counts.is_empty()
    }

    pub fn clear(&mut self) {
        self.neighbour_counts.clear();
    }

    /// Scored pairs for every neighbour, or `None` when the total is missing.
    #[must_use]
    pub fn scored_pairs(&self, precision: u32, min_pair_count: u64) -> Option<Vec<ScoredPair>> {
        let total = self.total()?;
        Some(
            self.neighbours()
                .filter(|&(_, count)| count >= min_pair_count)
                .map(|(word, count)| ScoredPair::new(self.primary.as_str(), word, total, count, precision))
                .collect(),
        )
    }
}

impl Mergeable for Stripe {
    fn merge(&mut self, other: Self) {
        if self.primary.is_empty() {
            self.primary = other.primary;
        }
        for (word, count) in other.neighbour_counts {
            *self.neighbour_counts.entry(word).or_default() += count;
        }
    }
}

impl fmt::Display for Stripe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries: Vec<String> = self
            .neighbour_counts
            .iter()
            .map(|(word, count)| format!("{word}:{count}"))
            .collect();
        write!(f, "{}", entries.join(" "))
    }
}

/// Builds stripes for every term in a record and flushes them at the end of
/// the record.
#[derive(Debug)]
pub struct StripesMapper {
    distance: usize,
    stripes: HashMap<String, Stripe>,
}

impl StripesMapper {
    #[must_use]
    pub fn new(settings: &Settings) -> Self {
        Self {
            distance: settings.neighbour_distance.max(1),
            stripes: HashMap::new(),
        }
    }
}

impl Mapper for StripesMapper {
    type Key = GroupKey;
    type Value = Stripe;

    fn map(&mut self, record: &Record, out: &mut dyn Emit<GroupKey, Stripe>) {
        let words = tokenize::words(&record.text);
        for (i, word) in words.iter().enumerate() {
            let Some(neighbour) = words.get(i + self.distance) else {
                break;
            };
            self.stripes
                .entry(word.clone())
                .or_insert_with(|| Stripe::new(word.as_str()))
                .observe(neighbour);
        }

        trace!(record = record.id, terms = self.stripes.len(), "Flushing stripes");
        for (term, stripe) in self.stripes.drain() {
            out.emit(GroupKey::new(term), stripe);
        }
    }
}

/// Merges every stripe of a term and emits its scored pairs in output order.
#[derive(Debug)]
pub struct StripesReducer {
    settings: Settings,
    queue: PairQueue,
}

impl StripesReducer {
    #[must_use]
    pub fn new(settings: &Settings) -> Self {
        Self {
            settings: settings.clone(),
            queue: PairQueue::new(),
        }
    }
}

impl Reducer for StripesReducer {
    type Key = GroupKey;
    type Value = Stripe;
    type OutKey = ScoredPair;
    type OutValue = f64;

    fn reduce(
        &mut self,
        group: Vec<(GroupKey, Stripe)>,
        out: &mut dyn Emit<ScoredPair, f64>,
    ) -> Result<()> {
        let Some((key, _)) = group.first() else {
            return Ok(());
        };
        let mut merged = Stripe::new(key.as_str());
        for (_, stripe) in group {
            merged.merge(stripe);
        }

        let Some(pairs) = merged.scored_pairs(self.settings.precision, self.settings.min_pair_count)
        else {
            return Err(PairRankError::MissingTotal {
                term: merged.primary().to_string(),
            });
        };
        debug!(term = %merged.primary(), stripe = %merged, "Reduced stripe");

        for pair in pairs {
            self.queue.push(pair);
        }
        self.queue.drain_into(&self.settings, out);
        merged.clear();
        Ok(())
    }
}

/// Runs the stripes job over `shards`.
///
/// # Errors
/// Returns error if the runner hits a non-recoverable failure.
pub fn run(
    shards: &[Shard],
    settings: &Settings,
    partitions: usize,
    combine: bool,
) -> Result<(Vec<(ScoredPair, f64)>, JobReport)> {
    let job = Job {
        name: "stripes",
        partitions,
        combine,
        sort: &NaturalOrder,
        grouping: &NaturalOrder,
        partitioner: &HashPartitioner,
    };
    LocalRunner::new().run(
        &job,
        shards,
        || StripesMapper::new(settings),
        || StripesReducer::new(settings),
    )
}
