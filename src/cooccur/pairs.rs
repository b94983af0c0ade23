// src/cooccur/pairs.rs
//! Pairs strategy: one record per `(term, neighbour)` plus one total record
//! per term; the reducer relies on the total arriving first.

use std::collections::HashMap;

use tracing::{debug, trace};

use super::key::{OrderedKey, PairGroupingComparator, PairPartitioner, PairSortComparator};
use super::scored::ScoredPair;
use super::{PairQueue, Settings};
use crate::error::{PairRankError, Result};
use crate::input::{tokenize, Record, Shard};
use crate::mapreduce::{Emit, Job, JobReport, LocalRunner, Mapper, Reducer};

/// Counts adjacent pairs of a record locally and flushes them at the end of
/// the record.
#[derive(Debug)]
pub struct PairsMapper {
    distance: usize,
    local: HashMap<OrderedKey, u64>,
}

impl PairsMapper {
    #[must_use]
    pub fn new(settings: &Settings) -> Self {
        Self {
            distance: settings.neighbour_distance.max(1),
            local: HashMap::new(),
        }
    }

    fn count(&mut self, key: OrderedKey) {
        *self.local.entry(key).or_default() += 1;
    }
}

impl Mapper for PairsMapper {
    type Key = OrderedKey;
    type Value = u64;

    fn map(&mut self, record: &Record, out: &mut dyn Emit<OrderedKey, u64>) {
        let words = tokenize::words(&record.text);
        for (i, word) in words.iter().enumerate() {
            let Some(neighbour) = words.get(i + self.distance) else {
                break;
            };
            self.count(OrderedKey::new(word.as_str(), neighbour.as_str()));
            self.count(OrderedKey::total(word.as_str()));
        }

        trace!(record = record.id, keys = self.local.len(), "Flushing pairs");
        for (key, count) in self.local.drain() {
            out.emit(key, count);
        }
    }
}

/// Turns one term's sorted group into scored pairs.
///
/// Pairs are staged in a priority queue that is drained whenever the term
/// changes and once more on cleanup.
#[derive(Debug)]
pub struct PairsReducer {
    settings: Settings,
    current: Option<String>,
    queue: PairQueue,
}

impl PairsReducer {
    #[must_use]
    pub fn new(settings: &Settings) -> Self {
        Self {
            settings: settings.clone(),
            current: None,
            queue: PairQueue::new(),
        }
    }
}

impl Reducer for PairsReducer {
    type Key = OrderedKey;
    type Value = u64;
    type OutKey = ScoredPair;
    type OutValue = f64;

    fn reduce(
        &mut self,
        group: Vec<(OrderedKey, u64)>,
        out: &mut dyn Emit<ScoredPair, f64>,
    ) -> Result<()> {
        let Some((first, _)) = group.first() else {
            return Ok(());
        };
        let term = first.primary().to_string();
        if self.current.as_deref() != Some(term.as_str()) {
            self.queue.drain_into(&self.settings, out);
            self.current = None;
        }

        let mut runs = sum_runs(group).into_iter();
        let total = match runs.next() {
            Some((key, total)) if key.is_total() && total > 0 => total,
            _ => return Err(PairRankError::MissingTotal { term }),
        };

        for (key, count) in runs {
            if count < self.settings.min_pair_count {
                continue;
            }
            self.queue.push(ScoredPair::new(
                term.as_str(),
                key.secondary(),
                total,
                count,
                self.settings.precision,
            ));
        }
        debug!(term = %term, total, staged = self.queue.len(), "Reduced pairs group");
        self.current = Some(term);
        Ok(())
    }

    fn cleanup(&mut self, out: &mut dyn Emit<ScoredPair, f64>) {
        self.queue.drain_into(&self.settings, out);
        self.current = None;
    }
}

/// Collapses adjacent records with the same full key, summing their counts.
fn sum_runs(group: Vec<(OrderedKey, u64)>) -> Vec<(OrderedKey, u64)> {
    let mut runs: Vec<(OrderedKey, u64)> = Vec::with_capacity(group.len());
    for (key, count) in group {
        match runs.last_mut() {
            Some((last, sum)) if last.sort_eq(&key) => *sum += count,
            _ => runs.push((key, count)),
        }
    }
    runs
}

/// Runs the pairs job over `shards`.
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
        name: "pairs",
        partitions,
        combine,
        sort: &PairSortComparator,
        grouping: &PairGroupingComparator,
        partitioner: &PairPartitioner,
    };
    LocalRunner::new().run(
        &job,
        shards,
        || PairsMapper::new(settings),
        || PairsReducer::new(settings),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapped(text: &str, distance: usize) -> HashMap<String, u64> {
        let settings = Settings {
            neighbour_distance: distance,
            ..Settings::default()
        };
        let mut mapper = PairsMapper::new(&settings);
        let mut out: Vec<(OrderedKey, u64)> = Vec::new();
        mapper.map(&Record::new(0, text), &mut out);
        out.into_iter().map(|(k, v)| (k.pair_text(), v)).collect()
    }

    #[test]
    fn test_mapper_counts_pairs_and_totals() {
        let counts = mapped("the cat sat on the cat mat", 1);
        assert_eq!(counts["the *"], 2);
        assert_eq!(counts["the cat"], 2);
        assert_eq!(counts["cat *"], 2);
        assert_eq!(counts["cat sat"], 1);
        assert_eq!(counts["cat mat"], 1);
        assert!(!counts.contains_key("mat *"));
    }

    #[test]
    fn test_mapper_respects_distance() {
        let counts = mapped("a b c d", 2);
        assert_eq!(counts["a c"], 1);
        assert_eq!(counts["b d"], 1);
        assert!(!counts.contains_key("c *"));
    }

    #[test]
    fn test_reducer_requires_total_first() {
        let mut reducer = PairsReducer::new(&Settings::default());
        let mut out: Vec<(ScoredPair, f64)> = Vec::new();
        let group = vec![(OrderedKey::new("the", "cat"), 2)];
        let err = reducer.reduce(group, &mut out).unwrap_err();
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_reducer_sums_split_runs() {
        let mut reducer = PairsReducer::new(&Settings::default());
        let mut out: Vec<(ScoredPair, f64)> = Vec::new();
        let group = vec![
            (OrderedKey::total("the"), 1),
            (OrderedKey::total("the"), 3),
            (OrderedKey::new("the", "cat"), 1),
            (OrderedKey::new("the", "cat"), 2),
            (OrderedKey::new("the", "dog"), 1),
        ];
        reducer.reduce(group, &mut out).unwrap();
        assert!(out.is_empty(), "queue drains on term change or cleanup");
        reducer.cleanup(&mut out);

        let got: Vec<_> = out.iter().map(|(p, v)| (p.to_string(), *v)).collect();
        assert_eq!(
            got,
            vec![("the cat (3/4)".to_string(), 0.75), ("the dog (1/4)".to_string(), 0.25)]
        );
    }

    #[test]
    fn test_reducer_drains_on_term_change() {
        let mut reducer = PairsReducer::new(&Settings::default());
        let mut out: Vec<(ScoredPair, f64)> = Vec::new();
        reducer
            .reduce(vec![(OrderedKey::total("a"), 1), (OrderedKey::new("a", "b"), 1)], &mut out)
            .unwrap();
        reducer
            .reduce(vec![(OrderedKey::total("b"), 1), (OrderedKey::new("b", "c"), 1)], &mut out)
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].0.primary, "a");
    }
}
