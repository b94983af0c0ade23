// src/mapreduce/runner.rs
//! In-process batch host: map shards in parallel, combine, partition, sort,
//! group and reduce.

use std::cmp::Ordering;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::{combine, KeyComparator, Mapper, Mergeable, Partitioner, Reducer};
use crate::error::Result;
use crate::input::Shard;

/// Wiring of one job: how keys are partitioned, sorted and grouped.
pub struct Job<'a, K> {
    pub name: &'a str,
    pub partitions: usize,
    /// Run the combiner on each shard's map output.
    pub combine: bool,
    pub sort: &'a dyn KeyComparator<K>,
    pub grouping: &'a dyn KeyComparator<K>,
    pub partitioner: &'a dyn Partitioner<K>,
}

/// Counters gathered while a job runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JobReport {
    pub name: String,
    pub shards: usize,
    pub records_read: usize,
    pub records_mapped: usize,
    /// Records handed to the shuffle (after the combiner, if enabled).
    pub records_shuffled: usize,
    pub groups_reduced: usize,
    pub groups_skipped: usize,
    pub records_emitted: usize,
}

/// Output of a reduce partition: emitted records plus its counters.
struct PartitionOutput<O> {
    records: Vec<O>,
    groups_reduced: usize,
    groups_skipped: usize,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalRunner;

impl LocalRunner {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Runs a job over `shards`. A fresh mapper is built per shard and a fresh
    /// reducer per partition, so no state is shared between workers.
    ///
    /// Partition outputs are concatenated in partition order.
    ///
    /// # Errors
    /// Returns the first non-recoverable reducer error.
    #[allow(clippy::type_complexity)]
    pub fn run<K, V, M, R, FM, FR>(
        &self,
        job: &Job<'_, K>,
        shards: &[Shard],
        new_mapper: FM,
        new_reducer: FR,
    ) -> Result<(Vec<(R::OutKey, R::OutValue)>, JobReport)>
    where
        K: Send,
        V: Send + Mergeable,
        M: Mapper<Key = K, Value = V>,
        R: Reducer<Key = K, Value = V>,
        R::OutKey: Send,
        R::OutValue: Send,
        FM: Fn() -> M + Sync,
        FR: Fn() -> R + Sync,
    {
        let partitions = job.partitions.max(1);
        info!(job = job.name, shards = shards.len(), partitions, "Starting job");

        let mapped: Vec<(usize, Vec<(K, V)>)> = shards
            .par_iter()
            .map(|shard| map_shard(job, shard, &new_mapper))
            .collect();

        let mut report = JobReport {
            name: job.name.to_string(),
            shards: shards.len(),
            records_read: shards.iter().map(|s| s.records.len()).sum(),
            ..JobReport::default()
        };

        let mut buckets: Vec<Vec<(K, V)>> = (0..partitions).map(|_| Vec::new()).collect();
        for (emitted, records) in mapped {
            report.records_mapped += emitted;
            report.records_shuffled += records.len();
            for (key, value) in records {
                let target = job.partitioner.partition(&key, partitions) % partitions;
                buckets[target].push((key, value));
            }
        }

        let outputs: Vec<PartitionOutput<(R::OutKey, R::OutValue)>> = buckets
            .into_par_iter()
            .enumerate()
            .map(|(index, bucket)| reduce_partition(job, index, bucket, &new_reducer))
            .collect::<Result<_>>()?;

        let mut records = Vec::new();
        for output in outputs {
            report.groups_reduced += output.groups_reduced;
            report.groups_skipped += output.groups_skipped;
            records.extend(output.records);
        }
        report.records_emitted = records.len();

        info!(
            job = job.name,
            mapped = report.records_mapped,
            shuffled = report.records_shuffled,
            groups = report.groups_reduced,
            skipped = report.groups_skipped,
            emitted = report.records_emitted,
            "Job finished"
        );
        Ok((records, report))
    }
}

fn map_shard<K, V, M, FM>(job: &Job<'_, K>, shard: &Shard, new_mapper: &FM) -> (usize, Vec<(K, V)>)
where
    V: Mergeable,
    M: Mapper<Key = K, Value = V>,
    FM: Fn() -> M,
{
    let mut mapper = new_mapper();
    let mut out: Vec<(K, V)> = Vec::new();
    for record in &shard.records {
        mapper.map(record, &mut out);
    }
    let emitted = out.len();
    let out = if job.combine { combine(out, job.sort) } else { out };
    debug!(
        shard = %shard.source.display(),
        emitted,
        after_combine = out.len(),
        "Mapped shard"
    );
    (emitted, out)
}

fn reduce_partition<K, V, R, FR>(
    job: &Job<'_, K>,
    index: usize,
    mut bucket: Vec<(K, V)>,
    new_reducer: &FR,
) -> Result<PartitionOutput<(R::OutKey, R::OutValue)>>
where
    R: Reducer<Key = K, Value = V>,
    FR: Fn() -> R,
{
    bucket.sort_by(|a, b| job.sort.compare(&a.0, &b.0));

    let mut reducer = new_reducer();
    let mut output = PartitionOutput {
        records: Vec::new(),
        groups_reduced: 0,
        groups_skipped: 0,
    };

    for group in split_groups(bucket, job.grouping) {
        match reducer.reduce(group, &mut output.records) {
            Ok(()) => output.groups_reduced += 1,
            Err(e) if e.is_recoverable() => {
                warn!(job = job.name, partition = index, "Skipping group: {e}");
                output.groups_skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }
    reducer.cleanup(&mut output.records);
    Ok(output)
}

/// Cuts a sorted run of records into groups of grouping-equal keys.
fn split_groups<K, V>(sorted: Vec<(K, V)>, grouping: &dyn KeyComparator<K>) -> Vec<Vec<(K, V)>> {
    let mut groups: Vec<Vec<(K, V)>> = Vec::new();
    for item in sorted {
        match groups.last_mut() {
            Some(group) if grouping.compare(&group[0].0, &item.0) == Ordering::Equal => {
                group.push(item);
            }
            _ => groups.push(vec![item]),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cooccur::key::{PairGroupingComparator, PairPartitioner, PairSortComparator};
    use crate::cooccur::pairs::PairsReducer;
    use crate::cooccur::{OrderedKey, Settings};
    use crate::input::Record;
    use crate::mapreduce::{Emit, HashPartitioner, NaturalOrder};

    struct WordMapper;

    impl Mapper for WordMapper {
        type Key = String;
        type Value = u64;

        fn map(&mut self, record: &Record, out: &mut dyn Emit<String, u64>) {
            for word in record.text.split_whitespace() {
                out.emit(word.to_string(), 1);
            }
        }
    }

    struct SumReducer;

    impl Reducer for SumReducer {
        type Key = String;
        type Value = u64;
        type OutKey = String;
        type OutValue = u64;

        fn reduce(&mut self, group: Vec<(String, u64)>, out: &mut dyn Emit<String, u64>) -> Result<()> {
            let key = group[0].0.clone();
            out.emit(key, group.iter().map(|(_, v)| v).sum());
            Ok(())
        }
    }

    fn shards() -> Vec<Shard> {
        vec![
            Shard {
                records: vec![Record::new(0, "a b a"), Record::new(1, "c")],
                ..Shard::default()
            },
            Shard {
                records: vec![Record::new(0, "b a")],
                ..Shard::default()
            },
        ]
    }

    fn run(partitions: usize, combine: bool) -> (Vec<(String, u64)>, JobReport) {
        let job = Job {
            name: "wordcount",
            partitions,
            combine,
            sort: &NaturalOrder,
            grouping: &NaturalOrder,
            partitioner: &HashPartitioner,
        };
        let (mut out, report) = LocalRunner::new()
            .run(&job, &shards(), || WordMapper, || SumReducer)
            .unwrap();
        out.sort();
        (out, report)
    }

    #[test]
    fn test_word_count_single_partition() {
        let (out, report) = run(1, false);
        assert_eq!(
            out,
            vec![("a".into(), 3), ("b".into(), 2), ("c".into(), 1)]
        );
        assert_eq!(report.records_read, 3);
        assert_eq!(report.records_mapped, 6);
        assert_eq!(report.groups_reduced, 3);
    }

    #[test]
    fn test_combiner_shrinks_shuffle_not_result() {
        let (plain, plain_report) = run(3, false);
        let (combined, combined_report) = run(3, true);
        assert_eq!(plain, combined);
        assert!(combined_report.records_shuffled < plain_report.records_shuffled);
    }

    /// Emits a `bad` group that never got a total next to a complete `good` one.
    struct TotalLessMapper;

    impl Mapper for TotalLessMapper {
        type Key = OrderedKey;
        type Value = u64;

        fn map(&mut self, _record: &Record, out: &mut dyn Emit<OrderedKey, u64>) {
            out.emit(OrderedKey::new("bad", "x"), 1);
            out.emit(OrderedKey::total("good"), 2);
            out.emit(OrderedKey::new("good", "y"), 1);
        }
    }

    #[test]
    fn test_recoverable_group_error_is_skipped() {
        let job = Job {
            name: "pairs",
            partitions: 1,
            combine: false,
            sort: &PairSortComparator,
            grouping: &PairGroupingComparator,
            partitioner: &PairPartitioner,
        };
        let shard = Shard {
            records: vec![Record::new(0, "unused")],
            ..Shard::default()
        };
        let settings = Settings::default();
        let (out, report) = LocalRunner::new()
            .run(&job, &[shard], || TotalLessMapper, || PairsReducer::new(&settings))
            .unwrap();

        let got: Vec<_> = out.iter().map(|(p, v)| (p.to_string(), *v)).collect();
        assert_eq!(got, vec![("good y (1/2)".to_string(), 0.5)]);
        assert_eq!(report.groups_skipped, 1);
        assert_eq!(report.groups_reduced, 1);
    }
}
