// src/mapreduce/mod.rs
//! The seams between the jobs and whatever batch engine executes them.
//!
//! A job only ever talks to its host through three extension points: an
//! [`Emit`] callback for key/value output, a sort [`KeyComparator`] and a
//! grouping [`KeyComparator`]. [`Partitioner`] decides which reduce unit a key
//! goes to. [`LocalRunner`] is an in-process host that honours the same
//! contract, with shards mapped in parallel.

pub mod combine;
pub mod runner;

pub use self::combine::combine;
pub use self::runner::{Job, JobReport, LocalRunner};

use std::cmp::Ordering;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::error::Result;
use crate::input::Record;

/// Key/value emission callback.
pub trait Emit<K, V> {
    fn emit(&mut self, key: K, value: V);
}

impl<K, V> Emit<K, V> for Vec<(K, V)> {
    fn emit(&mut self, key: K, value: V) {
        self.push((key, value));
    }
}

/// A total order (sort) or an equivalence (grouping) over keys.
pub trait KeyComparator<K>: Sync {
    fn compare(&self, a: &K, b: &K) -> Ordering;
}

/// Routes a key to one of `partitions` reduce units.
pub trait Partitioner<K>: Sync {
    fn partition(&self, key: &K, partitions: usize) -> usize;
}

/// Associative, commutative merge of two values for the same key.
pub trait Mergeable {
    fn merge(&mut self, other: Self);
}

impl Mergeable for u64 {
    fn merge(&mut self, other: Self) {
        *self += other;
    }
}

pub trait Mapper {
    type Key;
    type Value;

    /// Maps one input record. Mapper state must not outlive the shard.
    fn map(&mut self, record: &Record, out: &mut dyn Emit<Self::Key, Self::Value>);
}

pub trait Reducer {
    type Key;
    type Value;
    type OutKey;
    type OutValue;

    /// Receives one logical group: every record the grouping comparator
    /// considers equal, in sort-comparator order.
    ///
    /// # Errors
    /// Recoverable errors skip the group; anything else aborts the job.
    fn reduce(
        &mut self,
        group: Vec<(Self::Key, Self::Value)>,
        out: &mut dyn Emit<Self::OutKey, Self::OutValue>,
    ) -> Result<()>;

    /// Called once after the last group of a partition.
    fn cleanup(&mut self, _out: &mut dyn Emit<Self::OutKey, Self::OutValue>) {}
}

/// Natural `Ord` of the key, used both as sort and as grouping comparator for
/// plain keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct NaturalOrder;

impl<K: Ord> KeyComparator<K> for NaturalOrder {
    fn compare(&self, a: &K, b: &K) -> Ordering {
        a.cmp(b)
    }
}

/// `hash(key) mod partitions`, stable across runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct HashPartitioner;

impl<K: Hash> Partitioner<K> for HashPartitioner {
    fn partition(&self, key: &K, partitions: usize) -> usize {
        partition_of(key, partitions)
    }
}

/// Stable hash partition of any hashable value.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn partition_of<T: Hash + ?Sized>(value: &T, partitions: usize) -> usize {
    if partitions <= 1 {
        return 0;
    }
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    (hasher.finish() % partitions as u64) as usize
}
