// src/mapreduce/combine.rs
use std::cmp::Ordering;

use super::{KeyComparator, Mergeable};

/// Partially merges map output: records whose keys the sort comparator
/// considers equal collapse into one, values merged left to right.
///
/// The result is sorted. Because the merge is associative and commutative,
/// running this zero, one or many times leaves the final reduction unchanged.
pub fn combine<K, V>(mut records: Vec<(K, V)>, order: &dyn KeyComparator<K>) -> Vec<(K, V)>
where
    V: Mergeable,
{
    records.sort_by(|a, b| order.compare(&a.0, &b.0));

    let mut merged: Vec<(K, V)> = Vec::with_capacity(records.len());
    for (key, value) in records {
        match merged.last_mut() {
            Some((last_key, last_value)) if order.compare(last_key, &key) == Ordering::Equal => {
                last_value.merge(value);
            }
            _ => merged.push((key, value)),
        }
    }
    merged
}
