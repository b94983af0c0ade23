// src/cooccur/key.rs
//! Composite keys for the pairs strategy and the comparators that implement
//! secondary sort over them.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::mapreduce::{partition_of, KeyComparator, Partitioner};

/// Secondary term of the record holding a primary term's total count.
pub const SENTINEL: &str = "*";

/// Separator between primary and secondary in the textual form of a key.
pub const SEP: char = ' ';

/// Identity of a logical group: the primary term.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GroupKey(String);

impl GroupKey {
    #[must_use]
    pub fn new(term: impl Into<String>) -> Self {
        Self(term.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Immutable `(primary, secondary)` key. Counts travel as the record value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderedKey {
    primary: String,
    secondary: String,
}

impl OrderedKey {
    #[must_use]
    pub fn new(primary: impl Into<String>, secondary: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            secondary: secondary.into(),
        }
    }

    /// The total-count record for `primary`.
    #[must_use]
    pub fn total(primary: impl Into<String>) -> Self {
        Self::new(primary, SENTINEL)
    }

    #[must_use]
    pub fn primary(&self) -> &str {
        &self.primary
    }

    #[must_use]
    pub fn secondary(&self) -> &str {
        &self.secondary
    }

    #[must_use]
    pub fn is_total(&self) -> bool {
        self.secondary == SENTINEL
    }

    #[must_use]
    pub fn group_key(&self) -> GroupKey {
        GroupKey::new(self.primary.clone())
    }

    /// `"primary SEP secondary"`.
    #[must_use]
    pub fn pair_text(&self) -> String {
        format!("{}{SEP}{}", self.primary, self.secondary)
    }

    /// Same logical group: primary terms match, secondary ignored.
    #[must_use]
    pub fn group_eq(&self, other: &Self) -> bool {
        self.primary == other.primary
    }

    /// Same sort position: the full `"primary SEP secondary"` text matches.
    #[must_use]
    pub fn sort_eq(&self, other: &Self) -> bool {
        self.primary == other.primary && self.secondary == other.secondary
    }

    /// Sort order: by primary, then the total record, then by secondary.
    ///
    /// For keys built from tokenized words this agrees with comparing
    /// `pair_text()`, since `SENTINEL` sorts below every word character.
    #[must_use]
    pub fn sort_cmp(&self, other: &Self) -> Ordering {
        self.primary
            .cmp(&other.primary)
            .then_with(|| other.is_total().cmp(&self.is_total()))
            .then_with(|| self.secondary.cmp(&other.secondary))
    }
}

impl fmt::Display for OrderedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{SEP}{}", self.primary, self.secondary)
    }
}

/// Total order used by the shuffle: totals first within each primary term.
#[derive(Debug, Clone, Copy, Default)]
pub struct PairSortComparator;

impl KeyComparator<OrderedKey> for PairSortComparator {
    fn compare(&self, a: &OrderedKey, b: &OrderedKey) -> Ordering {
        a.sort_cmp(b)
    }
}

/// Grouping by primary term only, so one reduce call sees a term's total and
/// all of its neighbours.
#[derive(Debug, Clone, Copy, Default)]
pub struct PairGroupingComparator;

impl KeyComparator<OrderedKey> for PairGroupingComparator {
    fn compare(&self, a: &OrderedKey, b: &OrderedKey) -> Ordering {
        a.primary.cmp(&b.primary)
    }
}

/// Partitions on the primary term so a total and its neighbours always meet
/// in the same reducer.
#[derive(Debug, Clone, Copy, Default)]
pub struct PairPartitioner;

impl Partitioner<OrderedKey> for PairPartitioner {
    fn partition(&self, key: &OrderedKey, partitions: usize) -> usize {
        partition_of(key.primary(), partitions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_sorts_first_within_term() {
        let mut keys = vec![
            OrderedKey::new("the", "cat"),
            OrderedKey::new("the", "a"),
            OrderedKey::total("the"),
            OrderedKey::new("cat", "sat"),
            OrderedKey::total("cat"),
        ];
        keys.sort_by(OrderedKey::sort_cmp);
        let texts: Vec<_> = keys.iter().map(OrderedKey::pair_text).collect();
        assert_eq!(texts, vec!["cat *", "cat sat", "the *", "the a", "the cat"]);
    }

    #[test]
    fn test_sort_agrees_with_pair_text() {
        let a = OrderedKey::new("ab", "x");
        let b = OrderedKey::new("a", "zz");
        assert_eq!(a.sort_cmp(&b), a.pair_text().cmp(&b.pair_text()));
    }

    #[test]
    fn test_group_and_sort_equality() {
        let a = OrderedKey::new("the", "cat");
        let b = OrderedKey::total("the");
        assert!(a.group_eq(&b));
        assert!(!a.sort_eq(&b));
        assert!(a.sort_eq(&OrderedKey::new("the", "cat")));
        assert_eq!(PairGroupingComparator.compare(&a, &b), Ordering::Equal);
    }

    #[test]
    fn test_partition_ignores_secondary() {
        let p = PairPartitioner;
        for n in 1..8 {
            assert_eq!(
                p.partition(&OrderedKey::total("term"), n),
                p.partition(&OrderedKey::new("term", "other"), n)
            );
        }
    }
}
