// src/cooccur/scored.rs
//! The measurement side of a co-occurrence: a term, one neighbour and the two
//! counts the conditional probability is derived from.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::key::SEP;
use crate::numeric;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredPair {
    pub primary: String,
    pub neighbour: String,
    /// Total occurrences of `primary` (with a neighbour in range).
    pub primary_count: u64,
    /// Joint occurrences of `primary` followed by `neighbour`.
    pub neighbour_count: u64,
    pub precision: u32,
}

impl ScoredPair {
    #[must_use]
    pub fn new(
        primary: impl Into<String>,
        neighbour: impl Into<String>,
        primary_count: u64,
        neighbour_count: u64,
        precision: u32,
    ) -> Self {
        Self {
            primary: primary.into(),
            neighbour: neighbour.into(),
            primary_count,
            neighbour_count,
            precision,
        }
    }

    /// `neighbour_count / primary_count`, rounded half-up. `None` when the
    /// total is zero.
    #[must_use]
    pub fn conditional_probability(&self) -> Option<f64> {
        numeric::ratio(self.neighbour_count, self.primary_count, self.precision)
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.primary_count > 0
    }

    /// `"primary neighbour"`, the final tie-breaker.
    #[must_use]
    pub fn pair_text(&self) -> String {
        format!("{}{SEP}{}", self.primary, self.neighbour)
    }

    fn scaled_probability(&self) -> Option<u128> {
        numeric::scaled_ratio(self.neighbour_count, self.primary_count, self.precision)
    }

    /// Output order against a possibly missing or malformed pair. Fails closed:
    /// `self` sorts first when `other` is absent or has a blank term.
    #[must_use]
    pub fn compare(&self, other: Option<&Self>) -> Ordering {
        match other {
            Some(o) if !o.primary.trim().is_empty() => self.cmp(o),
            _ => Ordering::Less,
        }
    }

    fn tie_break(&self, other: &Self) -> Ordering {
        self.neighbour_count
            .cmp(&other.neighbour_count)
            .then_with(|| self.pair_text().cmp(&other.pair_text()))
            .then_with(|| self.primary_count.cmp(&other.primary_count))
            .then_with(|| self.precision.cmp(&other.precision))
    }
}

impl Ord for ScoredPair {
    /// Within a term: valid pairs by descending probability, ties by ascending
    /// joint count then pair text; pairs with a zero total go last. Different
    /// terms order by term.
    fn cmp(&self, other: &Self) -> Ordering {
        self.primary.cmp(&other.primary).then_with(|| {
            match (self.scaled_probability(), other.scaled_probability()) {
                (Some(a), Some(b)) if a != b => b.cmp(&a),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                _ => self.tie_break(other),
            }
        })
    }
}

impl PartialOrd for ScoredPair {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ScoredPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}/{})",
            self.pair_text(),
            self.neighbour_count,
            self.primary_count
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(neighbour: &str, total: u64, joint: u64) -> ScoredPair {
        ScoredPair::new("the", neighbour, total, joint, 5)
    }

    #[test]
    fn test_probability_rounding() {
        assert_eq!(pair("cat", 3, 1).conditional_probability(), Some(0.33333));
        assert_eq!(pair("cat", 0, 1).conditional_probability(), None);
    }

    #[test]
    fn test_higher_probability_first() {
        let mut pairs = vec![pair("a", 10, 2), pair("b", 10, 5), pair("c", 10, 3)];
        pairs.sort();
        let order: Vec<_> = pairs.iter().map(|p| p.neighbour.as_str()).collect();
        assert_eq!(order, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_equal_probability_breaks_on_text() {
        let mut pairs = vec![pair("dog", 4, 2), pair("cat", 4, 2)];
        pairs.sort();
        assert_eq!(pairs[0].neighbour, "cat");
    }

    #[test]
    fn test_equal_probability_breaks_on_count_first() {
        // 1/3 and 2/6 round to the same probability.
        let a = ScoredPair::new("t", "z", 3, 1, 5);
        let b = ScoredPair::new("t", "a", 6, 2, 5);
        assert_eq!(a.cmp(&b), Ordering::Less);
    }

    #[test]
    fn test_order_agrees_with_equality() {
        let coarse = ScoredPair::new("the", "cat", 4, 2, 2);
        let fine = ScoredPair::new("the", "cat", 4, 2, 5);
        assert_ne!(coarse, fine);
        assert_ne!(coarse.cmp(&fine), Ordering::Equal);
        assert_eq!(coarse.cmp(&fine), fine.cmp(&coarse).reverse());
        assert_eq!(fine.cmp(&fine.clone()), Ordering::Equal);
    }

    #[test]
    fn test_invalid_total_sorts_last() {
        let mut pairs = vec![pair("a", 0, 1), pair("b", 10, 1)];
        pairs.sort();
        assert_eq!(pairs[0].neighbour, "b");
        assert!(!pairs[1].is_valid());
    }

    #[test]
    fn test_compare_fails_closed() {
        let p = pair("cat", 2, 1);
        let blank = ScoredPair::new("  ", "x", 1, 1, 5);
        assert_eq!(p.compare(None), Ordering::Less);
        assert_eq!(p.compare(Some(&blank)), Ordering::Less);
        assert_eq!(p.compare(Some(&p.clone())), Ordering::Equal);
    }

    #[test]
    fn test_display_shows_counts() {
        assert_eq!(pair("cat", 2, 2).to_string(), "the cat (2/2)");
    }
}
