//! Ranked-frequency accumulator shared by the similarity finder and every
//! scorer strategy: count (or weight) occurrences per key, then take the
//! top-N keys.

use std::collections::HashMap;
use std::hash::Hash;

/// Accumulates a weight per key and ranks keys by total weight.
///
/// Ranking is weight descending with ties broken by key ascending, so
/// results are deterministic.
#[derive(Debug)]
pub struct RankedTally<K> {
    weights: HashMap<K, f64>,
}

impl<K> Default for RankedTally<K> {
    fn default() -> Self {
        Self {
            weights: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Ord> RankedTally<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one occurrence of `key`.
    pub fn add(&mut self, key: K) {
        self.add_weighted(key, 1.0);
    }

    /// Adds `weight` to the key's accumulated total.
    pub fn add_weighted(&mut self, key: K, weight: f64) {
        *self.weights.entry(key).or_insert(0.0) += weight;
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// All keys with their totals, ranked.
    pub fn into_ranked(self) -> Vec<(K, f64)> {
        let mut entries: Vec<(K, f64)> = self.weights.into_iter().collect();
        entries.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        entries
    }

    /// The top `n` keys by accumulated weight.
    pub fn top(self, n: usize) -> Vec<K> {
        self.into_ranked()
            .into_iter()
            .take(n)
            .map(|(key, _)| key)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_rank_by_frequency() {
        let mut tally = RankedTally::new();
        for id in [5_i64, 3, 5, 7, 5, 3] {
            tally.add(id);
        }
        assert_eq!(tally.into_ranked(), vec![(5, 3.0), (3, 2.0), (7, 1.0)]);
    }

    #[test]
    fn ties_break_by_key_ascending() {
        let mut tally = RankedTally::new();
        tally.add(9_i64);
        tally.add(2);
        tally.add(4);
        assert_eq!(tally.top(3), vec![2, 4, 9]);
    }

    #[test]
    fn weighted_accumulation() {
        let mut tally = RankedTally::new();
        tally.add_weighted("beach", 0.96);
        tally.add_weighted("hiking", 0.8);
        tally.add_weighted("beach", 0.8);
        assert_eq!(tally.top(1), vec!["beach"]);
    }

    #[test]
    fn top_truncates() {
        let mut tally = RankedTally::new();
        for key in ["a", "b", "c", "d"] {
            tally.add(key);
        }
        assert_eq!(tally.top(2).len(), 2);
    }

    #[test]
    fn empty_tally() {
        let tally: RankedTally<i64> = RankedTally::new();
        assert!(tally.is_empty());
        assert!(tally.top(5).is_empty());
    }
}
