// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Ordered pair lists for the trace relations.
//!
//! A [`PairList`] is a multi-valued map from a trace position to the
//! positions it relates to: key-ordered iteration, several values per key,
//! duplicate pairs tolerated (downstream renderers deduplicate adjacent
//! repeats). Three of them make up [`Relations`]: Follows(a, b) means a
//! causally succeeds b; Inside(a, b) means a is contained in composite
//! event b; Equals(a, b) records an explicit merge of two positions.

use std::collections::BTreeMap;

/// Key-ordered multimap of trace-position pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairList {
    map: BTreeMap<usize, Vec<usize>>,
    len: usize,
}

impl PairList {
    pub fn new() -> Self {
        PairList::default()
    }

    /// Record the pair (first, second). Duplicates are kept.
    pub fn insert(&mut self, first: usize, second: usize) {
        self.map.entry(first).or_default().push(second);
        self.len += 1;
    }

    /// All seconds recorded for `first`, in insertion order.
    pub fn values_at(&self, first: usize) -> &[usize] {
        self.map.get(&first).map_or(&[], Vec::as_slice)
    }

    pub fn contains_key(&self, first: usize) -> bool {
        self.map.contains_key(&first)
    }

    pub fn contains_pair(&self, first: usize, second: usize) -> bool {
        self.values_at(first).contains(&second)
    }

    /// Number of pairs recorded.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        self.map.clear();
        self.len = 0;
    }

    /// Pairs in key order; values for one key keep insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.map
            .iter()
            .flat_map(|(&first, seconds)| seconds.iter().map(move |&second| (first, second)))
    }

    /// Copy every pair of `other` with both positions shifted by `base`.
    ///
    /// Used when a stored segment's position-local lists are spliced into
    /// the global relation store.
    pub fn extend_shifted(&mut self, other: &PairList, base: usize) {
        for (first, second) in other.iter() {
            self.insert(first + base, second + base);
        }
    }
}

/// The three relations accumulated while a trace is assembled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Relations {
    pub follows: PairList,
    pub inside: PairList,
    pub equals: PairList,
}

impl Relations {
    pub fn new() -> Self {
        Relations::default()
    }

    pub fn clear(&mut self) {
        self.follows.clear();
        self.inside.clear();
        self.equals.clear();
    }

    /// Total pairs across the three lists.
    pub fn pair_count(&self) -> usize {
        self.follows.len() + self.inside.len() + self.equals.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_lookup() {
        let mut list = PairList::new();
        list.insert(4, 2);
        list.insert(4, 3);
        list.insert(1, 0);

        assert_eq!(list.values_at(4), &[2, 3]);
        assert_eq!(list.values_at(9), &[] as &[usize]);
        assert!(list.contains_key(1));
        assert!(list.contains_pair(4, 3));
        assert!(!list.contains_pair(4, 9));
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_iteration_is_key_ordered() {
        let mut list = PairList::new();
        list.insert(5, 1);
        list.insert(2, 0);
        list.insert(5, 0);

        let pairs: Vec<_> = list.iter().collect();
        assert_eq!(pairs, vec![(2, 0), (5, 1), (5, 0)]);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let mut list = PairList::new();
        list.insert(3, 1);
        list.insert(3, 1);
        assert_eq!(list.len(), 2);
        assert_eq!(list.values_at(3), &[1, 1]);
    }

    #[test]
    fn test_extend_shifted() {
        let mut local = PairList::new();
        local.insert(1, 0);
        local.insert(2, 1);

        let mut global = PairList::new();
        global.insert(1, 0);
        global.extend_shifted(&local, 3);

        let pairs: Vec<_> = global.iter().collect();
        assert_eq!(pairs, vec![(1, 0), (4, 3), (5, 4)]);
    }

    #[test]
    fn test_clear_resets_len() {
        let mut relations = Relations::new();
        relations.follows.insert(1, 0);
        relations.inside.insert(1, 0);
        relations.equals.insert(2, 1);
        assert_eq!(relations.pair_count(), 3);

        relations.clear();
        assert_eq!(relations.pair_count(), 0);
        assert!(relations.follows.is_empty());
    }
}
