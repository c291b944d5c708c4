//! Thread-safe accumulation of per-file results
//!
//! Merging is plain addition, so the aggregate is the same whatever order
//! results arrive in and however many threads call [`ResultCollector::add_result`].

use super::types::PartialResult;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct AggregateState {
    chars: HashMap<char, usize>,
    pairs: HashMap<u16, usize>,
    triples: HashMap<u32, usize>,
    files_processed: usize,
    total_chars: usize,
}

/// Independent copy of the aggregate at one point in time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateSnapshot {
    pub chars: HashMap<char, usize>,
    pub pairs: HashMap<u16, usize>,
    pub triples: HashMap<u32, usize>,
    pub files_found: usize,
    pub files_ignored: usize,
    pub files_processed: usize,
    pub total_chars: usize,
}

/// Global counters for one analysis run
#[derive(Debug, Default)]
pub struct ResultCollector {
    state: Mutex<AggregateState>,
    files_found: AtomicUsize,
    files_ignored: AtomicUsize,
}

impl ResultCollector {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, AggregateState> {
        // A merge never leaves the maps half-updated in a way later merges
        // cannot add to, so a poisoned lock is still usable
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Merge one file's counts into the aggregate
    pub fn add_result(&self, partial: PartialResult) {
        let mut state = self.lock();
        merge_into(&mut state.chars, partial.chars);
        merge_into(&mut state.pairs, partial.pairs);
        merge_into(&mut state.triples, partial.triples);
        state.files_processed += partial.file_count;
        state.total_chars += partial.char_count;
    }

    pub fn increment_found(&self) -> usize {
        self.files_found.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn increment_ignored(&self) -> usize {
        self.files_ignored.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn files_found(&self) -> usize {
        self.files_found.load(Ordering::Relaxed)
    }

    pub fn files_ignored(&self) -> usize {
        self.files_ignored.load(Ordering::Relaxed)
    }

    /// Deep copy of every map and counter
    pub fn snapshot(&self) -> AggregateSnapshot {
        let state = self.lock();
        AggregateSnapshot {
            chars: state.chars.clone(),
            pairs: state.pairs.clone(),
            triples: state.triples.clone(),
            files_found: self.files_found(),
            files_ignored: self.files_ignored(),
            files_processed: state.files_processed,
            total_chars: state.total_chars,
        }
    }
}

fn merge_into<K: std::hash::Hash + Eq>(target: &mut HashMap<K, usize>, source: HashMap<K, usize>) {
    if target.is_empty() {
        *target = source;
        return;
    }
    for (key, count) in source {
        *target.entry(key).or_insert(0) += count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn partial(chars: &[(char, usize)], pairs: &[(u16, usize)]) -> PartialResult {
        PartialResult {
            chars: chars.iter().copied().collect(),
            pairs: pairs.iter().copied().collect(),
            triples: HashMap::new(),
            file_count: 1,
            char_count: chars.iter().map(|(_, n)| n).sum(),
        }
    }

    #[test]
    fn test_add_result_sums_maps_and_counters() {
        let collector = ResultCollector::new();
        collector.add_result(partial(&[('a', 2), ('b', 1)], &[(1, 1)]));
        collector.add_result(partial(&[('a', 3)], &[(1, 2), (7, 1)]));

        let snapshot = collector.snapshot();
        assert_eq!(snapshot.chars[&'a'], 5);
        assert_eq!(snapshot.chars[&'b'], 1);
        assert_eq!(snapshot.pairs[&1], 3);
        assert_eq!(snapshot.pairs[&7], 1);
        assert_eq!(snapshot.files_processed, 2);
        assert_eq!(snapshot.total_chars, 6);
    }

    #[test]
    fn test_snapshot_is_independent() {
        let collector = ResultCollector::new();
        collector.add_result(partial(&[('x', 1)], &[]));
        let before = collector.snapshot();

        collector.add_result(partial(&[('x', 1)], &[]));
        assert_eq!(before.chars[&'x'], 1);
        assert_eq!(collector.snapshot().chars[&'x'], 2);
    }

    #[test]
    fn test_found_and_ignored_counters() {
        let collector = ResultCollector::new();
        assert_eq!(collector.increment_found(), 1);
        assert_eq!(collector.increment_found(), 2);
        assert_eq!(collector.increment_ignored(), 1);

        let snapshot = collector.snapshot();
        assert_eq!(snapshot.files_found, 2);
        assert_eq!(snapshot.files_ignored, 1);
    }

    #[test]
    fn test_concurrent_writers() {
        let collector = Arc::new(ResultCollector::new());
        crossbeam::thread::scope(|s| {
            for _ in 0..8 {
                let collector = Arc::clone(&collector);
                s.spawn(move |_| {
                    for _ in 0..100 {
                        collector.add_result(partial(&[('z', 1)], &[(42, 2)]));
                    }
                });
            }
        })
        .unwrap();

        let snapshot = collector.snapshot();
        assert_eq!(snapshot.chars[&'z'], 800);
        assert_eq!(snapshot.pairs[&42], 1600);
        assert_eq!(snapshot.files_processed, 800);
    }
}
