use parking_lot::Mutex;

use std::collections::HashMap;
use std::io::{self, Write};

/// Occurrence count per key. Keys are positional encodings before
/// canonicalization and canonical labels after.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MotifCounts {
    counts: HashMap<Vec<u8>, u64>,
}

impl MotifCounts {
    pub fn new() -> MotifCounts {
        MotifCounts::default()
    }

    /// Count one more occurrence of `key`.
    pub fn record(&mut self, key: &[u8]) {
        match self.counts.get_mut(key) {
            Some(count) => *count += 1,
            None => {
                self.counts.insert(key.to_vec(), 1);
            }
        }
    }

    pub fn add(&mut self, key: Vec<u8>, count: u64) {
        *self.counts.entry(key).or_insert(0) += count;
    }

    /// Sum `other` into `self` key by key.
    pub fn merge(&mut self, other: MotifCounts) {
        if self.counts.is_empty() {
            self.counts = other.counts;
            return;
        }
        for (key, count) in other.counts {
            self.add(key, count);
        }
    }

    pub fn get(&self, key: &[u8]) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&[u8], u64)> + '_ {
        self.counts
            .iter()
            .map(|(key, count)| (key.as_slice(), *count))
    }

    pub fn into_sorted_entries(self) -> Vec<(Vec<u8>, u64)> {
        let mut entries = self.counts.into_iter().collect::<Vec<_>>();
        entries.sort_unstable();
        entries
    }

    /// Entries by descending count, ties broken by key.
    pub fn ranked(&self) -> Vec<(&[u8], u64)> {
        let mut entries = self.iter().collect::<Vec<_>>();
        entries.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }

    /// One `<label>\t<count>` line per key, in [`ranked`](Self::ranked) order.
    pub fn write_table(&self, out: &mut impl Write) -> io::Result<()> {
        for (key, count) in self.ranked() {
            writeln!(out, "{}\t{}", String::from_utf8_lossy(key), count)?;
        }
        Ok(())
    }
}

impl FromIterator<(Vec<u8>, u64)> for MotifCounts {
    fn from_iter<I: IntoIterator<Item = (Vec<u8>, u64)>>(iter: I) -> Self {
        let mut counts = MotifCounts::new();
        for (key, count) in iter {
            counts.add(key, count);
        }
        counts
    }
}

/// The per-process map every worker thread folds its results into.
#[derive(Debug, Default)]
pub struct SharedCounts {
    inner: Mutex<MotifCounts>,
}

impl SharedCounts {
    pub fn new() -> SharedCounts {
        SharedCounts::default()
    }

    pub fn absorb(&self, counts: MotifCounts) {
        if counts.is_empty() {
            return;
        }
        self.inner.lock().merge(counts);
    }

    pub fn into_inner(self) -> MotifCounts {
        self.inner.into_inner()
    }
}
