use std::collections::{HashMap, HashSet};

use tracing::warn;

/// One routed (id, character) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub id: i64,
    pub character: String,
}

impl Entry {
    pub fn new(id: i64, character: &str) -> Self {
        Self {
            id,
            character: character.into(),
        }
    }
}

struct Slot {
    seq: usize,
    entry: Entry,
}

struct Bucket {
    key: String,
    slots: Vec<Slot>,
}

/// Category key → ordered entries, built one insertion at a time.
///
/// Buckets come into existence on their first insertion and keep creation
/// order. Every insertion is stamped with a global sequence number so the
/// deduplicator can tell which occurrence of an id came first.
#[derive(Default)]
pub struct BucketMap {
    buckets: Vec<Bucket>,
    index: HashMap<String, usize>,
    next_seq: usize,
}

impl BucketMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, entry: Entry) {
        let idx = match self.index.get(key) {
            Some(&i) => i,
            None => {
                self.buckets.push(Bucket {
                    key: key.to_string(),
                    slots: Vec::new(),
                });
                self.index.insert(key.to_string(), self.buckets.len() - 1);
                self.buckets.len() - 1
            }
        };
        self.buckets[idx].slots.push(Slot {
            seq: self.next_seq,
            entry,
        });
        self.next_seq += 1;
    }

    /// Entries of one bucket, in insertion order.
    pub fn get(&self, key: &str) -> Vec<&Entry> {
        self.index
            .get(key)
            .map(|&i| self.buckets[i].slots.iter().map(|s| &s.entry).collect())
            .unwrap_or_default()
    }

    /// Keys in bucket creation order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.buckets.iter().map(|b| b.key.as_str())
    }

    pub fn total_entries(&self) -> usize {
        self.buckets.iter().map(|b| b.slots.len()).sum()
    }

    /// Keep only the earliest-inserted occurrence of every id.
    ///
    /// Returns the ids whose later occurrences were dropped, in the order
    /// they were dropped.
    pub fn dedup(&mut self) -> Vec<i64> {
        let mut order: Vec<(usize, usize, usize)> = self
            .buckets
            .iter()
            .enumerate()
            .flat_map(|(b, bucket)| {
                bucket
                    .slots
                    .iter()
                    .enumerate()
                    .map(move |(p, slot)| (slot.seq, b, p))
            })
            .collect();
        order.sort_unstable();

        let mut seen: HashSet<i64> = HashSet::new();
        let mut doomed: HashSet<(usize, usize)> = HashSet::new();
        let mut dropped = Vec::new();
        for (_, b, p) in order {
            let entry = &self.buckets[b].slots[p].entry;
            if !seen.insert(entry.id) {
                warn!(
                    id = entry.id,
                    bucket = %self.buckets[b].key,
                    "dropping duplicate assignment"
                );
                doomed.insert((b, p));
                dropped.push(entry.id);
            }
        }

        if !doomed.is_empty() {
            for (b, bucket) in self.buckets.iter_mut().enumerate() {
                let mut p = 0;
                bucket.slots.retain(|_| {
                    let keep = !doomed.contains(&(b, p));
                    p += 1;
                    keep
                });
            }
        }
        dropped
    }

    /// Consume into `(key, entries)` pairs in bucket creation order.
    pub fn into_buckets(self) -> Vec<(String, Vec<Entry>)> {
        self.buckets
            .into_iter()
            .map(|b| (b.key, b.slots.into_iter().map(|s| s.entry).collect()))
            .collect()
    }
}
