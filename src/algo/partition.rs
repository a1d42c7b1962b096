use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::algo::buckets::Entry;
use crate::algo::taxonomy::{CategoryDescriptor, Taxonomy};

/// Default maximum number of kanji per output category.
pub const DEFAULT_MAX_CATEGORY_SIZE: usize = 10;

/// One output category: a capacity-bounded slice of a topic bucket.
/// `kanji_ids[i]` and `kanji_characters[i]` always describe the same item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicCategory {
    pub name: String,
    pub kanji_ids: Vec<i64>,
    pub kanji_characters: Vec<String>,
    pub description: String,
}

impl TopicCategory {
    fn from_entries(name: String, description: &str, entries: &[Entry]) -> Self {
        Self {
            name,
            kanji_ids: entries.iter().map(|e| e.id).collect(),
            kanji_characters: entries.iter().map(|e| e.character.clone()).collect(),
            description: description.to_string(),
        }
    }

    /// Zip ids and characters back into entries.
    pub fn entries(&self) -> Vec<Entry> {
        self.kanji_ids
            .iter()
            .zip(&self.kanji_characters)
            .map(|(&id, ch)| Entry::new(id, ch))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.kanji_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kanji_ids.is_empty()
    }
}

/// How chunk k > 1 of a bucket is labeled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuffixFormat {
    pub key_separator: String,
    pub name_separator: String,
}

impl Default for SuffixFormat {
    fn default() -> Self {
        Self {
            key_separator: "_".into(),
            name_separator: " ".into(),
        }
    }
}

impl SuffixFormat {
    pub fn key(&self, base: &str, n: usize) -> String {
        if n == 1 {
            base.to_string()
        } else {
            format!("{base}{}{n}", self.key_separator)
        }
    }

    pub fn name(&self, base: &str, n: usize) -> String {
        if n == 1 {
            base.to_string()
        } else {
            format!("{base}{}{n}", self.name_separator)
        }
    }
}

/// A labeled chunk produced by [`chunk_with_suffix`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk<T> {
    pub key: String,
    pub name: String,
    pub items: Vec<T>,
}

/// Split `items` into consecutive chunks of at most `max_size`, labeling the
/// first with the base key/name and the rest with a numeric suffix.
///
/// A `max_size` of zero is treated as one.
pub fn chunk_with_suffix<T: Clone>(
    key: &str,
    name: &str,
    items: &[T],
    max_size: usize,
    format: &SuffixFormat,
) -> Vec<Chunk<T>> {
    items
        .chunks(max_size.max(1))
        .enumerate()
        .map(|(i, chunk)| Chunk {
            key: format.key(key, i + 1),
            name: format.name(name, i + 1),
            items: chunk.to_vec(),
        })
        .collect()
}

/// Seal one bucket into output categories.
pub fn partition_bucket(
    descriptor: &CategoryDescriptor,
    entries: &[Entry],
    max_size: usize,
    format: &SuffixFormat,
) -> Vec<(String, TopicCategory)> {
    chunk_with_suffix(&descriptor.key, &descriptor.name, entries, max_size, format)
        .into_iter()
        .map(|chunk| {
            let cat =
                TopicCategory::from_entries(chunk.name, &descriptor.description, &chunk.items);
            (chunk.key, cat)
        })
        .collect()
}

/// Seal every non-empty bucket, walking the taxonomy in priority order.
///
/// Buckets whose key is not in the taxonomy are left out; the coverage
/// reconciler picks their items up afterwards.
pub fn partition_all(
    taxonomy: &Taxonomy,
    buckets: Vec<(String, Vec<Entry>)>,
    max_size: usize,
    format: &SuffixFormat,
) -> BTreeMap<String, TopicCategory> {
    let buckets: HashMap<String, Vec<Entry>> = buckets.into_iter().collect();
    let mut out = BTreeMap::new();
    for descriptor in taxonomy.by_priority() {
        let Some(entries) = buckets.get(&descriptor.key) else {
            continue;
        };
        if entries.is_empty() {
            continue;
        }
        out.extend(partition_bucket(descriptor, entries, max_size, format));
    }
    out
}

/// Remove every chunk of the bucket `key` from `map` and return their
/// entries concatenated in chunk order.
pub fn take_chunks(
    map: &mut BTreeMap<String, TopicCategory>,
    key: &str,
    format: &SuffixFormat,
) -> Vec<Entry> {
    let mut entries = Vec::new();
    let mut n = 1;
    while let Some(cat) = map.remove(&format.key(key, n)) {
        entries.extend(cat.entries());
        n += 1;
    }
    entries
}
