use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::warn;

use crate::algo::buckets::Entry;
use crate::algo::item::Item;
use crate::algo::partition::{partition_bucket, take_chunks, SuffixFormat, TopicCategory};
use crate::algo::taxonomy::Taxonomy;
use crate::error::{Result, TopicError};

/// How the category map lines up against the source items.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CoverageReport {
    /// Source ids absent from every category, in source order.
    pub missing: Vec<i64>,
    /// Ids present more than once across categories, ascending.
    pub duplicated: Vec<i64>,
    /// Ids in the map that no source item carries, ascending.
    pub unknown: Vec<i64>,
}

impl CoverageReport {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty() && self.duplicated.is_empty() && self.unknown.is_empty()
    }
}

/// Compare the category map with the source collection.
pub fn check(map: &BTreeMap<String, TopicCategory>, items: &[Item]) -> CoverageReport {
    let mut counts: HashMap<i64, usize> = HashMap::new();
    for cat in map.values() {
        for &id in &cat.kanji_ids {
            *counts.entry(id).or_insert(0) += 1;
        }
    }
    let source: HashSet<i64> = items.iter().map(|it| it.id).collect();

    let missing = items
        .iter()
        .filter(|it| !counts.contains_key(&it.id))
        .map(|it| it.id)
        .collect();
    let mut duplicated: Vec<i64> = counts
        .iter()
        .filter(|(_, n)| **n > 1)
        .map(|(&id, _)| id)
        .collect();
    duplicated.sort_unstable();
    let mut unknown: Vec<i64> = counts
        .keys()
        .filter(|id| !source.contains(*id))
        .copied()
        .collect();
    unknown.sort_unstable();

    CoverageReport {
        missing,
        duplicated,
        unknown,
    }
}

/// Make "every source id exactly once" a checked property.
///
/// Ids no source item carries are dropped, and an id placed more than once
/// keeps only its occurrence in the highest-priority category; categories
/// that lose entries are re-chunked. Items absent from the map are then
/// appended, in source order, to the neutral category, which is
/// re-partitioned on its own. Returns the ids that had to be added back.
/// Fails only if ids are still missing afterwards.
pub fn reconcile(
    map: &mut BTreeMap<String, TopicCategory>,
    items: &[Item],
    taxonomy: &Taxonomy,
    max_size: usize,
    format: &SuffixFormat,
) -> Result<Vec<i64>> {
    let mut report = check(map, items);
    if !report.unknown.is_empty() || !report.duplicated.is_empty() {
        warn!(
            unknown = ?report.unknown,
            duplicated = ?report.duplicated,
            "pruning stray assignments"
        );
        prune(map, items, taxonomy, max_size, format);
        report = check(map, items);
    }
    if report.missing.is_empty() {
        return Ok(vec![]);
    }

    let Some(neutral) = taxonomy.get(&taxonomy.neutral) else {
        return Err(TopicError::CoverageGap {
            missing: report.missing,
        });
    };
    warn!(
        count = report.missing.len(),
        neutral = %neutral.key,
        "coverage gap, routing missing items to neutral category"
    );

    let missing: HashSet<i64> = report.missing.iter().copied().collect();
    let mut entries = take_chunks(map, &neutral.key, format);
    entries.extend(
        items
            .iter()
            .filter(|it| missing.contains(&it.id))
            .map(|it| Entry::new(it.id, &it.character)),
    );
    map.extend(partition_bucket(neutral, &entries, max_size, format));

    let after = check(map, items);
    if !after.missing.is_empty() {
        return Err(TopicError::CoverageGap {
            missing: after.missing,
        });
    }
    Ok(report.missing)
}

/// Drop unknown ids and repeated ids from the map, re-chunking every
/// category whose entries change.
fn prune(
    map: &mut BTreeMap<String, TopicCategory>,
    items: &[Item],
    taxonomy: &Taxonomy,
    max_size: usize,
    format: &SuffixFormat,
) {
    let source: HashSet<i64> = items.iter().map(|it| it.id).collect();
    let mut seen: HashSet<i64> = HashSet::new();
    for descriptor in taxonomy.by_priority() {
        let entries = take_chunks(map, &descriptor.key, format);
        if entries.is_empty() {
            continue;
        }
        let before = entries.len();
        let kept: Vec<Entry> = entries
            .into_iter()
            .filter(|e| source.contains(&e.id) && seen.insert(e.id))
            .collect();
        if kept.len() != before {
            warn!(
                category = %descriptor.key,
                dropped = before - kept.len(),
                "category re-chunked"
            );
        }
        map.extend(partition_bucket(descriptor, &kept, max_size, format));
    }
}
