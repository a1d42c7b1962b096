use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::algo::item::Item;
use crate::algo::partition::TopicCategory;
use crate::error::{Result, TopicError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Distinct source kanji ids present in the category map.
    pub total_kanji: usize,
    /// Output categories after partitioning.
    pub total_categories: usize,
    /// Covered / source items as an integer percentage, e.g. `"100%"`.
    pub coverage: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The final document. Keys of `topic_categories` serialize in
/// lexicographic order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicMapping {
    pub topic_categories: BTreeMap<String, TopicCategory>,
    pub summary: Summary,
}

impl TopicMapping {
    /// Pretty JSON with glyphs written verbatim.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|source| TopicError::Json {
            what: "topic mapping",
            source,
        })
    }

    pub fn to_value(&self) -> Result<serde_json::Value> {
        serde_json::to_value(self).map_err(|source| TopicError::Json {
            what: "topic mapping",
            source,
        })
    }
}

/// Integer-rounded percentage string. An empty source reports `"0%"`.
pub fn coverage_percent(covered: usize, total: usize) -> String {
    if total == 0 {
        return "0%".into();
    }
    format!("{:.0}%", covered as f64 / total as f64 * 100.0)
}

/// Wrap the reconciled category map with its summary.
///
/// Only ids carried by `items` count as covered, so coverage never exceeds
/// 100% even if a stray id slipped into the map.
pub fn assemble(
    topic_categories: BTreeMap<String, TopicCategory>,
    items: &[Item],
    description: Option<&str>,
) -> TopicMapping {
    let source: HashSet<i64> = items.iter().map(|it| it.id).collect();
    let covered: HashSet<i64> = topic_categories
        .values()
        .flat_map(|c| c.kanji_ids.iter().copied())
        .filter(|id| source.contains(id))
        .collect();
    let summary = Summary {
        total_kanji: covered.len(),
        total_categories: topic_categories.len(),
        coverage: coverage_percent(covered.len(), source.len()),
        description: description.map(String::from),
    };
    TopicMapping {
        topic_categories,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn src(n: i64) -> Vec<Item> {
        (1..=n).map(|i| Item::new(i, &format!("k{i}"), "")).collect()
    }

    fn cat(ids: &[i64]) -> TopicCategory {
        TopicCategory {
            name: "n".into(),
            kanji_ids: ids.to_vec(),
            kanji_characters: ids.iter().map(|i| format!("k{i}")).collect(),
            description: "d".into(),
        }
    }

    #[test]
    fn coverage_rounds_to_integer() {
        assert_eq!(coverage_percent(12, 12), "100%");
        assert_eq!(coverage_percent(2, 3), "67%");
        assert_eq!(coverage_percent(1, 3), "33%");
        assert_eq!(coverage_percent(0, 0), "0%");
    }

    #[test]
    fn summary_counts_distinct_ids() {
        let mut map = BTreeMap::new();
        map.insert("b".to_string(), cat(&[1, 2]));
        map.insert("a".to_string(), cat(&[3]));
        let doc = assemble(map, &src(4), None);
        assert_eq!(doc.summary.total_kanji, 3);
        assert_eq!(doc.summary.total_categories, 2);
        assert_eq!(doc.summary.coverage, "75%");
    }

    #[test]
    fn ids_outside_the_source_are_not_counted() {
        let mut map = BTreeMap::new();
        map.insert("a".to_string(), cat(&[1, 99]));
        let doc = assemble(map, &src(1), None);
        assert_eq!(doc.summary.total_kanji, 1);
        assert_eq!(doc.summary.coverage, "100%");
    }

    #[test]
    fn keys_serialize_sorted() {
        let mut map = BTreeMap::new();
        map.insert("zeta".to_string(), cat(&[1]));
        map.insert("alpha_2".to_string(), cat(&[2]));
        map.insert("alpha".to_string(), cat(&[3]));
        let json = assemble(map, &src(3), None).to_json_pretty().unwrap();
        let a = json.find("\"alpha\"").unwrap();
        let a2 = json.find("\"alpha_2\"").unwrap();
        let z = json.find("\"zeta\"").unwrap();
        assert!(a < a2 && a2 < z);
    }

    #[test]
    fn description_is_optional_in_output() {
        let mut map = BTreeMap::new();
        map.insert("a".to_string(), cat(&[1]));
        let without = assemble(map.clone(), &src(1), None).to_value().unwrap();
        assert!(without["summary"].get("description").is_none());
        let with = assemble(map, &src(1), Some("N3 topics")).to_value().unwrap();
        assert_eq!(with["summary"]["description"], "N3 topics");
    }

    #[test]
    fn glyphs_are_not_escaped() {
        let mut map = BTreeMap::new();
        map.insert(
            "a".to_string(),
            TopicCategory {
                name: "n".into(),
                kanji_ids: vec![1],
                kanji_characters: vec!["法".into()],
                description: String::new(),
            },
        );
        let json = assemble(map, &src(1), None).to_json_pretty().unwrap();
        assert!(json.contains("\"法\""));
    }
}
