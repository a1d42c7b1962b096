//! End-to-end classification run.
//!
//! Pipeline:
//! 1. Route every item through the classifier chain into buckets
//! 2. Drop duplicate assignments (first insertion wins)
//! 3. Split buckets into capacity-bounded, suffix-labeled categories
//! 4. Reconcile coverage against the source, repairing via the neutral category
//! 5. Assemble the sorted document with its summary

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::algo::assemble::{assemble, TopicMapping};
use crate::algo::buckets::{BucketMap, Entry};
use crate::algo::classifier::{Classifier, Tier};
use crate::algo::coverage;
use crate::algo::item::{duplicate_ids, Item};
use crate::algo::partition::{partition_all, SuffixFormat, DEFAULT_MAX_CATEGORY_SIZE};
use crate::algo::taxonomy::Taxonomy;
use crate::error::{Result, TopicError};

/// Run-level knobs.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum kanji per output category.
    pub max_category_size: usize,
    /// Replace the taxonomy's neutral category for this run.
    pub neutral_override: Option<String>,
    /// Labeling of the second and later chunks of a bucket.
    pub suffix: SuffixFormat,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_category_size: DEFAULT_MAX_CATEGORY_SIZE,
            neutral_override: None,
            suffix: SuffixFormat::default(),
        }
    }
}

/// How one item was routed, for `explain` output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Routing {
    pub id: i64,
    pub character: String,
    pub category: String,
    pub tier: String,
    pub keyword: Option<String>,
}

pub struct Engine {
    taxonomy: Taxonomy,
    classifier: Classifier,
    config: EngineConfig,
}

impl Engine {
    /// Validate the taxonomy (after applying any neutral override) and
    /// compile the classifier.
    pub fn new(mut taxonomy: Taxonomy, config: EngineConfig) -> Result<Self> {
        if let Some(neutral) = &config.neutral_override {
            taxonomy.neutral = neutral.clone();
        }
        let taxonomy = taxonomy.validated()?;
        let classifier = Classifier::new(&taxonomy);
        Ok(Self {
            taxonomy,
            classifier,
            config,
        })
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Route every item into its bucket, in source order.
    pub fn route(&self, items: &[Item]) -> BucketMap {
        let mut buckets = BucketMap::new();
        let (mut primary, mut secondary, mut neutral) = (0usize, 0usize, 0usize);
        for item in items {
            let r = self.classifier.resolve(item);
            match r.tier {
                Tier::Primary => primary += 1,
                Tier::Secondary(_) => secondary += 1,
                Tier::Neutral => neutral += 1,
            }
            buckets.insert(r.key, Entry::new(item.id, &item.character));
        }
        debug!(primary, secondary, neutral, "routed items");
        buckets
    }

    /// Per-item routing decisions, without partitioning.
    pub fn explain(&self, items: &[Item]) -> Vec<Routing> {
        items
            .iter()
            .map(|item| {
                let r = self.classifier.resolve(item);
                Routing {
                    id: item.id,
                    character: item.character.clone(),
                    category: r.key.to_string(),
                    tier: r.tier.to_string(),
                    keyword: r.keyword.map(String::from),
                }
            })
            .collect()
    }

    /// Turn routed buckets into the final document: deduplicate, partition,
    /// reconcile coverage against `items`, assemble.
    pub fn seal(&self, mut buckets: BucketMap, items: &[Item]) -> Result<TopicMapping> {
        let dropped = buckets.dedup();
        if !dropped.is_empty() {
            debug!(count = dropped.len(), "duplicate assignments removed");
        }

        let max = self.config.max_category_size;
        let fmt = &self.config.suffix;
        let mut map = partition_all(&self.taxonomy, buckets.into_buckets(), max, fmt);

        let repaired = coverage::reconcile(&mut map, items, &self.taxonomy, max, fmt)?;
        if !repaired.is_empty() {
            debug!(ids = ?repaired, "coverage repaired");
        }

        let doc = assemble(map, items, self.taxonomy.description.as_deref());
        info!(
            items = items.len(),
            categories = doc.summary.total_categories,
            coverage = %doc.summary.coverage,
            "topic mapping built"
        );
        Ok(doc)
    }

    /// Classify and partition a batch of items.
    pub fn run(&self, items: &[Item]) -> Result<TopicMapping> {
        if items.is_empty() {
            return Err(TopicError::EmptySource);
        }
        let dups = duplicate_ids(items.iter().map(|it| it.id));
        if !dups.is_empty() {
            return Err(TopicError::DuplicateIdentifier { ids: dups });
        }
        self.seal(self.route(items), items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::taxonomy::{embedded_default_json, parse_taxonomy, test_taxonomy};

    fn topics() -> Taxonomy {
        test_taxonomy(
            &[
                ("governance_law_order", 1, "law,court"),
                ("food_drink", 2, "rice,tea"),
                ("states_conditions", 3, "state"),
            ],
            "states_conditions",
        )
    }

    fn engine() -> Engine {
        Engine::new(topics(), EngineConfig::default()).unwrap()
    }

    #[test]
    fn twelve_law_items_split_ten_and_two() {
        let items: Vec<Item> = (1..=12)
            .map(|i| Item::new(i, &format!("k{i}"), "law"))
            .collect();
        let doc = engine().run(&items).unwrap();
        let cats = &doc.topic_categories;
        assert_eq!(cats.len(), 2);
        assert_eq!(cats["governance_law_order"].kanji_ids, (1..=10).collect::<Vec<_>>());
        assert_eq!(cats["governance_law_order_2"].kanji_ids, vec![11, 12]);
        assert_eq!(cats["governance_law_order_2"].name, "governance law order 2");
        assert_eq!(doc.summary.total_kanji, 12);
        assert_eq!(doc.summary.total_categories, 2);
        assert_eq!(doc.summary.coverage, "100%");
    }

    #[test]
    fn unmatched_items_land_in_neutral_base_key() {
        let items = vec![
            Item::new(1, "猫", "cat"),
            Item::new(2, "犬", "dog"),
            Item::new(3, "鳥", "bird"),
        ];
        let doc = engine().run(&items).unwrap();
        assert_eq!(doc.topic_categories.len(), 1);
        assert_eq!(doc.topic_categories["states_conditions"].kanji_ids, vec![1, 2, 3]);
    }

    #[test]
    fn anomalous_double_routing_keeps_first_bucket() {
        let e = engine();
        let items = vec![Item::new(42, "法", "law"), Item::new(7, "米", "rice")];
        let mut buckets = e.route(&items);
        buckets.insert("food_drink", Entry::new(42, "法"));
        let doc = e.seal(buckets, &items).unwrap();
        assert_eq!(doc.topic_categories["governance_law_order"].kanji_ids, vec![42]);
        assert_eq!(doc.topic_categories["food_drink"].kanji_ids, vec![7]);
    }

    #[test]
    fn stray_id_in_bucket_is_dropped_from_output() {
        let e = engine();
        let items = vec![Item::new(1, "法", "law")];
        let mut buckets = e.route(&items);
        buckets.insert("governance_law_order", Entry::new(99, "x"));
        let doc = e.seal(buckets, &items).unwrap();
        assert_eq!(doc.topic_categories["governance_law_order"].kanji_ids, vec![1]);
        assert_eq!(
            doc.topic_categories["governance_law_order"].kanji_characters,
            vec!["法"]
        );
        assert_eq!(doc.summary.total_kanji, 1);
        assert_eq!(doc.summary.coverage, "100%");
    }

    #[test]
    fn unrouted_items_are_repaired_into_neutral() {
        let e = engine();
        let items = vec![Item::new(1, "法", "law"), Item::new(2, "x", "law")];
        let mut buckets = BucketMap::new();
        buckets.insert("governance_law_order", Entry::new(1, "法"));
        let doc = e.seal(buckets, &items).unwrap();
        assert_eq!(doc.topic_categories["states_conditions"].kanji_ids, vec![2]);
        assert_eq!(doc.summary.coverage, "100%");
    }

    #[test]
    fn identical_runs_are_byte_identical() {
        let t = parse_taxonomy(embedded_default_json()).unwrap();
        let e = Engine::new(t, EngineConfig::default()).unwrap();
        let items: Vec<Item> = (1..=60)
            .map(|i| {
                let gloss = ["law", "rice", "snow", "zzz", "ticket"][i as usize % 5];
                Item::new(i, &format!("k{i}"), gloss).with_example("w", "example")
            })
            .collect();
        let a = e.run(&items).unwrap().to_json_pretty().unwrap();
        let b = e.run(&items).unwrap().to_json_pretty().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn every_item_exactly_once_and_bounded() {
        let t = parse_taxonomy(embedded_default_json()).unwrap();
        let e = Engine::new(t, EngineConfig::default()).unwrap();
        let glosses = ["law", "rice", "snow", "zzz", "busy", "book", "hot", "door"];
        let items: Vec<Item> = (1..=200)
            .map(|i| Item::new(i, &format!("k{i}"), glosses[i as usize % glosses.len()]))
            .collect();
        let doc = e.run(&items).unwrap();

        let mut all: Vec<i64> = doc
            .topic_categories
            .values()
            .flat_map(|c| c.kanji_ids.clone())
            .collect();
        all.sort_unstable();
        assert_eq!(all, (1..=200).collect::<Vec<_>>());
        for cat in doc.topic_categories.values() {
            assert!(cat.len() <= 10);
            assert_eq!(cat.kanji_ids.len(), cat.kanji_characters.len());
        }
    }

    #[test]
    fn custom_capacity() {
        let config = EngineConfig {
            max_category_size: 4,
            ..Default::default()
        };
        let e = Engine::new(topics(), config).unwrap();
        let items: Vec<Item> = (1..=9).map(|i| Item::new(i, "k", "rice")).collect();
        let doc = e.run(&items).unwrap();
        let keys: Vec<&String> = doc.topic_categories.keys().collect();
        assert_eq!(keys, vec!["food_drink", "food_drink_2", "food_drink_3"]);
        assert_eq!(doc.topic_categories["food_drink_3"].kanji_ids, vec![9]);
    }

    #[test]
    fn neutral_override_is_validated() {
        let config = EngineConfig {
            neutral_override: Some("food_drink".into()),
            ..Default::default()
        };
        let e = Engine::new(topics(), config).unwrap();
        let doc = e.run(&[Item::new(1, "猫", "cat")]).unwrap();
        assert!(doc.topic_categories.contains_key("food_drink"));

        let config = EngineConfig {
            neutral_override: Some("nowhere".into()),
            ..Default::default()
        };
        assert!(matches!(
            Engine::new(topics(), config),
            Err(TopicError::InvalidTaxonomy(_))
        ));
    }

    #[test]
    fn empty_batch_is_fatal() {
        assert!(matches!(engine().run(&[]), Err(TopicError::EmptySource)));
    }

    #[test]
    fn duplicate_source_ids_are_fatal() {
        let items = vec![Item::new(1, "a", "law"), Item::new(1, "b", "rice")];
        match engine().run(&items) {
            Err(TopicError::DuplicateIdentifier { ids }) => assert_eq!(ids, vec![1]),
            other => panic!("expected DuplicateIdentifier, got {other:?}"),
        }
    }

    #[test]
    fn explain_reports_tier_and_keyword() {
        let rows = engine().explain(&[Item::new(1, "法", "court"), Item::new(2, "猫", "cat")]);
        assert_eq!(rows[0].category, "governance_law_order");
        assert_eq!(rows[0].tier, "primary");
        assert_eq!(rows[0].keyword.as_deref(), Some("court"));
        assert_eq!(rows[1].category, "states_conditions");
        assert_eq!(rows[1].tier, "neutral");
        assert_eq!(rows[1].keyword, None);
    }
}
