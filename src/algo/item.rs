use std::collections::HashSet;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Result, TopicError};

/// One usage example attached to a kanji: surface word plus English gloss.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Example {
    pub word: String,
    pub gloss: String,
}

/// A classifiable kanji record. Loaded once, never mutated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Item {
    pub id: i64,
    pub character: String,
    pub meaning: String,
    pub examples: Vec<Example>,
}

impl Item {
    pub fn new(id: i64, character: &str, meaning: &str) -> Self {
        Self {
            id,
            character: character.into(),
            meaning: meaning.into(),
            examples: Vec::new(),
        }
    }

    pub fn with_example(mut self, word: &str, gloss: &str) -> Self {
        self.examples.push(Example {
            word: word.into(),
            gloss: gloss.into(),
        });
        self
    }
}

// ── Source document shape ───────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
struct Gloss {
    #[serde(alias = "english")]
    en: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SourceExample {
    word: Option<String>,
    meanings: Option<Gloss>,
}

/// A record as the upstream loader writes it. Every field is optional here;
/// [`items_from_records`] decides which gaps are fatal.
#[derive(Debug, Deserialize)]
pub struct SourceRecord {
    id: Option<i64>,
    character: Option<String>,
    meanings: Option<Gloss>,
    examples: Option<Vec<SourceExample>>,
}

/// Parse the upstream document into validated items.
///
/// Accepts `{"items": [...]}`, a bare array of records, or a single record.
pub fn parse_source(doc: &Value) -> Result<Vec<Item>> {
    let records = match doc {
        Value::Object(map) if map.contains_key("items") => map["items"].clone(),
        Value::Array(_) => doc.clone(),
        Value::Null => Value::Array(vec![]),
        single => Value::Array(vec![single.clone()]),
    };
    let records: Vec<SourceRecord> =
        serde_json::from_value(records).map_err(|source| TopicError::Json {
            what: "source records",
            source,
        })?;
    items_from_records(records)
}

/// Turn raw records into items, rejecting the gaps that would make the
/// category map silently incomplete: no records at all, records without an
/// id, or two records sharing an id.
pub fn items_from_records(records: Vec<SourceRecord>) -> Result<Vec<Item>> {
    if records.is_empty() {
        return Err(TopicError::EmptySource);
    }

    let missing: Vec<usize> = records
        .iter()
        .enumerate()
        .filter(|(_, r)| r.id.is_none())
        .map(|(i, _)| i)
        .collect();
    if !missing.is_empty() {
        return Err(TopicError::MissingIdentifier { positions: missing });
    }

    let dups = duplicate_ids(records.iter().filter_map(|r| r.id));
    if !dups.is_empty() {
        return Err(TopicError::DuplicateIdentifier { ids: dups });
    }

    Ok(records
        .into_iter()
        .filter_map(|r| {
            let id = r.id?;
            let examples = r
                .examples
                .unwrap_or_default()
                .into_iter()
                .map(|ex| Example {
                    word: ex.word.unwrap_or_default(),
                    gloss: ex.meanings.and_then(|m| m.en).unwrap_or_default(),
                })
                .collect();
            Some(Item {
                id,
                character: r.character.unwrap_or_default(),
                meaning: r.meanings.and_then(|m| m.en).unwrap_or_default(),
                examples,
            })
        })
        .collect())
}

/// Ids occurring more than once, ascending and without repeats.
pub fn duplicate_ids(ids: impl IntoIterator<Item = i64>) -> Vec<i64> {
    let mut seen = HashSet::new();
    let mut dups: Vec<i64> = ids.into_iter().filter(|id| !seen.insert(*id)).collect();
    dups.sort_unstable();
    dups.dedup();
    dups
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_items_wrapper() {
        let doc = json!({"items": [
            {"id": 1, "character": "法", "meanings": {"en": "law"},
             "examples": [{"word": "法律", "meanings": {"en": "law, legislation"}}]},
            {"id": 2, "character": "猫"}
        ]});
        let items = parse_source(&doc).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].examples[0].word, "法律");
        assert_eq!(items[0].examples[0].gloss, "law, legislation");
        assert_eq!(items[1].meaning, "");
        assert!(items[1].examples.is_empty());
    }

    #[test]
    fn accepts_english_alias_and_bare_array() {
        let doc = json!([{"id": 5, "character": "雪", "meanings": {"english": "snow"}}]);
        let items = parse_source(&doc).unwrap();
        assert_eq!(items[0].meaning, "snow");
    }

    #[test]
    fn null_fields_are_empty_strings() {
        let doc = json!([{"id": 9, "character": null, "meanings": null,
                          "examples": [{"word": null, "meanings": {"en": null}}]}]);
        let items = parse_source(&doc).unwrap();
        assert_eq!(items[0].character, "");
        assert_eq!(items[0].examples[0], Example::default());
    }

    #[test]
    fn empty_source_is_fatal() {
        assert!(matches!(
            parse_source(&json!({"items": []})),
            Err(TopicError::EmptySource)
        ));
    }

    #[test]
    fn missing_id_reports_positions() {
        let doc = json!([{"id": 1}, {"character": "x"}, {"id": 3}, {"character": "y"}]);
        match parse_source(&doc) {
            Err(TopicError::MissingIdentifier { positions }) => assert_eq!(positions, vec![1, 3]),
            other => panic!("expected MissingIdentifier, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_ids_are_fatal() {
        let doc = json!([{"id": 4}, {"id": 4}, {"id": 2}, {"id": 4}]);
        match parse_source(&doc) {
            Err(TopicError::DuplicateIdentifier { ids }) => assert_eq!(ids, vec![4]),
            other => panic!("expected DuplicateIdentifier, got {other:?}"),
        }
    }
}
