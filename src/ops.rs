//! Shared operation wrappers for all interfaces (CLI, plugin).
//!
//! Each `op_*` function is a pure, synchronous wrapper around one or more
//! `algo` modules. Input and output are `serde_json::Value`, with no dependency
//! on clap or nu-plugin.

use serde_json::{json, Value};

use crate::algo::assemble::TopicMapping;
use crate::algo::engine::{Engine, EngineConfig};
use crate::algo::item;
use crate::algo::partition::DEFAULT_MAX_CATEGORY_SIZE;
use crate::algo::taxonomy::{self, Taxonomy};
use crate::error::{Result, TopicError};

/// Build an engine from an optional taxonomy path (default resolution chain
/// otherwise), a category capacity and an optional neutral override.
pub fn engine_for(
    taxonomy_path: Option<&str>,
    max_size: usize,
    neutral: Option<&str>,
) -> Result<Engine> {
    let tax = taxonomy::resolve_taxonomy(taxonomy_path)?;
    let config = EngineConfig {
        max_category_size: max_size,
        neutral_override: neutral.map(String::from),
        ..Default::default()
    };
    Engine::new(tax, config)
}

/// Classify an upstream source document into the typed topic mapping.
pub fn classify_source(
    source: &Value,
    taxonomy_path: Option<&str>,
    max_size: usize,
    neutral: Option<&str>,
) -> Result<TopicMapping> {
    let items = item::parse_source(source)?;
    engine_for(taxonomy_path, max_size, neutral)?.run(&items)
}

pub fn op_classify(
    source: &Value,
    taxonomy_path: Option<&str>,
    max_size: usize,
    neutral: Option<&str>,
) -> Result<Value> {
    classify_source(source, taxonomy_path, max_size, neutral)?.to_value()
}

pub fn op_explain(
    source: &Value,
    taxonomy_path: Option<&str>,
    neutral: Option<&str>,
) -> Result<Value> {
    let items = item::parse_source(source)?;
    let engine = engine_for(taxonomy_path, DEFAULT_MAX_CATEGORY_SIZE, neutral)?;
    serde_json::to_value(engine.explain(&items)).map_err(|source| TopicError::Json {
        what: "routing table",
        source,
    })
}

/// Validate taxonomy JSON text, reporting problems instead of failing.
pub fn op_validate_taxonomy(json_text: &str) -> Value {
    let parsed: std::result::Result<Taxonomy, _> = serde_json::from_str(json_text);
    match parsed {
        Ok(tax) => {
            let problems = tax.validate();
            json!({
                "valid": problems.is_empty(),
                "name": tax.name,
                "version": tax.version,
                "categories": tax.categories.len(),
                "fallback_tiers": tax.fallbacks.len(),
                "neutral": tax.neutral,
                "problems": problems,
            })
        }
        Err(e) => json!({
            "valid": false,
            "problems": [format!("Failed to parse taxonomy: {e}")],
        }),
    }
}

/// Categories of the resolved taxonomy in evaluation order.
pub fn op_list_categories(taxonomy_path: Option<&str>) -> Result<Value> {
    let tax = taxonomy::resolve_taxonomy(taxonomy_path)?;
    let rows: Vec<Value> = tax
        .by_priority()
        .iter()
        .map(|c| {
            json!({
                "priority": c.priority,
                "key": c.key,
                "name": c.name,
                "description": c.description,
                "keywords": c.keywords,
                "neutral": c.key == tax.neutral,
            })
        })
        .collect();
    Ok(Value::Array(rows))
}
