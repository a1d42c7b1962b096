use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, TopicError};

/// Embedded default taxonomy, compiled from `taxonomies/kanji_n3.json`.
/// Users override by placing a file at `$XDG_DATA_HOME/kanji-topics/taxonomy.json`
/// or `$KANJI_TOPICS_TAXONOMY` env var, or passing `--taxonomy <path>`.
const EMBEDDED_DEFAULT: &str = include_str!("../../taxonomies/kanji_n3.json");

/// Env var naming a taxonomy file that overrides every other source.
pub const TAXONOMY_ENV: &str = "KANJI_TOPICS_TAXONOMY";

/// One topical bucket. Lower `priority` is evaluated first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDescriptor {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub priority: i64,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// A secondary keyword test, checked against the meaning gloss only.
/// With several targets, the one with the lowest priority wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackTier {
    pub targets: Vec<String>,
    pub keywords: Vec<String>,
}

/// A complete, priority-ordered topic taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taxonomy {
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Terminal category for items no tier decides on.
    pub neutral: String,
    pub categories: Vec<CategoryDescriptor>,
    #[serde(default)]
    pub fallbacks: Vec<FallbackTier>,
}

impl Taxonomy {
    /// Descriptors in evaluation order (ascending priority).
    pub fn by_priority(&self) -> Vec<&CategoryDescriptor> {
        let mut ordered: Vec<&CategoryDescriptor> = self.categories.iter().collect();
        ordered.sort_by_key(|c| c.priority);
        ordered
    }

    pub fn get(&self, key: &str) -> Option<&CategoryDescriptor> {
        self.categories.iter().find(|c| c.key == key)
    }

    pub fn category_keys(&self) -> Vec<String> {
        self.by_priority().iter().map(|c| c.key.clone()).collect()
    }

    /// Collect every structural problem. An empty list means the taxonomy is
    /// safe to classify with.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if self.categories.is_empty() {
            problems.push("taxonomy has no categories".to_string());
            return problems;
        }

        let mut keys: HashSet<&str> = HashSet::new();
        let mut priorities: HashMap<i64, &str> = HashMap::new();
        for cat in &self.categories {
            if !slug_re().is_match(&cat.key) {
                problems.push(format!("key '{}' is not a snake_case slug", cat.key));
            }
            if !keys.insert(cat.key.as_str()) {
                problems.push(format!("duplicate key '{}'", cat.key));
            }
            if let Some(other) = priorities.insert(cat.priority, cat.key.as_str()) {
                problems.push(format!(
                    "priority {} shared by '{other}' and '{}'",
                    cat.priority, cat.key
                ));
            }
            check_keywords(&cat.key, &cat.keywords, &mut problems);
        }

        // A key shaped like `foo_2` would collide with the second chunk of `foo`.
        for cat in &self.categories {
            if let Some(caps) = suffix_re().captures(&cat.key) {
                let base = &caps[1];
                let n: usize = caps[2].parse().unwrap_or(0);
                if n >= 2 && keys.contains(base) {
                    problems.push(format!(
                        "key '{}' collides with partition suffix of '{base}'",
                        cat.key
                    ));
                }
            }
        }

        if !keys.contains(self.neutral.as_str()) {
            problems.push(unknown_key("neutral category", &self.neutral, &keys));
        } else if is_generic(&self.neutral)
            || self.get(&self.neutral).is_some_and(|c| is_generic(&c.name))
        {
            problems.push(format!(
                "neutral category '{}' is a generic bucket; pick a specific topic",
                self.neutral
            ));
        }

        for (i, tier) in self.fallbacks.iter().enumerate() {
            let label = format!("fallback tier {}", i + 1);
            if tier.targets.is_empty() {
                problems.push(format!("{label} has no target categories"));
            }
            for target in &tier.targets {
                if !keys.contains(target.as_str()) {
                    problems.push(unknown_key(&label, target, &keys));
                }
            }
            if tier.keywords.is_empty() {
                problems.push(format!("{label} has no keywords"));
            }
            check_keywords(&label, &tier.keywords, &mut problems);
        }

        problems
    }

    /// Validate, turning any problem into [`TopicError::InvalidTaxonomy`].
    pub fn validated(self) -> Result<Self> {
        let problems = self.validate();
        if problems.is_empty() {
            Ok(self)
        } else {
            Err(TopicError::InvalidTaxonomy(problems))
        }
    }
}

fn check_keywords(owner: &str, keywords: &[String], problems: &mut Vec<String>) {
    for kw in keywords {
        if kw.trim().is_empty() {
            problems.push(format!("'{owner}' has an empty keyword"));
        } else if *kw != kw.to_lowercase() {
            problems.push(format!("'{owner}' keyword '{kw}' is not lowercase"));
        }
    }
}

fn unknown_key(what: &str, key: &str, known: &HashSet<&str>) -> String {
    match closest_key(key, known) {
        Some(hint) => format!("{what} '{key}' is not a category (did you mean '{hint}'?)"),
        None => format!("{what} '{key}' is not a category"),
    }
}

fn closest_key<'a>(key: &str, known: &HashSet<&'a str>) -> Option<&'a str> {
    let mut candidates: Vec<(&str, f64)> = known
        .iter()
        .map(|k| (*k, strsim::jaro_winkler(key, k)))
        .filter(|(_, score)| *score >= 0.8)
        .collect();
    candidates.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(b.0))
    });
    candidates.first().map(|(k, _)| *k)
}

fn is_generic(label: &str) -> bool {
    generic_re().is_match(label.trim())
}

fn slug_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z0-9]+(?:_[a-z0-9]+)*$").expect("valid regex"))
}

fn suffix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(.+)_(\d+)$").expect("valid regex"))
}

fn generic_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^(other|others|misc|miscellaneous|uncategori[sz]ed|general|unknown|default|none)$")
            .expect("valid regex")
    })
}

/// Load the default taxonomy using this resolution order:
///
/// 1. `$KANJI_TOPICS_TAXONOMY` env var (path to JSON file)
/// 2. `$XDG_DATA_HOME/kanji-topics/taxonomy.json` (user override)
/// 3. `~/.local/share/kanji-topics/taxonomy.json` (fallback XDG path)
/// 4. Embedded compile-time default from `taxonomies/kanji_n3.json`
///
/// An override that cannot be read or fails validation is logged and skipped.
pub fn default_taxonomy() -> Result<Taxonomy> {
    // 1. Env var override
    if let Ok(path) = std::env::var(TAXONOMY_ENV) {
        match load_taxonomy(&path) {
            Ok(tax) => {
                debug!(%path, "taxonomy loaded from {TAXONOMY_ENV}");
                return Ok(tax);
            }
            Err(e) => warn!(%path, error = %e, "ignoring taxonomy override"),
        }
    }

    // 2. XDG_DATA_HOME
    if let Some(path) = xdg_taxonomy_path() {
        if path.exists() {
            let path = path.to_string_lossy();
            match load_taxonomy(&path) {
                Ok(tax) => {
                    debug!(%path, "taxonomy loaded from XDG data dir");
                    return Ok(tax);
                }
                Err(e) => warn!(%path, error = %e, "ignoring taxonomy override"),
            }
        }
    }

    // 3. Embedded fallback
    parse_taxonomy(EMBEDDED_DEFAULT)
}

/// Parse and validate a taxonomy from a JSON string.
pub fn parse_taxonomy(json: &str) -> Result<Taxonomy> {
    let tax: Taxonomy = serde_json::from_str(json).map_err(|source| TopicError::Json {
        what: "taxonomy",
        source,
    })?;
    tax.validated()
}

/// Load taxonomy from a file path.
pub fn load_taxonomy(path: &str) -> Result<Taxonomy> {
    let json = std::fs::read_to_string(path).map_err(|source| TopicError::Io {
        path: path.to_string(),
        source,
    })?;
    parse_taxonomy(&json)
}

/// Resolve an explicit path if given, else the default chain.
pub fn resolve_taxonomy(path: Option<&str>) -> Result<Taxonomy> {
    match path {
        Some(p) => load_taxonomy(p),
        None => default_taxonomy(),
    }
}

/// Return the XDG data path for the kanji-topics taxonomy.
fn xdg_taxonomy_path() -> Option<PathBuf> {
    let data_home = std::env::var("XDG_DATA_HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join(".local/share"))
        })?;
    Some(data_home.join("kanji-topics/taxonomy.json"))
}

/// Return the embedded default taxonomy as a JSON string.
/// Useful for exporting/seeding user-customizable files.
pub fn embedded_default_json() -> &'static str {
    EMBEDDED_DEFAULT
}

/// Build a taxonomy from `(key, priority, "comma,separated,keywords")` rows.
#[cfg(test)]
pub(crate) fn test_taxonomy(cats: &[(&str, i64, &str)], neutral: &str) -> Taxonomy {
    Taxonomy {
        name: "test".into(),
        version: "1".into(),
        description: None,
        neutral: neutral.into(),
        categories: cats
            .iter()
            .map(|(key, priority, keywords)| CategoryDescriptor {
                key: (*key).into(),
                name: key.replace('_', " "),
                description: format!("{key} topics"),
                priority: *priority,
                keywords: keywords
                    .split(',')
                    .filter(|k| !k.is_empty())
                    .map(String::from)
                    .collect(),
            })
            .collect(),
        fallbacks: vec![],
    }
}
