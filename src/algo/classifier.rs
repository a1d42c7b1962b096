//! Rule-based topic routing.
//!
//! Routing is a chain of tiers, each returning a decision or nothing:
//!
//! 1. **Primary**: categories in ascending priority; the first whose keyword
//!    occurs as a substring of the full search text wins.
//! 2. **Secondary**: fallback tiers in declaration order, tested against the
//!    meaning gloss only.
//! 3. **Neutral**: the taxonomy's designated specific category.
//!
//! The chain always ends in a decision, so every item gets a key.

use std::fmt;

use crate::algo::aggregate::{gloss_text, search_text};
use crate::algo::item::Item;
use crate::algo::taxonomy::{CategoryDescriptor, Taxonomy};

/// Which step of the chain decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Primary,
    /// One-based index into the taxonomy's fallback list.
    Secondary(usize),
    Neutral,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Primary => write!(f, "primary"),
            Tier::Secondary(n) => write!(f, "secondary-{n}"),
            Tier::Neutral => write!(f, "neutral"),
        }
    }
}

/// The routing decision for one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution<'a> {
    pub key: &'a str,
    pub tier: Tier,
    /// Keyword that fired; `None` for neutral routing.
    pub keyword: Option<&'a str>,
}

struct Secondary {
    target: String,
    keywords: Vec<String>,
}

/// Compiled view of a validated taxonomy, ready to route items.
pub struct Classifier {
    ordered: Vec<CategoryDescriptor>,
    secondary: Vec<Secondary>,
    neutral: String,
}

impl Classifier {
    /// Build from a taxonomy that has already passed [`Taxonomy::validate`].
    pub fn new(taxonomy: &Taxonomy) -> Self {
        let ordered: Vec<CategoryDescriptor> =
            taxonomy.by_priority().into_iter().cloned().collect();

        let secondary = taxonomy
            .fallbacks
            .iter()
            .filter_map(|tier| {
                // Several targets: the highest-ranked one in priority order.
                let target = ordered
                    .iter()
                    .find(|c| tier.targets.iter().any(|t| *t == c.key))?;
                Some(Secondary {
                    target: target.key.clone(),
                    keywords: tier.keywords.iter().map(|k| k.to_lowercase()).collect(),
                })
            })
            .collect();

        Self {
            ordered,
            secondary,
            neutral: taxonomy.neutral.clone(),
        }
    }

    pub fn neutral_key(&self) -> &str {
        &self.neutral
    }

    /// First category, by priority, with a keyword inside `text`.
    /// `text` must already be lowercase.
    pub fn primary(&self, text: &str) -> Option<Resolution<'_>> {
        self.ordered.iter().find_map(|cat| {
            cat.keywords
                .iter()
                .find(|kw| text.contains(kw.as_str()))
                .map(|kw| Resolution {
                    key: cat.key.as_str(),
                    tier: Tier::Primary,
                    keyword: Some(kw.as_str()),
                })
        })
    }

    /// First fallback tier with a keyword inside the lowercase gloss.
    pub fn secondary(&self, gloss: &str) -> Option<Resolution<'_>> {
        self.secondary.iter().enumerate().find_map(|(i, tier)| {
            tier.keywords
                .iter()
                .find(|kw| gloss.contains(kw.as_str()))
                .map(|kw| Resolution {
                    key: tier.target.as_str(),
                    tier: Tier::Secondary(i + 1),
                    keyword: Some(kw.as_str()),
                })
        })
    }

    pub fn neutral(&self) -> Resolution<'_> {
        Resolution {
            key: self.neutral.as_str(),
            tier: Tier::Neutral,
            keyword: None,
        }
    }

    /// Route one item through the full chain.
    pub fn resolve(&self, item: &Item) -> Resolution<'_> {
        self.primary(&search_text(item))
            .or_else(|| self.secondary(&gloss_text(item)))
            .unwrap_or_else(|| self.neutral())
    }
}
