//! Error types shared by the engine, the ops layer and both binaries.

use thiserror::Error;

/// Conditions that halt a classification run.
///
/// Misses, duplicate assignments and repairable coverage gaps are handled
/// inside the engine and never reach this type.
#[derive(Error, Debug)]
pub enum TopicError {
    /// Reading a source or taxonomy file failed
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON encoding/decoding errors
    #[error("Failed to parse {what}: {source}")]
    Json {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Taxonomy failed validation; every problem found is listed
    #[error("Invalid taxonomy: {}", .0.join("; "))]
    InvalidTaxonomy(Vec<String>),

    /// Nothing to classify
    #[error("Source collection is empty; nothing to classify")]
    EmptySource,

    /// Records without an `id`, reported by zero-based position
    #[error("Items at positions {positions:?} have no identifier")]
    MissingIdentifier { positions: Vec<usize> },

    /// The same id appears on more than one source record
    #[error("Duplicate item identifiers in source: {ids:?}")]
    DuplicateIdentifier { ids: Vec<i64> },

    /// Ids still absent from the category map after reconciliation
    #[error("Coverage gap could not be repaired; missing ids {missing:?}")]
    CoverageGap { missing: Vec<i64> },
}

pub type Result<T> = std::result::Result<T, TopicError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = TopicError::MissingIdentifier {
            positions: vec![3, 7],
        };
        assert_eq!(err.to_string(), "Items at positions [3, 7] have no identifier");

        let err = TopicError::InvalidTaxonomy(vec!["a".into(), "b".into()]);
        assert_eq!(err.to_string(), "Invalid taxonomy: a; b");

        let err = TopicError::CoverageGap { missing: vec![42] };
        assert!(err.to_string().contains("[42]"));
    }
}
