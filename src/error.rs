//! Error types for taxonomy construction, oracle calls and search
//!
//! Construction errors are synchronous and never retried. Oracle errors
//! carry enough shape for adapter-side retry policies to tell transient
//! transport failures from malformed answers.

use std::fmt;

use thiserror::Error;

/// Which id space a lookup or collision refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Category,
    Attribute,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Category => write!(f, "category"),
            EntityKind::Attribute => write!(f, "attribute"),
        }
    }
}

/// Registry construction and lookup errors
#[derive(Error, Debug)]
pub enum TaxonomyError {
    #[error("{kind} with ID {id} already exists in the tree")]
    DuplicateId { kind: EntityKind, id: String },

    #[error("parent node with ID {parent_id} not found in the tree (while inserting {id})")]
    MissingParent { id: String, parent_id: String },

    #[error("{kind} with ID {id} not found")]
    NotFound { kind: EntityKind, id: String },

    #[error("invalid taxonomy document: {0}")]
    Document(#[from] serde_json::Error),
}

impl TaxonomyError {
    pub(crate) fn category_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: EntityKind::Category,
            id: id.into(),
        }
    }

    pub(crate) fn attribute_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: EntityKind::Attribute,
            id: id.into(),
        }
    }
}

/// Failures reported by a relevance oracle
#[derive(Error, Debug)]
pub enum OracleError {
    #[error("oracle transport error: {0}")]
    Transport(String),

    #[error("malformed oracle response: {0}")]
    MalformedResponse(String),

    #[error("oracle does not support {0}")]
    Unsupported(&'static str),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl OracleError {
    /// Transport failures may succeed on a later attempt; everything else won't
    pub fn is_transient(&self) -> bool {
        matches!(self, OracleError::Transport(_))
    }
}

impl From<reqwest::Error> for OracleError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            OracleError::MalformedResponse(error.to_string())
        } else {
            OracleError::Transport(error.to_string())
        }
    }
}

/// Errors surfaced by a search invocation
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("taxonomy error: {0}")]
    Taxonomy(#[from] TaxonomyError),

    #[error("oracle error: {0}")]
    Oracle(#[from] OracleError),

    #[error("invalid search options: {0}")]
    InvalidOptions(String),
}

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("{0} environment variable not set")]
    MissingEnv(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_duplicate_category() {
        let e = TaxonomyError::DuplicateId {
            kind: EntityKind::Category,
            id: "aa-1".into(),
        };
        assert_eq!(e.to_string(), "category with ID aa-1 already exists in the tree");
    }

    #[test]
    fn display_missing_parent() {
        let e = TaxonomyError::MissingParent {
            id: "aa-1-2".into(),
            parent_id: "aa-1".into(),
        };
        assert_eq!(
            e.to_string(),
            "parent node with ID aa-1 not found in the tree (while inserting aa-1-2)"
        );
    }

    #[test]
    fn display_attribute_not_found() {
        let e = TaxonomyError::attribute_not_found("color");
        assert_eq!(e.to_string(), "attribute with ID color not found");
    }

    #[test]
    fn only_transport_errors_are_transient() {
        assert!(OracleError::Transport("reset".into()).is_transient());
        assert!(!OracleError::MalformedResponse("no choices".into()).is_transient());
        assert!(!OracleError::Unsupported("select_subset").is_transient());
        assert!(!OracleError::Other(anyhow::anyhow!("boom")).is_transient());
    }

    #[test]
    fn search_error_wraps_oracle_error() {
        let e: SearchError = OracleError::Transport("timeout".into()).into();
        assert_eq!(e.to_string(), "oracle error: oracle transport error: timeout");
    }
}
