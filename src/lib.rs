//! Open Taxonomy - hierarchical category classification
//!
//! Maintains a category tree (with typed attributes per category) and
//! classifies free text down to leaf categories by walking the tree and
//! asking an external relevance oracle which branches are worth exploring.
//!
//! ## Architecture
//!
//! ```text
//! taxonomy.json + attributes.json
//!         │
//!         ▼
//!  TaxonomyRegistry ──(read-only, Arc)──► SearchEngine ──► RelevanceOracle
//!                                              │              (external)
//!                                              ▼
//!                                     ranked Vec<SearchHit>
//! ```
//!
//! The oracle is always injected. Tests use [`oracle::ScriptedOracle`];
//! production callers use [`oracle::OpenAiRelevanceOracle`], optionally
//! wrapped in [`oracle::RetryingOracle`].

pub mod config;
pub mod error;
pub mod oracle;
pub mod search;
pub mod taxonomy;

pub use config::{OracleSettings, SearchSettings, TaxonomyConfig};
pub use error::{ConfigError, EntityKind, OracleError, SearchError, TaxonomyError};
pub use oracle::{Judgement, RelevanceOracle};
pub use search::{SearchEngine, SearchHit, SearchOptions, SelectionExplorer, DEFAULT_FANOUT_WIDTH};
pub use taxonomy::{
    Attribute, AttributeDocument, AttributeValue, Category, CategoryId, TaxonomyDocument,
    TaxonomyRegistry, ROOT_ID,
};
