//! Category taxonomy
//!
//! The registry is the single ownership arena for every category and
//! attribute. Parent, child and ancestor links are stored as ids and
//! resolved through the registry, so the tree has no ownership cycles and
//! serializes as flat records.
//!
//! ```text
//! root ──► level-0 vertical ──► level-1 ──► ... ──► leaf
//!   ▲            │
//!   └─ ancestors ┘   (ancestors(child) = ancestors(parent) + [parent])
//! ```

mod attribute;
mod category;
mod documents;
mod registry;

pub use attribute::{Attribute, AttributeValue};
pub use category::{Category, CategoryId, ROOT_ID};
pub use documents::{
    AttributeDocument, AttributeRecord, AttributeRef, CategoryRecord, IdRef, TaxonomyDocument,
    Vertical,
};
pub use registry::TaxonomyRegistry;
