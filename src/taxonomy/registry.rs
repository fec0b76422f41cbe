//! TaxonomyRegistry - id-indexed arena for categories and attributes
//!
//! The registry:
//! - owns every `Category` and `Attribute` for its lifetime
//! - validates ids and parent links at insertion time
//! - derives `ancestors` and maintains `children` as categories arrive
//! - exports itself back to a taxonomy document
//!
//! After construction it is only read, so searches share it behind an
//! `Arc` without locking.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info, warn};

use super::attribute::Attribute;
use super::category::{Category, CategoryId, ROOT_ID};
use super::documents::{
    AttributeDocument, AttributeRecord, CategoryRecord, TaxonomyDocument, Vertical,
};
use crate::error::{EntityKind, TaxonomyError};

const DEFAULT_ROOT_NAME: &str = "Root";

/// Id-indexed store of categories and attributes
#[derive(Debug, Clone)]
pub struct TaxonomyRegistry {
    categories: HashMap<CategoryId, Category>,
    /// Insertion order, root excluded
    order: Vec<CategoryId>,
    attributes: HashMap<String, Attribute>,
    attribute_order: Vec<String>,
}

impl Default for TaxonomyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TaxonomyRegistry {
    /// Create an empty registry whose synthetic root is named "Root"
    pub fn new() -> Self {
        Self::with_root_name(DEFAULT_ROOT_NAME)
    }

    pub fn with_root_name(root_name: impl Into<String>) -> Self {
        let root = Category::root(root_name);
        let mut categories = HashMap::new();
        categories.insert(root.id.clone(), root);
        Self {
            categories,
            order: Vec::new(),
            attributes: HashMap::new(),
            attribute_order: Vec::new(),
        }
    }

    /// Build a registry from both documents in one go
    pub fn from_documents(
        taxonomy: &TaxonomyDocument,
        attributes: &AttributeDocument,
    ) -> Result<Self, TaxonomyError> {
        let mut registry = Self::new();
        registry.bulk_load(taxonomy, attributes)?;
        Ok(registry)
    }

    /// Build a registry from raw JSON text of both documents
    pub fn from_json(taxonomy_json: &str, attribute_json: &str) -> Result<Self, TaxonomyError> {
        let taxonomy = TaxonomyDocument::from_json_str(taxonomy_json)?;
        let attributes = AttributeDocument::from_json_str(attribute_json)?;
        Self::from_documents(&taxonomy, &attributes)
    }

    // =========================================================================
    // INSERTION
    // =========================================================================

    /// Insert a single category.
    ///
    /// Level-0 categories attach to the synthetic root; deeper categories
    /// need their parent to be registered already.
    pub fn insert_category(&mut self, mut category: Category) -> Result<(), TaxonomyError> {
        category.children.clear();
        self.insert_record(category)
    }

    fn insert_record(&mut self, mut category: Category) -> Result<(), TaxonomyError> {
        if self.categories.contains_key(&category.id) {
            return Err(TaxonomyError::DuplicateId {
                kind: EntityKind::Category,
                id: category.id,
            });
        }

        let parent_id = if category.level == 0 {
            if let Some(declared) = category.parent_id.take() {
                warn!(
                    id = %category.id,
                    parent_id = %declared,
                    "Ignoring parent_id on level-0 category"
                );
            }
            ROOT_ID.to_string()
        } else {
            match category.parent_id.as_deref() {
                Some(parent_id) if self.categories.contains_key(parent_id) => {
                    parent_id.to_string()
                }
                declared => {
                    return Err(TaxonomyError::MissingParent {
                        id: category.id,
                        parent_id: declared.unwrap_or("<none>").to_string(),
                    })
                }
            }
        };

        let Some(parent) = self.categories.get_mut(&parent_id) else {
            return Err(TaxonomyError::category_not_found(parent_id));
        };
        category.ancestors = if parent.is_root() {
            vec![parent_id.clone()]
        } else {
            let mut ancestors = parent.ancestors.clone();
            ancestors.push(parent_id.clone());
            ancestors
        };
        parent.attach_child(&category.id);

        self.order.push(category.id.clone());
        self.categories.insert(category.id.clone(), category);
        Ok(())
    }

    /// Load a flat taxonomy document and an attribute document.
    ///
    /// Declared `children` / `ancestors` references are resolved against the
    /// records of the document (and anything already registered); dangling
    /// references are dropped. Records are then inserted in document order,
    /// so parents must precede their children. The first failure aborts the
    /// load and leaves the registry in a non-authoritative state.
    pub fn bulk_load(
        &mut self,
        taxonomy: &TaxonomyDocument,
        attributes: &AttributeDocument,
    ) -> Result<(), TaxonomyError> {
        // Phase 1: index every record regardless of order (first one wins)
        let mut parsed: HashMap<&str, &CategoryRecord> = HashMap::new();
        for record in taxonomy.categories() {
            parsed.entry(record.id.as_str()).or_insert(record);
        }

        let mut dropped = 0usize;
        for record in taxonomy.categories() {
            // Phase 2: resolve declared links
            let mut category = record.to_category();
            for child in &record.children {
                match self.effective_parent_of(&parsed, &child.id) {
                    Some(Some(parent)) if parent == record.id => {
                        category.attach_child(&child.id)
                    }
                    Some(_) => {
                        debug!(
                            id = %record.id,
                            child = %child.id,
                            "Dropping child whose parent_id disagrees"
                        );
                        dropped += 1;
                    }
                    None => {
                        debug!(
                            id = %record.id,
                            child = %child.id,
                            "Dropping dangling child reference"
                        );
                        dropped += 1;
                    }
                }
            }
            let declared_ancestors: Vec<&str> = record
                .ancestors
                .iter()
                .map(|a| a.id.as_str())
                .filter(|id| *id == ROOT_ID || self.effective_parent_of(&parsed, id).is_some())
                .collect();
            dropped += record.ancestors.len() - declared_ancestors.len();

            // Phase 3: insert in document order
            self.insert_record(category)?;

            if !declared_ancestors.is_empty() {
                let derived = self.categories[&record.id].ancestors();
                let declared_tail = declared_ancestors.iter().filter(|id| **id != ROOT_ID);
                let derived_tail = derived.iter().filter(|id| id.as_str() != ROOT_ID);
                if !declared_tail.map(|s| *s).eq(derived_tail.map(String::as_str)) {
                    debug!(id = %record.id, "Declared ancestors differ from derived chain");
                }
            }
        }
        if dropped > 0 {
            warn!(dropped, "Dropped unresolvable category references");
        }
        info!("Loaded {} categories.", self.order.len());

        info!("Loading {} attributes.", attributes.attributes.len());
        for record in &attributes.attributes {
            self.register_attribute(record.clone().into())?;
        }
        info!("Loaded {} attributes.", self.attributes.len());
        Ok(())
    }

    /// Parent the category will actually attach under.
    ///
    /// `Some(None)` for level-0 records (they hang off the root whatever
    /// `parent_id` they declare), `None` when the id dangles.
    fn effective_parent_of<'a>(
        &'a self,
        parsed: &HashMap<&str, &'a CategoryRecord>,
        id: &str,
    ) -> Option<Option<&'a str>> {
        if let Some(record) = parsed.get(id) {
            if record.level == 0 {
                return Some(None);
            }
            return Some(record.parent_id.as_deref());
        }
        self.categories
            .get(id)
            .map(|category| category.parent_id.as_deref())
    }

    /// Register one attribute definition.
    ///
    /// An identical re-registration is a no-op; a different definition
    /// under an existing id is a duplicate-id error.
    pub fn register_attribute(&mut self, attribute: Attribute) -> Result<(), TaxonomyError> {
        match self.attributes.get(&attribute.id) {
            Some(existing) if *existing == attribute => Ok(()),
            Some(_) => Err(TaxonomyError::DuplicateId {
                kind: EntityKind::Attribute,
                id: attribute.id,
            }),
            None => {
                self.attribute_order.push(attribute.id.clone());
                self.attributes.insert(attribute.id.clone(), attribute);
                Ok(())
            }
        }
    }

    /// Assign an attribute list to a category and register new definitions.
    ///
    /// All definitions are checked before anything is changed, so a
    /// conflict leaves both the category and the attribute table untouched.
    pub fn register_category_attributes(
        &mut self,
        category_id: &str,
        attributes: Vec<Attribute>,
    ) -> Result<(), TaxonomyError> {
        if !self.categories.contains_key(category_id) {
            return Err(TaxonomyError::category_not_found(category_id));
        }

        let mut seen: HashMap<&str, &Attribute> = HashMap::new();
        for attribute in &attributes {
            let existing = self
                .attributes
                .get(&attribute.id)
                .or_else(|| seen.get(attribute.id.as_str()).copied());
            if existing.is_some_and(|e| e != attribute) {
                return Err(TaxonomyError::DuplicateId {
                    kind: EntityKind::Attribute,
                    id: attribute.id.clone(),
                });
            }
            seen.insert(attribute.id.as_str(), attribute);
        }

        let ids: Vec<String> = attributes.iter().map(|a| a.id.clone()).collect();
        for attribute in attributes {
            self.register_attribute(attribute)?;
        }
        if let Some(category) = self.categories.get_mut(category_id) {
            category.attributes = ids;
        }
        Ok(())
    }

    // =========================================================================
    // LOOKUP
    // =========================================================================

    pub fn root(&self) -> &Category {
        // The root is inserted by the constructor and never removed
        &self.categories[ROOT_ID]
    }

    pub fn get_category(&self, id: &str) -> Result<&Category, TaxonomyError> {
        self.categories
            .get(id)
            .ok_or_else(|| TaxonomyError::category_not_found(id))
    }

    pub fn get_attribute(&self, id: &str) -> Result<&Attribute, TaxonomyError> {
        self.attributes
            .get(id)
            .ok_or_else(|| TaxonomyError::attribute_not_found(id))
    }

    pub fn contains_category(&self, id: &str) -> bool {
        self.categories.contains_key(id)
    }

    /// Number of categories, root excluded
    pub fn category_count(&self) -> usize {
        self.order.len()
    }

    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    /// Categories in insertion order, root excluded
    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.order.iter().filter_map(|id| self.categories.get(id))
    }

    /// Attributes in registration order
    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.attribute_order
            .iter()
            .filter_map(|id| self.attributes.get(id))
    }

    /// Registered children of a category, in discovery order
    pub fn children_of(&self, id: &str) -> Result<Vec<&Category>, TaxonomyError> {
        let category = self.get_category(id)?;
        Ok(category
            .children()
            .iter()
            .filter_map(|child| self.categories.get(child))
            .collect())
    }

    /// Ancestors of a category from the root down to its parent
    pub fn ancestors_of(&self, id: &str) -> Result<Vec<&Category>, TaxonomyError> {
        let category = self.get_category(id)?;
        category
            .ancestors()
            .iter()
            .map(|ancestor| self.get_category(ancestor))
            .collect()
    }

    /// Resolve a category's attribute references to their definitions
    pub fn category_attributes(&self, id: &str) -> Result<Vec<&Attribute>, TaxonomyError> {
        let category = self.get_category(id)?;
        category
            .attributes
            .iter()
            .map(|attribute| self.get_attribute(attribute))
            .collect()
    }

    // =========================================================================
    // TRAVERSAL / EXPORT
    // =========================================================================

    /// Depth-first pre-order walk from `start` (default: root).
    ///
    /// Depth is relative to the start category.
    pub fn walk(&self, start: Option<&str>) -> Result<Vec<(usize, &Category)>, TaxonomyError> {
        let start = self.get_category(start.unwrap_or(ROOT_ID))?;
        let mut visited = Vec::new();
        let mut seen = HashSet::new();
        let mut stack = vec![(0usize, start)];

        while let Some((depth, category)) = stack.pop() {
            if !seen.insert(category.id.as_str()) {
                continue;
            }
            visited.push((depth, category));
            for child in category.children().iter().rev() {
                match self.categories.get(child) {
                    Some(child) => stack.push((depth + 1, child)),
                    None => debug!(id = %category.id, child = %child, "Child not registered"),
                }
            }
        }
        Ok(visited)
    }

    /// Indented outline of the tree below `start`
    pub fn outline(&self, start: Option<&str>) -> Result<String, TaxonomyError> {
        let mut out = String::new();
        for (depth, category) in self.walk(start)? {
            out.push_str(&format!(
                "{}{} (ID: {}, Level: {})\n",
                "  ".repeat(depth),
                category.name,
                category.id,
                category.level
            ));
        }
        Ok(out)
    }

    /// Export as a taxonomy document, one vertical per level-0 category.
    ///
    /// Parents precede children within each vertical, so the result can be
    /// fed straight back into `bulk_load`.
    pub fn to_document(&self, version: impl Into<String>) -> TaxonomyDocument {
        let verticals = self
            .root()
            .children()
            .iter()
            .filter_map(|top| self.walk(Some(top.as_str())).ok())
            .map(|subtree| Vertical {
                categories: subtree
                    .into_iter()
                    .map(|(_, category)| CategoryRecord::from_category(category))
                    .collect(),
            })
            .collect();

        TaxonomyDocument {
            version: version.into(),
            verticals,
        }
    }

    /// Export the attribute table as an attribute document
    pub fn to_attribute_document(&self) -> AttributeDocument {
        AttributeDocument {
            attributes: self
                .attributes()
                .map(|a| AttributeRecord {
                    id: a.id.clone(),
                    name: a.name.clone(),
                    handle: a.handle.clone(),
                    description: (!a.description.is_empty()).then(|| a.description.clone()),
                    extended_attributes: a.extended_attributes.clone(),
                    values: a.values.clone(),
                })
                .collect(),
        }
    }
}
