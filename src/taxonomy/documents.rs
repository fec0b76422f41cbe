//! Serde models for the bulk taxonomy and attribute documents
//!
//! ```json
//! { "version": "2024-07",
//!   "verticals": [ { "categories": [ { "id": "el", "level": 0, ... } ] } ] }
//! ```

use serde::{Deserialize, Serialize};

use super::attribute::{Attribute, AttributeValue};
use super::category::{Category, CategoryId};
use crate::error::TaxonomyError;

/// Top-level taxonomy document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxonomyDocument {
    pub version: String,
    #[serde(default)]
    pub verticals: Vec<Vertical>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vertical {
    #[serde(default)]
    pub categories: Vec<CategoryRecord>,
}

/// One category as it appears in a taxonomy document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub level: u32,
    pub full_name: String,
    #[serde(default)]
    pub parent_id: Option<CategoryId>,
    #[serde(default)]
    pub attributes: Vec<AttributeRef>,
    #[serde(default)]
    pub children: Vec<IdRef>,
    #[serde(default)]
    pub ancestors: Vec<IdRef>,
}

/// `{"id": ...}` reference to another category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdRef {
    pub id: String,
}

/// Attribute reference listed on a category; only the id is significant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeRef {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Top-level attribute document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeDocument {
    #[serde(default)]
    pub attributes: Vec<AttributeRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeRecord {
    pub id: String,
    pub name: String,
    pub handle: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub extended_attributes: Vec<String>,
    #[serde(default)]
    pub values: Vec<AttributeValue>,
}

impl TaxonomyDocument {
    pub fn from_json_str(json: &str) -> Result<Self, TaxonomyError> {
        Ok(serde_json::from_str(json)?)
    }

    /// All category records across verticals, in document order
    pub fn categories(&self) -> impl Iterator<Item = &CategoryRecord> {
        self.verticals.iter().flat_map(|v| v.categories.iter())
    }
}

impl AttributeDocument {
    pub fn from_json_str(json: &str) -> Result<Self, TaxonomyError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl CategoryRecord {
    /// Build the in-memory category, leaving derived links empty
    pub(crate) fn to_category(&self) -> Category {
        Category {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            level: self.level,
            full_name: self.full_name.clone(),
            parent_id: self.parent_id.clone(),
            attributes: self.attributes.iter().map(|a| a.id.clone()).collect(),
            ancestors: Vec::new(),
            children: Vec::new(),
        }
    }

    pub(crate) fn from_category(category: &Category) -> Self {
        let refs = |ids: &[CategoryId]| -> Vec<IdRef> {
            ids.iter().map(|id| IdRef { id: id.clone() }).collect()
        };
        Self {
            id: category.id.clone(),
            name: category.name.clone(),
            description: category.description.clone(),
            level: category.level,
            full_name: category.full_name.clone(),
            parent_id: category.parent_id.clone(),
            attributes: category
                .attributes
                .iter()
                .map(|id| AttributeRef {
                    id: id.clone(),
                    name: None,
                })
                .collect(),
            children: refs(&category.children),
            ancestors: refs(&category.ancestors),
        }
    }
}

impl From<AttributeRecord> for Attribute {
    fn from(record: AttributeRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            handle: record.handle,
            description: record.description.unwrap_or_default(),
            extended_attributes: record.extended_attributes,
            values: record.values,
        }
    }
}
