//! Category - a node in the taxonomy tree

use serde::{Deserialize, Serialize};

/// Category identifiers are the taxonomy's own string keys (e.g. `el-4-8`)
pub type CategoryId = String;

/// Id of the synthetic root every level-0 vertical hangs off
pub const ROOT_ID: &str = "root";

pub(crate) const ROOT_DESCRIPTION: &str = "The Root Category";

/// A category in the taxonomy.
///
/// `children` and `ancestors` are derived by the registry at insertion time;
/// a freshly built category always has both empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Depth of the category, 0 = top-level vertical
    pub level: u32,
    /// Breadcrumb, e.g. "Electronics > Computers > Laptops"
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<CategoryId>,
    /// Attribute ids, in taxonomy order (not owned by the category)
    #[serde(default)]
    pub attributes: Vec<String>,

    #[serde(default)]
    pub(crate) ancestors: Vec<CategoryId>,
    #[serde(default)]
    pub(crate) children: Vec<CategoryId>,
}

impl Category {
    /// Create a category with no parent, description or attributes
    pub fn new(
        id: impl Into<CategoryId>,
        name: impl Into<String>,
        level: u32,
        full_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            level,
            full_name: full_name.into(),
            parent_id: None,
            attributes: Vec::new(),
            ancestors: Vec::new(),
            children: Vec::new(),
        }
    }

    pub(crate) fn root(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(ROOT_ID, name.clone(), 0, name).with_description(ROOT_DESCRIPTION)
    }

    pub fn with_parent(mut self, parent_id: impl Into<CategoryId>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_attributes<I, S>(mut self, attribute_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes = attribute_ids.into_iter().map(Into::into).collect();
        self
    }

    /// Ancestor ids from the root down to the immediate parent
    pub fn ancestors(&self) -> &[CategoryId] {
        &self.ancestors
    }

    /// Child ids in discovery order
    pub fn children(&self) -> &[CategoryId] {
        &self.children
    }

    pub fn is_root(&self) -> bool {
        self.id == ROOT_ID
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Append a child id, keeping set semantics
    pub(crate) fn attach_child(&mut self, child_id: &str) {
        if !self.children.iter().any(|c| c == child_id) {
            self.children.push(child_id.to_string());
        }
    }
}
