//! Attribute definitions shared across categories

use serde::{Deserialize, Serialize};

/// A typed attribute (e.g. "Color") and the values it may take.
///
/// Equality is structural: the registry treats re-registration of an equal
/// definition as a no-op and anything else under the same id as a conflict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub id: String,
    pub name: String,
    pub handle: String,
    #[serde(default)]
    pub description: String,
    /// Ids of related attributes
    #[serde(default)]
    pub extended_attributes: Vec<String>,
    #[serde(default)]
    pub values: Vec<AttributeValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeValue {
    pub id: String,
    pub name: String,
    pub handle: String,
}

impl Attribute {
    pub fn new(id: impl Into<String>, name: impl Into<String>, handle: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            handle: handle.into(),
            description: String::new(),
            extended_attributes: Vec::new(),
            values: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_value(
        mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        handle: impl Into<String>,
    ) -> Self {
        self.values.push(AttributeValue {
            id: id.into(),
            name: name.into(),
            handle: handle.into(),
        });
        self
    }

    /// Allowed value names, in declaration order
    pub fn value_names(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|v| v.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_fields_default() {
        let attribute: Attribute = serde_json::from_str(
            r#"{"id": "color", "name": "Color", "handle": "color"}"#,
        )
        .unwrap();
        assert_eq!(attribute.description, "");
        assert!(attribute.extended_attributes.is_empty());
        assert!(attribute.values.is_empty());
    }

    #[test]
    fn test_value_names() {
        let attribute = Attribute::new("color", "Color", "color")
            .with_value("color-1", "Red", "red")
            .with_value("color-2", "Blue", "blue");
        assert_eq!(attribute.value_names().collect::<Vec<_>>(), ["Red", "Blue"]);
    }

    #[test]
    fn test_equality_is_structural() {
        let a = Attribute::new("color", "Color", "color").with_value("color-1", "Red", "red");
        let b = Attribute::new("color", "Color", "color").with_value("color-1", "Red", "red");
        let c = Attribute::new("color", "Colour", "color");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
