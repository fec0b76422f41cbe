//! Shared fixtures for integration tests

#![allow(dead_code)]

use open_taxonomy::{Category, TaxonomyRegistry};

/// Install a test subscriber once; later calls are no-ops
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "open_taxonomy=debug".into()),
        )
        .with_test_writer()
        .try_init();
}

/// Category whose full name is its breadcrumb below `parent_full_name`
pub fn category(id: &str, name: &str, level: u32, parent: Option<(&str, &str)>) -> Category {
    match parent {
        Some((parent_id, parent_full_name)) => Category::new(
            id,
            name,
            level,
            format!("{parent_full_name} > {name}"),
        )
        .with_parent(parent_id),
        None => Category::new(id, name, level, name),
    }
}

/// root → A → {B, C}
pub fn scenario_a_registry() -> TaxonomyRegistry {
    let mut registry = TaxonomyRegistry::new();
    registry.insert_category(category("a", "A", 0, None)).unwrap();
    registry
        .insert_category(category("b", "B", 1, Some(("a", "A"))))
        .unwrap();
    registry
        .insert_category(category("c", "C", 1, Some(("a", "A"))))
        .unwrap();
    registry
}

/// A small retail tree:
///
/// ```text
/// Electronics
///   Computers
///     Laptops
///     Desktops
///   Phones
/// Apparel
///   Shirts
///   Shoes
/// ```
pub fn retail_registry() -> TaxonomyRegistry {
    let mut registry = TaxonomyRegistry::new();
    let records = [
        category("el", "Electronics", 0, None),
        category("el-1", "Computers", 1, Some(("el", "Electronics"))),
        category("el-1-1", "Laptops", 2, Some(("el-1", "Electronics > Computers"))),
        category("el-1-2", "Desktops", 2, Some(("el-1", "Electronics > Computers"))),
        category("el-2", "Phones", 1, Some(("el", "Electronics"))),
        category("ap", "Apparel", 0, None),
        category("ap-1", "Shirts", 1, Some(("ap", "Apparel"))),
        category("ap-2", "Shoes", 1, Some(("ap", "Apparel"))),
    ];
    for record in records {
        registry.insert_category(record).unwrap();
    }
    registry
}

pub const TAXONOMY_JSON: &str = r#"{
  "version": "2024-07",
  "verticals": [
    {
      "categories": [
        {
          "id": "el",
          "name": "Electronics",
          "level": 0,
          "full_name": "Electronics",
          "children": [{"id": "el-1"}, {"id": "ghost"}],
          "ancestors": []
        },
        {
          "id": "el-1",
          "name": "Computers",
          "description": "Desktop and portable computers",
          "level": 1,
          "full_name": "Electronics > Computers",
          "parent_id": "el",
          "attributes": [{"id": "color", "name": "Color"}, {"id": "screen-size"}],
          "children": [],
          "ancestors": [{"id": "el"}]
        }
      ]
    }
  ]
}"#;

pub const ATTRIBUTES_JSON: &str = r#"{
  "attributes": [
    {
      "id": "color",
      "name": "Color",
      "handle": "color",
      "description": "Defines the primary color",
      "values": [
        {"id": "1", "name": "Black", "handle": "color__black"},
        {"id": "2", "name": "Silver", "handle": "color__silver"}
      ]
    },
    {
      "id": "screen-size",
      "name": "Screen size",
      "handle": "screen_size"
    }
  ]
}"#;
