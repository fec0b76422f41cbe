//! Registry construction from documents and structural invariants

mod helpers;

use anyhow::Result;
use helpers::{category, init_tracing, retail_registry, ATTRIBUTES_JSON, TAXONOMY_JSON};
use open_taxonomy::taxonomy::IdRef;
use open_taxonomy::{
    AttributeDocument, EntityKind, TaxonomyDocument, TaxonomyError, TaxonomyRegistry, ROOT_ID,
};
use proptest::prelude::*;

#[test]
fn scenario_b_missing_parent() {
    let mut registry = TaxonomyRegistry::new();
    let err = registry
        .insert_category(category("x", "X", 1, Some(("missing", "Missing"))))
        .unwrap_err();
    match err {
        TaxonomyError::MissingParent { id, parent_id } => {
            assert_eq!(id, "x");
            assert_eq!(parent_id, "missing");
        }
        other => panic!("expected MissingParent, got {other:?}"),
    }
    assert!(!registry.contains_category("x"));
}

#[test]
fn scenario_c_dangling_child_is_dropped() -> Result<()> {
    init_tracing();
    let registry = TaxonomyRegistry::from_json(TAXONOMY_JSON, ATTRIBUTES_JSON)?;

    let electronics = registry.get_category("el")?;
    assert_eq!(electronics.children(), ["el-1"]);
    assert_eq!(electronics.ancestors(), [ROOT_ID]);
    assert!(!registry.contains_category("ghost"));

    let computers = registry.get_category("el-1")?;
    assert_eq!(computers.ancestors(), [ROOT_ID, "el"]);
    assert_eq!(
        computers.description.as_deref(),
        Some("Desktop and portable computers")
    );
    Ok(())
}

#[test]
fn category_attributes_resolve_to_definitions() -> Result<()> {
    let registry = TaxonomyRegistry::from_json(TAXONOMY_JSON, ATTRIBUTES_JSON)?;
    let attributes = registry.category_attributes("el-1")?;
    let names: Vec<_> = attributes.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, ["Color", "Screen size"]);

    let color = registry.get_attribute("color")?;
    assert_eq!(color.value_names().collect::<Vec<_>>(), ["Black", "Silver"]);
    assert!(registry.get_attribute("screen-size")?.description.is_empty());
    Ok(())
}

#[test]
fn conflicting_attribute_document_fails_load() {
    let conflicting = r#"{"attributes": [
        {"id": "color", "name": "Color", "handle": "color"},
        {"id": "color", "name": "Colour", "handle": "colour"}
    ]}"#;
    let err = TaxonomyRegistry::from_json(TAXONOMY_JSON, conflicting).unwrap_err();
    assert!(matches!(
        err,
        TaxonomyError::DuplicateId {
            kind: EntityKind::Attribute,
            ..
        }
    ));
}

#[test]
fn identical_attribute_reregistration_is_noop() -> Result<()> {
    let repeated = r#"{"attributes": [
        {"id": "color", "name": "Color", "handle": "color"},
        {"id": "color", "name": "Color", "handle": "color"}
    ]}"#;
    let registry = TaxonomyRegistry::from_json(TAXONOMY_JSON, repeated)?;
    assert_eq!(registry.attribute_count(), 1);
    Ok(())
}

#[test]
fn malformed_document_is_rejected() {
    let err = TaxonomyRegistry::from_json("{not json", ATTRIBUTES_JSON).unwrap_err();
    assert!(matches!(err, TaxonomyError::Document(_)));
}

#[test]
fn child_listed_before_parent_fails() {
    let out_of_order = r#"{"version": "1", "verticals": [{"categories": [
        {"id": "b", "name": "B", "level": 1, "full_name": "A > B", "parent_id": "a"},
        {"id": "a", "name": "A", "level": 0, "full_name": "A"}
    ]}]}"#;
    let err = TaxonomyRegistry::from_json(out_of_order, r#"{"attributes": []}"#).unwrap_err();
    assert!(matches!(err, TaxonomyError::MissingParent { .. }));
}

#[test]
fn export_reloads_to_equivalent_registry() -> Result<()> {
    let exported_from = retail_registry();
    let document = exported_from.to_document("2024-07");
    assert_eq!(document.verticals.len(), 2);

    let json = serde_json::to_string(&document)?;
    let reloaded = TaxonomyRegistry::from_documents(
        &TaxonomyDocument::from_json_str(&json)?,
        &AttributeDocument {
            attributes: Vec::new(),
        },
    )?;

    assert_eq!(reloaded.category_count(), exported_from.category_count());
    for category in exported_from.categories() {
        let copy = reloaded.get_category(&category.id)?;
        assert_eq!(copy, category);
    }
    assert_eq!(reloaded.outline(None)?, exported_from.outline(None)?);
    Ok(())
}

#[test]
fn exported_records_reference_ids() {
    let document = retail_registry().to_document("1");
    let electronics = &document.verticals[0].categories[0];
    assert_eq!(electronics.id, "el");
    assert_eq!(
        electronics.children,
        [
            IdRef { id: "el-1".into() },
            IdRef { id: "el-2".into() }
        ]
    );
}

/// Parent choice per node: 0 starts a new vertical, k attaches to node k-1
fn arb_shape() -> impl Strategy<Value = Vec<prop::sample::Index>> {
    prop::collection::vec(any::<prop::sample::Index>(), 1..24)
}

proptest! {
    #[test]
    fn ancestors_extend_parent_chain(shape in arb_shape()) {
        let mut registry = TaxonomyRegistry::new();
        let mut levels: Vec<u32> = Vec::new();

        for (i, choice) in shape.iter().enumerate() {
            let id = format!("n{i}");
            let parent = choice.index(i + 1);
            let record = if parent == 0 {
                levels.push(0);
                category(&id, &id, 0, None)
            } else {
                let parent_id = format!("n{}", parent - 1);
                let level = levels[parent - 1] + 1;
                levels.push(level);
                category(&id, &id, level, Some((parent_id.as_str(), parent_id.as_str())))
            };
            registry.insert_category(record).unwrap();
        }

        for node in registry.categories() {
            if node.level == 0 {
                prop_assert_eq!(node.ancestors(), [ROOT_ID]);
                prop_assert!(registry.root().children().contains(&node.id));
                continue;
            }
            let parent_id = node.parent_id.as_deref().unwrap();
            let parent = registry.get_category(parent_id).unwrap();
            let mut expected = parent.ancestors().to_vec();
            expected.push(parent.id.clone());
            prop_assert_eq!(node.ancestors(), expected.as_slice());
            prop_assert!(parent.children().contains(&node.id));
        }

        prop_assert_eq!(registry.walk(None).unwrap().len(), shape.len() + 1);
    }
}
