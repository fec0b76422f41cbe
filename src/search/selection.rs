//! Child-selection explorer
//!
//! At each category the oracle picks the relevant subset of its children by
//! name; only picked children are explored further. Leaves reached this way
//! are the result.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::error::SearchError;
use crate::oracle::RelevanceOracle;
use crate::taxonomy::{Category, CategoryId, TaxonomyRegistry, ROOT_ID};

pub struct SelectionExplorer {
    registry: Arc<TaxonomyRegistry>,
    oracle: Arc<dyn RelevanceOracle>,
}

impl SelectionExplorer {
    pub fn new(registry: Arc<TaxonomyRegistry>, oracle: Arc<dyn RelevanceOracle>) -> Self {
        Self { registry, oracle }
    }

    /// Leaves reached from `start` (default: root), in selection order.
    ///
    /// A start category without children is returned as is. Selected names
    /// that match no child are dropped; with duplicate child names the first
    /// child wins.
    pub async fn explore(
        &self,
        query: &str,
        start: Option<&str>,
    ) -> Result<Vec<CategoryId>, SearchError> {
        let start = self.registry.get_category(start.unwrap_or(ROOT_ID))?;
        let mut results = Vec::new();
        let mut stack = vec![start];

        while let Some(category) = stack.pop() {
            let children = self.registry.children_of(&category.id)?;
            if children.is_empty() {
                results.push(category.id.clone());
                continue;
            }

            debug!(
                "Considering {} children of {} at depth {}",
                children.len(),
                category.name,
                category.level
            );
            let labels: Vec<String> = children.iter().map(|c| c.name.clone()).collect();
            let selected = self.oracle.select_subset(query, &labels).await?;
            let chosen = resolve_selection(&children, &selected);
            debug!(
                id = %category.id,
                selected = chosen.len(),
                "Oracle selected children"
            );

            // Reversed so the first selected child is explored first
            stack.extend(chosen.into_iter().rev());
        }

        Ok(results)
    }
}

/// Map selected names back to children, dropping unknown and repeated names
fn resolve_selection<'a>(children: &[&'a Category], selected: &[String]) -> Vec<&'a Category> {
    let mut seen = HashSet::new();
    selected
        .iter()
        .filter(|name| seen.insert(name.as_str()))
        .filter_map(|name| children.iter().find(|c| c.name == **name).copied())
        .collect()
}
