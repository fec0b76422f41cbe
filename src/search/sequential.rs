//! Breadth-first sequential search
//!
//! One oracle call at a time. Same relevance rule and pruning as
//! `SearchEngine::search`, so the two agree on the hit set when bailing is
//! off.

use std::collections::{HashSet, VecDeque};

use tracing::{debug, info};

use super::engine::{Frontier, SearchEngine};
use super::{rank, SearchHit, SearchOptions};
use crate::error::SearchError;

impl SearchEngine {
    /// Breadth-first variant of [`SearchEngine::search`].
    ///
    /// `bail_on_first_result` stops right after the first hit; `fanout_width`
    /// is ignored.
    pub async fn search_sequential(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<SearchHit>, SearchError> {
        options.validate()?;
        let threshold = options.confidence_threshold;
        let mut oracle_calls = 0usize;

        let start = self.start_frontier(query, options, &mut oracle_calls).await?;
        let mut hits = Vec::new();
        let mut visited: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<Frontier<'_>> = VecDeque::new();
        queue.push_back(start);

        while let Some(item) = queue.pop_front() {
            if !visited.insert(item.category.id.as_str()) {
                continue;
            }
            if !item.relevant {
                debug!(id = %item.category.id, "Pruned irrelevant category");
                continue;
            }

            let children = self.registry.children_of(&item.category.id)?;
            if children.is_empty() {
                if !item.category.is_root() {
                    hits.push(item.into_hit());
                    if options.bail_on_first_result {
                        break;
                    }
                }
                continue;
            }

            for child in children {
                if visited.contains(child.id.as_str()) {
                    continue;
                }
                let judgement = self
                    .oracle
                    .judge(query, &child.full_name, child.description.as_deref())
                    .await?;
                oracle_calls += 1;
                debug!(
                    id = %child.id,
                    verdict = judgement.verdict,
                    confidence = judgement.confidence,
                    "Judged category"
                );
                queue.push_back(item.child(child, judgement, threshold));
            }
        }

        rank(&mut hits);
        info!(hits = hits.len(), oracle_calls, "Sequential search complete");
        Ok(hits)
    }
}
