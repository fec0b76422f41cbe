//! Depth-first batched pruning search

use std::sync::Arc;

use futures::future::try_join_all;
use tracing::{debug, info};

use super::{rank, SearchHit, SearchOptions};
use crate::error::SearchError;
use crate::oracle::{Judgement, RelevanceOracle};
use crate::taxonomy::{Category, TaxonomyRegistry, ROOT_ID};

/// Relevance-guided search over a shared registry
pub struct SearchEngine {
    pub(super) registry: Arc<TaxonomyRegistry>,
    pub(super) oracle: Arc<dyn RelevanceOracle>,
}

/// Work-list entry: a judged category waiting to be expanded or pruned
pub(super) struct Frontier<'a> {
    pub(super) category: &'a Category,
    pub(super) path: Vec<String>,
    pub(super) confidence: f64,
    pub(super) relevant: bool,
}

impl<'a> Frontier<'a> {
    pub(super) fn new(
        category: &'a Category,
        path: Vec<String>,
        judgement: Judgement,
        threshold: f64,
    ) -> Self {
        Self {
            category,
            path,
            confidence: judgement.confidence,
            relevant: judgement.passes(threshold),
        }
    }

    /// Frontier entry for `child`, extending this entry's path
    pub(super) fn child(
        &self,
        child: &'a Category,
        judgement: Judgement,
        threshold: f64,
    ) -> Frontier<'a> {
        let mut path = self.path.clone();
        path.push(child.name.clone());
        Frontier::new(child, path, judgement, threshold)
    }

    pub(super) fn into_hit(self) -> SearchHit {
        SearchHit {
            category_id: self.category.id.clone(),
            path: self.path,
            confidence: self.confidence,
        }
    }
}

impl SearchEngine {
    pub fn new(registry: Arc<TaxonomyRegistry>, oracle: Arc<dyn RelevanceOracle>) -> Self {
        Self { registry, oracle }
    }

    pub fn registry(&self) -> &TaxonomyRegistry {
        &self.registry
    }

    pub fn oracle(&self) -> &dyn RelevanceOracle {
        self.oracle.as_ref()
    }

    /// Classify `query` against the taxonomy.
    ///
    /// Hits are relevant leaves, highest confidence first. Any oracle error
    /// aborts the search.
    pub async fn search(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<SearchHit>, SearchError> {
        options.validate()?;
        let threshold = options.confidence_threshold;
        let mut oracle_calls = 0usize;

        let start = self.start_frontier(query, options, &mut oracle_calls).await?;
        let mut hits = Vec::new();
        let mut stack = vec![start];

        loop {
            if options.bail_on_first_result && !hits.is_empty() {
                debug!(hits = hits.len(), "Bailing on first result");
                break;
            }
            let Some(item) = stack.pop() else {
                break;
            };
            if !item.relevant {
                debug!(
                    id = %item.category.id,
                    confidence = item.confidence,
                    "Pruned irrelevant category"
                );
                continue;
            }

            let children = self.registry.children_of(&item.category.id)?;
            if children.is_empty() {
                if !item.category.is_root() {
                    debug!(
                        id = %item.category.id,
                        confidence = item.confidence,
                        "Relevant leaf"
                    );
                    hits.push(item.into_hit());
                }
                continue;
            }

            debug!(
                id = %item.category.id,
                children = children.len(),
                "Expanding relevant category"
            );
            for batch in children.chunks(options.fanout_width) {
                let judgements = try_join_all(batch.iter().map(|child| {
                    self.oracle
                        .judge(query, &child.full_name, child.description.as_deref())
                }))
                .await?;
                oracle_calls += batch.len();

                for (child, judgement) in batch.iter().copied().zip(judgements) {
                    debug!(
                        id = %child.id,
                        verdict = judgement.verdict,
                        confidence = judgement.confidence,
                        "Judged category"
                    );
                    stack.push(item.child(child, judgement, threshold));
                }
            }
        }

        rank(&mut hits);
        info!(
            oracle = self.oracle.name(),
            hits = hits.len(),
            oracle_calls,
            "Search complete"
        );
        Ok(hits)
    }

    /// Judge the start category. The synthetic root is relevant without a call.
    pub(super) async fn start_frontier(
        &self,
        query: &str,
        options: &SearchOptions,
        oracle_calls: &mut usize,
    ) -> Result<Frontier<'_>, SearchError> {
        let start = self
            .registry
            .get_category(options.root.as_deref().unwrap_or(ROOT_ID))?;
        if start.is_root() {
            return Ok(Frontier {
                category: start,
                path: Vec::new(),
                confidence: 1.0,
                relevant: true,
            });
        }

        let judgement = self
            .oracle
            .judge(query, &start.full_name, start.description.as_deref())
            .await?;
        *oracle_calls += 1;
        debug!(
            id = %start.id,
            verdict = judgement.verdict,
            confidence = judgement.confidence,
            "Judged start category"
        );
        Ok(Frontier::new(
            start,
            vec![start.name.clone()],
            judgement,
            options.confidence_threshold,
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::Mutex;

    use tracing_subscriber::fmt::MakeWriter;

    use super::*;
    use crate::oracle::ScriptedOracle;
    use crate::search::SearchOptions;

    /// Collects formatted log output in memory
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Captured;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn test_batched_search_logs_each_verdict() {
        let mut registry = TaxonomyRegistry::new();
        registry
            .insert_category(Category::new("a", "A", 0, "A"))
            .unwrap();
        registry
            .insert_category(Category::new("b", "B", 1, "A > B").with_parent("a"))
            .unwrap();
        let oracle = ScriptedOracle::new()
            .relevant("A", 0.9)
            .irrelevant("A > B", 0.2);
        let engine = SearchEngine::new(Arc::new(registry), Arc::new(oracle));

        let captured = Captured::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(captured.clone())
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .finish();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let hits = tracing::subscriber::with_default(subscriber, || {
            runtime.block_on(engine.search("q", &SearchOptions::new(0.5)))
        })
        .unwrap();
        assert!(hits.is_empty());

        let logs = captured.text();
        let verdicts: Vec<_> = logs
            .lines()
            .filter(|line| line.contains("Judged category"))
            .collect();
        assert_eq!(verdicts.len(), 2);
        assert!(verdicts[0].contains("id=a") && verdicts[0].contains("verdict=true"));
        assert!(verdicts[1].contains("id=b") && verdicts[1].contains("verdict=false"));
    }
}
