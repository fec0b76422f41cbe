//! Scripted oracle with deterministic answers and a call trace

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{Judgement, RelevanceOracle};
use crate::error::OracleError;

/// One recorded `judge` call
#[derive(Debug, Clone, PartialEq)]
pub struct OracleCall {
    pub query: String,
    pub label: String,
    pub description: Option<String>,
}

/// Oracle answering from a fixed script keyed by label.
///
/// Labels without a scripted judgement get the default judgement
/// (irrelevant, 0.0 unless overridden). Every `judge` call is recorded.
pub struct ScriptedOracle {
    judgements: HashMap<String, Judgement>,
    default: Judgement,
    failing: HashSet<String>,
    subsets: HashMap<String, Vec<String>>,
    calls: Mutex<Vec<OracleCall>>,
}

impl Default for ScriptedOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedOracle {
    pub fn new() -> Self {
        Self {
            judgements: HashMap::new(),
            default: Judgement::irrelevant(0.0),
            failing: HashSet::new(),
            subsets: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_judgement(mut self, label: impl Into<String>, judgement: Judgement) -> Self {
        self.judgements.insert(label.into(), judgement);
        self
    }

    pub fn relevant(self, label: impl Into<String>, confidence: f64) -> Self {
        self.with_judgement(label, Judgement::relevant(confidence))
    }

    pub fn irrelevant(self, label: impl Into<String>, confidence: f64) -> Self {
        self.with_judgement(label, Judgement::irrelevant(confidence))
    }

    pub fn with_default(mut self, judgement: Judgement) -> Self {
        self.default = judgement;
        self
    }

    /// Make `judge` fail with a transport error for this label
    pub fn failing(mut self, label: impl Into<String>) -> Self {
        self.failing.insert(label.into());
        self
    }

    /// Script the `select_subset` answer when the first offered label is `first_label`
    pub fn with_subset<I, S>(mut self, first_label: impl Into<String>, selected: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subsets.insert(
            first_label.into(),
            selected.into_iter().map(Into::into).collect(),
        );
        self
    }

    /// Recorded `judge` calls, in call order
    pub fn calls(&self) -> Vec<OracleCall> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    /// Labels of recorded `judge` calls, in call order
    pub fn judged_labels(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.label).collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|calls| calls.len()).unwrap_or(0)
    }
}

#[async_trait]
impl RelevanceOracle for ScriptedOracle {
    async fn judge(
        &self,
        query: &str,
        label: &str,
        description: Option<&str>,
    ) -> Result<Judgement, OracleError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(OracleCall {
                query: query.to_string(),
                label: label.to_string(),
                description: description.map(str::to_string),
            });
        }
        if self.failing.contains(label) {
            return Err(OracleError::Transport(format!("scripted failure for {label}")));
        }
        Ok(self.judgements.get(label).copied().unwrap_or(self.default))
    }

    async fn select_subset(
        &self,
        _query: &str,
        labels: &[String],
    ) -> Result<Vec<String>, OracleError> {
        let selected = labels
            .first()
            .and_then(|first| self.subsets.get(first))
            .cloned()
            .unwrap_or_default();
        Ok(selected)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
