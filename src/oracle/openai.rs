//! OpenAI-compatible relevance oracle
//!
//! `judge` uses the legacy completions endpoint with `logprobs` so the
//! verdict token comes with a score; `select_subset` uses chat completions
//! in JSON mode.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{Judgement, RelevanceOracle};
use crate::config::OracleSettings;
use crate::error::{ConfigError, OracleError};

const JUDGE_INSTRUCTIONS: &str = "\
You are classifying products against a hierarchical taxonomy tree. Given a product description (query) and a taxonomy node (node name), you need to determine whether the node is relevant to the product.
If a node is relevant, we will further explore the node's children to refine the classification.
Given a product description and a taxonomy node, decide if the node is relevant to the product.

Return TRUE if the node is relevant to the product description, and FALSE otherwise.

Product Description: HP Newest 14\" Ultral Light Laptop for Students and Business, Intel Quad-Core N4120, 8GB RAM, 192GB Storage(64GB eMMC+128GB Micro SD), 1 Year Office 365, Webcam, HDMI, WiFi, USB-A&C, Win 11 S
Taxonomy Node: Home & Garden
Remember, only return TRUE or FALSE!
Response: FALSE";

const SELECT_INSTRUCTIONS: &str = "\
You are classifying a single product against a hierarchical taxonomy tree. We are examining the children of a taxonomy node to determine if they improve the classification of a product description.
Given a product description and a list of children nodes in the taxonomy, you need to decide which children explicitly *improve* the classification of the product description.
Select the children nodes that will improve the classification of the product description if they are selected.

It is preferred to select no children than to select irrelevant children. To do so return the empty list.
Respond with JSON of the form {\"children\": [\"<child name>\", ...]}.";

const STOP_TOKEN: &str = "<|im_end|>";

/// Relevance oracle backed by an OpenAI-compatible HTTP API
#[derive(Clone)]
pub struct OpenAiRelevanceOracle {
    api_key: String,
    client: reqwest::Client,
    settings: OracleSettings,
}

impl OpenAiRelevanceOracle {
    pub fn new(api_key: String, settings: OracleSettings) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout())
            .build()
            .map_err(|e| ConfigError::Invalid(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            api_key,
            client,
            settings,
        })
    }

    /// Create from `OPENAI_API_KEY` plus `OracleSettings::from_env`
    pub fn from_env() -> Result<Self, ConfigError> {
        let settings = OracleSettings::from_env();
        let api_key =
            std::env::var("OPENAI_API_KEY").map_err(|_| ConfigError::MissingEnv("OPENAI_API_KEY"))?;
        Self::new(api_key, settings)
    }

    pub fn settings(&self) -> &OracleSettings {
        &self.settings
    }

    async fn post(&self, path: &str, body: serde_json::Value) -> Result<String, OracleError> {
        let url = format!("{}/{}", self.settings.base_url.trim_end_matches('/'), path);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            let message = format!("OpenAI API error {}: {}", status, text);
            // 4xx other than rate limiting will not get better on retry
            if status.is_client_error() && status.as_u16() != 429 {
                return Err(OracleError::MalformedResponse(message));
            }
            return Err(OracleError::Transport(message));
        }
        debug!("OpenAI raw response: {}", truncate_for_log(&text, 1000));
        Ok(text)
    }
}

/// Longest prefix of `text` no longer than `max` bytes, cut on a char boundary
fn truncate_for_log(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let end = (0..=max).rev().find(|i| text.is_char_boundary(*i)).unwrap_or(0);
    &text[..end]
}

pub(crate) fn judge_prompt(query: &str, label: &str, description: Option<&str>) -> String {
    let node = match description {
        Some(description) if !description.trim().is_empty() => {
            format!("Node: {label}\nNode Description: {description}")
        }
        _ => format!("Node: {label}"),
    };
    let prompt = format!(
        "Query: {query}\n{node}\nRemember, only return TRUE or FALSE!\nResponse: "
    );
    format!(
        "<|im_start|>system\n{JUDGE_INSTRUCTIONS}\n<|im_end|>\n\
         <|im_start|>user\n{prompt}\n<|im_end|>\n"
    )
}

pub(crate) fn selection_prompt(query: &str, labels: &[String]) -> String {
    format!(
        "Product Description:\n---\n{query}\n---\n\nChildren: {}\n\
         Select the children nodes that are relevant to the product description.",
        labels.join(", ")
    )
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    text: String,
    logprobs: Option<Logprobs>,
}

#[derive(Deserialize)]
struct Logprobs {
    #[serde(default)]
    top_logprobs: Vec<HashMap<String, f64>>,
}

/// Verdict token plus `Σ exp(logprob)` over the first token's alternatives
pub(crate) fn parse_completion(body: &str) -> Result<Judgement, OracleError> {
    let response: CompletionResponse = serde_json::from_str(body)
        .map_err(|e| OracleError::MalformedResponse(format!("completion: {e}")))?;
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| OracleError::MalformedResponse("OpenAI returned no choices".into()))?;
    let top = choice
        .logprobs
        .and_then(|l| l.top_logprobs.into_iter().next())
        .ok_or_else(|| OracleError::MalformedResponse("completion has no logprobs".into()))?;

    let confidence: f64 = top.values().map(|logprob| logprob.exp()).sum();
    Ok(Judgement::from_token(&choice.text, confidence))
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

#[derive(Deserialize)]
struct SelectedChildren {
    #[serde(default)]
    children: Vec<String>,
}

/// Selected labels in the model's order, restricted to offered ones, duplicates dropped
pub(crate) fn parse_selection(body: &str, labels: &[String]) -> Result<Vec<String>, OracleError> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| OracleError::MalformedResponse(format!("chat completion: {e}")))?;
    let content = response
        .choices
        .into_iter()
        .next()
        .map(|c| c.message.content)
        .ok_or_else(|| OracleError::MalformedResponse("OpenAI returned no choices".into()))?;
    let selected: SelectedChildren = serde_json::from_str(&content)
        .map_err(|e| OracleError::MalformedResponse(format!("selection content: {e}")))?;

    let mut seen = HashSet::new();
    Ok(selected
        .children
        .into_iter()
        .filter(|name| labels.contains(name) && seen.insert(name.clone()))
        .collect())
}

#[async_trait]
impl RelevanceOracle for OpenAiRelevanceOracle {
    async fn judge(
        &self,
        query: &str,
        label: &str,
        description: Option<&str>,
    ) -> Result<Judgement, OracleError> {
        let body = serde_json::json!({
            "model": &self.settings.model,
            "prompt": judge_prompt(query, label, description),
            "max_tokens": self.settings.max_tokens,
            "temperature": self.settings.temperature,
            "logprobs": 1,
            "stop": [STOP_TOKEN],
        });
        let text = self.post("completions", body).await?;
        let judgement = parse_completion(&text)?;
        debug!(
            label,
            verdict = judgement.verdict,
            confidence = judgement.confidence,
            "OpenAI relevance verdict"
        );
        Ok(judgement)
    }

    async fn select_subset(
        &self,
        query: &str,
        labels: &[String],
    ) -> Result<Vec<String>, OracleError> {
        let body = serde_json::json!({
            "model": &self.settings.model,
            "messages": [
                {"role": "system", "content": SELECT_INSTRUCTIONS},
                {"role": "user", "content": selection_prompt(query, labels)}
            ],
            "max_tokens": self.settings.max_tokens,
            "temperature": self.settings.temperature,
            "response_format": {"type": "json_object"},
        });
        let text = self.post("chat/completions", body).await?;
        parse_selection(&text, labels)
    }

    fn name(&self) -> &str {
        &self.settings.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_judge_prompt_includes_description() {
        let prompt = judge_prompt("ThinkPad T480", "Electronics > Computers", Some("PCs"));
        assert!(prompt.contains("Query: ThinkPad T480"));
        assert!(prompt.contains("Node: Electronics > Computers\nNode Description: PCs"));
        assert!(prompt.ends_with("Response: \n<|im_end|>\n"));

        let bare = judge_prompt("ThinkPad T480", "Electronics", None);
        assert!(!bare.contains("Node Description"));
    }

    #[test]
    fn test_parse_completion_sums_top_logprobs() {
        let body = r#"{"choices": [{
            "text": " TRUE",
            "logprobs": {"top_logprobs": [{"TRUE": -0.1, "True": -3.0}]}
        }]}"#;
        let judgement = parse_completion(body).unwrap();
        assert!(judgement.verdict);
        let expected = (-0.1f64).exp() + (-3.0f64).exp();
        assert!((judgement.confidence - expected).abs() < 1e-12);
    }

    #[test]
    fn test_parse_completion_without_logprobs_is_malformed() {
        let body = r#"{"choices": [{"text": "TRUE", "logprobs": null}]}"#;
        assert!(matches!(
            parse_completion(body),
            Err(OracleError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_completion(r#"{"choices": []}"#),
            Err(OracleError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_parse_selection_keeps_model_order() {
        let labels = vec![
            "Laptops".to_string(),
            "Desktops".to_string(),
            "Tablets".to_string(),
        ];
        let content = r#"{\"children\": [\"Tablets\", \"Phones\", \"Laptops\", \"Tablets\"]}"#;
        let body = format!(r#"{{"choices": [{{"message": {{"content": "{content}"}}}}]}}"#);
        assert_eq!(
            parse_selection(&body, &labels).unwrap(),
            ["Tablets", "Laptops"]
        );
    }

    #[test]
    fn test_truncate_for_log() {
        assert_eq!(truncate_for_log("héllo", 2), "h");
        assert_eq!(truncate_for_log("héllo", 100), "héllo");
    }

    #[test]
    fn test_name_is_model() {
        let oracle =
            OpenAiRelevanceOracle::new("test-key".to_string(), OracleSettings::default()).unwrap();
        assert_eq!(oracle.name(), "gpt-4o");
    }
}
