//! Configuration
//!
//! YAML configuration for search behaviour and the OpenAI oracle adapter,
//! with environment overrides for the adapter:
//!
//! ```yaml
//! root_name: Root
//! search:
//!   confidence_threshold: 0.6
//!   bail_on_first_result: false
//!   fanout_width: 3
//! oracle:
//!   model: gpt-4o
//!   max_retries: 2
//! ```
//!
//! `confidence_threshold` has no default: every caller states its own.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::oracle::RetryPolicy;
use crate::search::{SearchOptions, DEFAULT_FANOUT_WIDTH};

const DEFAULT_MODEL: &str = "gpt-4o";
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Root configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxonomyConfig {
    #[serde(default = "default_root_name")]
    pub root_name: String,
    pub search: SearchSettings,
    #[serde(default)]
    pub oracle: OracleSettings,
}

/// Search defaults applied by callers that build options from config
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSettings {
    pub confidence_threshold: f64,
    #[serde(default)]
    pub bail_on_first_result: bool,
    #[serde(default = "default_fanout_width")]
    pub fanout_width: usize,
}

/// OpenAI-compatible oracle adapter settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleSettings {
    pub model: String,
    pub base_url: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_seconds: u64,
    /// Retries applied by `RetryingOracle` around the adapter
    pub max_retries: u32,
}

fn default_root_name() -> String {
    "Root".to_string()
}

fn default_fanout_width() -> usize {
    DEFAULT_FANOUT_WIDTH
}

impl Default for OracleSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_tokens: 100,
            temperature: 0.1,
            timeout_seconds: 30,
            max_retries: 2,
        }
    }
}

impl OracleSettings {
    /// Defaults overridden by `OPENAI_MODEL` / `OPENAI_BASE_URL` (a `.env` file is honoured)
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::default().with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(model) = std::env::var("OPENAI_MODEL") {
            self.model = model;
        }
        if let Ok(base_url) = std::env::var("OPENAI_BASE_URL") {
            self.base_url = base_url;
        }
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries)
    }
}

impl SearchSettings {
    pub fn to_options(&self) -> SearchOptions {
        SearchOptions::new(self.confidence_threshold)
            .bail_on_first_result(self.bail_on_first_result)
            .fanout_width(self.fanout_width)
    }
}

impl TaxonomyConfig {
    /// Load from a YAML file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::load_from_str(&content)
    }

    /// Load from a YAML string
    pub fn load_from_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.search.confidence_threshold.is_finite() {
            return Err(ConfigError::Invalid(
                "search.confidence_threshold must be a finite number".into(),
            ));
        }
        if self.search.fanout_width == 0 {
            return Err(ConfigError::Invalid(
                "search.fanout_width must be at least 1".into(),
            ));
        }
        if self.oracle.timeout_seconds == 0 {
            return Err(ConfigError::Invalid(
                "oracle.timeout_seconds must be at least 1".into(),
            ));
        }
        if self.root_name.trim().is_empty() {
            return Err(ConfigError::Invalid("root_name must not be empty".into()));
        }
        Ok(())
    }
}
