use serde::Deserialize;
use std::fs;

use crate::client::AnalyzeRequest;
use crate::constants::{report, request};
use crate::error::StreamError;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct DebateConfig {
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,
}

impl Default for DebateConfig {
    fn default() -> Self {
        Self {
            threshold: request::DEFAULT_DEBATE_THRESHOLD,
            max_rounds: request::DEFAULT_MAX_ROUNDS,
        }
    }
}

fn default_threshold() -> f64 {
    request::DEFAULT_DEBATE_THRESHOLD
}

fn default_max_rounds() -> u32 {
    request::DEFAULT_MAX_ROUNDS
}

fn default_report_dir() -> String {
    report::DEFAULT_DIR.to_string()
}

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    /// Backend analysis endpoint (one POST per run, NDJSON response).
    pub endpoint: String,

    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub debate: DebateConfig,

    #[serde(default = "default_report_dir")]
    pub report_dir: String,
}

impl AppConfig {
    pub fn load() -> Result<Self, StreamError> {
        Self::load_from("config.yaml")
    }

    pub fn load_from(path: &str) -> Result<Self, StreamError> {
        let content = fs::read_to_string(path)
            .map_err(|e| StreamError::Config(format!("failed to read {}: {}", path, e)))?;

        // Strip BOM if present
        let content = content.strip_prefix("\u{feff}").unwrap_or(&content);

        serde_yaml::from_str(content)
            .map_err(|e| StreamError::Config(format!("failed to parse {}: {}", path, e)))
    }

    /// Configured API key, falling back to the environment the same way the
    /// backend itself does.
    pub fn effective_api_key(&self) -> Option<String> {
        self.llm
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()))
    }

    pub fn to_request(&self, symbol: &str) -> AnalyzeRequest {
        AnalyzeRequest {
            symbol: symbol.to_string(),
            api_key: self.effective_api_key(),
            model: self.llm.model.clone(),
            base_url: self.llm.base_url.clone(),
            debate_threshold: self.debate.threshold,
            max_rounds: self.debate.max_rounds,
        }
    }
}
