//! Agent configuration loaded from TOML files
//!
//! Each deployed agent can override:
//! - LLM provider used for extraction and generation
//! - Restaurant search endpoint and result limit
//! - Sentinel and generic-term vocabularies
//! - Word bounds of the follow-up override
//! - System instructions

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::prompts::PromptSet;

/// Root agent configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentConfig {
    /// LLM provider settings
    #[serde(default)]
    pub llm: LlmConfig,

    /// Restaurant search settings
    #[serde(default)]
    pub search: SearchConfig,

    /// Words treated as "no value" or as non-specific food
    #[serde(default)]
    pub vocabulary: Vocabulary,

    /// Short follow-up detection
    #[serde(default)]
    pub follow_up: FollowUpConfig,

    /// System instructions
    #[serde(default)]
    pub prompts: PromptSet,
}

impl AgentConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: AgentConfig = toml::from_str(content)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=50).contains(&self.search.limit) {
            return Err(ConfigError::Validation(format!(
                "search.limit must be between 1 and 50, got {}",
                self.search.limit
            )));
        }
        if self.follow_up.min_words == 0 || self.follow_up.min_words > self.follow_up.max_words {
            return Err(ConfigError::Validation(format!(
                "follow_up word bounds are invalid: {}..={}",
                self.follow_up.min_words, self.follow_up.max_words
            )));
        }
        Ok(())
    }
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider name: "gemini", "openai", "groq", "local"
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Model to use
    #[serde(default = "default_model")]
    pub model: String,

    /// API key environment variable name (overrides the provider default)
    #[serde(default)]
    pub api_key_env: Option<String>,

    /// Custom API endpoint
    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

fn default_provider() -> String {
    "gemini".to_string()
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_llm_timeout() -> u64 {
    60
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            api_key_env: None,
            endpoint: None,
            timeout_secs: default_llm_timeout(),
        }
    }
}

/// Restaurant search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,

    /// Maximum number of businesses requested and rendered
    #[serde(default = "default_limit")]
    pub limit: usize,

    /// API key environment variable name (defaults to YELP_API_KEY)
    #[serde(default)]
    pub api_key_env: Option<String>,

    #[serde(default = "default_search_timeout")]
    pub timeout_secs: u64,
}

fn default_search_endpoint() -> String {
    "https://api.yelp.com/v3/businesses/search".to_string()
}

fn default_limit() -> usize {
    5
}

fn default_search_timeout() -> u64 {
    30
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: default_search_endpoint(),
            limit: default_limit(),
            api_key_env: None,
            timeout_secs: default_search_timeout(),
        }
    }
}

/// Word lists used when cleaning slots
///
/// Matching is case-insensitive after trimming.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vocabulary {
    /// Literal values meaning "no value"
    #[serde(default = "default_sentinels")]
    pub sentinels: Vec<String>,

    /// Greetings and non-specific food words
    #[serde(default = "default_generic_terms")]
    pub generic_terms: Vec<String>,
}

fn default_sentinels() -> Vec<String> {
    ["null", "none", "n/a", ""].iter().map(|s| s.to_string()).collect()
}

fn default_generic_terms() -> Vec<String> {
    ["hi", "hello", "hey", "food", "restaurant", "meal"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            sentinels: default_sentinels(),
            generic_terms: default_generic_terms(),
        }
    }
}

impl Vocabulary {
    pub fn is_sentinel(&self, value: &str) -> bool {
        contains_folded(&self.sentinels, value)
    }

    pub fn is_generic(&self, value: &str) -> bool {
        contains_folded(&self.generic_terms, value)
    }
}

fn contains_folded(list: &[String], value: &str) -> bool {
    let needle = value.trim().to_lowercase();
    list.iter().any(|term| term.trim().to_lowercase() == needle)
}

/// Bounds for "short" utterances in the follow-up override
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowUpConfig {
    #[serde(default = "default_min_words")]
    pub min_words: usize,

    #[serde(default = "default_max_words")]
    pub max_words: usize,
}

fn default_min_words() -> usize {
    1
}

fn default_max_words() -> usize {
    4
}

impl Default for FollowUpConfig {
    fn default() -> Self {
        Self {
            min_words: default_min_words(),
            max_words: default_max_words(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}
