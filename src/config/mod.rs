//! Application configuration

pub mod agent;
pub mod prompts;

use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub use agent::{AgentConfig, ConfigError, FollowUpConfig, LlmConfig, SearchConfig, Vocabulary};
pub use prompts::PromptSet;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub gemini_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub groq_api_key: Option<String>,
    pub yelp_api_key: Option<String>,
    /// Optional agent TOML file (vocabulary, providers, follow-up rule)
    pub agent_config_path: Option<PathBuf>,
    /// Sessions untouched for this long are discarded
    pub session_idle_secs: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".into()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            gemini_api_key: non_empty_var("GEMINI_API_KEY"),
            openai_api_key: non_empty_var("OPENAI_API_KEY"),
            groq_api_key: non_empty_var("GROQ_API_KEY"),
            yelp_api_key: non_empty_var("YELP_API_KEY"),
            agent_config_path: env::var("DINESCOUT_CONFIG").ok().map(PathBuf::from),
            session_idle_secs: env::var("SESSION_IDLE_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1800),
        })
    }

    /// Load the agent file if one is configured, otherwise the built-in defaults
    pub fn load_agent(&self) -> Result<AgentConfig, ConfigError> {
        let agent = match &self.agent_config_path {
            Some(path) => AgentConfig::from_file(path)?,
            None => AgentConfig::default(),
        };
        agent.validate()?;
        Ok(agent)
    }

    /// API key for the configured LLM provider. An explicit `api_key_env` wins.
    pub fn llm_api_key(&self, llm: &LlmConfig) -> Option<String> {
        if let Some(var) = &llm.api_key_env {
            return non_empty_var(var);
        }
        match llm.provider.to_lowercase().as_str() {
            "gemini" => self.gemini_api_key.clone(),
            "openai" => self.openai_api_key.clone(),
            "groq" => self.groq_api_key.clone(),
            _ => None,
        }
    }

    /// API key for the restaurant search service
    pub fn search_api_key(&self, search: &SearchConfig) -> Option<String> {
        match &search.api_key_env {
            Some(var) => non_empty_var(var),
            None => self.yelp_api_key.clone(),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
