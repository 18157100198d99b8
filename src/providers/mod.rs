//! External collaborators: LLM providers and restaurant search
//!
//! The conversation core only sees three narrow seams:
//! - [`Extractor`] turns an utterance into city / food / intent
//! - [`Generator`] writes free-form replies
//! - [`RestaurantSearch`] looks up businesses for a city and food

mod gemini;
mod openai_compat;
mod yelp;

#[cfg(test)]
pub mod testing;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::LlmConfig;
use crate::conversation::{Intent, Turn};

pub use gemini::GeminiProvider;
pub use openai_compat::{OpenAICompatConfig, OpenAICompatProvider};
pub use yelp::YelpClient;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Classify a non-success HTTP status
    pub fn from_status(status: reqwest::StatusCode, detail: impl Into<String>) -> Self {
        let detail = format!("HTTP {}: {}", status, detail.into());
        match status.as_u16() {
            401 | 403 => ProviderError::Auth(detail),
            429 => ProviderError::RateLimited(detail),
            _ => ProviderError::InvalidResponse(detail),
        }
    }
}

/// Unprocessed extraction output, one per turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub city: Option<String>,
    pub food: Option<String>,
    pub intent: Intent,
}

#[derive(Debug, Deserialize)]
struct ExtractionPayload {
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    food: Option<String>,
    #[serde(default)]
    intent: Option<String>,
}

/// Parse the JSON object produced by an extraction model.
///
/// Strings are trimmed; a missing or unknown intent becomes `Chat`.
pub fn parse_extraction(text: &str) -> Result<Extraction, ProviderError> {
    let body = strip_code_fence(text);
    let payload: ExtractionPayload = serde_json::from_str(body).map_err(|e| {
        ProviderError::InvalidResponse(format!("Failed to parse extraction: {} - Body: {}", e, text))
    })?;

    Ok(Extraction {
        city: payload.city.map(|c| c.trim().to_string()),
        food: payload.food.map(|f| f.trim().to_string()),
        intent: payload
            .intent
            .as_deref()
            .map(Intent::from_label)
            .unwrap_or(Intent::Chat),
    })
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    match trimmed.strip_prefix("```") {
        Some(rest) => {
            let rest = rest.strip_prefix("json").unwrap_or(rest);
            rest.strip_suffix("```").unwrap_or(rest).trim()
        }
        None => trimmed,
    }
}

/// A free-form generation call
#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    pub system: &'a str,
    pub prompt: &'a str,
    /// Earlier turns, oldest first
    pub history: &'a [Turn],
}

#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(&self, utterance: &str) -> Result<Extraction, ProviderError>;
}

#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, request: GenerationRequest<'_>) -> Result<String, ProviderError>;
}

/// A business returned by the search service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Business {
    pub name: String,
    pub address: String,
    pub rating: f64,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    #[error("search API key is missing")]
    MissingCredentials,

    #[error("search request rejected ({status}): {detail}")]
    Rejected { status: u16, detail: String },

    #[error("search request failed ({status}): {detail}")]
    Service { status: u16, detail: String },

    #[error("network error contacting search service: {0}")]
    Transport(String),

    #[error("{0}")]
    Other(String),
}

#[async_trait]
pub trait RestaurantSearch: Send + Sync {
    async fn search(&self, city: &str, term: &str, limit: usize)
        -> Result<Vec<Business>, SearchError>;
}

pub enum Provider {
    Gemini(GeminiProvider),
    OpenAICompat(OpenAICompatProvider),
}

impl Provider {
    pub fn from_config(llm: &LlmConfig, api_key: Option<String>) -> Result<Self, ProviderError> {
        match llm.provider.to_lowercase().as_str() {
            "gemini" => {
                let api_key = api_key
                    .ok_or_else(|| ProviderError::NotConfigured("GEMINI_API_KEY".into()))?;
                Ok(Provider::Gemini(GeminiProvider::new(
                    llm.endpoint.clone(),
                    api_key,
                    llm.model.clone(),
                    llm.timeout_secs,
                )?))
            }
            "openai" | "groq" => {
                let api_key = api_key.ok_or_else(|| {
                    ProviderError::NotConfigured(format!("{} API key", llm.provider))
                })?;
                let mut config = if llm.provider.eq_ignore_ascii_case("groq") {
                    OpenAICompatConfig::groq(api_key)
                } else {
                    OpenAICompatConfig::openai(api_key)
                };
                config.default_model = llm.model.clone();
                config.timeout_secs = llm.timeout_secs;
                if let Some(endpoint) = &llm.endpoint {
                    config.base_url = endpoint.clone();
                }
                Ok(Provider::OpenAICompat(OpenAICompatProvider::new(config)?))
            }
            "local" => {
                let endpoint = llm
                    .endpoint
                    .clone()
                    .unwrap_or_else(|| "http://localhost:8000/v1".into());
                let mut config = OpenAICompatConfig::local(endpoint, llm.model.clone());
                config.api_key = api_key;
                Ok(Provider::OpenAICompat(OpenAICompatProvider::new(config)?))
            }
            other => Err(ProviderError::UnknownProvider(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Provider::Gemini(_) => "gemini",
            Provider::OpenAICompat(_) => "openai-compatible",
        }
    }
}

/// LLM provider bound to an extraction instruction
pub struct LlmBackend {
    provider: Provider,
    extraction_instruction: String,
}

impl LlmBackend {
    pub fn new(provider: Provider, extraction_instruction: impl Into<String>) -> Self {
        Self {
            provider,
            extraction_instruction: extraction_instruction.into(),
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }
}

#[async_trait]
impl Extractor for LlmBackend {
    async fn extract(&self, utterance: &str) -> Result<Extraction, ProviderError> {
        let text = match &self.provider {
            Provider::Gemini(p) => p.extract_json(&self.extraction_instruction, utterance).await?,
            Provider::OpenAICompat(p) => {
                p.extract_json(&self.extraction_instruction, utterance).await?
            }
        };
        parse_extraction(&text)
    }
}

#[async_trait]
impl Generator for LlmBackend {
    async fn generate(&self, request: GenerationRequest<'_>) -> Result<String, ProviderError> {
        match &self.provider {
            Provider::Gemini(p) => p.generate(request).await,
            Provider::OpenAICompat(p) => p.generate(request).await,
        }
    }
}
