//! Gemini provider implementation
//!
//! Talks to the `generateContent` REST endpoint. Extraction requests a JSON
//! response constrained by a schema; generation is plain text.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::conversation::Role;

use super::{GenerationRequest, ProviderError};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiProvider {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn text(role: Option<&str>, text: &str) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![Part {
                text: Some(text.to_string()),
            }],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: Value,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

fn extraction_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "city": {
                "type": "STRING",
                "nullable": true,
                "description": "The geographic location (city and country/state, e.g. 'New York, USA'). Null if not found."
            },
            "food": {
                "type": "STRING",
                "nullable": true,
                "description": "The specific type of cuisine or dish (e.g. 'sushi', 'pizza', 'vegan'). Null if not found."
            },
            "intent": {
                "type": "STRING",
                "enum": ["SEARCH", "INFO", "CHAT"],
                "description": "SEARCH (finding restaurants), INFO (a question about popular foods or food culture), or CHAT (greeting/general talk)"
            }
        },
        "required": ["intent"]
    })
}

impl GeminiProvider {
    pub fn new(
        base_url: Option<String>,
        api_key: String,
        model: String,
        timeout_secs: u64,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key,
            model,
        })
    }

    /// Ask for the extraction JSON object
    pub async fn extract_json(&self, system: &str, utterance: &str) -> Result<String, ProviderError> {
        let request = GenerateContentRequest {
            contents: vec![Content::text(Some("user"), utterance)],
            system_instruction: Some(Content::text(None, system)),
            generation_config: Some(GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: extraction_schema(),
            }),
        };
        self.send(&request).await
    }

    pub async fn generate(&self, request: GenerationRequest<'_>) -> Result<String, ProviderError> {
        let mut contents: Vec<Content> = request
            .history
            .iter()
            .map(|turn| {
                let role = match turn.role {
                    Role::User => "user",
                    Role::Assistant => "model",
                };
                Content::text(Some(role), &turn.text)
            })
            .collect();
        contents.push(Content::text(Some("user"), request.prompt));

        let request = GenerateContentRequest {
            contents,
            system_instruction: Some(Content::text(None, request.system)),
            generation_config: None,
        };
        self.send(&request).await
    }

    async fn send(&self, request: &GenerateContentRequest) -> Result<String, ProviderError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(ProviderError::from_status(status, detail));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body).map_err(|e| {
            ProviderError::InvalidResponse(format!("Failed to parse response: {} - Body: {}", e, body))
        })?;

        first_text(parsed)
            .ok_or_else(|| ProviderError::InvalidResponse("No text in response".to_string()))
    }
}

fn first_text(response: GenerateContentResponse) -> Option<String> {
    let content = response.candidates.into_iter().next()?.content?;
    let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}
