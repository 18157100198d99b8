//! Yelp business search

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::config::SearchConfig;

use super::{Business, RestaurantSearch, SearchError};

pub struct YelpClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    businesses: Vec<YelpBusiness>,
}

#[derive(Debug, Deserialize)]
struct YelpBusiness {
    name: String,
    #[serde(default)]
    rating: Option<f64>,
    #[serde(default)]
    location: Option<YelpLocation>,
}

#[derive(Debug, Default, Deserialize)]
struct YelpLocation {
    #[serde(default)]
    address1: Option<String>,
    #[serde(default)]
    display_address: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    description: Option<String>,
}

impl From<YelpBusiness> for Business {
    fn from(business: YelpBusiness) -> Self {
        let location = business.location.unwrap_or_default();
        let address = location
            .address1
            .filter(|a| !a.trim().is_empty())
            .or_else(|| {
                let joined = location.display_address.join(", ");
                (!joined.trim().is_empty()).then_some(joined)
            })
            .unwrap_or_else(|| "Address unavailable".to_string());

        Business {
            name: business.name,
            address,
            rating: business.rating.unwrap_or(0.0),
        }
    }
}

impl YelpClient {
    pub fn new(config: &SearchConfig, api_key: Option<String>) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SearchError::Other(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key,
        })
    }

    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl RestaurantSearch for YelpClient {
    async fn search(
        &self,
        city: &str,
        term: &str,
        limit: usize,
    ) -> Result<Vec<Business>, SearchError> {
        let api_key = self.api_key.as_ref().ok_or(SearchError::MissingCredentials)?;

        let limit = limit.to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .bearer_auth(api_key)
            .query(&[("term", term), ("location", city), ("limit", limit.as_str())])
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            return Err(classify_failure(status, &body));
        }

        let parsed: SearchResponse = serde_json::from_str(&body)
            .map_err(|e| SearchError::Other(format!("Unreadable search response: {}", e)))?;

        Ok(parsed.businesses.into_iter().map(Business::from).collect())
    }
}

fn transport_error(error: reqwest::Error) -> SearchError {
    tracing::warn!(error = %error, "search transport failure");
    let summary = if error.is_timeout() {
        "the request timed out"
    } else if error.is_connect() {
        "could not connect to the search service"
    } else {
        "the connection failed"
    };
    SearchError::Transport(summary.to_string())
}

fn classify_failure(status: StatusCode, body: &str) -> SearchError {
    let detail = serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(|e| e.error.description)
        .unwrap_or_else(|| "Unknown API Error.".to_string());

    match status {
        StatusCode::UNAUTHORIZED => SearchError::MissingCredentials,
        StatusCode::BAD_REQUEST => SearchError::Rejected {
            status: status.as_u16(),
            detail,
        },
        _ => SearchError::Service {
            status: status.as_u16(),
            detail,
        },
    }
}
