//! Scripted collaborators for testing
//!
//! Each fake replays queued results in order and records every call.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::conversation::{Intent, Turn};

use super::{
    Business, Extraction, Extractor, GenerationRequest, Generator, ProviderError,
    RestaurantSearch, SearchError,
};

pub fn extraction(city: Option<&str>, food: Option<&str>, intent: Intent) -> Extraction {
    Extraction {
        city: city.map(str::to_string),
        food: food.map(str::to_string),
        intent,
    }
}

pub fn business(name: &str, address: &str, rating: f64) -> Business {
    Business {
        name: name.to_string(),
        address: address.to_string(),
        rating,
    }
}

#[derive(Default)]
pub struct ScriptedExtractor {
    responses: Mutex<VecDeque<Result<Extraction, ProviderError>>>,
    pub calls: Mutex<Vec<String>>,
}

impl ScriptedExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue(&self, extraction: Extraction) -> &Self {
        self.responses.lock().unwrap().push_back(Ok(extraction));
        self
    }

    pub fn queue_error(&self, error: ProviderError) -> &Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Extractor for ScriptedExtractor {
    async fn extract(&self, utterance: &str) -> Result<Extraction, ProviderError> {
        self.calls.lock().unwrap().push(utterance.to_string());
        self.responses.lock().unwrap().pop_front().unwrap_or_else(|| {
            Err(ProviderError::InvalidResponse("no scripted extraction".into()))
        })
    }
}

/// A recorded generation call
#[derive(Debug, Clone)]
pub struct RecordedGeneration {
    pub system: String,
    pub prompt: String,
    pub history: Vec<Turn>,
}

#[derive(Default)]
pub struct ScriptedGenerator {
    responses: Mutex<VecDeque<Result<String, ProviderError>>>,
    pub calls: Mutex<Vec<RecordedGeneration>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue(&self, text: impl Into<String>) -> &Self {
        self.responses.lock().unwrap().push_back(Ok(text.into()));
        self
    }

    pub fn queue_error(&self, error: ProviderError) -> &Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn recorded(&self) -> Vec<RecordedGeneration> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(&self, request: GenerationRequest<'_>) -> Result<String, ProviderError> {
        self.calls.lock().unwrap().push(RecordedGeneration {
            system: request.system.to_string(),
            prompt: request.prompt.to_string(),
            history: request.history.to_vec(),
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("scripted reply".to_string()))
    }
}

/// A recorded search call: (city, term, limit)
pub type RecordedSearch = (String, String, usize);

#[derive(Default)]
pub struct ScriptedSearch {
    responses: Mutex<VecDeque<Result<Vec<Business>, SearchError>>>,
    pub calls: Mutex<Vec<RecordedSearch>>,
}

impl ScriptedSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue(&self, businesses: Vec<Business>) -> &Self {
        self.responses.lock().unwrap().push_back(Ok(businesses));
        self
    }

    pub fn queue_error(&self, error: SearchError) -> &Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn recorded(&self) -> Vec<RecordedSearch> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RestaurantSearch for ScriptedSearch {
    async fn search(
        &self,
        city: &str,
        term: &str,
        limit: usize,
    ) -> Result<Vec<Business>, SearchError> {
        self.calls
            .lock()
            .unwrap()
            .push((city.to_string(), term.to_string(), limit));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}
