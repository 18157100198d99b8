//! Intent resolution
//!
//! Turns an utterance into an intent plus resolved city / food, filling gaps
//! from session memory and correcting a known classifier weakness: short
//! follow-ups such as "what about Paris" after a search get labelled INFO or
//! CHAT when they really continue that search.

use std::sync::Arc;

use crate::config::{FollowUpConfig, Vocabulary};
use crate::conversation::Intent;
use crate::providers::Extractor;

use super::memory::{clean_slot, title_case, SessionMemory};

/// Result of resolving one utterance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub intent: Intent,
    /// City after merging with memory
    pub city: Option<String>,
    /// Food after merging with memory
    pub food: Option<String>,
    /// City supplied by this utterance
    pub supplied_city: Option<String>,
    /// Food supplied by this utterance
    pub supplied_food: Option<String>,
    /// Set when the follow-up rule turned the intent into SEARCH
    pub overridden: bool,
    /// Set when the extraction collaborator failed
    pub extraction_error: Option<String>,
}

impl Resolution {
    /// CHAT with no slots: bare greetings and failed extraction
    fn chat_only(extraction_error: Option<String>) -> Self {
        Self {
            intent: Intent::Chat,
            city: None,
            food: None,
            supplied_city: None,
            supplied_food: None,
            overridden: false,
            extraction_error,
        }
    }
}

/// Inputs of the follow-up override, gathered for one turn
#[derive(Debug, Clone, Copy)]
pub struct FollowUpSignals {
    pub intent: Intent,
    pub word_count: usize,
    pub city_resolved: bool,
    pub food_supplied: bool,
    pub food_remembered: bool,
    pub last_action: Option<Intent>,
}

/// True when a short INFO/CHAT turn should continue the previous search
pub fn is_search_follow_up(signals: &FollowUpSignals, bounds: &FollowUpConfig) -> bool {
    matches!(signals.intent, Intent::Info | Intent::Chat)
        && (bounds.min_words..=bounds.max_words).contains(&signals.word_count)
        && signals.city_resolved
        && !signals.food_supplied
        && signals.food_remembered
        && signals.last_action == Some(Intent::Search)
}

pub struct IntentResolver {
    extractor: Arc<dyn Extractor>,
    vocabulary: Vocabulary,
    follow_up: FollowUpConfig,
}

impl IntentResolver {
    pub fn new(extractor: Arc<dyn Extractor>, vocabulary: Vocabulary, follow_up: FollowUpConfig) -> Self {
        Self {
            extractor,
            vocabulary,
            follow_up,
        }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Whole utterance is a greeting or generic word
    pub fn is_bare_greeting(&self, utterance: &str) -> bool {
        self.vocabulary.is_generic(utterance)
    }

    /// Resolve intent and slots for one utterance. Never fails.
    pub async fn resolve(&self, utterance: &str, memory: &SessionMemory) -> Resolution {
        let extraction = match self.extractor.extract(utterance).await {
            Ok(extraction) => extraction,
            Err(e) => {
                tracing::warn!(error = %e, "extraction failed, falling back to CHAT");
                return Resolution::chat_only(Some(e.to_string()));
            }
        };

        if self.is_bare_greeting(utterance) {
            tracing::debug!(utterance, "bare greeting, forcing CHAT");
            return Resolution::chat_only(None);
        }

        let supplied_city = clean_slot(extraction.city.as_deref(), &self.vocabulary)
            .map(|city| title_case(&city));
        let supplied_food = clean_slot(extraction.food.as_deref(), &self.vocabulary)
            .filter(|food| !self.vocabulary.is_generic(food))
            .map(|food| food.to_lowercase());

        let city = clean_slot(supplied_city.as_deref().or(memory.city()), &self.vocabulary);
        let food = clean_slot(supplied_food.as_deref().or(memory.food()), &self.vocabulary);

        let signals = FollowUpSignals {
            intent: extraction.intent,
            word_count: utterance.split_whitespace().count(),
            city_resolved: city.is_some(),
            food_supplied: supplied_food.is_some(),
            food_remembered: memory.food().is_some(),
            last_action: memory.last_action(),
        };
        let overridden = is_search_follow_up(&signals, &self.follow_up);
        let intent = if overridden {
            tracing::info!(
                from = %extraction.intent,
                city = city.as_deref().unwrap_or_default(),
                food = memory.food().unwrap_or_default(),
                "short follow-up continues previous search"
            );
            Intent::Search
        } else {
            extraction.intent
        };

        Resolution {
            intent,
            city,
            food,
            supplied_city,
            supplied_food,
            overridden,
            extraction_error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::memory::Slot;
    use crate::providers::testing::{extraction, ScriptedExtractor};
    use crate::providers::ProviderError;

    fn resolver(extractor: Arc<ScriptedExtractor>) -> IntentResolver {
        IntentResolver::new(extractor, Vocabulary::default(), FollowUpConfig::default())
    }

    fn after_search(city: Option<&str>, food: &str) -> SessionMemory {
        let vocab = Vocabulary::default();
        let mut memory = SessionMemory::new();
        memory.update(Slot::City, city, &vocab);
        memory.update(Slot::Food, Some(food), &vocab);
        memory.set_last_action(Intent::Search);
        memory
    }

    fn signals() -> FollowUpSignals {
        FollowUpSignals {
            intent: Intent::Info,
            word_count: 3,
            city_resolved: true,
            food_supplied: false,
            food_remembered: true,
            last_action: Some(Intent::Search),
        }
    }

    #[test]
    fn test_follow_up_predicate_each_clause() {
        let bounds = FollowUpConfig::default();
        assert!(is_search_follow_up(&signals(), &bounds));
        assert!(is_search_follow_up(
            &FollowUpSignals { intent: Intent::Chat, ..signals() },
            &bounds
        ));

        let failing = [
            FollowUpSignals { intent: Intent::Search, ..signals() },
            FollowUpSignals { word_count: 0, ..signals() },
            FollowUpSignals { word_count: 5, ..signals() },
            FollowUpSignals { city_resolved: false, ..signals() },
            FollowUpSignals { food_supplied: true, ..signals() },
            FollowUpSignals { food_remembered: false, ..signals() },
            FollowUpSignals { last_action: Some(Intent::Info), ..signals() },
            FollowUpSignals { last_action: None, ..signals() },
        ];
        for case in failing {
            assert!(!is_search_follow_up(&case, &bounds), "{case:?}");
        }
    }

    #[tokio::test]
    async fn test_normalizes_and_merges() {
        let extractor = Arc::new(ScriptedExtractor::new());
        extractor.queue(extraction(Some("new york"), Some("Ramen"), Intent::Search));

        let resolution = resolver(extractor.clone())
            .resolve("ramen in new york", &SessionMemory::new())
            .await;

        assert_eq!(resolution.intent, Intent::Search);
        assert_eq!(resolution.city.as_deref(), Some("New York"));
        assert_eq!(resolution.food.as_deref(), Some("ramen"));
        assert_eq!(resolution.supplied_city.as_deref(), Some("New York"));
        assert!(!resolution.overridden);
        assert_eq!(extractor.call_count(), 1);
    }

    #[tokio::test]
    async fn test_sentinels_and_generic_food_fall_back_to_memory() {
        let extractor = Arc::new(ScriptedExtractor::new());
        extractor.queue(extraction(Some("None"), Some("restaurant"), Intent::Search));

        let memory = after_search(Some("Tokyo"), "sushi");
        let resolution = resolver(extractor).resolve("find me a restaurant", &memory).await;

        assert_eq!(resolution.supplied_city, None);
        assert_eq!(resolution.supplied_food, None);
        assert_eq!(resolution.city.as_deref(), Some("Tokyo"));
        assert_eq!(resolution.food.as_deref(), Some("sushi"));
    }

    #[tokio::test]
    async fn test_hi_is_always_chat() {
        let extractor = Arc::new(ScriptedExtractor::new());
        extractor.queue(extraction(Some("Hi"), Some("hi"), Intent::Search));

        let memory = after_search(Some("Tokyo"), "sushi");
        let resolution = resolver(extractor.clone()).resolve("  HI ", &memory).await;

        assert_eq!(resolution.intent, Intent::Chat);
        assert_eq!(resolution.city, None);
        assert_eq!(resolution.food, None);
        assert!(!resolution.overridden);
        assert_eq!(extractor.call_count(), 1);
    }

    #[tokio::test]
    async fn test_what_about_paris_continues_search() {
        let extractor = Arc::new(ScriptedExtractor::new());
        extractor.queue(extraction(Some("Paris"), None, Intent::Info));

        let memory = after_search(Some(""), "Sushi");
        assert_eq!(memory.city(), None);

        let resolution = resolver(extractor).resolve("what about Paris", &memory).await;

        assert!(resolution.overridden);
        assert_eq!(resolution.intent, Intent::Search);
        assert_eq!(resolution.city.as_deref(), Some("Paris"));
        assert_eq!(resolution.food.as_deref(), Some("Sushi"));
    }

    #[tokio::test]
    async fn test_long_question_stays_info() {
        let extractor = Arc::new(ScriptedExtractor::new());
        extractor.queue(extraction(Some("Paris"), None, Intent::Info));

        let memory = after_search(Some("Tokyo"), "sushi");
        let resolution = resolver(extractor)
            .resolve("what is the most famous dish in Paris", &memory)
            .await;

        assert!(!resolution.overridden);
        assert_eq!(resolution.intent, Intent::Info);
    }

    #[tokio::test]
    async fn test_extraction_failure_degrades_to_chat() {
        let extractor = Arc::new(ScriptedExtractor::new());
        extractor.queue_error(ProviderError::Auth("HTTP 401: bad key".into()));

        let memory = after_search(Some("Tokyo"), "sushi");
        let resolution = resolver(extractor).resolve("what about Paris", &memory).await;

        assert_eq!(resolution.intent, Intent::Chat);
        assert_eq!(resolution.city, None);
        assert_eq!(resolution.food, None);
        assert!(!resolution.overridden);
        assert!(resolution.extraction_error.unwrap().contains("bad key"));
    }

    #[tokio::test]
    async fn test_greeting_still_reports_extraction_failure() {
        let extractor = Arc::new(ScriptedExtractor::new());
        extractor.queue_error(ProviderError::Auth("HTTP 401: bad key".into()));

        let resolution = resolver(extractor).resolve("hi", &SessionMemory::new()).await;

        assert_eq!(resolution.intent, Intent::Chat);
        assert!(!resolution.overridden);
        assert!(resolution.extraction_error.unwrap().contains("bad key"));
    }
}
