//! Turn dispatch
//!
//! A resolved turn becomes a [`TurnPlan`]; each plan variant is a terminal
//! branch that produces exactly one reply and the action to remember.

use std::sync::Arc;

use crate::config::PromptSet;
use crate::config::prompts::info_prompt;
use crate::conversation::{Intent, Turn};
use crate::providers::{GenerationRequest, Generator, RestaurantSearch};

use super::render;
use super::resolver::Resolution;

/// What to do with a resolved turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnPlan {
    Chat,
    Info { city: Option<String> },
    Search(SearchPlan),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchPlan {
    Ready { city: String, food: String },
    MissingFood { city: String },
    MissingCity { food: String },
    MissingBoth,
}

impl TurnPlan {
    pub fn from_resolution(resolution: &Resolution) -> Self {
        match resolution.intent {
            Intent::Chat => TurnPlan::Chat,
            Intent::Info => TurnPlan::Info {
                city: resolution.city.clone(),
            },
            Intent::Search => {
                let plan = match (resolution.city.clone(), resolution.food.clone()) {
                    (Some(city), Some(food)) => SearchPlan::Ready { city, food },
                    (Some(city), None) => SearchPlan::MissingFood { city },
                    (None, Some(food)) => SearchPlan::MissingCity { food },
                    (None, None) => SearchPlan::MissingBoth,
                };
                TurnPlan::Search(plan)
            }
        }
    }
}

/// Reply for one turn and the action that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatched {
    pub reply: String,
    pub action: Intent,
}

impl Dispatched {
    fn new(reply: impl Into<String>, action: Intent) -> Self {
        Self {
            reply: reply.into(),
            action,
        }
    }
}

pub struct TurnDispatcher {
    generator: Arc<dyn Generator>,
    search: Arc<dyn RestaurantSearch>,
    prompts: PromptSet,
    limit: usize,
}

impl TurnDispatcher {
    pub fn new(
        generator: Arc<dyn Generator>,
        search: Arc<dyn RestaurantSearch>,
        prompts: PromptSet,
        limit: usize,
    ) -> Self {
        Self {
            generator,
            search,
            prompts,
            limit,
        }
    }

    /// Run a plan. `history` holds the turns before the current utterance.
    pub async fn dispatch(&self, plan: TurnPlan, utterance: &str, history: &[Turn]) -> Dispatched {
        match plan {
            TurnPlan::Chat => self.chat(utterance, history).await,
            TurnPlan::Info { city } => self.info(utterance, city.as_deref()).await,
            TurnPlan::Search(SearchPlan::Ready { city, food }) => self.search(&city, &food).await,
            TurnPlan::Search(SearchPlan::MissingFood { city }) => {
                Dispatched::new(render::missing_food(&city), Intent::Chat)
            }
            TurnPlan::Search(SearchPlan::MissingCity { food }) => {
                Dispatched::new(render::missing_city(&food), Intent::Chat)
            }
            TurnPlan::Search(SearchPlan::MissingBoth) => {
                Dispatched::new(render::missing_both(), Intent::Chat)
            }
        }
    }

    async fn chat(&self, utterance: &str, history: &[Turn]) -> Dispatched {
        let request = GenerationRequest {
            system: &self.prompts.chat,
            prompt: utterance,
            history,
        };
        let reply = match self.generator.generate(request).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "chat generation failed");
                render::CHAT_APOLOGY.to_string()
            }
        };
        Dispatched::new(reply, Intent::Chat)
    }

    async fn info(&self, utterance: &str, city: Option<&str>) -> Dispatched {
        let prompt = info_prompt(utterance, city);
        let request = GenerationRequest {
            system: &self.prompts.info,
            prompt: &prompt,
            history: &[],
        };
        let reply = match self.generator.generate(request).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "info generation failed");
                render::INFO_APOLOGY.to_string()
            }
        };
        Dispatched::new(reply, Intent::Info)
    }

    async fn search(&self, city: &str, food: &str) -> Dispatched {
        tracing::info!(city, food, limit = self.limit, "searching restaurants");

        match self.search.search(city, food, self.limit).await {
            Ok(businesses) if businesses.is_empty() => {
                Dispatched::new(render::no_results(food, city), Intent::Chat)
            }
            Ok(businesses) => Dispatched::new(
                render::search_results(food, city, &businesses, self.limit),
                Intent::Search,
            ),
            Err(e) => {
                tracing::warn!(error = %e, city, food, "restaurant search failed");
                Dispatched::new(render::search_failure(&e, food, city), Intent::Chat)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::testing::{business, ScriptedGenerator, ScriptedSearch};
    use crate::providers::{ProviderError, SearchError};

    struct Fixture {
        generator: Arc<ScriptedGenerator>,
        search: Arc<ScriptedSearch>,
        dispatcher: TurnDispatcher,
    }

    fn fixture() -> Fixture {
        let generator = Arc::new(ScriptedGenerator::new());
        let search = Arc::new(ScriptedSearch::new());
        let dispatcher =
            TurnDispatcher::new(generator.clone(), search.clone(), PromptSet::default(), 5);
        Fixture {
            generator,
            search,
            dispatcher,
        }
    }

    fn ready(city: &str, food: &str) -> TurnPlan {
        TurnPlan::Search(SearchPlan::Ready {
            city: city.into(),
            food: food.into(),
        })
    }

    #[test]
    fn test_plan_from_resolution() {
        let mut resolution = Resolution {
            intent: Intent::Search,
            city: None,
            food: Some("sushi".into()),
            supplied_city: None,
            supplied_food: Some("sushi".into()),
            overridden: false,
            extraction_error: None,
        };
        assert_eq!(
            TurnPlan::from_resolution(&resolution),
            TurnPlan::Search(SearchPlan::MissingCity { food: "sushi".into() })
        );

        resolution.intent = Intent::Info;
        resolution.city = Some("Rome".into());
        assert_eq!(
            TurnPlan::from_resolution(&resolution),
            TurnPlan::Info { city: Some("Rome".into()) }
        );
    }

    #[tokio::test]
    async fn test_missing_city_never_searches() {
        let f = fixture();
        let out = f
            .dispatcher
            .dispatch(
                TurnPlan::Search(SearchPlan::MissingCity { food: "sushi".into() }),
                "sushi please",
                &[],
            )
            .await;

        assert!(out.reply.contains("Sushi"));
        assert!(out.reply.contains("Which city"));
        assert_eq!(out.action, Intent::Chat);
        assert!(f.search.recorded().is_empty());
    }

    #[tokio::test]
    async fn test_zero_results() {
        let f = fixture();
        f.search.queue(vec![]);

        let out = f.dispatcher.dispatch(ready("Reykjavik", "tacos"), "tacos in reykjavik", &[]).await;

        assert!(out.reply.contains("Tacos"));
        assert!(out.reply.contains("Reykjavik"));
        assert_eq!(out.action, Intent::Chat);
        assert_eq!(f.search.recorded(), vec![("Reykjavik".to_string(), "tacos".to_string(), 5)]);
    }

    #[tokio::test]
    async fn test_five_results_render_five_entries() {
        let f = fixture();
        f.search.queue(
            (1..=5)
                .map(|i| business(&format!("Sushi Bar {i}"), &format!("{i}-1 Ginza"), 4.5))
                .collect(),
        );

        let out = f.dispatcher.dispatch(ready("Tokyo", "sushi"), "sushi in tokyo", &[]).await;
        let entries: Vec<&str> = out.reply.lines().skip(1).collect();

        assert_eq!(out.action, Intent::Search);
        assert_eq!(entries.len(), 5);
        for (i, entry) in entries.iter().enumerate() {
            let n = i + 1;
            assert!(entry.contains(&format!("[Sushi Bar {n}]")));
            assert!(entry.contains("**4.5**"));
            assert!(entry.contains(&format!("{n}-1 Ginza")));
            assert!(entry.contains(&format!("query=Sushi+Bar+{n}%2C+Tokyo")));
        }
    }

    #[tokio::test]
    async fn test_search_errors_become_chat() {
        let f = fixture();
        f.search.queue_error(SearchError::Rejected {
            status: 400,
            detail: "LOCATION_NOT_FOUND".into(),
        });

        let out = f.dispatcher.dispatch(ready("Atlantis", "sushi"), "sushi in atlantis", &[]).await;

        assert_eq!(out.action, Intent::Chat);
        assert!(out.reply.contains("couldn't find any results"));
    }

    #[tokio::test]
    async fn test_chat_uses_history_and_persona() {
        let f = fixture();
        f.generator.queue("Hello! What are you craving, and where?");
        let history = vec![Turn::user("hey"), Turn::assistant("Hi!", Intent::Chat)];

        let out = f.dispatcher.dispatch(TurnPlan::Chat, "how are you", &history).await;

        assert_eq!(out.action, Intent::Chat);
        assert_eq!(out.reply, "Hello! What are you craving, and where?");
        let calls = f.generator.recorded();
        assert_eq!(calls[0].prompt, "how are you");
        assert_eq!(calls[0].history.len(), 2);
        assert_eq!(calls[0].system, PromptSet::default().chat);
    }

    #[tokio::test]
    async fn test_generation_failures_apologise() {
        let f = fixture();
        f.generator
            .queue_error(ProviderError::RateLimited("HTTP 429".into()))
            .queue_error(ProviderError::InvalidResponse("empty".into()));

        let chat = f.dispatcher.dispatch(TurnPlan::Chat, "yo", &[]).await;
        assert_eq!(chat.reply, render::CHAT_APOLOGY);
        assert_eq!(chat.action, Intent::Chat);

        let info = f
            .dispatcher
            .dispatch(TurnPlan::Info { city: Some("Lima".into()) }, "what do people eat in lima?", &[])
            .await;
        assert_eq!(info.reply, render::INFO_APOLOGY);
        assert_eq!(info.action, Intent::Info);
    }

    #[tokio::test]
    async fn test_info_prompt_carries_city() {
        let f = fixture();
        f.generator.queue("- Ceviche\n- Lomo saltado");

        let out = f
            .dispatcher
            .dispatch(TurnPlan::Info { city: Some("Lima".into()) }, "what should I try?", &[])
            .await;

        assert_eq!(out.action, Intent::Info);
        let calls = f.generator.recorded();
        assert!(calls[0].prompt.contains("in Lima"));
        assert!(calls[0].history.is_empty());
    }
}
