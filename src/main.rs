//! DineScout - conversational restaurant finder API
//!
//! Maps free-text requests ("sushi in Tokyo", "what about Paris?") to a
//! restaurant search, an informational answer, or a casual chat reply, while
//! remembering the last city and food across turns.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod conversation;
mod core;
mod providers;
mod routes;

use crate::core::{ChatEngine, IntentResolver, SessionStore, TurnDispatcher};
use config::Config;
use providers::{LlmBackend, Provider, YelpClient};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ChatEngine>,
    pub sessions: Arc<SessionStore>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dinescout=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let agent = config.load_agent()?;
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    let provider = Provider::from_config(&agent.llm, config.llm_api_key(&agent.llm))?;
    let llm = Arc::new(LlmBackend::new(provider, agent.prompts.extraction.clone()));
    tracing::info!("🧠 Using {} provider ({})", llm.provider_name(), agent.llm.model);

    let yelp = YelpClient::new(&agent.search, config.search_api_key(&agent.search))?;
    if !yelp.has_credentials() {
        tracing::warn!("🔑 No search API key configured; restaurant searches will ask for one");
    }

    let resolver = IntentResolver::new(
        llm.clone(),
        agent.vocabulary.clone(),
        agent.follow_up.clone(),
    );
    let dispatcher = TurnDispatcher::new(
        llm,
        Arc::new(yelp),
        agent.prompts.clone(),
        agent.search.limit,
    );

    let sessions = Arc::new(SessionStore::new());
    sessions
        .clone()
        .spawn_sweeper(Duration::from_secs(config.session_idle_secs));

    let state = AppState {
        engine: Arc::new(ChatEngine::new(resolver, dispatcher)),
        sessions,
    };

    let app = Router::new()
        .merge(routes::router())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    tracing::info!("🍽️ DineScout API running at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
