//! Chat engine
//!
//! The ChatEngine runs one turn at a time for a session:
//! 1. Appends the user utterance to the transcript
//! 2. Resolves intent and slots against session memory
//! 3. Commits newly supplied slots to memory
//! 4. Dispatches the turn (chat, info or search)
//! 5. Records the action and appends the assistant reply

use serde::Serialize;
use uuid::Uuid;

use crate::conversation::{Intent, Transcript, TranscriptSink, Turn};

use super::dispatch::{TurnDispatcher, TurnPlan};
use super::memory::{title_case, SessionMemory, Slot};
use super::resolver::{IntentResolver, Resolution};

/// One conversation: its memory and transcript
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: Uuid,
    pub memory: SessionMemory,
    pub transcript: Transcript,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            memory: SessionMemory::new(),
            transcript: Transcript::new(),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything a caller needs to show for a finished turn
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnOutcome {
    pub reply: String,
    pub action: Intent,
    /// Out-of-band notes such as intent overrides or recoverable failures
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notices: Vec<String>,
    pub memory: SessionMemory,
}

pub struct ChatEngine {
    resolver: IntentResolver,
    dispatcher: TurnDispatcher,
}

impl ChatEngine {
    pub fn new(resolver: IntentResolver, dispatcher: TurnDispatcher) -> Self {
        Self {
            resolver,
            dispatcher,
        }
    }

    /// Process one utterance. External failures are folded into the reply.
    pub async fn take_turn(&self, session: &mut Session, utterance: &str) -> TurnOutcome {
        let utterance = utterance.trim();
        session.transcript.append(Turn::user(utterance));

        let resolution = self.resolver.resolve(utterance, &session.memory).await;
        tracing::debug!(
            session = %session.id,
            intent = %resolution.intent,
            city = resolution.city.as_deref().unwrap_or_default(),
            food = resolution.food.as_deref().unwrap_or_default(),
            "turn resolved"
        );

        self.remember_slots(&mut session.memory, &resolution);
        let notices = notices_for(&resolution);

        let plan = TurnPlan::from_resolution(&resolution);
        let turns = session.transcript.turns();
        let history = &turns[..turns.len().saturating_sub(1)];
        let dispatched = self.dispatcher.dispatch(plan, utterance, history).await;

        session.memory.set_last_action(dispatched.action);
        session
            .transcript
            .append(Turn::assistant(dispatched.reply.clone(), dispatched.action));

        TurnOutcome {
            reply: dispatched.reply,
            action: dispatched.action,
            notices,
            memory: session.memory.clone(),
        }
    }

    /// A supplied city is always kept; INFO turns never touch the food slot
    fn remember_slots(&self, memory: &mut SessionMemory, resolution: &Resolution) {
        let vocabulary = self.resolver.vocabulary();
        memory.update(Slot::City, resolution.supplied_city.as_deref(), vocabulary);
        if resolution.intent != Intent::Info {
            memory.update(Slot::Food, resolution.supplied_food.as_deref(), vocabulary);
        }
    }
}

fn notices_for(resolution: &Resolution) -> Vec<String> {
    let mut notices = Vec::new();
    if resolution.overridden {
        notices.push(format!(
            "Intent overridden to SEARCH for '{}' in '{}'",
            title_case(resolution.food.as_deref().unwrap_or_default()),
            resolution.city.as_deref().unwrap_or_default()
        ));
    }
    if resolution.extraction_error.is_some() {
        notices.push(
            "I couldn't analyse that request just now, so I answered conversationally.".to_string(),
        );
    }
    notices
}
