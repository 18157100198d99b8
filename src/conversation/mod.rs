//! Conversation types and transcript handling

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// What a turn is trying to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Intent {
    /// Find restaurants for a city + food
    Search,
    /// Ask about food culture or popular dishes
    Info,
    /// Greetings and general talk
    Chat,
}

impl Intent {
    /// Parse the label produced by an extraction model. Unknown labels fall back to `Chat`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_uppercase().as_str() {
            "SEARCH" => Intent::Search,
            "INFO" => Intent::Info,
            _ => Intent::Chat,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Search => "SEARCH",
            Intent::Info => "INFO",
            Intent::Chat => "CHAT",
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single utterance in the transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,

    /// Which branch produced an assistant turn
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<Intent>,

    pub created_at: DateTime<Utc>,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            action: None,
            created_at: Utc::now(),
        }
    }

    pub fn assistant(text: impl Into<String>, action: Intent) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            action: Some(action),
            created_at: Utc::now(),
        }
    }
}

/// Append-only surface that receives turns in order
pub trait TranscriptSink: Send {
    fn append(&mut self, turn: Turn);

    /// Everything appended so far, oldest first
    fn turns(&self) -> &[Turn];
}

/// In-memory transcript owned by a session
#[derive(Debug, Clone, Default, Serialize)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

impl TranscriptSink for Transcript {
    fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    fn turns(&self) -> &[Turn] {
        &self.turns
    }
}
