//! Conversation model.
//!
//! A conversation is an append-only list of turns scoped to one active
//! persona. It lives only in memory and is cleared whenever the persona
//! changes or a new conversation starts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

impl TurnRole {
    /// Role name as understood by the completion endpoint.
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnRole::User => "user",
            TurnRole::Assistant => "assistant",
        }
    }
}

/// One message in a conversation.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ChatTurn {
    pub id: String,
    pub role: TurnRole,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatTurn {
    pub fn new(role: TurnRole, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(TurnRole::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(TurnRole::Assistant, text)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Conversation {
    persona_id: Option<String>,
    turns: Vec<ChatTurn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn persona_id(&self) -> Option<&str> {
        self.persona_id.as_deref()
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Switches to `persona_id`, dropping all turns.
    ///
    /// Switching to the persona that is already active still clears.
    pub fn switch_persona(&mut self, persona_id: impl Into<String>) {
        self.persona_id = Some(persona_id.into());
        self.turns.clear();
    }

    /// Starts over with the same persona.
    pub fn reset(&mut self) {
        self.turns.clear();
    }

    pub fn push(&mut self, turn: ChatTurn) {
        self.turns.push(turn);
    }
}
