//! Conversation model.
//!
//! An ordered log of turns owned by a single chat session. The log carries at
//! most one instruction turn, always at position zero, which is sent to the
//! model but never shown to the user.

use std::iter::FusedIterator;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use crate::error::{AdvisorError, Result};

/// Represents the role of a turn in a conversation.
///
/// Parsing accepts the aliases used by different model SDKs: `system` for the
/// instruction turn and `model` for the assistant turn.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum TurnRole {
    /// Persona and filter context. Never rendered to the user.
    #[strum(to_string = "instruction", serialize = "system")]
    Instruction,
    /// Message typed by the user.
    #[strum(to_string = "user")]
    User,
    /// Reply from the model, or a diagnostic rendered in its place.
    #[strum(to_string = "assistant", serialize = "model")]
    Assistant,
}

impl TurnRole {
    /// Parses a role name, failing with [`AdvisorError::InvalidRole`].
    pub fn parse(role: &str) -> Result<Self> {
        role.trim()
            .parse::<TurnRole>()
            .map_err(|_| AdvisorError::invalid_role(role))
    }
}

/// How the instruction turn travels to the transport.
///
/// Chosen once per integration and never switched mid-session.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum TransportConvention {
    /// The instruction is emitted as the first entry of the history.
    #[serde(rename = "inline")]
    #[strum(to_string = "inline")]
    InlineHistory,
    /// The instruction is returned separately and omitted from the history.
    #[default]
    #[serde(rename = "separate")]
    #[strum(to_string = "separate")]
    SeparateField,
}

/// A single entry in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    id: Uuid,
    role: TurnRole,
    text: String,
    /// Timestamp when the turn was created (RFC 3339).
    created_at: String,
}

impl Turn {
    fn new(role: TurnRole, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            text: text.into(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn role(&self) -> TurnRole {
        self.role
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn created_at(&self) -> &str {
        &self.created_at
    }
}

/// The view of a conversation handed to a transport.
#[derive(Debug, Clone)]
pub struct RenderedConversation<'a> {
    /// The instruction text, present only under [`TransportConvention::SeparateField`].
    pub instruction: Option<&'a str>,
    /// `(role, text)` pairs in insertion order.
    pub history: Transcript<'a>,
}

/// Lazy, finite iterator over a conversation's turns.
///
/// Cloning it restarts iteration from the same position.
#[derive(Debug, Clone)]
pub struct Transcript<'a> {
    turns: std::slice::Iter<'a, Turn>,
    skip_instruction: bool,
}

impl<'a> Iterator for Transcript<'a> {
    type Item = (TurnRole, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let turn = self.turns.next()?;
            if self.skip_instruction && turn.role == TurnRole::Instruction {
                continue;
            }
            return Some((turn.role, turn.text.as_str()));
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (_, upper) = self.turns.size_hint();
        (0, upper)
    }
}

impl FusedIterator for Transcript<'_> {}

/// Ordered chat transcript for one session.
///
/// User and assistant turns only grow; [`Conversation::reset`] is the one way
/// to drop them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversation {
    turns: Vec<Turn>,
    greeting: Option<String>,
}

impl Conversation {
    /// Creates an empty conversation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a conversation seeded with an assistant greeting.
    ///
    /// The greeting is re-seeded after [`Conversation::reset`].
    pub fn with_greeting(greeting: impl Into<String>) -> Self {
        let greeting = greeting.into();
        Self {
            turns: vec![Turn::new(TurnRole::Assistant, greeting.clone())],
            greeting: Some(greeting),
        }
    }

    /// Appends a user or assistant turn at the end.
    ///
    /// Instruction turns are rejected: they are only placed through
    /// [`Conversation::set_instruction`], which keeps them at position zero.
    pub fn append(&mut self, role: TurnRole, text: impl Into<String>) -> Result<&Turn> {
        if role == TurnRole::Instruction {
            return Err(AdvisorError::invalid_role(
                "instruction (use set_instruction instead)",
            ));
        }
        let index = self.turns.len();
        self.turns.push(Turn::new(role, text));
        Ok(&self.turns[index])
    }

    /// Appends a turn whose role arrives as a string, e.g. from a UI layer.
    pub fn append_raw(&mut self, role: &str, text: impl Into<String>) -> Result<&Turn> {
        let role = TurnRole::parse(role)?;
        self.append(role, text)
    }

    /// Sets the instruction turn's text.
    ///
    /// Replaces the text of turn zero in place when it is the instruction,
    /// otherwise inserts a new instruction turn at position zero. Calling
    /// this twice with the same text leaves the conversation unchanged.
    pub fn set_instruction(&mut self, text: impl Into<String>) -> &Turn {
        let text = text.into();
        match self.turns.first_mut() {
            Some(turn) if turn.role == TurnRole::Instruction => {
                if turn.text != text {
                    tracing::debug!(turn_id = %turn.id, "Replacing instruction text");
                    turn.text = text;
                }
            }
            _ => {
                self.turns.insert(0, Turn::new(TurnRole::Instruction, text));
            }
        }
        &self.turns[0]
    }

    /// Returns the instruction turn, if one has been set.
    pub fn instruction(&self) -> Option<&Turn> {
        self.turns
            .first()
            .filter(|turn| turn.role == TurnRole::Instruction)
    }

    /// All turns in insertion order, instruction included.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Turns the end user may see (everything except the instruction).
    pub fn visible_turns(&self) -> impl Iterator<Item = &Turn> + '_ {
        self.turns
            .iter()
            .filter(|turn| turn.role != TurnRole::Instruction)
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Drops every user and assistant turn.
    ///
    /// The instruction turn survives and the greeting, if configured, is
    /// seeded again.
    pub fn reset(&mut self) {
        self.turns.retain(|turn| turn.role == TurnRole::Instruction);
        if let Some(greeting) = &self.greeting {
            self.turns
                .push(Turn::new(TurnRole::Assistant, greeting.clone()));
        }
    }

    /// Renders the conversation for a transport using the given convention.
    pub fn render_for_transport(&self, convention: TransportConvention) -> RenderedConversation<'_> {
        match convention {
            TransportConvention::InlineHistory => RenderedConversation {
                instruction: None,
                history: Transcript {
                    turns: self.turns.iter(),
                    skip_instruction: false,
                },
            },
            TransportConvention::SeparateField => RenderedConversation {
                instruction: self.instruction().map(Turn::text),
                history: Transcript {
                    turns: self.turns.iter(),
                    skip_instruction: true,
                },
            },
        }
    }
}
