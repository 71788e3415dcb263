//! Advisor use case.
//!
//! Coordinates the conversation, the request builder and the resilient caller
//! for one user turn:
//!
//! 1. reject empty input,
//! 2. append the user turn,
//! 3. refresh the instruction turn from the current filters,
//! 4. build the request and run the call,
//! 5. append the result's display text as the assistant turn.
//!
//! The assistant turn is appended only after the call reaches a terminal
//! state. Dropping the `submit` future leaves the user turn without an answer.

use advisor_core::error::{AdvisorError, Result};
use advisor_core::{CallResult, Conversation, FilterKind, FilterSelection, RequestBuilder, TurnRole};
use advisor_interaction::ResilientCaller;

use crate::session::ChatSession;

/// Greeting seeded into new sessions.
pub const DEFAULT_GREETING: &str = "Hello! I'm your Watch Collection Advisor. \
Use /set to choose filters, then ask me for recommendations or market insights.";

pub struct AdvisorService {
    caller: ResilientCaller,
    builder: RequestBuilder,
    greeting: Option<String>,
}

impl AdvisorService {
    pub fn new(caller: ResilientCaller, builder: RequestBuilder) -> Self {
        Self {
            caller,
            builder,
            greeting: Some(DEFAULT_GREETING.to_string()),
        }
    }

    /// Sets the greeting for new and reset sessions; `None` starts them empty.
    pub fn with_greeting(mut self, greeting: Option<String>) -> Self {
        self.greeting = greeting;
        self
    }

    pub fn builder(&self) -> &RequestBuilder {
        &self.builder
    }

    pub fn caller(&self) -> &ResilientCaller {
        &self.caller
    }

    /// Starts a session with the instruction for the default filters in place.
    pub fn start_session(&self) -> ChatSession {
        let mut conversation = match &self.greeting {
            Some(greeting) => Conversation::with_greeting(greeting.clone()),
            None => Conversation::new(),
        };
        let filters = FilterSelection::default();
        conversation.set_instruction(self.builder.instruction_for(&filters));

        let session = ChatSession::new(conversation);
        tracing::debug!(session_id = %session.id(), "Session started");
        session
    }

    /// Runs one user turn and returns its result.
    ///
    /// Only empty input is an error; every call outcome, failures included,
    /// comes back as a [`CallResult`] and is recorded in the conversation.
    pub async fn submit(&self, session: &mut ChatSession, text: &str) -> Result<CallResult> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AdvisorError::EmptyInput);
        }

        let instruction = self.builder.instruction_for(session.filters());
        let conversation = session.conversation_mut();
        conversation.append(TurnRole::User, text)?;
        conversation.set_instruction(instruction);

        let request = self.builder.build(session.conversation(), session.filters());
        tracing::debug!(
            session_id = %session.id(),
            model = %request.model,
            history_len = request.history.len(),
            "Submitting user turn"
        );

        let result = self.caller.call(&request).await;
        session
            .conversation_mut()
            .append(TurnRole::Assistant, result.display_text())?;

        Ok(result)
    }

    /// Sets one filter and refreshes the instruction turn.
    ///
    /// Returns the label actually applied; unknown values fall back to `Any`.
    pub fn update_filter(&self, session: &mut ChatSession, kind: FilterKind, value: &str) -> &'static str {
        session.filters_mut().set(kind, value);
        self.refresh_instruction(session);

        let applied = session.filters().get(kind);
        tracing::debug!(filter = %kind, value = applied, "Filter updated");
        applied
    }

    /// Replaces the whole filter selection.
    pub fn replace_filters(&self, session: &mut ChatSession, filters: FilterSelection) {
        *session.filters_mut() = filters;
        self.refresh_instruction(session);
    }

    /// Clears the transcript, keeping filters and the instruction turn.
    pub fn reset(&self, session: &mut ChatSession) {
        session.conversation_mut().reset();
        self.refresh_instruction(session);
        tracing::debug!(session_id = %session.id(), "Session reset");
    }

    fn refresh_instruction(&self, session: &mut ChatSession) {
        let instruction = self.builder.instruction_for(session.filters());
        session.conversation_mut().set_instruction(instruction);
    }
}
