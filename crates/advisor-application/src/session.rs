//! Chat session context.

use advisor_core::{Conversation, FilterSelection};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// State owned by one interactive session.
///
/// Holds the conversation and the current filter selection. A call in flight
/// borrows the session mutably, so two submissions can never interleave.
#[derive(Debug, Clone)]
pub struct ChatSession {
    id: Uuid,
    started_at: DateTime<Utc>,
    conversation: Conversation,
    filters: FilterSelection,
}

impl ChatSession {
    pub fn new(conversation: Conversation) -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            conversation,
            filters: FilterSelection::default(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn conversation_mut(&mut self) -> &mut Conversation {
        &mut self.conversation
    }

    pub fn filters(&self) -> &FilterSelection {
        &self.filters
    }

    pub fn filters_mut(&mut self) -> &mut FilterSelection {
        &mut self.filters
    }
}
