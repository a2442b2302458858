//! Conversation history
//!
//! The full, append-only exchange with the model. Every request carries all
//! of it; nothing is truncated or summarised.

use tracing::debug;

use crate::documents::DocumentRecord;
use crate::instructions::Instruction;
use crate::llm::{Message, Role};

/// Prefix of the user message that carries the document collection
pub const RESEARCH_DATA_PREFIX: &str = "Here is my research data: ";

/// Ordered list of role-tagged messages
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// One system message per instruction, then the documents as a user message
    pub fn seeded(instructions: &[Instruction], records: &[DocumentRecord]) -> Result<Self, serde_json::Error> {
        debug!(
            instructions = instructions.len(),
            documents = records.len(),
            "Conversation::seeded: called"
        );
        let mut conversation = Self::new();
        for instruction in instructions {
            conversation.push(Message::system(&instruction.text));
        }
        conversation.push(Message::user(render_research_data(records)?));
        Ok(conversation)
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Drop everything after the first `len` messages
    pub(crate) fn truncate(&mut self, len: usize) {
        self.messages.truncate(len);
    }

    /// Count of messages per role: (system, user, assistant)
    pub fn role_counts(&self) -> (usize, usize, usize) {
        self.messages.iter().fold((0, 0, 0), |(s, u, a), m| match m.role {
            Role::System => (s + 1, u, a),
            Role::User => (s, u + 1, a),
            Role::Assistant => (s, u, a + 1),
        })
    }
}

/// Textual form of the document collection handed to the model
pub fn render_research_data(records: &[DocumentRecord]) -> Result<String, serde_json::Error> {
    Ok(format!("{}{}", RESEARCH_DATA_PREFIX, serde_json::to_string(records)?))
}
