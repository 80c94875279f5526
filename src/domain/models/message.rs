use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Who authored a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    UserA,
    UserB,
    Moderator,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::UserA => "user_a",
            Sender::UserB => "user_b",
            Sender::Moderator => "moderator",
        }
    }

    /// Label shown next to a message in the UI.
    pub fn display_name(&self) -> &'static str {
        match self {
            Sender::UserA => "User A",
            Sender::UserB => "User B",
            Sender::Moderator => "Moderator",
        }
    }

    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "user_a" => Ok(Sender::UserA),
            "user_b" => Ok(Sender::UserB),
            "moderator" => Ok(Sender::Moderator),
            unknown => Err(DomainError::invalid_input(format!(
                "unknown sender '{unknown}'"
            ))),
        }
    }

    pub fn is_moderator(&self) -> bool {
        matches!(self, Sender::Moderator)
    }
}

/// A single transcript entry. Immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    id: u64,
    sender: Sender,
    text: String,
}

impl Message {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn sender(&self) -> Sender {
        self.sender
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Append-only, in-memory message sequence for one page session.
///
/// Ordering is insertion order. Identifiers come from a strictly monotonic
/// counter so two appends in the same clock tick can never collide.
#[derive(Debug, Default)]
pub struct Transcript {
    messages: Vec<Message>,
    next_id: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message and return a reference to it. There is no remove or
    /// edit operation.
    pub fn append(&mut self, sender: Sender, text: impl Into<String>) -> &Message {
        let id = self.next_id;
        self.next_id += 1;
        self.messages.push(Message {
            id,
            sender,
            text: text.into(),
        });
        &self.messages[self.messages.len() - 1]
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

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }
}
