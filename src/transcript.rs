use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Separator used when joining a message's fragments for display.
pub const PART_SEPARATOR: &str = " ";

/// Opaque message identifier, unique within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(Uuid);

impl MessageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single message in the conversation.
///
/// User messages carry their full text as a single part fixed at creation.
/// Assistant messages start empty and grow one fragment at a time as the
/// stream delivers them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub parts: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a completed user message.
    pub fn user(question: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            role: Role::User,
            parts: vec![question.into()],
            timestamp: Utc::now(),
        }
    }

    /// Create an empty assistant message awaiting streamed fragments.
    pub fn assistant_placeholder() -> Self {
        Self {
            id: MessageId::new(),
            role: Role::Assistant,
            parts: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    /// Append one fragment, preserving arrival order.
    pub fn push_part(&mut self, fragment: impl Into<String>) {
        self.parts.push(fragment.into());
    }

    /// Display text: fragments joined with the part separator.
    pub fn text(&self) -> String {
        self.parts.join(PART_SEPARATOR)
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

/// Ordered conversation history; append-only during a session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message and return its id.
    pub fn push(&mut self, message: Message) -> MessageId {
        let id = message.id;
        self.messages.push(message);
        id
    }

    pub fn get_mut(&mut self, id: MessageId) -> Option<&mut Message> {
        self.messages.iter_mut().find(|m| m.id == id)
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_holds_single_part() {
        let msg = Message::user("What is 2+2?");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.parts, vec!["What is 2+2?"]);
        assert_eq!(msg.text(), "What is 2+2?");
    }

    #[test]
    fn assistant_placeholder_starts_empty() {
        let msg = Message::assistant_placeholder();
        assert_eq!(msg.role, Role::Assistant);
        assert!(msg.is_empty());
        assert_eq!(msg.text(), "");
    }

    #[test]
    fn parts_join_in_append_order() {
        let mut msg = Message::assistant_placeholder();
        msg.push_part("The");
        msg.push_part("answer");
        msg.push_part("is");
        msg.push_part("4");
        assert_eq!(msg.text(), "The answer is 4");
    }

    #[test]
    fn transcript_preserves_insertion_order() {
        let mut transcript = Transcript::new();
        transcript.push(Message::user("first"));
        transcript.push(Message::assistant_placeholder());
        transcript.push(Message::user("second"));
        let roles: Vec<Role> = transcript.messages().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant, Role::User]);
        assert_eq!(transcript.len(), 3);
    }

    #[test]
    fn get_mut_finds_message_by_id() {
        let mut transcript = Transcript::new();
        transcript.push(Message::user("hello"));
        let id = transcript.push(Message::assistant_placeholder());
        transcript.get_mut(id).unwrap().push_part("hi");
        assert_eq!(transcript.last().unwrap().text(), "hi");
    }

    #[test]
    fn message_ids_are_unique() {
        let a = Message::user("a");
        let b = Message::user("a");
        assert_ne!(a.id, b.id);
    }
}
