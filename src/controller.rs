//! Headless conversation state machine: submit a question, feed it stream
//! events, read back the transcript. No UI or network dependency.

use crate::client::StreamFailure;
use crate::transcript::{Message, MessageId, Transcript};

/// Fixed text appended to the answer when the streaming connection fails.
pub const CONNECT_ERROR_TEXT: &str = "Error connecting to server";

/// Fixed text appended to the answer when a received fragment cannot be decoded.
pub const DECODE_ERROR_TEXT: &str = "Error processing response";

/// Transcript text for a stream failure kind.
pub fn error_text(failure: StreamFailure) -> &'static str {
    match failure {
        StreamFailure::Connect => CONNECT_ERROR_TEXT,
        StreamFailure::Decode => DECODE_ERROR_TEXT,
    }
}

/// Lifecycle of the most recent request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestPhase {
    Idle,
    Streaming,
    Completed,
    Failed,
}

/// Drives one request at a time: `submit` appends the user message and an
/// assistant placeholder, then `push_fragment` grows the placeholder until
/// `complete` or `fail` ends the request. Both terminal transitions clear the
/// pending flag and re-enable submission; a failure additionally appends the
/// fixed error text for its kind.
pub struct ConversationController {
    transcript: Transcript,
    phase: RequestPhase,
    pending: bool,
    active_reply: Option<MessageId>,
}

impl ConversationController {
    pub fn new() -> Self {
        Self {
            transcript: Transcript::new(),
            phase: RequestPhase::Idle,
            pending: false,
            active_reply: None,
        }
    }

    /// Start a new request. Returns `true` when a stream should be opened for
    /// `question`; a blank question or an already-pending request is a no-op.
    pub fn submit(&mut self, question: &str) -> bool {
        let question = question.trim();
        if question.is_empty() || self.pending {
            return false;
        }

        self.transcript.push(Message::user(question));
        let reply_id = self.transcript.push(Message::assistant_placeholder());
        self.active_reply = Some(reply_id);
        self.pending = true;
        self.phase = RequestPhase::Streaming;
        true
    }

    /// Append one streamed fragment to the in-progress answer. Fragments
    /// arriving outside an active request (e.g. after completion) are dropped.
    pub fn push_fragment(&mut self, fragment: &str) {
        if !self.pending {
            return;
        }
        if let Some(reply) = self.active_reply.and_then(|id| self.transcript.get_mut(id)) {
            reply.push_part(fragment);
        }
    }

    /// Normal end of stream.
    pub fn complete(&mut self) {
        if !self.pending {
            return;
        }
        self.pending = false;
        self.active_reply = None;
        self.phase = RequestPhase::Completed;
    }

    /// Stream failure: surface the fixed error text in the answer and end the
    /// request. The connection is closed by the caller dropping the receiver.
    pub fn fail(&mut self, failure: StreamFailure) {
        if !self.pending {
            return;
        }
        if let Some(reply) = self.active_reply.and_then(|id| self.transcript.get_mut(id)) {
            reply.push_part(error_text(failure));
        }
        self.pending = false;
        self.active_reply = None;
        self.phase = RequestPhase::Failed;
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn pending(&self) -> bool {
        self.pending
    }

    pub fn phase(&self) -> RequestPhase {
        self.phase
    }
}

impl Default for ConversationController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::Role;

    #[test]
    fn submit_appends_user_then_placeholder() {
        let mut controller = ConversationController::new();
        assert!(controller.submit("What is 2+2?"));

        let messages = controller.transcript().messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[0].text(), "What is 2+2?");
        assert_eq!(messages[1].role, Role::Assistant);
        assert!(messages[1].is_empty());
        assert!(controller.pending());
        assert_eq!(controller.phase(), RequestPhase::Streaming);
    }

    #[test]
    fn blank_submit_is_a_no_op() {
        let mut controller = ConversationController::new();
        assert!(!controller.submit(""));
        assert!(!controller.submit("   \t\n"));
        assert_eq!(controller.transcript().len(), 0);
        assert!(!controller.pending());
        assert_eq!(controller.phase(), RequestPhase::Idle);
    }

    #[test]
    fn submit_while_pending_is_a_no_op() {
        let mut controller = ConversationController::new();
        assert!(controller.submit("first"));
        assert!(!controller.submit("second"));
        assert_eq!(controller.transcript().len(), 2);
    }

    #[test]
    fn fragments_accumulate_in_delivery_order() {
        let mut controller = ConversationController::new();
        controller.submit("tell me something");
        for fragment in ["The", "answer", "is", "4"] {
            controller.push_fragment(fragment);
        }
        controller.complete();

        let reply = controller.transcript().last().unwrap();
        assert_eq!(reply.text(), "The answer is 4");
        assert!(!controller.pending());
        assert_eq!(controller.phase(), RequestPhase::Completed);
    }

    #[test]
    fn transport_error_after_fragments_appends_error_text() {
        let mut controller = ConversationController::new();
        controller.submit("hello");
        controller.push_fragment("partial");
        controller.fail(StreamFailure::Connect);

        let reply = controller.transcript().last().unwrap();
        assert_eq!(reply.text(), format!("partial {CONNECT_ERROR_TEXT}"));
        assert!(!controller.pending());
        assert_eq!(controller.phase(), RequestPhase::Failed);
    }

    #[test]
    fn immediate_error_yields_only_error_text() {
        let mut controller = ConversationController::new();
        controller.submit("hello");
        controller.fail(StreamFailure::Connect);

        let reply = controller.transcript().last().unwrap();
        assert_eq!(reply.text(), CONNECT_ERROR_TEXT);
        assert!(!controller.pending());
    }

    #[test]
    fn decode_error_uses_processing_text() {
        let mut controller = ConversationController::new();
        controller.submit("hello");
        controller.fail(StreamFailure::Decode);
        assert_eq!(controller.transcript().last().unwrap().text(), DECODE_ERROR_TEXT);
    }

    #[test]
    fn late_fragments_after_completion_are_dropped() {
        let mut controller = ConversationController::new();
        controller.submit("What is 2+2?");
        controller.push_fragment("4");
        controller.complete();
        controller.push_fragment("5");

        assert_eq!(controller.transcript().last().unwrap().text(), "4");
    }

    #[test]
    fn terminal_states_reenable_submission() {
        let mut controller = ConversationController::new();
        controller.submit("one");
        controller.complete();
        assert!(controller.submit("two"));
        controller.fail(StreamFailure::Connect);
        assert!(controller.submit("three"));
        assert_eq!(controller.transcript().len(), 6);
    }

    #[test]
    fn submitted_question_is_trimmed() {
        let mut controller = ConversationController::new();
        controller.submit("  spaced out  ");
        assert_eq!(controller.transcript().messages()[0].text(), "spaced out");
    }
}
