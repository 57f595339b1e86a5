use crate::error::SubmitRejected;
use crate::video_id::VideoReference;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Content of the responder turn appended when a question could not be answered
pub const FAILED_ANSWER_PLACEHOLDER: &str = "Error: Unable to get a response from the chatbot.";

/// Who produced a turn
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Role {
    Asker,
    Responder,
}

/// One message of the exchange, immutable once appended
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Turn {
    /// Position in the conversation, starting at 0
    pub id: u64,
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Status of the question/answer flow
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ConversationStatus {
    /// No question outstanding
    Idle,
    /// Exactly one question outstanding
    AwaitingResponse,
    /// Last question failed; history is intact
    Errored,
}

/// A question accepted by [`Conversation::submit`] that must be sent to the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AskRequest {
    /// Matches the eventual outcome to this request
    pub request_id: u64,
    pub video_url: String,
    pub question: String,
}

/// Ordered question/answer history about one video.
///
/// Turns are only appended through the transitions below, so every responder
/// turn follows the asker turn that prompted it, and at most one request is
/// outstanding at any time.
#[derive(Debug, Clone)]
pub struct Conversation {
    video: Option<VideoReference>,
    turns: Vec<Turn>,
    pending_input: String,
    status: ConversationStatus,
    outstanding: Option<u64>,
    // Never reset, so outcomes from before a reset can't match a later request
    next_request_id: u64,
}

impl Conversation {
    pub fn new() -> Self {
        Self {
            video: None,
            turns: Vec::new(),
            pending_input: String::new(),
            status: ConversationStatus::Idle,
            outstanding: None,
            next_request_id: 1,
        }
    }

    /// Conversation scoped to `video`
    pub fn for_video(video: VideoReference) -> Self {
        let mut conversation = Self::new();
        conversation.video = Some(video);
        conversation
    }

    pub fn video(&self) -> Option<&VideoReference> {
        self.video.as_ref()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn status(&self) -> ConversationStatus {
        self.status
    }

    pub fn pending_input(&self) -> &str {
        &self.pending_input
    }

    pub fn is_awaiting(&self) -> bool {
        self.status == ConversationStatus::AwaitingResponse
    }

    /// Replace the text of the input box
    pub fn set_pending_input(&mut self, text: impl Into<String>) {
        self.pending_input = text.into();
    }

    /// Return to the initial state for a different video. Any outstanding
    /// request is forgotten and its outcome will be discarded.
    pub fn reset(&mut self, video: VideoReference) {
        if let Some(request_id) = self.outstanding.take() {
            debug!("Abandoning outstanding request {} on reset", request_id);
        }
        self.video = Some(video);
        self.turns.clear();
        self.pending_input.clear();
        self.status = ConversationStatus::Idle;
    }

    /// Accept a question: append the asker turn right away and hand back the
    /// request to send. Rejected while another question is outstanding; the
    /// message is dropped, not queued.
    pub fn submit(&mut self, message: &str) -> Result<AskRequest, SubmitRejected> {
        if message.trim().is_empty() {
            debug!("Ignoring empty chat message");
            return Err(SubmitRejected::EmptyMessage);
        }
        if self.is_awaiting() {
            debug!("Ignoring chat message while request {:?} is outstanding", self.outstanding);
            return Err(SubmitRejected::AwaitingResponse);
        }
        let video_url = match &self.video {
            Some(video) => video.raw_url.clone(),
            None => return Err(SubmitRejected::NoActiveVideo),
        };

        self.push_turn(Role::Asker, message.to_string());
        self.pending_input.clear();

        let request_id = self.next_request_id;
        self.next_request_id += 1;
        self.outstanding = Some(request_id);
        self.status = ConversationStatus::AwaitingResponse;

        debug!("Question {} accepted ({} turns)", request_id, self.turns.len());
        Ok(AskRequest {
            request_id,
            video_url,
            question: message.to_string(),
        })
    }

    /// Submit whatever is in the input box
    pub fn submit_pending(&mut self) -> Result<AskRequest, SubmitRejected> {
        let message = self.pending_input.clone();
        self.submit(&message)
    }

    /// Record the answer to the outstanding request. Returns `false` and leaves
    /// the conversation untouched when `request_id` is not outstanding.
    pub fn on_response(&mut self, request_id: u64, answer: impl Into<String>) -> bool {
        if !self.settle(request_id) {
            return false;
        }
        self.push_turn(Role::Responder, answer.into());
        self.status = ConversationStatus::Idle;
        true
    }

    /// Record that the outstanding request failed. The reason is logged; the
    /// history gets a fixed placeholder answer.
    pub fn on_failure(&mut self, request_id: u64, reason: &str) -> bool {
        if !self.settle(request_id) {
            return false;
        }
        warn!("Question {} failed: {}", request_id, reason);
        self.push_turn(Role::Responder, FAILED_ANSWER_PLACEHOLDER.to_string());
        self.status = ConversationStatus::Errored;
        true
    }

    fn settle(&mut self, request_id: u64) -> bool {
        if self.outstanding == Some(request_id) {
            self.outstanding = None;
            true
        } else {
            debug!(
                "Discarding stale outcome for request {} (outstanding: {:?})",
                request_id, self.outstanding
            );
            false
        }
    }

    fn push_turn(&mut self, role: Role, content: String) {
        self.turns.push(Turn {
            id: self.turns.len() as u64,
            role,
            content,
            created_at: Utc::now(),
        });
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}
