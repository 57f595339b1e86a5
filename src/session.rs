//! Session controller: ties URL validation, summarization and the chat
//! state machine to the remote service.
//!
//! Remote calls run as spawned tasks that report back through a
//! [`SessionEvent`] channel; all state changes happen in
//! [`SessionController::handle_event`] on the caller's task, so the controller
//! needs no locking.

use crate::conversation::{AskRequest, Conversation};
use crate::error::{SubmitRejected, TransportError, ValidationError};
use crate::format::{SummaryFormatter, Synopsis};
use crate::remote::VideoService;
use crate::video_id::VideoReference;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Summary text published when the summarize call fails
pub const FAILED_SUMMARY_PLACEHOLDER: &str = "Failed to fetch summary.";

/// Completion of a remote call started by the controller
#[derive(Debug)]
pub enum SessionEvent {
    SummaryFinished {
        generation: u64,
        result: Result<String, TransportError>,
    },
    AnswerFinished {
        request_id: u64,
        result: Result<String, TransportError>,
    },
}

/// Result of applying a [`SessionEvent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionUpdate {
    SummaryPublished,
    ConversationAdvanced,
    /// The event belonged to a superseded request
    Discarded,
}

/// Summary currently shown for the active video
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishedSummary {
    Ready(Synopsis),
    Unavailable,
}

impl PublishedSummary {
    pub fn display_text(&self) -> &str {
        match self {
            PublishedSummary::Ready(synopsis) => synopsis.display_text(),
            PublishedSummary::Unavailable => FAILED_SUMMARY_PLACEHOLDER,
        }
    }

    pub fn synopsis(&self) -> Option<&Synopsis> {
        match self {
            PublishedSummary::Ready(synopsis) => Some(synopsis),
            PublishedSummary::Unavailable => None,
        }
    }
}

pub struct SessionController {
    service: Arc<dyn VideoService>,
    formatter: SummaryFormatter,
    video: Option<VideoReference>,
    summary: Option<PublishedSummary>,
    loading: bool,
    summary_generation: u64,
    conversation: Conversation,
    events: mpsc::UnboundedSender<SessionEvent>,
}

impl SessionController {
    /// Create a controller and the receiver its remote calls report to.
    /// Feed every received event back into [`Self::handle_event`].
    pub fn new(
        service: Arc<dyn VideoService>,
        formatter: SummaryFormatter,
    ) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let controller = Self {
            service,
            formatter,
            video: None,
            summary: None,
            loading: false,
            summary_generation: 0,
            conversation: Conversation::new(),
            events,
        };
        (controller, receiver)
    }

    pub fn video(&self) -> Option<&VideoReference> {
        self.video.as_ref()
    }

    pub fn summary(&self) -> Option<&PublishedSummary> {
        self.summary.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Validate `raw_url` and start summarizing it.
    ///
    /// Invalid input fails immediately and leaves the session untouched. A
    /// valid URL becomes the active video, resets the conversation and starts
    /// exactly one summarize call.
    pub fn submit_url(&mut self, raw_url: &str) -> Result<VideoReference, ValidationError> {
        let reference = VideoReference::parse(raw_url).map_err(|e| {
            warn!("Rejected video URL: {}", e);
            e
        })?;

        if let Some(id) = &reference.canonical_id {
            info!("🎬 Summarizing video {} ({})", id, id.embed_url());
        }

        self.summary_generation += 1;
        self.loading = true;
        self.summary = None;
        self.video = Some(reference.clone());
        self.conversation.reset(reference.clone());

        let generation = self.summary_generation;
        let service = Arc::clone(&self.service);
        let events = self.events.clone();
        let video_url = reference.raw_url.clone();

        tokio::spawn(async move {
            let result = service.summarize(&video_url).await;
            if events.send(SessionEvent::SummaryFinished { generation, result }).is_err() {
                debug!("Session closed before summary {} arrived", generation);
            }
        });

        Ok(reference)
    }

    /// Replace the chat input text
    pub fn set_chat_input(&mut self, text: impl Into<String>) {
        self.conversation.set_pending_input(text);
    }

    /// Ask a question about the active video
    pub fn submit_chat(&mut self, message: &str) -> Result<(), SubmitRejected> {
        let request = self.conversation.submit(message)?;
        self.dispatch_ask(request);
        Ok(())
    }

    /// Ask whatever is in the chat input
    pub fn submit_chat_input(&mut self) -> Result<(), SubmitRejected> {
        let request = self.conversation.submit_pending()?;
        self.dispatch_ask(request);
        Ok(())
    }

    fn dispatch_ask(&self, request: AskRequest) {
        let service = Arc::clone(&self.service);
        let events = self.events.clone();

        tokio::spawn(async move {
            let AskRequest { request_id, video_url, question } = request;
            let result = service.ask(&video_url, &question).await;
            if events.send(SessionEvent::AnswerFinished { request_id, result }).is_err() {
                debug!("Session closed before answer {} arrived", request_id);
            }
        });
    }

    /// Apply the outcome of a remote call. Failures become placeholder
    /// content; nothing is propagated to the caller.
    pub fn handle_event(&mut self, event: SessionEvent) -> SessionUpdate {
        match event {
            SessionEvent::SummaryFinished { generation, result } => {
                self.finish_summary(generation, result)
            }
            SessionEvent::AnswerFinished { request_id, result } => {
                self.finish_answer(request_id, result)
            }
        }
    }

    fn finish_summary(
        &mut self,
        generation: u64,
        result: Result<String, TransportError>,
    ) -> SessionUpdate {
        if generation != self.summary_generation {
            debug!(
                "Discarding summary {} (current request is {})",
                generation, self.summary_generation
            );
            return SessionUpdate::Discarded;
        }

        self.loading = false;
        self.summary = Some(match result {
            Ok(raw) => {
                info!("📝 Summary received ({} bytes)", raw.len());
                PublishedSummary::Ready(Synopsis::new(raw, &self.formatter))
            }
            Err(e) => {
                warn!("Summary request failed: {}", e);
                PublishedSummary::Unavailable
            }
        });
        SessionUpdate::SummaryPublished
    }

    fn finish_answer(
        &mut self,
        request_id: u64,
        result: Result<String, TransportError>,
    ) -> SessionUpdate {
        let applied = match result {
            Ok(answer) => self.conversation.on_response(request_id, answer),
            Err(e) => self.conversation.on_failure(request_id, &e.to_string()),
        };

        if applied {
            SessionUpdate::ConversationAdvanced
        } else {
            SessionUpdate::Discarded
        }
    }
}
