/// Video Digest - summaries and question answering for YouTube videos
///
/// Client side of a summarization service: validates video URLs, formats the
/// generated summary for display and runs the question/answer conversation
/// about the active video.

pub mod config;
pub mod conversation;
pub mod display;
pub mod error;
pub mod format;
pub mod remote;
pub mod session;
pub mod video_id;

// Re-export main types for easy access
pub use crate::config::{Config, ConfigBuilder};
pub use crate::conversation::{
    AskRequest, Conversation, ConversationStatus, Role, Turn, FAILED_ANSWER_PLACEHOLDER,
};
pub use crate::error::{SubmitRejected, TransportError, ValidationError};
pub use crate::format::{format_summary, SummaryConfig, SummaryFormatter, Synopsis};
pub use crate::remote::{AskFields, HttpVideoService, SummarizeMethod, VideoService};
pub use crate::session::{
    PublishedSummary, SessionController, SessionEvent, SessionUpdate, FAILED_SUMMARY_PLACEHOLDER,
};
pub use crate::video_id::{extract_video_id, VideoId, VideoReference};
