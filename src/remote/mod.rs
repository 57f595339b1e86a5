pub mod http;

use crate::error::TransportError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use self::http::HttpVideoService;

/// How the summarize request is sent
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SummarizeMethod {
    /// `POST` with a `{ "video_url": .. }` JSON body
    PostJson,
    /// `GET` with a `youtube_video_url` query parameter
    GetQuery,
}

/// JSON field names of the ask exchange, which differ between deployments
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AskFields {
    /// Request field carrying the question
    pub question_field: String,

    /// Request field carrying the video URL, omitted from the body when unset
    pub video_field: Option<String>,

    /// Response field carrying the answer
    pub answer_field: String,
}

impl AskFields {
    /// `{ video_url, question }` answered with `{ answer }`
    pub fn question_answer() -> Self {
        Self {
            question_field: "question".to_string(),
            video_field: Some("video_url".to_string()),
            answer_field: "answer".to_string(),
        }
    }

    /// `{ message }` answered with `{ response }`
    pub fn message_response() -> Self {
        Self {
            question_field: "message".to_string(),
            video_field: None,
            answer_field: "response".to_string(),
        }
    }

    /// Look up a preset by name (`question-answer` or `message-response`)
    pub fn preset(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().replace('_', "-").as_str() {
            "question-answer" => Some(Self::question_answer()),
            "message-response" => Some(Self::message_response()),
            _ => None,
        }
    }
}

impl Default for AskFields {
    fn default() -> Self {
        Self::question_answer()
    }
}

/// The remote summarization and question-answering service
#[async_trait]
pub trait VideoService: Send + Sync {
    /// Raw generated summary for the video at `video_url`
    async fn summarize(&self, video_url: &str) -> Result<String, TransportError>;

    /// Answer to `question` about the video at `video_url`
    async fn ask(&self, video_url: &str, question: &str) -> Result<String, TransportError>;
}
