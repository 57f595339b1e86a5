//! Error types for the video digest client

use reqwest::StatusCode;

/// User input that does not resolve to a usable video
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid YouTube URL: {0}")]
    InvalidVideoUrl(String),
}

/// A remote call that did not complete successfully
#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Service returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Response is missing the `{0}` field")]
    MissingField(String),

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
}

/// Why a chat submission was not accepted
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitRejected {
    #[error("message is empty")]
    EmptyMessage,

    #[error("a question is already awaiting its answer")]
    AwaitingResponse,

    #[error("no video is active")]
    NoActiveVideo,
}
