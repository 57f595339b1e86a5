use super::{AskFields, SummarizeMethod, VideoService};
use crate::config::ServiceConfig;
use crate::error::TransportError;
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Serialize;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Response field carrying the generated summary
const SUMMARY_FIELD: &str = "summary";

/// Query parameter used by `GET` summarize endpoints
const SUMMARY_QUERY_PARAM: &str = "youtube_video_url";

/// HTTP/JSON client for the summarization service
pub struct HttpVideoService {
    client: Client,
    summarize_url: Url,
    ask_url: Url,
    summarize_method: SummarizeMethod,
    ask_fields: AskFields,
}

#[derive(Debug, Serialize)]
struct SummarizeRequest<'a> {
    video_url: &'a str,
}

impl HttpVideoService {
    pub fn new(config: &ServiceConfig) -> Result<Self, TransportError> {
        let base = base_url(&config.base_url)?;
        let summarize_url = base.join(&config.summarize_path)?;
        let ask_url = base.join(&config.ask_path)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            summarize_url,
            ask_url,
            summarize_method: config.summarize_method,
            ask_fields: config.ask_fields.clone(),
        })
    }

    pub fn summarize_url(&self) -> &Url {
        &self.summarize_url
    }

    pub fn ask_url(&self) -> &Url {
        &self.ask_url
    }

    fn ask_body(&self, video_url: &str, question: &str) -> Value {
        let mut body = Map::new();
        if let Some(field) = &self.ask_fields.video_field {
            body.insert(field.clone(), Value::String(video_url.to_string()));
        }
        body.insert(
            self.ask_fields.question_field.clone(),
            Value::String(question.to_string()),
        );
        Value::Object(body)
    }
}

#[async_trait]
impl VideoService for HttpVideoService {
    async fn summarize(&self, video_url: &str) -> Result<String, TransportError> {
        debug!("Requesting summary from {} for {}", self.summarize_url, video_url);

        let request = match self.summarize_method {
            SummarizeMethod::PostJson => self
                .client
                .post(self.summarize_url.clone())
                .json(&SummarizeRequest { video_url }),
            SummarizeMethod::GetQuery => self
                .client
                .get(self.summarize_url.clone())
                .query(&[(SUMMARY_QUERY_PARAM, video_url)]),
        };

        let response = ensure_success(request.send().await?).await?;
        let body: Value = response.json().await?;
        text_field(&body, SUMMARY_FIELD)
    }

    async fn ask(&self, video_url: &str, question: &str) -> Result<String, TransportError> {
        debug!("Sending question to {}", self.ask_url);

        let response = self
            .client
            .post(self.ask_url.clone())
            .json(&self.ask_body(video_url, question))
            .send()
            .await?;

        let body: Value = ensure_success(response).await?.json().await?;
        text_field(&body, &self.ask_fields.answer_field)
    }
}

/// Parse the base URL so that relative endpoint paths join beneath it
fn base_url(raw: &str) -> Result<Url, TransportError> {
    let raw = raw.trim();
    if raw.ends_with('/') {
        Ok(Url::parse(raw)?)
    } else {
        Ok(Url::parse(&format!("{}/", raw))?)
    }
}

async fn ensure_success(response: Response) -> Result<Response, TransportError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(TransportError::Status { status, body })
}

/// Text of `field` in a JSON object; non-string values are rendered as JSON
fn text_field(body: &Value, field: &str) -> Result<String, TransportError> {
    match body.get(field) {
        Some(Value::String(text)) => Ok(text.clone()),
        Some(Value::Null) | None => Err(TransportError::MissingField(field.to_string())),
        Some(other) => Ok(other.to_string()),
    }
}
