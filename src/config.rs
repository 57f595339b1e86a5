use crate::format::SummaryConfig;
use crate::remote::{AskFields, SummarizeMethod};
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Configuration for the video digest client
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote service settings
    #[serde(default)]
    pub service: ServiceConfig,

    /// Summary formatting settings
    #[serde(default)]
    pub summary: SummaryConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Base URL of the summarization service
    pub base_url: String,

    /// Summarize endpoint, relative to `base_url`
    pub summarize_path: String,

    /// How the summarize request is sent
    pub summarize_method: SummarizeMethod,

    /// Question endpoint, relative to `base_url`
    pub ask_path: String,

    /// Request timeout in seconds
    pub timeout_seconds: u64,

    /// Field names of the question/answer exchange
    pub ask_fields: AskFields,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/".to_string(),
            summarize_path: "api/summarize/".to_string(),
            summarize_method: SummarizeMethod::PostJson,
            ask_path: "api/chatbot/".to_string(),
            timeout_seconds: 60, // generation of long transcripts is slow
            ask_fields: AskFields::question_answer(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default tracing filter when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "video_digest=info,warn".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the first config file found, then apply
    /// environment overrides
    pub fn load() -> Result<Self> {
        let config_paths = ["video-digest.toml", "config/video-digest.toml"];

        for path in &config_paths {
            if Path::new(path).exists() {
                match Self::from_file(Path::new(path)) {
                    Ok(config) => {
                        tracing::info!("📄 Loaded configuration from: {}", path);
                        return config.with_env_overrides();
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config file {}: {}", path, e);
                    }
                }
            }
        }

        Self::default().with_env_overrides()
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read {}: {}", path.display(), e))?;
        Ok(toml::from_str(&config_str)?)
    }

    /// Override settings from `VIDEO_DIGEST_*` environment variables
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(base_url) = std::env::var("VIDEO_DIGEST_BASE_URL") {
            self.service.base_url = base_url;
        }

        if let Ok(timeout) = std::env::var("VIDEO_DIGEST_TIMEOUT") {
            self.service.timeout_seconds = timeout
                .parse()
                .map_err(|_| anyhow!("VIDEO_DIGEST_TIMEOUT must be a number of seconds"))?;
        }

        if let Ok(shape) = std::env::var("VIDEO_DIGEST_ASK_SHAPE") {
            self.service.ask_fields = AskFields::preset(&shape)
                .ok_or_else(|| anyhow!("Unknown ask shape: {}", shape))?;
        }

        if let Ok(level) = std::env::var("VIDEO_DIGEST_LOG_LEVEL") {
            self.logging.level = level;
        }

        Ok(self)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        std::fs::write(path, config_str)?;
        tracing::info!("💾 Configuration saved to: {}", path.display());
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let base = Url::parse(&self.service.base_url)
            .map_err(|e| anyhow!("Invalid base_url {}: {}", self.service.base_url, e))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(anyhow!("base_url must use http or https"));
        }

        if self.service.timeout_seconds == 0 {
            return Err(anyhow!("timeout_seconds must be greater than 0"));
        }

        let fields = &self.service.ask_fields;
        if fields.question_field.is_empty() || fields.answer_field.is_empty() {
            return Err(anyhow!("ask question_field and answer_field must not be empty"));
        }
        if fields.video_field.as_deref() == Some("") {
            return Err(anyhow!("ask video_field must not be empty when set"));
        }

        if self.summary.heading_labels.iter().any(|label| label.trim().is_empty()) {
            return Err(anyhow!("heading labels must not be empty"));
        }

        tracing::debug!("✅ Configuration validation passed");
        Ok(())
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "Video Digest Configuration:\n\
            - Service: {}\n\
            - Summarize: {} ({:?})\n\
            - Ask: {} ({} -> {})\n\
            - Timeout: {}s\n\
            - Headings: {}",
            self.service.base_url,
            self.service.summarize_path,
            self.service.summarize_method,
            self.service.ask_path,
            self.service.ask_fields.question_field,
            self.service.ask_fields.answer_field,
            self.service.timeout_seconds,
            self.summary.heading_labels.join(", ")
        )
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.service.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.config.service.timeout_seconds = seconds;
        self
    }

    pub fn with_summarize_method(mut self, method: SummarizeMethod) -> Self {
        self.config.service.summarize_method = method;
        self
    }

    pub fn with_summarize_path(mut self, path: impl Into<String>) -> Self {
        self.config.service.summarize_path = path.into();
        self
    }

    pub fn with_ask_path(mut self, path: impl Into<String>) -> Self {
        self.config.service.ask_path = path.into();
        self
    }

    pub fn with_ask_fields(mut self, fields: AskFields) -> Self {
        self.config.service.ask_fields = fields;
        self
    }

    pub fn with_heading_labels(mut self, labels: Vec<String>) -> Self {
        self.config.summary.heading_labels = labels;
        self
    }

    pub fn with_bullet(mut self, bullet: impl Into<String>) -> Self {
        self.config.summary.bullet = bullet.into();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.service.base_url, "http://localhost:8000/");
        assert_eq!(config.service.summarize_method, SummarizeMethod::PostJson);
        assert_eq!(config.service.ask_fields, AskFields::question_answer());
        assert_eq!(config.summary.bullet, "•");
    }

    #[test]
    fn test_config_builder() {
        let config = ConfigBuilder::new()
            .with_base_url("https://digest.example.com/")
            .with_timeout(5)
            .with_ask_fields(AskFields::message_response())
            .with_bullet("-")
            .build();

        assert_eq!(config.service.base_url, "https://digest.example.com/");
        assert_eq!(config.service.timeout_seconds, 5);
        assert_eq!(config.service.ask_fields.answer_field, "response");
        assert_eq!(config.summary.bullet, "-");
    }

    #[test]
    fn test_config_validation() {
        assert!(Config::default().validate().is_ok());
        assert!(ConfigBuilder::new().with_timeout(0).build().validate().is_err());
        assert!(ConfigBuilder::new().with_base_url("ftp://host/").build().validate().is_err());
        assert!(ConfigBuilder::new()
            .with_heading_labels(vec!["Key Points".to_string(), " ".to_string()])
            .build()
            .validate()
            .is_err());
    }

    #[test]
    fn test_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            [service]
            base_url = "http://10.0.0.2:9000/"
            summarize_method = "GetQuery"
            summarize_path = "summary/"

            [service.ask_fields]
            question_field = "message"
            answer_field = "response"
            "#,
        )
        .unwrap();

        assert_eq!(config.service.base_url, "http://10.0.0.2:9000/");
        assert_eq!(config.service.summarize_method, SummarizeMethod::GetQuery);
        assert_eq!(config.service.ask_path, "api/chatbot/");
        assert_eq!(config.service.ask_fields, AskFields::message_response());
        assert_eq!(config.summary.heading_labels.len(), 3);
    }

    // The only test touching VIDEO_DIGEST_* variables, so it cannot race
    // with other tests in the same process
    #[test]
    fn test_env_overrides() {
        std::env::set_var("VIDEO_DIGEST_BASE_URL", "http://10.0.0.3:7000/");
        std::env::set_var("VIDEO_DIGEST_TIMEOUT", "15");
        std::env::set_var("VIDEO_DIGEST_ASK_SHAPE", "message_response");
        std::env::set_var("VIDEO_DIGEST_LOG_LEVEL", "video_digest=trace");

        let config = Config::default().with_env_overrides().unwrap();
        assert_eq!(config.service.base_url, "http://10.0.0.3:7000/");
        assert_eq!(config.service.timeout_seconds, 15);
        assert_eq!(config.service.ask_fields, AskFields::message_response());
        assert_eq!(config.logging.level, "video_digest=trace");
        // Settings without a variable keep their values
        assert_eq!(config.service.ask_path, "api/chatbot/");

        std::env::set_var("VIDEO_DIGEST_TIMEOUT", "soon");
        let err = Config::default().with_env_overrides().unwrap_err();
        assert!(err.to_string().contains("VIDEO_DIGEST_TIMEOUT"));

        std::env::set_var("VIDEO_DIGEST_TIMEOUT", "15");
        std::env::set_var("VIDEO_DIGEST_ASK_SHAPE", "bogus");
        let err = Config::default().with_env_overrides().unwrap_err();
        assert!(err.to_string().contains("Unknown ask shape: bogus"));

        for var in [
            "VIDEO_DIGEST_BASE_URL",
            "VIDEO_DIGEST_TIMEOUT",
            "VIDEO_DIGEST_ASK_SHAPE",
            "VIDEO_DIGEST_LOG_LEVEL",
        ] {
            std::env::remove_var(var);
        }

        let config = Config::default().with_env_overrides().unwrap();
        assert_eq!(config.service.base_url, "http://localhost:8000/");
        assert_eq!(config.service.timeout_seconds, 60);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("video-digest.toml");

        let config = ConfigBuilder::new().with_ask_path("chat/").build();
        config.save(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.service.ask_path, "chat/");
        assert_eq!(loaded.service.ask_fields, config.service.ask_fields);
    }
}
