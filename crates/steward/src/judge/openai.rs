//! OpenAI-compatible chat completions judge.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde_json::json;

use super::prompts;
use super::provider::{Judge, JudgeConfig, JudgeRequest, transport_error};
use crate::error::{JudgeError, Result, StewardError};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Judge backed by an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiJudge {
    client: Client,
    api_key: String,
    endpoint: String,
    model: String,
    config: JudgeConfig,
}

impl OpenAiJudge {
    /// Create a judge with the given API key and default configuration.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(api_key, JudgeConfig::default())
    }

    /// Create a judge with custom configuration.
    pub fn with_config(api_key: impl Into<String>, config: JudgeConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| StewardError::Config(format!("Failed to create HTTP client: {}", e)))?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let model = config
            .model
            .clone()
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Ok(Self {
            client,
            api_key: api_key.into(),
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            model,
            config,
        })
    }

    /// Create from `OPENAI_API_KEY`, with `OPENAI_BASE_URL` and
    /// `OPENAI_MODEL` filling in what the configuration leaves unset.
    pub fn from_env(mut config: JudgeConfig) -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            StewardError::Config("OPENAI_API_KEY environment variable not set".to_string())
        })?;
        if config.base_url.is_none() {
            config.base_url = std::env::var("OPENAI_BASE_URL").ok();
        }
        if config.model.is_none() {
            config.model = std::env::var("OPENAI_MODEL").ok();
        }
        Self::with_config(api_key, config.with_env_overrides())
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_headers(&self) -> std::result::Result<HeaderMap, JudgeError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))
                .map_err(|e| JudgeError::Transport(format!("Invalid API key: {}", e)))?,
        );
        Ok(headers)
    }
}

#[async_trait]
impl Judge for OpenAiJudge {
    async fn propose(&self, request: &JudgeRequest) -> std::result::Result<String, JudgeError> {
        let body = json!({
            "model": self.model,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "response_format": {"type": "json_object"},
            "messages": [
                {"role": "system", "content": prompts::system_prompt()},
                {"role": "user", "content": prompts::request_prompt(request)}
            ]
        });

        let timeout = self.config.timeout();
        let response = self
            .client
            .post(&self.endpoint)
            .headers(self.build_headers()?)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error("OpenAI", timeout, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(JudgeError::Transport(format!(
                "OpenAI API error ({}): {}",
                status, error_text
            )));
        }

        let api_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| JudgeError::Malformed(format!("Failed to parse API response: {}", e)))?;

        api_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| JudgeError::Malformed("No response from OpenAI".to_string()))
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn config(&self) -> &JudgeConfig {
        &self.config
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: Option<String>,
}
