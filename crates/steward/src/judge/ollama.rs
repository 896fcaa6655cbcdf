//! Ollama judge for local models.
//!
//! Ollama runs models locally, no API key needed. Install it from
//! <https://ollama.ai>, then pull a model (`ollama pull llama3.2`).

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::prompts;
use super::provider::{Judge, JudgeConfig, JudgeRequest, transport_error};
use crate::error::{JudgeError, Result, StewardError};

const DEFAULT_HOST: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "llama3.2";

/// Judge backed by Ollama's `/api/chat` endpoint.
pub struct OllamaJudge {
    client: Client,
    api_url: String,
    model: String,
    config: JudgeConfig,
}

impl OllamaJudge {
    /// Create with `OLLAMA_HOST` and `OLLAMA_MODEL` filling in what the
    /// configuration leaves unset.
    pub fn new(mut config: JudgeConfig) -> Result<Self> {
        if config.base_url.is_none() {
            config.base_url = std::env::var("OLLAMA_HOST").ok();
        }
        if config.model.is_none() {
            config.model = std::env::var("OLLAMA_MODEL").ok();
        }
        Self::with_config(config.with_env_overrides())
    }

    /// Create with custom configuration only.
    pub fn with_config(config: JudgeConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| StewardError::Config(format!("Failed to create HTTP client: {}", e)))?;

        let host = config.base_url.as_deref().unwrap_or(DEFAULT_HOST);
        Ok(Self {
            client,
            api_url: format!("{}/api/chat", host.trim_end_matches('/')),
            model: config
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            config,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl Judge for OllamaJudge {
    async fn propose(&self, request: &JudgeRequest) -> std::result::Result<String, JudgeError> {
        let body = json!({
            "model": self.model,
            "stream": false,
            "format": "json",
            "options": {
                "temperature": self.config.temperature,
                "num_predict": self.config.max_tokens
            },
            "messages": [
                {"role": "system", "content": prompts::system_prompt()},
                {"role": "user", "content": prompts::request_prompt(request)}
            ]
        });

        let timeout = self.config.timeout();
        let response = self
            .client
            .post(&self.api_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error("Ollama", timeout, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            if error_text.contains("not found") {
                return Err(JudgeError::Transport(format!(
                    "Model '{}' not found. Pull it with: ollama pull {}",
                    self.model, self.model
                )));
            }
            return Err(JudgeError::Transport(format!(
                "Ollama error ({}): {}",
                status, error_text
            )));
        }

        let api_response: OllamaResponse = response
            .json()
            .await
            .map_err(|e| JudgeError::Malformed(format!("Failed to parse Ollama response: {}", e)))?;

        Ok(api_response.message.content)
    }

    fn name(&self) -> &str {
        "ollama"
    }

    fn config(&self) -> &JudgeConfig {
        &self.config
    }
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    message: OllamaMessage,
}

#[derive(Debug, Deserialize)]
struct OllamaMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_endpoint() {
        let judge = OllamaJudge::with_config(JudgeConfig::default()).unwrap();
        assert_eq!(judge.api_url, "http://localhost:11434/api/chat");
        assert_eq!(judge.model(), "llama3.2");
    }

    #[test]
    fn test_custom_host_and_model() {
        let config = JudgeConfig::default()
            .with_model("mistral")
            .with_timeout_secs(5);
        let config = JudgeConfig {
            base_url: Some("http://gpu-box:11434/".to_string()),
            ..config
        };
        let judge = OllamaJudge::with_config(config).unwrap();
        assert_eq!(judge.api_url, "http://gpu-box:11434/api/chat");
        assert_eq!(judge.model(), "mistral");
    }
}
