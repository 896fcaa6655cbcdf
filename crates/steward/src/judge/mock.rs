//! Mock judge for testing and offline runs.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value, json};

use super::provider::{ColumnBrief, Judge, JudgeConfig, JudgeRequest};
use crate::error::JudgeError;

#[derive(Debug, Clone)]
enum Reply {
    /// Accept each column's first candidate with its suggested value.
    FirstCandidate,
    Fixed(String),
    Fail(JudgeError),
}

/// Judge with predictable replies. Counts calls and the peak number of
/// concurrent calls so tests can check the adapter's limits.
#[derive(Debug)]
pub struct MockJudge {
    reply: Reply,
    delay: Option<Duration>,
    config: JudgeConfig,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl MockJudge {
    /// Accept the first candidate of every column.
    pub fn new() -> Self {
        Self::with_reply_kind(Reply::FirstCandidate)
    }

    /// Always reply with the given text.
    pub fn with_reply(reply: impl Into<String>) -> Self {
        Self::with_reply_kind(Reply::Fixed(reply.into()))
    }

    /// Always fail with the given error.
    pub fn failing(error: JudgeError) -> Self {
        Self::with_reply_kind(Reply::Fail(error))
    }

    fn with_reply_kind(reply: Reply) -> Self {
        Self {
            reply,
            delay: None,
            config: JudgeConfig::default(),
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    /// Wait before replying.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_config(mut self, config: JudgeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn render(&self, request: &JudgeRequest) -> Result<String, JudgeError> {
        match &self.reply {
            Reply::Fixed(text) => Ok(text.clone()),
            Reply::Fail(error) => Err(error.clone()),
            Reply::FirstCandidate if request.batched => {
                let columns: Map<String, Value> = request
                    .columns
                    .iter()
                    .map(|brief| (brief.column.clone(), first_candidate_plan(brief)))
                    .collect();
                Ok(json!({ "columns": columns }).to_string())
            }
            Reply::FirstCandidate => Ok(request
                .columns
                .first()
                .map(first_candidate_plan)
                .unwrap_or_else(|| json!({"text": "", "value": {}}))
                .to_string()),
        }
    }
}

impl Default for MockJudge {
    fn default() -> Self {
        Self::new()
    }
}

fn first_candidate_plan(brief: &ColumnBrief) -> Value {
    let mut value = Map::new();
    for (index, candidate) in brief.candidates.iter().enumerate() {
        let entry = if index == 0 {
            match candidate.suggested_value() {
                Some(v) => json!({"status": "accepted", "value": v}),
                None => json!({"status": "accepted"}),
            }
        } else {
            json!({"status": "rejected"})
        };
        value.insert(candidate.action.to_string(), entry);
    }
    if value.is_empty() {
        value.insert("keep".to_string(), json!({"status": "accepted"}));
    }
    json!({
        "text": format!("Mock plan for '{}'", brief.column),
        "value": value
    })
}

#[async_trait]
impl Judge for MockJudge {
    async fn propose(&self, request: &JudgeRequest) -> Result<String, JudgeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(current, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let reply = self.render(request);

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        reply
    }

    fn name(&self) -> &str {
        "mock"
    }

    fn config(&self) -> &JudgeConfig {
        &self.config
    }
}
