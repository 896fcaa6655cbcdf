//! Judge trait, configuration and request types.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::JudgeError;
use crate::profile::{ColumnProfile, DataType, EntityCount};
use crate::quality::round1;
use crate::recommend::{Action, Recommendation};

/// Configuration for judge providers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JudgeConfig {
    /// Model name; each provider has its own default.
    pub model: Option<String>,
    /// Endpoint override; each provider has its own default.
    pub base_url: Option<String>,
    pub temperature: f64,
    pub max_tokens: usize,
    /// Per-call deadline in seconds.
    pub timeout_secs: u64,
    /// Most judge calls in flight at once.
    pub max_in_flight: usize,
    /// Send every column in one call instead of one call per column.
    pub batch: bool,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            model: None,
            base_url: None,
            temperature: 0.2,
            max_tokens: 512,
            timeout_secs: 30,
            max_in_flight: 4,
            batch: false,
        }
    }
}

impl JudgeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// Apply `LLM_TIMEOUT_SEC` when set and valid.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(secs) = std::env::var("LLM_TIMEOUT_SEC")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
        {
            self.timeout_secs = secs;
        }
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_batch(mut self, batch: bool) -> Self {
        self.batch = batch;
        self
    }

    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight;
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// What the judge sees about one column: profile facts plus candidates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnBrief {
    pub column: String,
    pub data_type: DataType,
    pub row_count: usize,
    pub missing_percentage: f64,
    pub unique_count: usize,
    pub top_entities: Vec<EntityCount>,
    pub candidates: Vec<Recommendation>,
}

impl ColumnBrief {
    pub fn new(profile: &ColumnProfile, candidates: Vec<Recommendation>) -> Self {
        Self {
            column: profile.name.clone(),
            data_type: profile.data_type,
            row_count: profile.row_count,
            missing_percentage: round1(profile.missing_ratio() * 100.0),
            unique_count: profile.unique_count,
            top_entities: profile.entities.top.clone(),
            candidates,
        }
    }

    /// Actions the judge may accept besides keep.
    pub fn proposed_actions(&self) -> Vec<Action> {
        self.candidates.iter().map(|c| c.action).collect()
    }
}

/// One judge call: a single column, or every column in batched mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgeRequest {
    pub columns: Vec<ColumnBrief>,
    /// Whether the reply must be keyed by column name.
    pub batched: bool,
}

impl JudgeRequest {
    pub fn single(brief: ColumnBrief) -> Self {
        Self {
            columns: vec![brief],
            batched: false,
        }
    }

    pub fn batch(briefs: Vec<ColumnBrief>) -> Self {
        Self {
            columns: briefs,
            batched: true,
        }
    }
}

/// An external arbiter that picks one action per column.
///
/// The reply is untrusted text; the adapter validates it. Implementations
/// must be thread-safe so one judge can serve concurrent column calls.
#[async_trait]
pub trait Judge: Send + Sync {
    /// Ask for a plan and return the raw reply.
    async fn propose(&self, request: &JudgeRequest) -> Result<String, JudgeError>;

    /// Provider name, for logging.
    fn name(&self) -> &str;

    fn config(&self) -> &JudgeConfig;
}

/// Map a reqwest failure onto a judge error.
pub(crate) fn transport_error(provider: &str, timeout: Duration, err: reqwest::Error) -> JudgeError {
    if err.is_timeout() {
        JudgeError::Timeout(timeout)
    } else if err.is_connect() {
        JudgeError::Transport(format!("failed to connect to {}: {}", provider, err))
    } else {
        JudgeError::Transport(format!("{} request failed: {}", provider, err))
    }
}
